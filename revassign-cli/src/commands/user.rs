//! User commands

use clap::{Args, Subcommand};

use super::{print_json, Services};

/// User commands
#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Set whether a user can be picked as reviewer
    SetActive {
        /// User id
        user_id: String,

        /// New activity flag
        #[arg(long, required = true, action = clap::ArgAction::Set)]
        active: bool,
    },

    /// List open and merged pull requests the user reviews
    Reviews {
        /// User id
        user_id: String,
    },
}

impl UserArgs {
    /// Execute the user command
    pub async fn execute(&self, services: &Services) -> revassign_core::Result<()> {
        match &self.command {
            UserCommand::SetActive { user_id, active } => {
                let user = services.users.set_is_active(user_id, *active).await?;
                print_json(&serde_json::json!({ "user": user }))
            }
            UserCommand::Reviews { user_id } => {
                let pull_requests = services.users.review_queue(user_id).await?;
                print_json(&serde_json::json!({
                    "user_id": user_id,
                    "pull_requests": pull_requests,
                }))
            }
        }
    }
}
