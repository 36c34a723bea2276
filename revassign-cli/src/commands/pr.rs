//! Pull request commands

use clap::{Args, Subcommand};
use revassign_core::CreatePullRequest;

use super::{print_json, Services};

/// Pull request commands
#[derive(Args, Debug)]
pub struct PrArgs {
    #[command(subcommand)]
    pub command: PrCommand,
}

#[derive(Subcommand, Debug)]
pub enum PrCommand {
    /// Open a pull request and assign reviewers from the author's team
    Create {
        /// Pull request id
        #[arg(long)]
        id: String,

        /// Pull request title
        #[arg(long)]
        name: String,

        /// Author user id
        #[arg(long)]
        author: String,
    },

    /// Mark a pull request merged
    Merge {
        /// Pull request id
        pr_id: String,
    },

    /// Replace one reviewer with another active teammate
    Reassign {
        /// Pull request id
        pr_id: String,

        /// Reviewer to replace
        #[arg(long)]
        old_reviewer: String,
    },

    /// Show a pull request
    Get {
        /// Pull request id
        pr_id: String,
    },
}

impl PrArgs {
    /// Execute the pull request command
    pub async fn execute(&self, services: &Services) -> revassign_core::Result<()> {
        let prs = &services.pull_requests;
        match &self.command {
            PrCommand::Create { id, name, author } => {
                let pr = prs
                    .create_pr(CreatePullRequest::new(id, name, author))
                    .await?;
                print_json(&serde_json::json!({ "pr": pr }))
            }
            PrCommand::Merge { pr_id } => {
                let pr = prs.merge_pr(pr_id).await?;
                print_json(&serde_json::json!({ "pr": pr }))
            }
            PrCommand::Reassign {
                pr_id,
                old_reviewer,
            } => print_json(&prs.update_reviewer(pr_id, old_reviewer).await?),
            PrCommand::Get { pr_id } => print_json(&prs.get_pr(pr_id).await?),
        }
    }
}
