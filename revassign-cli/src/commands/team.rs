//! Team management commands

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use revassign_core::{Error, Team, TeamMember};

use super::{print_json, Services};

/// Team management commands
#[derive(Args, Debug)]
pub struct TeamArgs {
    #[command(subcommand)]
    pub command: TeamCommand,
}

#[derive(Subcommand, Debug)]
pub enum TeamCommand {
    /// Create a team and upsert its members
    Add {
        /// Team name
        #[arg(short, long, required_unless_present = "file")]
        name: Option<String>,

        /// Member as `id:username`, or `id:username:inactive`
        #[arg(short, long = "member", value_parser = parse_member, conflicts_with = "file")]
        members: Vec<TeamMember>,

        /// Read the team from a JSON file instead
        #[arg(short, long, conflicts_with = "name")]
        file: Option<PathBuf>,
    },

    /// Show a team with its members
    Get {
        /// Team name
        name: String,
    },

    /// Mark every member of a team inactive
    Deactivate {
        /// Team name
        name: String,
    },
}

impl TeamArgs {
    /// Execute the team command
    pub async fn execute(&self, services: &Services) -> revassign_core::Result<()> {
        match &self.command {
            TeamCommand::Add {
                name,
                members,
                file,
            } => {
                let team = match (file, name) {
                    (Some(path), _) => read_team_file(path)?,
                    (None, Some(name)) => Team::new(name.clone(), members.clone()),
                    (None, None) => {
                        return Err(Error::Config("either --name or --file is required".into()))
                    }
                };
                let created = services.teams.create_team(team).await?;
                print_json(&serde_json::json!({ "team": created }))
            }
            TeamCommand::Get { name } => print_json(&services.teams.get_team(name).await?),
            TeamCommand::Deactivate { name } => {
                let deactivated = services.teams.deactivate_team(name).await?;
                print_json(&serde_json::json!({
                    "team_name": name,
                    "deactivated": deactivated,
                }))
            }
        }
    }
}

fn read_team_file(path: &Path) -> revassign_core::Result<Team> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Cannot read team file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&contents)
        .map_err(|e| Error::Config(format!("Invalid team file {}: {}", path.display(), e)))
}

/// Parse `id:username[:inactive]`
fn parse_member(spec: &str) -> Result<TeamMember, String> {
    let mut parts = spec.split(':');
    let id = parts.next().filter(|s| !s.is_empty());
    let username = parts.next().filter(|s| !s.is_empty());

    let (Some(id), Some(username)) = (id, username) else {
        return Err(format!("expected id:username[:inactive], got '{}'", spec));
    };

    let is_active = match parts.next() {
        None => true,
        Some("inactive") => false,
        Some("active") => true,
        Some(other) => return Err(format!("unknown member flag '{}'", other)),
    };

    if parts.next().is_some() {
        return Err(format!("too many fields in '{}'", spec));
    }

    Ok(TeamMember::new(id, username, is_active))
}
