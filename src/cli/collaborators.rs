//! Collaborators command - manage repository access

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check};
use anstream::println;
use autopr::error::Result;
use autopr::types::{AddCollaboratorOutcome, Permission};
use clap::Subcommand;
use std::path::Path;

/// Collaborator subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum CollaboratorAction {
    /// List collaborators
    List,
    /// Invite a user or change their permission
    Add {
        /// GitHub login
        login: String,
        /// Permission level
        #[arg(long, value_enum, default_value = "push")]
        permission: Permission,
    },
    /// Remove a collaborator
    Remove {
        /// GitHub login
        login: String,
    },
    /// List pending invitations
    Invitations,
    /// Cancel a pending invitation
    CancelInvite {
        /// Invitation ID (see `invitations`)
        id: u64,
    },
}

/// Run a collaborators subcommand
#[allow(clippy::future_not_send)]
pub async fn run_collaborators(path: &Path, action: CollaboratorAction) -> Result<()> {
    let mut ctx = CommandContext::new(path).await?;
    let platform = ctx.platform.as_ref();

    match action {
        CollaboratorAction::List => {
            let collaborators = ctx.reviewers.collaborators().get(platform).await?;
            println!(
                "{}",
                format!(
                    "{} collaborator(s) on {}",
                    collaborators.len(),
                    platform.config().slug()
                )
                .emphasis()
            );
            for collaborator in &collaborators {
                println!(
                    "  {} {}",
                    format!("{:<24}", collaborator.login).accent(),
                    collaborator.permission.as_deref().unwrap_or("-").muted()
                );
            }
        }
        CollaboratorAction::Add { login, permission } => {
            let outcome = platform.add_collaborator(&login, permission).await?;
            ctx.reviewers.collaborators().invalidate(platform);
            match outcome {
                AddCollaboratorOutcome::Invited(id) => println!(
                    "{} Invited {} with {} permission {}",
                    check(),
                    login.accent(),
                    permission.as_str(),
                    format!("(invitation {id})").muted()
                ),
                AddCollaboratorOutcome::AlreadyCollaborator => println!(
                    "{} {} is already a collaborator; permission set to {}",
                    check(),
                    login.accent(),
                    permission.as_str()
                ),
            }
        }
        CollaboratorAction::Remove { login } => {
            platform.remove_collaborator(&login).await?;
            ctx.reviewers.collaborators().invalidate(platform);
            println!("{} Removed {}", check(), login.accent());
        }
        CollaboratorAction::Invitations => {
            let invitations = platform.list_invitations().await?;
            if invitations.is_empty() {
                println!("{}", "No pending invitations".muted());
            }
            for invitation in &invitations {
                println!(
                    "  {} {} {} {}",
                    format!("{:>10}", invitation.id).muted(),
                    format!("{:<24}", invitation.invitee.as_deref().unwrap_or("?")).accent(),
                    invitation.permissions,
                    invitation
                        .created_at
                        .format("%Y-%m-%d")
                        .to_string()
                        .muted()
                );
            }
        }
        CollaboratorAction::CancelInvite { id } => {
            platform.cancel_invitation(id).await?;
            println!("{} Cancelled invitation {}", check(), id.accent());
        }
    }
    Ok(())
}
