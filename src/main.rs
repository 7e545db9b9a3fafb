//! autopr CLI - branch-pattern driven pull requests for GitHub

mod cli;

use anstream::eprintln;
use autopr::error::Result;
use autopr::types::MergeMethod;
use clap::{ArgAction, Parser, Subcommand};
use cli::auth::AuthAction;
use cli::collaborators::CollaboratorAction;
use cli::conflicts::ConflictOptions;
use cli::daily::DailyOptions;
use cli::merge::MergeOptions;
use cli::new::NewOptions;
use cli::pattern::PatternAction;
use cli::reviewer_group::ReviewerGroupAction;
use cli::style::Stylize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "autopr")]
#[command(about = "Automate GitHub pull requests from branch naming patterns")]
#[command(version)]
struct Cli {
    /// Path to the repository (defaults to current directory)
    #[arg(long, global = true)]
    path: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter .autopr.json for this repository
    Init {
        /// Base branch for PRs (detected from origin/HEAD if omitted)
        #[arg(long)]
        default_branch: Option<String>,

        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Create or update the PR for the current branch
    New {
        /// Base branch (overrides config)
        #[arg(long)]
        base: Option<String>,

        /// PR title (overrides the generated title)
        #[arg(long)]
        title: Option<String>,

        /// Open as draft
        #[arg(long)]
        draft: bool,

        /// Generate the description with the AI backend
        #[arg(long)]
        ai: bool,

        /// Do not push the branch first
        #[arg(long)]
        no_push: bool,

        /// Show the plan without pushing or calling GitHub
        #[arg(long)]
        dry_run: bool,
    },

    /// Merge a PR after checking approval, CI and conflicts
    Merge {
        /// PR number
        pr: u64,

        /// Merge method
        #[arg(long, value_enum, default_value_t)]
        method: MergeMethod,

        /// Delete the head branch after merging
        #[arg(long)]
        delete_branch: bool,

        /// Merge even if not approved or CI has not passed
        #[arg(long)]
        force: bool,

        /// Show what would happen without merging
        #[arg(long)]
        dry_run: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show mergeability, approval and CI state of a PR
    Status {
        /// PR number
        pr: u64,
    },

    /// Show conflicting files of a PR
    Conflicts {
        /// PR number
        pr: u64,

        /// Reproduce the merge locally and show conflict regions
        #[arg(long)]
        local: bool,

        /// Ask the AI backend for resolution suggestions
        #[arg(long)]
        ai: bool,
    },

    /// Manage reviewer groups
    ReviewerGroup {
        #[command(subcommand)]
        action: ReviewerGroupAction,
    },

    /// Manage branch patterns
    Pattern {
        #[command(subcommand)]
        action: PatternAction,
    },

    /// Manage repository collaborators
    Collaborators {
        #[command(subcommand)]
        action: CollaboratorAction,
    },

    /// AI code review of a PR
    Review {
        /// PR number
        pr: u64,

        /// Post the review as a PR comment
        #[arg(long)]
        post: bool,
    },

    /// Suggest a commit message for the staged changes
    Commit {
        /// Draft message to improve
        #[arg(short, long)]
        message: Option<String>,

        /// Commit with the suggested message
        #[arg(long)]
        apply: bool,
    },

    /// Report the day's commits grouped by author
    Daily {
        /// Day to report (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,

        /// Only commits by this author email
        #[arg(long, conflicts_with = "all")]
        author: Option<String>,

        /// Commits by every author
        #[arg(long)]
        all: bool,
    },

    /// Show or store GitHub credentials
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let path = cli.path.unwrap_or_else(|| PathBuf::from("."));

    match cli.command {
        Commands::Init {
            default_branch,
            force,
        } => cli::init::run_init(&path, default_branch, force).await,
        Commands::New {
            base,
            title,
            draft,
            ai,
            no_push,
            dry_run,
        } => {
            let options = NewOptions {
                base,
                title,
                draft,
                ai,
                no_push,
                dry_run,
            };
            cli::new::run_new(&path, options).await
        }
        Commands::Merge {
            pr,
            method,
            delete_branch,
            force,
            dry_run,
            yes,
        } => {
            let options = MergeOptions {
                method,
                delete_branch,
                force,
                dry_run,
                yes,
            };
            cli::merge::run_merge(&path, pr, options).await
        }
        Commands::Status { pr } => cli::status::run_status(&path, pr).await,
        Commands::Conflicts { pr, local, ai } => {
            cli::conflicts::run_conflicts(&path, pr, ConflictOptions { local, ai }).await
        }
        Commands::ReviewerGroup { action } => {
            cli::reviewer_group::run_reviewer_group(&path, action).await
        }
        Commands::Pattern { action } => cli::pattern::run_pattern(&path, action).await,
        Commands::Collaborators { action } => {
            cli::collaborators::run_collaborators(&path, action).await
        }
        Commands::Review { pr, post } => cli::review::run_review(&path, pr, post).await,
        Commands::Commit { message, apply } => {
            cli::commit::run_commit(&path, message.as_deref(), apply).await
        }
        Commands::Daily { date, author, all } => {
            cli::daily::run_daily(&path, DailyOptions { date, author, all }).await
        }
        Commands::Auth { action } => cli::auth::run_auth(&path, action).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "Error:".error());
            ExitCode::FAILURE
        }
    }
}
