//! autopr - branch-pattern driven pull request automation for GitHub
//!
//! The library holds the policy core (pattern matching, reviewer rotation,
//! mergeability tracking) and thin wrappers around GitHub, git and an AI
//! backend. The `autopr` binary wires these into CLI commands.

pub mod ai;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod git;
pub mod merge;
pub mod pattern;
pub mod platform;
pub mod progress;
pub mod report;
pub mod reviewers;
pub mod status;
pub mod submit;
pub mod types;
