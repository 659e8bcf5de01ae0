use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// kmt - terminal client for the KMT HR backend
#[derive(Parser, Debug)]
#[command(name = "kmt")]
#[command(version)]
#[command(about = "Log in to the KMT HR backend and browse its data", long_about = None)]
pub struct Cli {
    /// Backend base URL (e.g., http://localhost:5000/api); overrides KMT_API_BASE_URL
    #[arg(long = "base-url", global = true)]
    pub base_url: Option<String>,

    /// Where the session is persisted between invocations; overrides KMT_SESSION_FILE
    #[arg(long = "session-file", global = true)]
    pub session_file: Option<PathBuf>,

    /// Print raw JSON instead of tables
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Log in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Log out and clear the stored session
    Logout,
    /// Show the logged-in user and what their role allows
    Whoami,
    /// List departments
    Departments {
        #[arg(long)]
        search: Option<String>,
    },
    /// List users
    Users {
        #[arg(long)]
        search: Option<String>,
        #[arg(long = "department")]
        department_id: Option<i64>,
    },
    /// List leave requests
    Leave {
        /// pending, approved, rejected or cancelled
        #[arg(long)]
        status: Option<String>,
    },
    /// Approve a pending leave request
    Approve {
        id: i64,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Reject a pending leave request
    Reject {
        id: i64,
        #[arg(long)]
        comment: Option<String>,
    },
}
