//! CLI command definitions using clap.
//!
//! - ask: answer one question, optionally inside a session
//! - chat: interactive session on stdin
//! - tools: print the tool descriptors offered to the model
//! - courses: list course titles in the catalog

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Coursemate - ask questions about course material
#[derive(Parser, Debug)]
#[command(name = "coursemate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug-level logging and a token usage line after each run
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer a single question
    Ask {
        /// The question to answer
        question: String,

        /// Continue an existing session
        #[arg(short, long, conflicts_with = "new_session")]
        session: Option<String>,

        /// Start a new session and print its id
        #[arg(short = 'n', long)]
        new_session: bool,
    },

    /// Interactive question loop sharing one session
    Chat,

    /// Print tool descriptors as JSON
    Tools,

    /// List courses in the catalog
    Courses,
}
