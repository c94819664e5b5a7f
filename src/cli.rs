//! Command-line surface for managing triggers and the daemon.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    version = env!("CARGO_PKG_VERSION"),
    about = "danchu - Korean-aware text snippet expander",
    long_about = "danchu expands short trigger abbreviations into stored text \
                  as you type, system-wide, aware of the Korean 2-set IME."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new trigger
    Add {
        #[clap(long, short = 't', help = "Trigger abbreviation")]
        trigger: String,

        #[clap(long, short = 'c', help = "The expansion text")]
        content: String,
    },
    /// Delete a trigger
    Delete {
        #[clap(long, short = 't', help = "Trigger to delete")]
        trigger: String,
    },
    /// Update the expansion text of an existing trigger
    Update {
        #[clap(long, short = 't', help = "Trigger to update")]
        trigger: String,

        #[clap(long, short = 'c', help = "New expansion text")]
        content: String,
    },
    /// List all registered triggers
    List,
    /// Start the expansion daemon
    Start,
    /// Stop the expansion daemon
    Stop,
    /// Check the daemon status
    Status,
    // Hidden command used internally to run the daemon worker
    #[clap(hide = true)]
    DaemonWorker,
}
