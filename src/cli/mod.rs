pub mod branches;
pub mod init;
pub mod report;
pub mod schemes;
pub mod status;

use clap::{Parser, Subcommand};

pub const SCHEMES_FILE: &str = "schemes.json";

#[derive(Parser)]
#[command(
    name = "scorecard",
    version,
    about = "Regional office branch scorecard built from spreadsheet datasets."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up the data directory and regional office details.
    Init {
        /// Path for scorecard data (default: ~/Documents/scorecard)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Branch code the regional office reports under
        #[arg(long = "ro-code")]
        ro_code: Option<String>,
        /// Label for the consolidated totals row
        #[arg(long = "ro-name")]
        ro_name: Option<String>,
        /// Default region used to scope the branch directory
        #[arg(long)]
        region: Option<String>,
    },
    /// Consolidate all datasets into the branch scorecard.
    Report {
        /// Report date stamped on every row (default: today, DD-MM-YYYY)
        #[arg(long)]
        date: Option<String>,
        /// Only seed branches from this region
        #[arg(long)]
        region: Option<String>,
        /// Read data from this directory instead of the configured one
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Write the scorecard as CSV (default: <data_dir>/exports/scorecard-<date>.csv)
        #[arg(long, num_args = 0..=1, value_name = "PATH")]
        export: Option<Option<String>>,
        /// Print rows as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Manage the scheme code table used to classify sanctions.
    Schemes {
        #[command(subcommand)]
        command: SchemesCommands,
    },
    /// List the branch directory.
    Branches {
        /// Only branches in this region
        #[arg(long)]
        region: Option<String>,
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Show settings and which dataset files are present.
    Status {
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Print a shell completion script.
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum SchemesCommands {
    /// Show every category with its product codes.
    List {
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Add product codes to a category.
    Add {
        /// Category key, e.g. housing, agriJl, totalSme
        category: String,
        /// Product codes to add
        #[arg(required = true)]
        codes: Vec<String>,
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Remove product codes from a category.
    Remove {
        /// Category key, e.g. housing, agriJl, totalSme
        category: String,
        /// Product codes to remove
        #[arg(required = true)]
        codes: Vec<String>,
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
}
