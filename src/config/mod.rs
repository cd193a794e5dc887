pub mod toml_config;

pub use toml_config::{AppConfig, RosterSource};

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "lead-splitter")]
#[command(about = "Upload lead spreadsheets and split them evenly across agents")]
pub struct CliConfig {
    /// Path to TOML configuration file (defaults are used when absent)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override the sqlite database path from the config
    #[arg(long, global = true)]
    pub database: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Parse a CSV/XLSX/XLS file and distribute its leads across the roster
    Upload {
        /// File to upload
        file: String,

        /// Who is uploading (recorded on every list)
        #[arg(long)]
        uploaded_by: String,

        /// Show the distribution without saving anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Manage the agent roster
    Agents {
        #[command(subcommand)]
        action: AgentAction,
    },

    /// Show stored lists, optionally for one agent
    Lists {
        #[arg(long)]
        agent: Option<String>,
    },

    /// Write stored lists to a zip of CSV files
    Export {
        /// Zip file name, relative to export.output_path
        #[arg(short, long, default_value = "lists.zip")]
        output: String,

        #[arg(long)]
        agent: Option<String>,
    },
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum AgentAction {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        mobile: String,
    },
    List,
    Show {
        id: String,
    },
    /// Fields left out keep their current value
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        mobile: Option<String>,
    },
    Remove {
        id: String,
    },
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the TOML config (or defaults) and applies command line overrides.
    pub fn load_app_config(&self) -> crate::utils::error::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };
        if let Some(database) = &self.database {
            config.database.path = database.clone();
        }
        Ok(config)
    }
}
