use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "connector-certify",
    version,
    about = "Certification checks for connector components"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Certify a connector component directory
    Certify {
        /// Path to the component directory
        path: PathBuf,

        /// Write the JSON report to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Custom config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Source model exported by the parser (JSON)
        #[arg(long)]
        tree: Option<PathBuf>,

        /// Descriptor file (defaults to descriptor.toml in the component)
        #[arg(long)]
        descriptor: Option<PathBuf>,
    },

    /// List all built-in rules with descriptions
    ListRules,

    /// Show full explanation for a rule
    Explain {
        /// Rule key (e.g., "gitignore-exist")
        rule_key: String,

        /// Config file declaring layout rules (auto-detected otherwise)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}
