use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "sitedemo")]
#[command(about = "Content models and contact form pipeline for a small showcase site")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "sitedemo.toml")]
    pub config: String,

    /// Override the content file from the configuration
    #[arg(long)]
    pub content: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Log as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Validate every page and report placeholder email settings
    Check,

    /// Submit a contact form from the command line
    Submit {
        /// Id of the contact page
        #[arg(long)]
        page: u64,

        /// Field values as clean_name=value (repeat for multi-valued fields)
        #[arg(short, long = "field", value_parser = parse_key_value)]
        fields: Vec<(String, String)>,
    },

    /// Export a contact page's submissions as CSV
    Export {
        /// Id of the contact page
        #[arg(long)]
        page: u64,

        /// Output file
        #[arg(short, long, default_value = "submissions.csv")]
        output: String,
    },
}

fn parse_key_value(input: &str) -> Result<(String, String), String> {
    input
        .split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected clean_name=value, got '{}'", input))
}
