use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tpl")]
#[command(about = "Search a design template catalog", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "TPL_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search templates by keyword
    Search(SearchArgs),

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args)]
pub struct SearchArgs {
    /// Keywords (comma-separated, or several arguments). Defaults to the business type,
    /// first suggested keyword, or business name from config
    pub keywords: Vec<String>,

    /// Page builder to search templates for
    #[arg(long)]
    pub builder: Option<String>,

    /// Business name sent with the query
    #[arg(long)]
    pub business_name: Option<String>,

    /// Number of extra catalog pages to load after the search settles
    #[arg(long, default_value = "0")]
    pub more: usize,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub format: String,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Print the config file path
    Path,
}
