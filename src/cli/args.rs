//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    activity::ActivityCommands,
    article::ArticleCommands,
    auth::LoginArgs,
    buyer::BuyerCommands,
    completions::CompletionsArgs,
    config::ConfigCommands,
    dashboard::DashboardArgs,
    delivery::DeliveryCommands,
    distribution::DistributionCommands,
    farmer::FarmerCommands,
    harvest::HarvestCommands,
    maintenance::MaintenanceCommands,
    officer::OfficerCommands,
    sales::SalesCommands,
    team::TeamCommands,
};

#[derive(Parser)]
#[command(name = "mao")]
#[command(author, version, about = "Municipal Agriculture Office console")]
#[command(long_about = "Review and manage the abaca supply chain from the command line: farmer, buyer and officer verification, harvests, sales, deliveries, seedling distribution and site content.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging to stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Backend base URL (overrides config)
    #[arg(long, global = true, env = "MAO_API_URL")]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in to the backend and store the session
    Login(LoginArgs),

    /// Forget the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Farmer registration and verification
    #[command(subcommand)]
    Farmer(FarmerCommands),

    /// Buyer registration and verification
    #[command(subcommand)]
    Buyer(BuyerCommands),

    /// Association officer verification
    #[command(subcommand)]
    Officer(OfficerCommands),

    /// Harvest submissions
    #[command(subcommand)]
    Harvest(HarvestCommands),

    /// Sales report review
    #[command(subcommand)]
    Sales(SalesCommands),

    /// Fiber deliveries (read-only)
    #[command(subcommand)]
    Delivery(DeliveryCommands),

    /// Seedling distributions
    #[command(subcommand)]
    Distribution(DistributionCommands),

    /// Team members shown on the public site
    #[command(subcommand)]
    Team(TeamCommands),

    /// News articles
    #[command(subcommand)]
    Article(ArticleCommands),

    /// Activity logs and address blocklist
    #[command(subcommand)]
    Activity(ActivityCommands),

    /// Maintenance mode
    #[command(subcommand)]
    Maintenance(MaintenanceCommands),

    /// Production, sales and user statistics
    Dashboard(DashboardArgs),

    /// View and modify configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}

impl OutputFormat {
    /// Resolve `Auto` against the configured default, then `fallback`
    pub fn resolve(self, configured: Option<&str>, fallback: OutputFormat) -> OutputFormat {
        match self {
            OutputFormat::Auto => configured
                .and_then(|s| OutputFormat::from_str(s, true).ok())
                .filter(|f| *f != OutputFormat::Auto)
                .unwrap_or(fallback),
            f => f,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_resolve_format() {
        assert_eq!(
            OutputFormat::Auto.resolve(None, OutputFormat::Tsv),
            OutputFormat::Tsv
        );
        assert_eq!(
            OutputFormat::Auto.resolve(Some("json"), OutputFormat::Tsv),
            OutputFormat::Json
        );
        assert_eq!(
            OutputFormat::Md.resolve(Some("json"), OutputFormat::Tsv),
            OutputFormat::Md
        );
        assert_eq!(
            OutputFormat::Auto.resolve(Some("bogus"), OutputFormat::Yaml),
            OutputFormat::Yaml
        );
    }
}
