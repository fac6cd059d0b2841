//! `mao config` command - Configuration management
//!
//! Settings live in a single user-level `config.yaml`. Environment
//! variables override the file at load time.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::PathBuf;

use crate::cli::GlobalOpts;
use crate::core::view::PageSize;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration values
    Show(ShowArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Unset (remove) a configuration value
    Unset(UnsetArgs),

    /// Show the path to the configuration file
    Path,

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,

    /// Print the raw file instead of the effective values
    #[arg(long)]
    pub raw: bool,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Configuration key (e.g., api_url, page_size)
    pub key: String,

    /// Value to set
    pub value: String,
}

#[derive(clap::Args, Debug)]
pub struct UnsetArgs {
    /// Configuration key to remove
    pub key: String,
}

/// Valid configuration keys
const VALID_KEYS: &[(&str, &str)] = &[
    ("api_url", "Backend base URL (e.g. https://mao.example.gov.ph)"),
    ("page_size", "Rows per page: 10, 20, 30, 40, 50 or 100"),
    ("timeout_secs", "HTTP request timeout in seconds"),
    (
        "default_format",
        "Default output format (yaml, json, tsv, csv, md, id)",
    ),
];

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, _global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args),
        ConfigCommands::Set(args) => run_set(args),
        ConfigCommands::Unset(args) => run_unset(args),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs) -> Result<()> {
    let config = Config::load();

    if let Some(key) = &args.key {
        check_key(key)?;
        return match get_config_value(&config, key) {
            Some(v) => {
                println!("{}", v);
                Ok(())
            }
            None => Err(miette::miette!("Key '{}' is not set", key)),
        };
    }

    if args.raw {
        let path = config_path()?;
        println!("{} {}", style("Config:").bold(), style(path.display()).dim());
        println!();
        if path.exists() {
            print!("{}", fs::read_to_string(&path).into_diagnostic()?);
        } else {
            println!("{}", style("(not created)").dim());
        }
        return Ok(());
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();
    for (key, _) in VALID_KEYS {
        print_config_value(key, get_config_value(&config, key).as_deref());
    }

    println!();
    println!("{}", style("Config Sources (in priority order):").dim());
    println!("  1. Command-line flags (--api-url, --per-page, --format)");
    println!("  2. Environment variables (MAO_API_URL, MAO_PAGE_SIZE, MAO_TIMEOUT)");
    println!("  3. Config file (mao config path)");
    Ok(())
}

fn run_set(args: SetArgs) -> Result<()> {
    check_key(&args.key)?;
    let value = parse_value(&args.key, &args.value)?;
    let path = config_path()?;

    let mut config_map = read_mapping(&path)?;
    if let serde_yml::Value::Mapping(map) = &mut config_map {
        map.insert(serde_yml::Value::String(args.key.clone()), value);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).into_diagnostic()?;
    }
    let yaml = serde_yml::to_string(&config_map).into_diagnostic()?;
    fs::write(&path, yaml).into_diagnostic()?;

    println!(
        "{} Set {} {} {}",
        style("✓").green(),
        style(&args.key).cyan(),
        style("→").dim(),
        style(&args.value).yellow()
    );
    Ok(())
}

fn run_unset(args: UnsetArgs) -> Result<()> {
    let path = config_path()?;
    if !path.exists() {
        return Err(miette::miette!(
            "Config file does not exist: {}",
            path.display()
        ));
    }

    let mut config_map = read_mapping(&path)?;
    let removed = match &mut config_map {
        serde_yml::Value::Mapping(map) => map
            .remove(&serde_yml::Value::String(args.key.clone()))
            .is_some(),
        _ => false,
    };
    if !removed {
        return Err(miette::miette!("Key '{}' not found in config", args.key));
    }

    let yaml = serde_yml::to_string(&config_map).into_diagnostic()?;
    fs::write(&path, yaml).into_diagnostic()?;

    println!("{} Removed {}", style("✓").green(), style(&args.key).cyan());
    Ok(())
}

fn run_path() -> Result<()> {
    let path = config_path()?;
    println!("{}", path.display());
    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();

    for (key, description) in VALID_KEYS {
        println!("  {:<20} {}", style(key).cyan(), style(description).dim());
    }

    println!();
    println!(
        "{}",
        style("Use 'mao config set <key> <value>' to set a value.").dim()
    );
    Ok(())
}

// Helper functions

fn config_path() -> Result<PathBuf> {
    Config::config_path().ok_or_else(|| miette::miette!("Could not determine config directory"))
}

fn check_key(key: &str) -> Result<()> {
    if VALID_KEYS.iter().any(|(k, _)| *k == key) {
        Ok(())
    } else {
        Err(miette::miette!(
            help = "Run `mao config keys` to list valid keys",
            "Unknown configuration key '{}'",
            key
        ))
    }
}

/// Typed YAML value for a key; numbers are stored as numbers
fn parse_value(key: &str, value: &str) -> Result<serde_yml::Value> {
    match key {
        "page_size" => {
            let size: PageSize = value.parse().map_err(|e: String| miette::miette!("{}", e))?;
            Ok(serde_yml::Value::Number((size.get() as u64).into()))
        }
        "timeout_secs" => {
            let secs: u64 = value
                .trim()
                .parse()
                .map_err(|_| miette::miette!("timeout_secs must be a whole number of seconds"))?;
            Ok(serde_yml::Value::Number(secs.into()))
        }
        _ => Ok(serde_yml::Value::String(value.to_string())),
    }
}

fn read_mapping(path: &PathBuf) -> Result<serde_yml::Value> {
    if !path.exists() {
        return Ok(serde_yml::Value::Mapping(Default::default()));
    }
    let content = fs::read_to_string(path).into_diagnostic()?;
    let parsed: serde_yml::Value =
        serde_yml::from_str(&content).unwrap_or(serde_yml::Value::Mapping(Default::default()));
    // An empty file parses as null
    if parsed.is_mapping() {
        Ok(parsed)
    } else {
        Ok(serde_yml::Value::Mapping(Default::default()))
    }
}

fn get_config_value(config: &Config, key: &str) -> Option<String> {
    match key {
        "api_url" => Some(config.api_url()),
        "page_size" => Some(config.page_size().to_string()),
        "timeout_secs" => Some(config.timeout_secs().to_string()),
        "default_format" => config.default_format.clone(),
        _ => None,
    }
}

fn print_config_value(key: &str, value: Option<&str>) {
    if let Some(v) = value {
        println!("  {}: {}", style(key).cyan(), style(v).yellow());
    } else {
        println!("  {}: {}", style(key).cyan(), style("(not set)").dim());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_types() {
        assert_eq!(
            parse_value("page_size", "50").unwrap(),
            serde_yml::Value::Number(50u64.into())
        );
        assert!(parse_value("page_size", "15").is_err());
        assert!(parse_value("timeout_secs", "soon").is_err());
        assert_eq!(
            parse_value("api_url", "http://x").unwrap(),
            serde_yml::Value::String("http://x".into())
        );
    }

    #[test]
    fn test_check_key() {
        assert!(check_key("api_url").is_ok());
        assert!(check_key("author").is_err());
    }
}
