//! `mao maintenance` command - Public site maintenance mode

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::utils::Connection;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::maintenance::{MaintenanceStatus, STATUS_PATH, TOGGLE_PATH};

#[derive(Subcommand, Debug)]
pub enum MaintenanceCommands {
    /// Show whether maintenance mode is on
    Status,

    /// Turn maintenance mode on or off
    Toggle(ToggleArgs),
}

#[derive(clap::Args, Debug)]
pub struct ToggleArgs {
    /// Message shown to visitors while the site is down
    #[arg(long, short = 'm')]
    pub message: Option<String>,
}

pub fn run(cmd: MaintenanceCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        MaintenanceCommands::Status => run_status(global),
        MaintenanceCommands::Toggle(args) => run_toggle(args, global),
    }
}

fn fetch_status(conn: &Connection) -> Result<MaintenanceStatus> {
    conn.client
        .get_json::<MaintenanceStatus>(STATUS_PATH)
        .map_err(|e| miette::miette!("{}", e.user_message()))
}

fn run_status(global: &GlobalOpts) -> Result<()> {
    let conn = Connection::open(global)?;
    let status = fetch_status(&conn)?;

    match conn.format(global, OutputFormat::Tsv) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&status).into_diagnostic()?);
        }
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&status).into_diagnostic()?),
        _ => print_status(&status),
    }
    Ok(())
}

fn run_toggle(args: ToggleArgs, global: &GlobalOpts) -> Result<()> {
    let conn = Connection::open(global)?;
    let current = fetch_status(&conn)?;
    let body = current.toggle_body(args.message.as_deref());

    conn.client
        .post(TOGGLE_PATH, body)
        .map_err(|e| miette::miette!("{}", e.user_message()))?;
    tracing::info!(enabled = !current.is_maintenance_mode, "maintenance mode toggled");

    if !global.quiet {
        let now = MaintenanceStatus {
            is_maintenance_mode: !current.is_maintenance_mode,
            message: args.message.or(current.message),
        };
        print!("{} ", style("✓").green());
        print_status(&now);
    }
    Ok(())
}

fn print_status(status: &MaintenanceStatus) {
    if status.is_maintenance_mode {
        println!("Maintenance mode is {}", style("ON").yellow().bold());
        if let Some(message) = status.message.as_deref().filter(|m| !m.is_empty()) {
            println!("  {}: {}", style("message").cyan(), message);
        }
    } else {
        println!("Maintenance mode is {}", style("off").green());
    }
}
