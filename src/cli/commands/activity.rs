//! `mao activity` command - Activity logs and the IP/MAC blocklist

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::commands::utils::{
    export_csv, finish_list, mutate, open_screen, Columns, Connection, ViewArgs,
};
use crate::cli::table::{CellValue, ColumnDef, TableConfig, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::fetch::Screen;
use crate::core::mutation::{Action, RefreshPolicy};
use crate::core::view::FilterState;
use crate::entities::activity::{self, ActivityLog, BlockKind, BlockedAddress, LogQuery};

#[derive(Subcommand, Debug)]
pub enum ActivityCommands {
    /// Show one page of activity logs (paged and searched by the backend)
    List(ListArgs),

    /// List blocked IP or MAC addresses
    Blocked(BlockedArgs),

    /// Block an IP or MAC address
    Block(BlockArgs),

    /// Remove a block
    Unblock(UnblockArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search user, action and description
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Filter by user type (e.g. farmer, buyer, mao)
    #[arg(long)]
    pub user_type: Option<String>,

    /// Filter by action type (e.g. login, create, delete)
    #[arg(long)]
    pub action_type: Option<String>,

    #[arg(long, short = 'p', default_value_t = 1)]
    pub page: usize,

    /// Logs per page
    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    /// Write this page as CSV into DIR (default: current directory)
    #[arg(long, value_name = "DIR", num_args = 0..=1, default_missing_value = ".")]
    pub export: Option<PathBuf>,

    /// Wrap long descriptions at this width
    #[arg(long)]
    pub wrap: Option<usize>,
}

#[derive(clap::Args, Debug)]
pub struct BlockedArgs {
    /// Address kind
    #[arg(value_enum)]
    pub kind: BlockKind,

    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(clap::Args, Debug)]
pub struct BlockArgs {
    #[arg(value_enum)]
    pub kind: BlockKind,

    /// Address to block
    pub address: String,

    #[arg(long, short = 'r')]
    pub reason: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct UnblockArgs {
    #[arg(value_enum)]
    pub kind: BlockKind,

    /// Block ID (from `mao activity blocked`)
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

const LOG_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 8),
    ColumnDef::new("time", "TIME", 16),
    ColumnDef::new("user", "USER", 20),
    ColumnDef::new("type", "TYPE", 8),
    ColumnDef::new("action", "ACTION", 12),
    ColumnDef::new("description", "DESCRIPTION", 40),
    ColumnDef::new("ip", "IP", 15),
];

fn log_row(l: &ActivityLog) -> TableRow {
    TableRow::new(l.id.to_string())
        .cell("id", CellValue::Id(l.id.to_string()))
        .cell("time", CellValue::DateTime(l.created_at))
        .cell("user", CellValue::Text(l.user_name.clone()))
        .cell("type", CellValue::Text(l.user_type.clone()))
        .cell("action", CellValue::Text(l.action_type.clone()))
        .cell("description", CellValue::Text(l.description.clone()))
        .cell(
            "ip",
            l.ip_address
                .clone()
                .map(CellValue::Text)
                .unwrap_or(CellValue::Empty),
        )
}

const BLOCK_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 8),
    ColumnDef::new("address", "ADDRESS", 20),
    ColumnDef::new("reason", "REASON", 32),
    ColumnDef::new("by", "BLOCKED BY", 18),
    ColumnDef::new("date", "SINCE", 12),
];

fn block_row(b: &BlockedAddress) -> TableRow {
    let text = |v: &Option<String>| v.clone().map(CellValue::Text).unwrap_or(CellValue::Empty);
    TableRow::new(b.id.to_string())
        .cell("id", CellValue::Id(b.id.to_string()))
        .cell("address", CellValue::Text(b.address.clone()))
        .cell("reason", text(&b.reason))
        .cell("by", text(&b.blocked_by))
        .cell("date", CellValue::Date(b.created_at))
}

const BLOCKED: Columns<BlockedAddress> = Columns {
    entity_name: "blocked address",
    plural: "blocked addresses",
    columns: BLOCK_COLUMNS,
    row: block_row,
};

pub fn run(cmd: ActivityCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ActivityCommands::List(args) => run_list(args, global),
        ActivityCommands::Blocked(args) => run_blocked(args, global),
        ActivityCommands::Block(args) => run_block(args, global),
        ActivityCommands::Unblock(args) => run_unblock(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let conn = Connection::open(global)?;
    let query = LogQuery {
        page: args.page,
        limit: args.limit,
        search: args.search,
        user_type: args.user_type,
        action_type: args.action_type,
    };
    let mut screen: Screen<ActivityLog> = Screen::new(query.source());
    screen
        .load(&conn.client)
        .map_err(|e| miette::miette!("{}", e.user_message()))?;

    if let Some(dir) = &args.export {
        export_csv(&screen, &activity::export_fields(), dir, global)?;
    }

    let format = conn.format(global, OutputFormat::Tsv);
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(screen.records()).into_diagnostic()?;
            println!("{}", json);
            return Ok(());
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(screen.records()).into_diagnostic()?);
            return Ok(());
        }
        _ => {}
    }

    if screen.records().is_empty() {
        if !global.quiet {
            println!("No activity logs found.");
        }
        return Ok(());
    }

    let footer = match screen.pagination() {
        Some(p) => format!(
            "(page {} of {}, {} total)",
            query.page.max(1),
            p.total_pages.max(1),
            p.total
        ),
        None => format!("(page {})", query.page.max(1)),
    };
    let config = if global.quiet {
        TableConfig::for_pipe()
    } else if let Some(width) = args.wrap {
        TableConfig::with_wrap(width)
    } else {
        TableConfig::default()
    };

    TableFormatter::new(LOG_COLUMNS, "activity log")
        .with_footer(footer)
        .with_config(config)
        .output(screen.records().iter().map(log_row), format);
    Ok(())
}

fn run_blocked(args: BlockedArgs, global: &GlobalOpts) -> Result<()> {
    let conn = Connection::open(global)?;
    let screen: Screen<BlockedAddress> =
        open_screen(&conn, args.kind.source(), &args.view, FilterState::new());
    finish_list(&screen, &BLOCKED, &args.view, None, None, &conn, global)
}

fn run_block(args: BlockArgs, global: &GlobalOpts) -> Result<()> {
    let body = args
        .kind
        .block_body(&args.address, args.reason.as_deref())
        .map_err(|e| miette::miette!("{}", e.user_message()))?;

    let conn = Connection::open(global)?;
    let mut screen: Screen<BlockedAddress> = Screen::new(args.kind.source());
    let done = mutate(
        &conn,
        &mut screen,
        &args.kind.block_path(),
        None,
        Action::Create(body),
        RefreshPolicy::Refetch,
        &format!("{} block", args.kind),
        false,
        global,
    )?;

    if done && !global.quiet {
        println!(
            "  {} {} address(es) now blocked",
            style(screen.records().len()).cyan(),
            args.kind
        );
    }
    Ok(())
}

fn run_unblock(args: UnblockArgs, global: &GlobalOpts) -> Result<()> {
    let conn = Connection::open(global)?;
    let mut screen: Screen<BlockedAddress> = Screen::new(args.kind.source());
    mutate(
        &conn,
        &mut screen,
        &args.kind.unblock_resource(),
        Some(&args.id),
        Action::Delete,
        RefreshPolicy::Refetch,
        &format!("{} block", args.kind),
        args.yes,
        global,
    )?;
    Ok(())
}
