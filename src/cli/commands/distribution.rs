//! `mao distribution` command - Seedling distribution records

use chrono::{Local, NaiveDate};
use clap::Subcommand;
use miette::Result;

use crate::cli::commands::utils::{
    finish_list, mutate, open_screen, Columns, Connection, DateArgs, ViewArgs,
};
use crate::cli::table::{CellValue, ColumnDef, TableRow};
use crate::cli::GlobalOpts;
use crate::core::fetch::Screen;
use crate::core::mutation::{Action, RefreshPolicy};
use crate::core::view::FilterState;
use crate::entities::distribution::{
    self, Distribution, DistributionSummary, NewDistribution, RecipientType,
};

#[derive(Subcommand, Debug)]
pub enum DistributionCommands {
    /// List seedling distributions with filtering
    List(ListArgs),

    /// Record a new distribution to an association or farmer
    New(NewArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by recipient type
    #[arg(long)]
    pub recipient: Option<RecipientType>,

    #[command(flatten)]
    pub date: DateArgs,

    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Recipient type
    #[arg(long, short = 't', default_value = "association")]
    pub recipient_type: RecipientType,

    /// Association or farmer ID
    #[arg(long, short = 'r')]
    pub recipient: String,

    /// Seedling variety (e.g. "Abuab", "Tangongon")
    #[arg(long)]
    pub variety: String,

    /// Number of seedlings
    #[arg(long, short = 'q')]
    pub quantity: u64,

    /// Distribution date, YYYY-MM-DD (default: today)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    #[arg(long)]
    pub remarks: Option<String>,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 8),
    ColumnDef::new("type", "TYPE", 11),
    ColumnDef::new("recipient", "RECIPIENT", 26),
    ColumnDef::new("variety", "VARIETY", 16),
    ColumnDef::new("quantity", "SEEDLINGS", 10),
    ColumnDef::new("date", "DATE", 12),
];

fn row(d: &Distribution) -> TableRow {
    TableRow::new(d.id.to_string())
        .cell("id", CellValue::Id(d.id.to_string()))
        .cell("type", CellValue::Text(d.recipient_type.to_string()))
        .cell("recipient", CellValue::Text(d.recipient_name.clone()))
        .cell("variety", CellValue::Text(d.seedling_variety.clone()))
        .cell("quantity", CellValue::Number(d.quantity_distributed as i64))
        .cell("date", CellValue::Date(d.date_distributed))
}

const OUTPUT: Columns<Distribution> = Columns {
    entity_name: "distribution",
    plural: "distributions",
    columns: COLUMNS,
    row,
};

pub fn run(cmd: DistributionCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        DistributionCommands::List(args) => run_list(args, global),
        DistributionCommands::New(args) => run_new(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let conn = Connection::open(global)?;
    let filter = FilterState::new()
        .with_category(
            "recipient",
            args.recipient.map(|r| r.to_string()).unwrap_or_default(),
        )
        .with_date(args.date.date);
    let screen: Screen<Distribution> =
        open_screen(&conn, distribution::source(), &args.view, filter);

    let summary = DistributionSummary::compute(screen.view.filtered());
    let cards = vec![
        ("Distributions", summary.total.to_string()),
        ("Seedlings distributed", summary.seedlings.to_string()),
        ("Recipients", summary.recipients.to_string()),
    ];

    finish_list(
        &screen,
        &OUTPUT,
        &args.view,
        Some(cards),
        Some(&distribution::export_fields()),
        &conn,
        global,
    )
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let input = NewDistribution {
        recipient_type: args.recipient_type,
        recipient_id: args.recipient,
        seedling_variety: args.variety,
        quantity: args.quantity,
        date: args.date.unwrap_or_else(|| Local::now().date_naive()),
        remarks: args.remarks,
    };
    let body = input
        .to_body()
        .map_err(|e| miette::miette!("{}", e.user_message()))?;

    let conn = Connection::open(global)?;
    let mut screen: Screen<Distribution> = Screen::new(distribution::source());
    mutate(
        &conn,
        &mut screen,
        distribution::CREATE_ENDPOINT,
        None,
        Action::Create(body),
        RefreshPolicy::Refetch,
        "distribution",
        false,
        global,
    )?;

    if !global.quiet {
        let total = DistributionSummary::compute(screen.records()).seedlings;
        println!("  {} seedling(s) distributed in total", total);
    }
    Ok(())
}
