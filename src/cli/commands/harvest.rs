//! `mao harvest` command - Harvest submission review

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::utils::{
    finish_list, mutate, open_screen, Columns, Connection, IdArgs, RejectArgs, ViewArgs,
};
use crate::cli::table::{CellValue, ColumnDef, TableRow};
use crate::cli::GlobalOpts;
use crate::core::entity::VerificationStatus;
use crate::core::fetch::Screen;
use crate::core::mutation::{Action, RefreshPolicy};
use crate::core::summary::{count_by, format_number};
use crate::core::view::FilterState;
use crate::entities::harvest::{self, Harvest, HarvestSummary};

#[derive(Subcommand, Debug)]
pub enum HarvestCommands {
    /// List harvest submissions with filtering
    List(ListArgs),

    /// Verify a harvest submission
    Verify(IdArgs),

    /// Reject a harvest submission
    Reject(RejectArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by verification status
    #[arg(long)]
    pub status: Option<VerificationStatus>,

    /// Filter by fiber grade (exact, e.g. "S2", "JK")
    #[arg(long, short = 'g')]
    pub grade: Option<String>,

    #[command(flatten)]
    pub view: ViewArgs,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 8),
    ColumnDef::new("farmer", "FARMER", 22),
    ColumnDef::new("variety", "VARIETY", 14),
    ColumnDef::new("location", "LOCATION", 22),
    ColumnDef::new("kg", "KG", 10),
    ColumnDef::new("grade", "GRADE", 6),
    ColumnDef::new("status", "STATUS", 10),
    ColumnDef::new("date", "HARVESTED", 12),
];

fn row(h: &Harvest) -> TableRow {
    TableRow::new(h.id.to_string())
        .cell("id", CellValue::Id(h.id.to_string()))
        .cell("farmer", CellValue::Text(h.farmer_name.clone()))
        .cell("variety", CellValue::Text(h.abaca_variety.clone()))
        .cell("location", CellValue::Text(h.location.clone()))
        .cell("kg", CellValue::Float(h.quantity_kg, 1))
        .cell("grade", CellValue::Text(h.fiber_grade.clone()))
        .cell("status", CellValue::Verification(h.status))
        .cell("date", CellValue::Date(h.harvest_date))
}

const OUTPUT: Columns<Harvest> = Columns {
    entity_name: "harvest",
    plural: "harvests",
    columns: COLUMNS,
    row,
};

pub fn run(cmd: HarvestCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        HarvestCommands::List(args) => run_list(args, global),
        HarvestCommands::Verify(args) => run_action(&args.id, Action::Verify, global),
        HarvestCommands::Reject(args) => {
            run_action(&args.id, Action::Reject { reason: args.reason }, global)
        }
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let conn = Connection::open(global)?;
    let filter = FilterState::new()
        .with_category("status", args.status.map(|s| s.to_string()).unwrap_or_default())
        .with_category("grade", args.grade.clone().unwrap_or_default());
    let screen: Screen<Harvest> = open_screen(&conn, harvest::source(), &args.view, filter);

    let rows = screen.view.filtered();
    let summary = HarvestSummary::compute(rows.iter().copied());
    let by_grade = count_by(rows.iter().copied(), |h| h.fiber_grade.clone())
        .into_iter()
        .filter(|(grade, _)| !grade.is_empty())
        .map(|(grade, n)| format!("{}: {}", grade, n))
        .collect::<Vec<_>>()
        .join(", ");
    let cards = vec![
        ("Total harvests", summary.total.to_string()),
        ("Pending", summary.pending.to_string()),
        ("Verified", summary.verified.to_string()),
        ("Rejected", summary.rejected.to_string()),
        ("Total kg", format_number(summary.total_kg)),
        ("Verified kg", format_number(summary.verified_kg)),
        ("Farmers", summary.farmers.to_string()),
        ("By grade", by_grade),
    ];

    finish_list(
        &screen,
        &OUTPUT,
        &args.view,
        Some(cards),
        Some(&harvest::export_fields()),
        &conn,
        global,
    )
}

fn run_action(id: &str, action: Action, global: &GlobalOpts) -> Result<()> {
    let conn = Connection::open(global)?;
    let mut screen: Screen<Harvest> = Screen::new(harvest::source());
    mutate(
        &conn,
        &mut screen,
        harvest::ENDPOINT,
        Some(id),
        action,
        RefreshPolicy::Refetch,
        "harvest",
        false,
        global,
    )?;
    Ok(())
}
