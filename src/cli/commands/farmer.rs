//! `mao farmer` command - Farmer registration and verification

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::utils::{
    finish_list, mutate, open_screen, Columns, Connection, DeleteArgs, IdArgs, RejectArgs,
    ViewArgs,
};
use crate::cli::table::{CellValue, ColumnDef, TableRow};
use crate::cli::GlobalOpts;
use crate::core::entity::VerificationStatus;
use crate::core::fetch::Screen;
use crate::core::mutation::{Action, RefreshPolicy};
use crate::core::summary::format_number;
use crate::core::view::FilterState;
use crate::entities::farmer::{self, Farmer, FarmerSummary};

#[derive(Subcommand, Debug)]
pub enum FarmerCommands {
    /// List farmers with filtering
    List(ListArgs),

    /// Mark a farmer as verified
    Verify(IdArgs),

    /// Reject a farmer's registration
    Reject(RejectArgs),

    /// Permanently delete a farmer
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by verification status
    #[arg(long)]
    pub status: Option<VerificationStatus>,

    /// Filter by association name (exact)
    #[arg(long, short = 'a')]
    pub association: Option<String>,

    #[command(flatten)]
    pub view: ViewArgs,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 8),
    ColumnDef::new("name", "NAME", 24),
    ColumnDef::new("association", "ASSOCIATION", 20),
    ColumnDef::new("location", "LOCATION", 28),
    ColumnDef::new("area", "HECTARES", 10),
    ColumnDef::new("status", "STATUS", 10),
    ColumnDef::new("registered", "REGISTERED", 12),
];

fn row(f: &Farmer) -> TableRow {
    TableRow::new(f.id.to_string())
        .cell("id", CellValue::Id(f.id.to_string()))
        .cell("name", CellValue::Text(f.full_name.clone()))
        .cell(
            "association",
            f.association_name
                .clone()
                .map(CellValue::Text)
                .unwrap_or(CellValue::Empty),
        )
        .cell("location", CellValue::Text(f.location()))
        .cell("area", CellValue::Float(f.farm_area_hectares, 2))
        .cell("status", CellValue::Verification(f.verification_status))
        .cell("registered", CellValue::Date(f.created_at))
}

const OUTPUT: Columns<Farmer> = Columns {
    entity_name: "farmer",
    plural: "farmers",
    columns: COLUMNS,
    row,
};

/// Run a farmer subcommand
pub fn run(cmd: FarmerCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        FarmerCommands::List(args) => run_list(args, global),
        FarmerCommands::Verify(args) => run_action(&args.id, Action::Verify, false, global),
        FarmerCommands::Reject(args) => {
            run_action(&args.id, Action::Reject { reason: args.reason }, false, global)
        }
        FarmerCommands::Delete(args) => run_action(&args.id, Action::Delete, args.yes, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let conn = Connection::open(global)?;
    let filter = FilterState::new()
        .with_category("status", args.status.map(|s| s.to_string()).unwrap_or_default())
        .with_category("association", args.association.clone().unwrap_or_default());
    let screen: Screen<Farmer> = open_screen(&conn, farmer::source(), &args.view, filter);

    let summary = FarmerSummary::compute(screen.view.filtered());
    let cards = vec![
        ("Total farmers", summary.total.to_string()),
        ("Verified", summary.verified.to_string()),
        ("Pending", summary.pending.to_string()),
        ("Rejected", summary.rejected.to_string()),
        ("Total farm area (ha)", format_number(summary.total_hectares)),
        ("Associations", summary.associations.to_string()),
    ];

    finish_list(
        &screen,
        &OUTPUT,
        &args.view,
        Some(cards),
        Some(&farmer::export_fields()),
        &conn,
        global,
    )
}

fn run_action(id: &str, action: Action, yes: bool, global: &GlobalOpts) -> Result<()> {
    let conn = Connection::open(global)?;
    let mut screen: Screen<Farmer> = Screen::new(farmer::source());
    mutate(
        &conn,
        &mut screen,
        farmer::ENDPOINT,
        Some(id),
        action,
        RefreshPolicy::Refetch,
        "farmer",
        yes,
        global,
    )?;
    Ok(())
}
