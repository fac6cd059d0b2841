//! `mao buyer` command - Fiber buyer verification

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
use crate::core::view::FilterState;
use crate::entities::buyer::{self, Buyer, BuyerSummary};

#[derive(Subcommand, Debug)]
pub enum BuyerCommands {
    /// List buyers with filtering
    List(ListArgs),

    /// Mark a buyer as verified
    Verify(IdArgs),

    /// Reject a buyer's registration
    Reject(RejectArgs),

    /// Permanently delete a buyer
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by verification status
    #[arg(long)]
    pub status: Option<VerificationStatus>,

    #[command(flatten)]
    pub view: ViewArgs,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 8),
    ColumnDef::new("business", "BUSINESS", 28),
    ColumnDef::new("contact", "CONTACT", 20),
    ColumnDef::new("location", "LOCATION", 24),
    ColumnDef::new("status", "STATUS", 10),
    ColumnDef::new("registered", "REGISTERED", 12),
];

fn row(b: &Buyer) -> TableRow {
    TableRow::new(b.id.to_string())
        .cell("id", CellValue::Id(b.id.to_string()))
        .cell("business", CellValue::Text(b.business_name.clone()))
        .cell("contact", CellValue::Text(b.contact_person.clone()))
        .cell("location", CellValue::Text(b.location.clone()))
        .cell("status", CellValue::Verification(b.verification_status))
        .cell("registered", CellValue::Date(b.created_at))
}

const OUTPUT: Columns<Buyer> = Columns {
    entity_name: "buyer",
    plural: "buyers",
    columns: COLUMNS,
    row,
};

pub fn run(cmd: BuyerCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        BuyerCommands::List(args) => run_list(args, global),
        BuyerCommands::Verify(args) => run_action(&args.id, Action::Verify, false, global),
        BuyerCommands::Reject(args) => {
            run_action(&args.id, Action::Reject { reason: args.reason }, false, global)
        }
        BuyerCommands::Delete(args) => run_action(&args.id, Action::Delete, args.yes, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let conn = Connection::open(global)?;
    let filter = FilterState::new()
        .with_category("status", args.status.map(|s| s.to_string()).unwrap_or_default());
    let screen: Screen<Buyer> = open_screen(&conn, buyer::source(), &args.view, filter);

    let summary = BuyerSummary::compute(screen.view.filtered());
    let cards = vec![
        ("Total buyers", summary.total.to_string()),
        ("Verified", summary.verified.to_string()),
        ("Pending", summary.pending.to_string()),
        ("Rejected", summary.rejected.to_string()),
    ];

    finish_list(
        &screen,
        &OUTPUT,
        &args.view,
        Some(cards),
        Some(&buyer::export_fields()),
        &conn,
        global,
    )
}

fn run_action(id: &str, action: Action, yes: bool, global: &GlobalOpts) -> Result<()> {
    let conn = Connection::open(global)?;
    let mut screen: Screen<Buyer> = Screen::new(buyer::source());
    mutate(
        &conn,
        &mut screen,
        buyer::ENDPOINT,
        Some(id),
        action,
        RefreshPolicy::Refetch,
        "buyer",
        yes,
        global,
    )?;
    Ok(())
}
