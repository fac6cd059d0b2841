//! `mao officer` command - Association officer verification

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
use crate::core::summary::{count_where, distinct_count};
use crate::core::view::FilterState;
use crate::entities::officer::{self, AssociationOfficer};

#[derive(Subcommand, Debug)]
pub enum OfficerCommands {
    /// List association officers with filtering
    List(ListArgs),

    /// Mark an officer as verified
    Verify(IdArgs),

    /// Reject an officer's registration
    Reject(RejectArgs),

    /// Permanently delete an officer
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
    ColumnDef::new("association", "ASSOCIATION", 24),
    ColumnDef::new("position", "POSITION", 16),
    ColumnDef::new("status", "STATUS", 10),
    ColumnDef::new("registered", "REGISTERED", 12),
];

fn row(o: &AssociationOfficer) -> TableRow {
    TableRow::new(o.id.to_string())
        .cell("id", CellValue::Id(o.id.to_string()))
        .cell("name", CellValue::Text(o.full_name.clone()))
        .cell("association", CellValue::Text(o.association_name.clone()))
        .cell("position", CellValue::Text(o.position.clone()))
        .cell("status", CellValue::Verification(o.verification_status))
        .cell("registered", CellValue::Date(o.created_at))
}

const OUTPUT: Columns<AssociationOfficer> = Columns {
    entity_name: "officer",
    plural: "officers",
    columns: COLUMNS,
    row,
};

pub fn run(cmd: OfficerCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        OfficerCommands::List(args) => run_list(args, global),
        OfficerCommands::Verify(args) => run_action(&args.id, Action::Verify, false, global),
        OfficerCommands::Reject(args) => {
            run_action(&args.id, Action::Reject { reason: args.reason }, false, global)
        }
        OfficerCommands::Delete(args) => run_action(&args.id, Action::Delete, args.yes, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let conn = Connection::open(global)?;
    let filter = FilterState::new()
        .with_category("status", args.status.map(|s| s.to_string()).unwrap_or_default())
        .with_category("association", args.association.clone().unwrap_or_default());
    let screen: Screen<AssociationOfficer> =
        open_screen(&conn, officer::source(), &args.view, filter);

    let rows = screen.view.filtered();
    let status_is = |wanted: VerificationStatus| {
        count_where(rows.clone(), move |o: &AssociationOfficer| {
            o.verification_status == wanted
        })
    };
    let cards = vec![
        ("Total officers", rows.len().to_string()),
        ("Verified", status_is(VerificationStatus::Verified).to_string()),
        ("Pending", status_is(VerificationStatus::Pending).to_string()),
        (
            "Associations",
            distinct_count(rows.clone(), |o: &AssociationOfficer| {
                o.association_name.clone()
            })
            .to_string(),
        ),
    ];

    finish_list(
        &screen,
        &OUTPUT,
        &args.view,
        Some(cards),
        Some(&officer::export_fields()),
        &conn,
        global,
    )
}

fn run_action(id: &str, action: Action, yes: bool, global: &GlobalOpts) -> Result<()> {
    let conn = Connection::open(global)?;
    let mut screen: Screen<AssociationOfficer> = Screen::new(officer::source());
    mutate(
        &conn,
        &mut screen,
        officer::ENDPOINT,
        Some(id),
        action,
        RefreshPolicy::Refetch,
        "officer",
        yes,
        global,
    )?;
    Ok(())
}
