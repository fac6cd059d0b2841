//! `mao sales` command - Sales report review
//!
//! Approve and reject update the local copy in place instead of refetching
//! the whole report list.

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::commands::utils::{
    finish_list, mutate, open_screen, Columns, Connection, IdArgs, RejectArgs, ViewArgs,
};
use crate::cli::helpers::format_peso;
use crate::cli::table::{CellValue, ColumnDef, TableRow};
use crate::cli::GlobalOpts;
use crate::core::entity::ReviewStatus;
use crate::core::fetch::Screen;
use crate::core::identity::RecordId;
use crate::core::mutation::{Action, RefreshPolicy};
use crate::core::summary::format_number;
use crate::core::view::FilterState;
use crate::entities::sales::{self, set_status, SalesReport, SalesSummaryCards};

#[derive(Subcommand, Debug)]
pub enum SalesCommands {
    /// List sales reports with filtering
    List(ListArgs),

    /// Approve a sales report
    Approve(IdArgs),

    /// Reject a sales report
    Reject(RejectArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by review status
    #[arg(long)]
    pub status: Option<ReviewStatus>,

    #[command(flatten)]
    pub view: ViewArgs,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 8),
    ColumnDef::new("farmer", "FARMER", 20),
    ColumnDef::new("buyer", "BUYER", 22),
    ColumnDef::new("grade", "GRADE", 6),
    ColumnDef::new("kg", "KG", 10),
    ColumnDef::new("price", "PRICE/KG", 10),
    ColumnDef::new("total", "TOTAL", 14),
    ColumnDef::new("status", "STATUS", 10),
    ColumnDef::new("date", "SOLD", 12),
];

fn row(r: &SalesReport) -> TableRow {
    TableRow::new(r.id.to_string())
        .cell("id", CellValue::Id(r.id.to_string()))
        .cell("farmer", CellValue::Text(r.farmer_name.clone()))
        .cell("buyer", CellValue::Text(r.buyer_name.clone()))
        .cell("grade", CellValue::Text(r.fiber_grade.clone()))
        .cell("kg", CellValue::Float(r.quantity_kg, 1))
        .cell("price", CellValue::Amount(r.price_per_kg))
        .cell("total", CellValue::Amount(r.amount()))
        .cell("status", CellValue::Review(r.status))
        .cell("date", CellValue::Date(r.sale_date))
}

const OUTPUT: Columns<SalesReport> = Columns {
    entity_name: "sales report",
    plural: "sales reports",
    columns: COLUMNS,
    row,
};

pub fn run(cmd: SalesCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SalesCommands::List(args) => run_list(args, global),
        SalesCommands::Approve(args) => {
            run_review(args.id, Action::Approve, ReviewStatus::Approved, global)
        }
        SalesCommands::Reject(args) => run_review(
            args.id,
            Action::Reject {
                reason: args.reason,
            },
            ReviewStatus::Rejected,
            global,
        ),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let conn = Connection::open(global)?;
    let filter = FilterState::new()
        .with_category("status", args.status.map(|s| s.to_string()).unwrap_or_default());
    let screen: Screen<SalesReport> = open_screen(&conn, sales::source(), &args.view, filter);

    let summary = SalesSummaryCards::compute(screen.view.filtered());
    let cards = vec![
        ("Total reports", summary.total.to_string()),
        ("Pending", summary.pending.to_string()),
        ("Approved", summary.approved.to_string()),
        ("Rejected", summary.rejected.to_string()),
        ("Total kg", format_number(summary.total_kg)),
        ("Total amount", format_peso(summary.total_amount)),
    ];

    finish_list(
        &screen,
        &OUTPUT,
        &args.view,
        Some(cards),
        Some(&sales::export_fields()),
        &conn,
        global,
    )
}

/// Send the review, then mark the report locally with its new status
fn run_review(id: String, action: Action, status: ReviewStatus, global: &GlobalOpts) -> Result<()> {
    let conn = Connection::open(global)?;
    let mut screen: Screen<SalesReport> = Screen::new(sales::source());
    if let Err(e) = screen.load(&conn.client) {
        tracing::debug!(error = %e, "sales reports not loaded before review");
    }

    let target = RecordId::from(id.as_str());
    let done = mutate(
        &conn,
        &mut screen,
        sales::ENDPOINT,
        Some(&id),
        action,
        RefreshPolicy::optimistic(move |reports| set_status(reports, &target, status)),
        "sales report",
        false,
        global,
    )?;

    if done && !global.quiet && !screen.records().is_empty() {
        let pending = SalesSummaryCards::compute(screen.records()).pending;
        println!("  {} report(s) still pending", style(pending).yellow());
    }
    Ok(())
}
