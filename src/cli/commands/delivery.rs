//! `mao delivery` command - Fiber delivery tracking (read-only)

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::utils::{
    finish_list, open_screen, Columns, Connection, DateArgs, ViewArgs,
};
use crate::cli::table::{CellValue, ColumnDef, TableRow};
use crate::cli::GlobalOpts;
use crate::core::fetch::Screen;
use crate::core::summary::format_number;
use crate::core::view::FilterState;
use crate::entities::delivery::{self, DeliveryStatus, DeliverySummary, FiberDelivery};

#[derive(Subcommand, Debug)]
pub enum DeliveryCommands {
    /// List fiber deliveries with filtering
    List(ListArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by delivery status
    #[arg(long)]
    pub status: Option<DeliveryStatus>,

    #[command(flatten)]
    pub date: DateArgs,

    #[command(flatten)]
    pub view: ViewArgs,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 8),
    ColumnDef::new("buyer", "BUYER", 22),
    ColumnDef::new("farmer", "FARMER", 20),
    ColumnDef::new("grade", "GRADE", 6),
    ColumnDef::new("kg", "KG", 10),
    ColumnDef::new("location", "LOCATION", 22),
    ColumnDef::new("status", "STATUS", 11),
    ColumnDef::new("date", "DELIVERY", 12),
];

fn row(d: &FiberDelivery) -> TableRow {
    TableRow::new(d.id.to_string())
        .cell("id", CellValue::Id(d.id.to_string()))
        .cell("buyer", CellValue::Text(d.buyer_name.clone()))
        .cell("farmer", CellValue::Text(d.farmer_name.clone()))
        .cell("grade", CellValue::Text(d.fiber_grade.clone()))
        .cell("kg", CellValue::Float(d.quantity_kg, 1))
        .cell("location", CellValue::Text(d.delivery_location.clone()))
        .cell("status", CellValue::Delivery(d.status))
        .cell("date", CellValue::Date(d.delivery_date))
}

const OUTPUT: Columns<FiberDelivery> = Columns {
    entity_name: "delivery",
    plural: "deliveries",
    columns: COLUMNS,
    row,
};

pub fn run(cmd: DeliveryCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        DeliveryCommands::List(args) => run_list(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let conn = Connection::open(global)?;
    let filter = FilterState::new()
        .with_category("status", args.status.map(|s| s.to_string()).unwrap_or_default())
        .with_date(args.date.date);
    let screen: Screen<FiberDelivery> = open_screen(&conn, delivery::source(), &args.view, filter);

    let summary = DeliverySummary::compute(screen.view.filtered());
    let cards = vec![
        ("Total deliveries", summary.total.to_string()),
        ("Delivered", summary.delivered.to_string()),
        ("In transit", summary.in_transit.to_string()),
        ("Pending", summary.pending.to_string()),
        ("Total kg", format_number(summary.total_kg)),
    ];

    finish_list(
        &screen,
        &OUTPUT,
        &args.view,
        Some(cards),
        Some(&delivery::export_fields()),
        &conn,
        global,
    )
}
