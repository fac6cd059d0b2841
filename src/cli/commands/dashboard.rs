//! `mao dashboard` command - Production, sales and user statistics

use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::commands::utils::Connection;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::report::{Card, DashboardReport};

#[derive(clap::Args, Debug)]
pub struct DashboardArgs {
    /// Fail instead of showing zeros when a report cannot be loaded
    #[arg(long)]
    pub strict: bool,
}

pub fn run(args: DashboardArgs, global: &GlobalOpts) -> Result<()> {
    let conn = Connection::open(global)?;
    let report = DashboardReport::fetch(&conn.client);

    for (name, message) in &report.failures {
        eprintln!(
            "{} {} report unavailable: {}",
            style("!").yellow(),
            name,
            message
        );
    }
    if args.strict && !report.is_complete() {
        return Err(miette::miette!(
            "{} of 3 reports failed to load",
            report.failures.len()
        ));
    }

    match conn.format(global, OutputFormat::Tsv) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
        }
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&report).into_diagnostic()?),
        OutputFormat::Md => println!("{}", render(&report.cards()).with(Style::markdown())),
        OutputFormat::Csv | OutputFormat::Tsv | OutputFormat::Id | OutputFormat::Auto => {
            println!("{}", style("MAO dashboard").bold());
            println!("{}", render(&report.cards()).with(Style::rounded()));
        }
    }
    Ok(())
}

fn render(cards: &[Card]) -> tabled::Table {
    let mut builder = Builder::default();
    builder.push_record(["Metric", "Value", "Trend"]);
    for card in cards {
        builder.push_record([
            card.label.to_string(),
            card.value.clone(),
            card.trend.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }
    builder.build()
}
