//! Shared utilities for CLI commands
//!
//! Every list command runs the same pipeline: fetch the collection, apply
//! the user's filters, then print summary cards, export the filtered rows
//! and/or print one page. Mutating commands go through [`mutate`].

use chrono::Local;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::PromptConfirm;
use crate::cli::table::{ColumnDef, TableConfig, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::api::{ApiClient, ApiError, HttpTransport};
use crate::core::entity::Record;
use crate::core::export::{to_csv, write_export, FieldSpec};
use crate::core::fetch::{ListSource, Screen};
use crate::core::mutation::{Action, MutationDispatcher, RefreshPolicy};
use crate::core::session::AuthContext;
use crate::core::view::{DateBucket, FilterState, PageSize};
use crate::core::Config;

/// Paging, search, summary and export options shared by list commands
#[derive(clap::Args, Debug, Clone)]
pub struct ViewArgs {
    /// Case-insensitive search
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Page to show (clamped to the last page)
    #[arg(long, short = 'p', default_value_t = 1)]
    pub page: usize,

    /// Rows per page: 10, 20, 30, 40, 50 or 100
    #[arg(long)]
    pub per_page: Option<PageSize>,

    /// Print summary cards for the filtered rows
    #[arg(long)]
    pub summary: bool,

    /// Write all filtered rows as CSV into DIR (default: current directory)
    #[arg(long, value_name = "DIR", num_args = 0..=1, default_missing_value = ".")]
    pub export: Option<PathBuf>,

    /// Wrap long text columns at this width instead of truncating
    #[arg(long)]
    pub wrap: Option<usize>,

    /// Show only the number of matching rows
    #[arg(long)]
    pub count: bool,
}

/// Date range filter for screens with dated records
#[derive(clap::Args, Debug, Clone)]
pub struct DateArgs {
    /// Only rows from today, the last 7 days or the last 30 days
    #[arg(long, default_value = "all")]
    pub date: DateBucket,
}

/// Loaded configuration plus an authenticated API client
pub struct Connection {
    pub config: Config,
    pub client: ApiClient<HttpTransport>,
}

impl Connection {
    /// Build a client from the stored session
    ///
    /// The backend URL is taken from `--api-url`/`MAO_API_URL`, then the
    /// URL the session was created against, then the config file.
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let config = Config::load();
        let auth = AuthContext::load().map_err(|e| miette::miette!("{}", e))?;
        let session = auth
            .session()
            .ok_or_else(|| miette::miette!("{}", ApiError::NotAuthenticated))?;

        let api_url = global
            .api_url
            .clone()
            .unwrap_or_else(|| session.api_url.clone());
        let api_url = if api_url.trim().is_empty() {
            config.api_url()
        } else {
            api_url
        };

        let transport = HttpTransport::new(&api_url, config.timeout_secs())
            .map_err(|e| miette::miette!("{}", e))?;
        Ok(Self {
            client: ApiClient::new(transport, Some(session.token.clone())),
            config,
        })
    }

    /// Output format after resolving `auto`
    pub fn format(&self, global: &GlobalOpts, fallback: OutputFormat) -> OutputFormat {
        global
            .format
            .resolve(self.config.default_format.as_deref(), fallback)
    }
}

/// Fetch a collection and apply the user's filters
///
/// A failed load is reported as a warning and the screen continues with
/// whatever it holds (nothing, on a first load).
pub fn open_screen<T>(
    conn: &Connection,
    source: ListSource,
    args: &ViewArgs,
    filter: FilterState,
) -> Screen<T>
where
    T: Record + Clone,
{
    let mut screen = Screen::new(source);
    screen
        .view
        .set_page_size(args.per_page.unwrap_or_else(|| conn.config.page_size()));

    if let Err(e) = screen.load(&conn.client) {
        eprintln!("{} {}", style("!").yellow(), e.user_message());
    }

    screen
        .view
        .set_filter(filter.with_search(args.search.clone().unwrap_or_default()));
    screen.view.go_to_page(args.page);
    screen
}

/// How one screen renders its rows
pub struct Columns<T> {
    pub entity_name: &'static str,
    pub plural: &'static str,
    pub columns: &'static [ColumnDef],
    pub row: fn(&T) -> TableRow,
}

/// Summary cards, export and the visible page, in that order
pub fn finish_list<T>(
    screen: &Screen<T>,
    out: &Columns<T>,
    args: &ViewArgs,
    cards: Option<Vec<(&'static str, String)>>,
    export_fields: Option<&[FieldSpec<T>]>,
    conn: &Connection,
    global: &GlobalOpts,
) -> Result<()>
where
    T: Record + Clone + Serialize,
{
    if args.count {
        println!("{}", screen.view.filtered().len());
        return Ok(());
    }

    let format = conn.format(global, OutputFormat::Tsv);

    if args.summary {
        if let Some(cards) = cards {
            print_cards(out.plural, &cards, format);
        }
    }

    if let Some(dir) = &args.export {
        match export_fields {
            Some(fields) => export_csv(screen, fields, dir, global)?,
            None => {
                return Err(miette::miette!("{} cannot be exported", out.plural));
            }
        }
    }

    print_page(screen, out, args, format, global)
}

/// Print the current page of the filtered view
pub fn print_page<T>(
    screen: &Screen<T>,
    out: &Columns<T>,
    args: &ViewArgs,
    format: OutputFormat,
    global: &GlobalOpts,
) -> Result<()>
where
    T: Record + Clone + Serialize,
{
    let page = screen.view.page();

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&page.items).into_diagnostic()?;
            println!("{}", json);
            return Ok(());
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&page.items).into_diagnostic()?;
            print!("{}", yaml);
            return Ok(());
        }
        _ => {}
    }

    if page.items.is_empty() && !matches!(format, OutputFormat::Id | OutputFormat::Csv) {
        if !global.quiet {
            println!("No {} found.", out.plural);
        }
        return Ok(());
    }

    let config = if global.quiet {
        TableConfig::for_pipe()
    } else if let Some(width) = args.wrap {
        TableConfig::with_wrap(width)
    } else {
        TableConfig::default()
    };

    let footer = format!(
        "(page {} of {}, {} matching, {} loaded)",
        page.page,
        page.total_pages,
        page.total_items,
        screen.records().len()
    );

    TableFormatter::new(out.columns, out.entity_name)
        .with_footer(footer)
        .with_config(config)
        .output(page.items.into_iter().map(out.row), format);
    Ok(())
}

/// Render summary cards as a two-column table
pub fn print_cards(title: &str, cards: &[(&'static str, String)], format: OutputFormat) {
    let mut builder = Builder::default();
    for (label, value) in cards {
        builder.push_record([label.to_string(), value.clone()]);
    }
    let mut table = builder.build();

    if format == OutputFormat::Md {
        println!("## {}\n", title);
        println!("{}\n", table.with(Style::markdown()));
    } else {
        println!("{}", style(title).bold());
        println!("{}\n", table.with(Style::rounded()));
    }
}

/// Write the filtered view to `{resource}_{today}.csv` in `dir`
pub fn export_csv<T>(screen: &Screen<T>, fields: &[FieldSpec<T>], dir: &Path, global: &GlobalOpts) -> Result<()>
where
    T: Record + Clone,
{
    let rows = screen.view.filtered();
    let csv = to_csv(rows.iter().copied(), fields);
    let path = write_export(dir, T::RESOURCE, Local::now().date_naive(), &csv)
        .map_err(|e| miette::miette!("{}", e))?;

    if !global.quiet {
        eprintln!(
            "{} Exported {} row(s) to {}",
            style("✓").green(),
            style(rows.len()).cyan(),
            style(path.display()).cyan()
        );
    }
    Ok(())
}

/// Past tense of an action for confirmation messages
pub fn past_tense(action: &Action) -> &'static str {
    match action {
        Action::Verify => "Verified",
        Action::Reject { .. } => "Rejected",
        Action::Approve => "Approved",
        Action::Delete => "Deleted",
        Action::Create(_) => "Created",
        Action::Update(_) => "Updated",
        Action::ToggleStatus => "Toggled",
    }
}

/// Run an action against one record and refresh the screen
///
/// Returns false when the user declined the confirmation prompt.
#[allow(clippy::too_many_arguments)]
pub fn mutate<T>(
    conn: &Connection,
    screen: &mut Screen<T>,
    resource: &str,
    id: Option<&str>,
    action: Action,
    policy: RefreshPolicy<T>,
    noun: &str,
    yes: bool,
    global: &GlobalOpts,
) -> Result<bool>
where
    T: Record + Clone,
{
    let confirm = PromptConfirm::new(yes);
    let dispatcher = MutationDispatcher::new(&conn.client, &confirm);
    let done = past_tense(&action);

    match dispatcher.dispatch(screen, resource, id, action, policy) {
        Ok(_) => {
            if !global.quiet {
                println!(
                    "{} {} {} {}",
                    style("✓").green(),
                    done,
                    noun,
                    style(id.unwrap_or_default()).cyan()
                );
            }
            Ok(true)
        }
        Err(ApiError::Cancelled) => {
            if !global.quiet {
                println!("{}", style("Cancelled.").dim());
            }
            Ok(false)
        }
        Err(e) => Err(miette::miette!("{}", e.user_message())),
    }
}

/// Target of a single-record action
#[derive(clap::Args, Debug)]
pub struct IdArgs {
    /// Record ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct RejectArgs {
    /// Record ID
    pub id: String,

    /// Reason shown to the submitter
    #[arg(long, short = 'r')]
    pub reason: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Record ID
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}
