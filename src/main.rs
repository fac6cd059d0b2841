use clap::Parser;
use miette::Result;
use mao::cli::commands;
use mao::cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_logging(global.verbose);

    match cli.command {
        Commands::Login(args) => commands::auth::run_login(args, &global),
        Commands::Logout => commands::auth::run_logout(&global),
        Commands::Whoami => commands::auth::run_whoami(&global),
        Commands::Farmer(cmd) => commands::farmer::run(cmd, &global),
        Commands::Buyer(cmd) => commands::buyer::run(cmd, &global),
        Commands::Officer(cmd) => commands::officer::run(cmd, &global),
        Commands::Harvest(cmd) => commands::harvest::run(cmd, &global),
        Commands::Sales(cmd) => commands::sales::run(cmd, &global),
        Commands::Delivery(cmd) => commands::delivery::run(cmd, &global),
        Commands::Distribution(cmd) => commands::distribution::run(cmd, &global),
        Commands::Team(cmd) => commands::team::run(cmd, &global),
        Commands::Article(cmd) => commands::article::run(cmd, &global),
        Commands::Activity(cmd) => commands::activity::run(cmd, &global),
        Commands::Maintenance(cmd) => commands::maintenance::run(cmd, &global),
        Commands::Dashboard(args) => commands::dashboard::run(args, &global),
        Commands::Config(cmd) => commands::config::run(cmd, &global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`
fn init_logging(verbose: bool) {
    let fallback = if verbose { "mao=debug" } else { "mao=warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
