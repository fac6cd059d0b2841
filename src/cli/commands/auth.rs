//! `mao login`, `mao logout` and `mao whoami`

use chrono::Utc;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Password};
use miette::{IntoDiagnostic, Result};
use serde::Deserialize;
use serde_json::json;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::api::{ApiClient, HttpTransport};
use crate::core::session::{AuthContext, CurrentUser, Session};
use crate::core::Config;

pub const LOGIN_PATH: &str = "/auth/login";

#[derive(clap::Args, Debug)]
pub struct LoginArgs {
    /// Account email (prompted when omitted)
    #[arg(long, short = 'e')]
    pub email: Option<String>,

    /// Password (prompted when omitted)
    #[arg(long, env = "MAO_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(alias = "accessToken", alias = "access_token")]
    token: String,
    #[serde(alias = "admin", alias = "mao")]
    user: CurrentUser,
}

pub fn run_login(args: LoginArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let api_url = global.api_url.clone().unwrap_or_else(|| config.api_url());
    let theme = ColorfulTheme::default();

    let email = match args.email {
        Some(email) => email,
        None => Input::with_theme(&theme)
            .with_prompt("Email")
            .interact_text()
            .into_diagnostic()?,
    };
    let password = match args.password {
        Some(password) => password,
        None => Password::with_theme(&theme)
            .with_prompt("Password")
            .interact()
            .into_diagnostic()?,
    };

    let transport =
        HttpTransport::new(&api_url, config.timeout_secs()).map_err(|e| miette::miette!("{}", e))?;
    let client = ApiClient::new(transport, None);
    let body = client
        .post(LOGIN_PATH, json!({ "email": email, "password": password }))
        .map_err(|e| miette::miette!("Login failed: {}", e.user_message()))?;
    let response: LoginResponse = serde_json::from_value(body)
        .map_err(|e| miette::miette!("Unexpected login response: {}", e))?;

    let mut auth = AuthContext::load().map_err(|e| miette::miette!("{}", e))?;
    let user = response.user.clone();
    auth.login(Session {
        token: response.token,
        user: response.user,
        api_url,
        logged_in_at: Utc::now(),
    })
    .map_err(|e| miette::miette!("{}", e))?;

    tracing::info!(email = %user.email, "logged in");
    if !global.quiet {
        println!(
            "{} Logged in as {} ({})",
            style("✓").green(),
            style(display_name(&user)).cyan(),
            user.role
        );
    }
    Ok(())
}

pub fn run_logout(global: &GlobalOpts) -> Result<()> {
    let mut auth = AuthContext::load().map_err(|e| miette::miette!("{}", e))?;
    let existed = auth.logout().map_err(|e| miette::miette!("{}", e))?;
    if !global.quiet {
        if existed {
            println!("{} Logged out", style("✓").green());
        } else {
            println!("{}", style("Not logged in").dim());
        }
    }
    Ok(())
}

pub fn run_whoami(global: &GlobalOpts) -> Result<()> {
    let auth = AuthContext::load().map_err(|e| miette::miette!("{}", e))?;
    let session = auth
        .session()
        .ok_or_else(|| miette::miette!("Not logged in. Run `mao login` first"))?;

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&session.user).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&session.user).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", session.user.id),
        _ => {
            println!("{}", style(display_name(&session.user)).bold());
            println!("  {}: {}", style("email").cyan(), session.user.email);
            println!("  {}: {}", style("role").cyan(), session.user.role);
            println!("  {}: {}", style("backend").cyan(), session.api_url);
            println!(
                "  {}: {}",
                style("since").cyan(),
                session.logged_in_at.format("%Y-%m-%d %H:%M UTC")
            );
        }
    }
    Ok(())
}

fn display_name(user: &CurrentUser) -> &str {
    if user.name.is_empty() {
        &user.email
    } else {
        &user.name
    }
}
