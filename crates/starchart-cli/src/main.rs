//! Starchart CLI - a terminal front end for the Starchart astrology service.
//!
//! Signs in against the backend, keeps the session token between runs, and
//! prints reports, articles and zodiac insights as plain text.

mod render;

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use starchart_core::api::client::{
    DEFAULT_ARTICLE_PAGE_SIZE, DEFAULT_REPORT_HISTORY_LIMIT, DEFAULT_REPORT_TYPE,
};
use starchart_core::{Config, RegisterProfile, SessionController};

// ============================================================================
// Constants
// ============================================================================

/// Environment variable read instead of prompting for a password
const ENV_PASSWORD: &str = "STARCHART_PASSWORD";

/// Log file name prefix inside the cache directory
const LOG_FILE_PREFIX: &str = "starchart.log";

#[derive(Debug, Parser)]
#[command(name = "starchart", version, about = "Personal astrology reports from the terminal")]
struct Cli {
    /// Also write logs to a daily rotated file in the cache directory
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and remember the session
    Login {
        /// Defaults to the last email used
        email: Option<String>,
    },
    /// Create an account with birth details, then sign in
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        /// YYYY-MM-DD
        #[arg(long)]
        birth_date: String,
        /// HH:MM or HH:MM:SS
        #[arg(long)]
        birth_time: String,
        #[arg(long)]
        birth_place: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show or generate a personal report
    Report {
        #[command(subcommand)]
        kind: ReportKind,
    },
    /// List published articles
    Articles {
        #[arg(long, default_value_t = 0)]
        skip: u32,
        #[arg(long, default_value_t = DEFAULT_ARTICLE_PAGE_SIZE)]
        limit: u32,
    },
    /// Read one article
    Article { slug: String },
    /// Zodiac insights for every sign, or one sign
    Insights { sign: Option<String> },
}

#[derive(Debug, Subcommand)]
enum ReportKind {
    /// Western astrology report
    Astrology {
        /// Generate a fresh report instead of showing the latest
        #[arg(long)]
        new: bool,
        #[arg(long = "type", default_value = DEFAULT_REPORT_TYPE)]
        report_type: String,
        /// List recent reports
        #[arg(long, conflicts_with = "new")]
        history: bool,
    },
    /// Chinese zodiac report for the current year
    Zodiac {
        #[arg(long)]
        new: bool,
        #[arg(long, conflicts_with = "new")]
        history: bool,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = Config::load().context("Failed to load config")?;
    let log_dir = if cli.log_file {
        Some(config.cache_dir()?)
    } else {
        None
    };
    let _guard = init_tracing(log_dir.as_deref());
    info!(api = %config.api_base_url, backend = ?config.token_backend, "starchart starting");

    let session = SessionController::from_config(&config)?;

    match cli.command {
        Command::Logout => {
            session.logout();
            println!("Signed out.");
            return Ok(());
        }
        Command::Login { email } => {
            session.restore().await;
            login(&session, &config, email).await?;
        }
        Command::Register {
            email,
            name,
            birth_date,
            birth_time,
            birth_place,
        } => {
            session.restore().await;
            let profile = RegisterProfile {
                password: read_password()?,
                email,
                name,
                birth_date,
                birth_time,
                birth_place,
            };
            let identity = session.register(&profile).await?;
            remember_email(&identity.email);
            println!("Welcome, {}! Your account is ready.", identity.name);
        }
        Command::Whoami => {
            session.restore().await;
            match session.identity() {
                Some(identity) => render::print_identity(&identity),
                None => println!("Not signed in."),
            }
        }
        Command::Report { kind } => {
            session.restore().await;
            require_auth(&session)?;
            report(&session, kind).await?;
        }
        Command::Articles { skip, limit } => {
            let articles = session.api().list_articles(skip, limit).await?;
            render::print_article_list(&articles);
        }
        Command::Article { slug } => {
            let article = session.api().fetch_article(&slug).await?;
            render::print_article(&article);
        }
        Command::Insights { sign } => match sign {
            Some(sign) => {
                let entry = session.api().fetch_zodiac_interpretation(&sign).await?;
                render::print_interpretation(&entry);
            }
            None => {
                let entries = session.api().list_zodiac_interpretations().await?;
                render::print_interpretation_list(&entries);
            }
        },
    }

    info!("starchart finished");
    Ok(())
}

async fn login(
    session: &SessionController,
    config: &Config,
    email: Option<String>,
) -> Result<()> {
    let email = email
        .or_else(|| config.last_email.clone())
        .ok_or_else(|| anyhow::anyhow!("Email required: starchart login <email>"))?;

    if session.identity().as_ref().map(|i| i.email.as_str()) == Some(email.as_str()) {
        println!("Already signed in as {}.", email);
        return Ok(());
    }

    let password = read_password()?;
    println!("Signing in...");
    let identity = session.login(&email, &password).await?;
    remember_email(&identity.email);
    println!("Signed in as {} <{}>.", identity.name, identity.email);
    Ok(())
}

async fn report(session: &SessionController, kind: ReportKind) -> Result<()> {
    let api = session.api();
    match kind {
        ReportKind::Astrology {
            history: true, ..
        } => {
            let reports = api.list_astrology_reports(DEFAULT_REPORT_HISTORY_LIMIT).await?;
            render::print_astrology_history(&reports);
        }
        ReportKind::Astrology {
            new, report_type, ..
        } => {
            let report = if new {
                api.generate_astrology_report(&report_type).await?
            } else {
                api.latest_or_generate_astrology_report().await?
            };
            render::print_astrology_report(&report);
        }
        ReportKind::Zodiac { history: true, .. } => {
            let reports = api.list_zodiac_reports(DEFAULT_REPORT_HISTORY_LIMIT).await?;
            render::print_zodiac_history(&reports);
        }
        ReportKind::Zodiac { new, .. } => {
            let report = if new {
                api.generate_zodiac_report().await?
            } else {
                api.latest_or_generate_zodiac_report().await?
            };
            render::print_zodiac_report(&report);
        }
    }
    Ok(())
}

fn require_auth(session: &SessionController) -> Result<()> {
    if session.state().is_authenticated() {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "Not signed in. Run `starchart login <email>` first."
        ))
    }
}

fn read_password() -> Result<String> {
    if let Ok(password) = std::env::var(ENV_PASSWORD) {
        return Ok(password);
    }
    rpassword::prompt_password("Password: ").context("Failed to read password")
}

/// Save the email for the next login. Failures are only logged.
fn remember_email(email: &str) {
    // Re-read the file so environment overrides are not persisted
    let result = Config::config_path()
        .and_then(|path| Config::load_from(&path))
        .and_then(|mut config| {
            config.last_email = Some(email.to_string());
            config.save()
        });
    if let Err(e) = result {
        warn!(error = %e, "Failed to save config");
    }
}
