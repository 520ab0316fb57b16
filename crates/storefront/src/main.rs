//! EStore storefront shell.
//!
//! Interactive terminal client for the EStore REST backend. Browse products,
//! manage a session cart, check out, and administer orders and products.
//!
//! Logs go to stderr (`RUST_LOG`, default `estore_storefront=info`) so they
//! never interleave with shell output.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::Parser;
use estore_storefront::config::StorefrontConfig;
use estore_storefront::error::Result;
use estore_storefront::interaction::Terminal;
use estore_storefront::shell;
use estore_storefront::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Terminal storefront for the EStore backend.
#[derive(Debug, Parser)]
#[command(name = "estore", version, about)]
struct Cli {
    /// Backend base URL (overrides `STOREFRONT_BACKEND_URL`)
    #[arg(long)]
    backend_url: Option<String>,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "estore_storefront=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

fn load_config(cli: &Cli) -> Result<StorefrontConfig> {
    let config = StorefrontConfig::from_env()?;
    match cli.backend_url.as_deref() {
        Some(url) => Ok(config.with_backend_url(url)?),
        None => Ok(config),
    }
}

async fn run(config: StorefrontConfig) -> Result<()> {
    let mut state = AppState::new(config)?;
    state.startup().await;

    let mut term = Terminal::stdio();
    shell::run(&mut state, &mut term).await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Configuration comes first: Sentry needs the DSN before tracing starts
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            e.report();
            std::process::exit(1);
        }
    };

    let sentry_guard = init_sentry(&config);
    init_tracing();
    tracing::info!(backend = %config.backend_url, "Starting storefront");

    if let Err(e) = run(config).await {
        e.report();
        drop(sentry_guard);
        std::process::exit(1);
    }
}
