use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use common::config::SamplerSource;
use common::{Config, MetricSampler, NotificationChannel};
use decision::{DecisionEngine, Thresholds};
use engine::{Monitor, Reporter};
use notify::{DiscordChannel, Dispatcher, TelegramChannel};
use sampler::{FeedSampler, SimulatedSampler};

/// Pre-pump market condition monitor.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML thresholds file (overrides THRESHOLDS_PATH)
    #[arg(long, global = true)]
    thresholds: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Run one poll cycle (default)
    Check,
    /// Summarize the last seven days of history
    Report,
    /// Send a test alert to every configured channel
    TestAlert,
}

#[tokio::main]
async fn main() -> Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!("💥 Monitor failed: {e:#}");
        return Err(e);
    }
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env().context("loading configuration")?;
    let dispatcher = build_dispatcher(&cfg)?;
    info!(channels = ?dispatcher.channel_names(), "Pre-Pump Monitor starting");

    match args.command.unwrap_or(Command::Check) {
        Command::Check => {
            let thresholds_path = args.thresholds.or_else(|| cfg.thresholds_path.clone());
            let thresholds = match thresholds_path {
                Some(path) => Thresholds::load(&path)?,
                None => Thresholds::default(),
            };
            info!(?thresholds, "Thresholds loaded");

            let history = engine::history::open(&cfg.history, cfg.http_timeout).await?;
            let monitor = Monitor::new(
                DecisionEngine::new(thresholds),
                build_sampler(&cfg)?,
                history,
                dispatcher,
            );
            monitor.run_cycle().await?;
            info!("✅ Monitor check completed");
        }
        Command::Report => {
            let history = engine::history::open(&cfg.history, cfg.http_timeout).await?;
            Reporter::new(history, dispatcher).run(chrono::Utc::now()).await?;
        }
        Command::TestAlert => {
            engine::send_test_alert(&dispatcher).await;
        }
    }
    Ok(())
}

// ── Collaborators (injected based on config) ─────────────────────────────────

fn build_sampler(cfg: &Config) -> Result<Arc<dyn MetricSampler>> {
    let sampler: Arc<dyn MetricSampler> = match &cfg.sampler {
        SamplerSource::Feed { url, token } => {
            info!(%url, "Using feed sampler");
            Arc::new(FeedSampler::new(url.clone(), token.clone(), cfg.http_timeout)?)
        }
        SamplerSource::Simulated { activity, participation } => {
            let activity = activity.clone().unwrap_or(SimulatedSampler::DEFAULT_ACTIVITY);
            let participation = participation.clone().unwrap_or(SimulatedSampler::DEFAULT_PARTICIPATION);
            info!(?activity, ?participation, "No SAMPLER_URL set, using simulated market data");
            Arc::new(SimulatedSampler::new().with_ranges(activity, participation)?)
        }
    };
    Ok(sampler)
}

fn build_dispatcher(cfg: &Config) -> Result<Dispatcher> {
    let mut channels: Vec<Arc<dyn NotificationChannel>> = Vec::new();
    if let Some(discord) = &cfg.discord {
        channels.push(Arc::new(DiscordChannel::new(
            discord.webhook_url.clone(),
            discord.username.clone(),
            cfg.http_timeout,
        )?));
    }
    if let Some(telegram) = &cfg.telegram {
        channels.push(Arc::new(TelegramChannel::new(
            telegram.bot_token.clone(),
            &telegram.chat,
        )));
    }
    Ok(Dispatcher::new(channels))
}
