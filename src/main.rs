//! Vacancy Monitor — binary entrypoint.
//! Wires configuration, the gateway fetcher, the sheets sink, and the
//! alert webhook together, bootstraps the dedup index, then hands the
//! pipeline to the hourly scheduler.

use anyhow::Context;
use async_trait::async_trait;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vacancy_monitor::config::AppConfig;
use vacancy_monitor::fetch::gateway::GatewayFetcher;
use vacancy_monitor::matcher::KeywordMatcher;
use vacancy_monitor::notify::webhook::WebhookNotifier;
use vacancy_monitor::pipeline::{IngestionPipeline, PipelineCfg};
use vacancy_monitor::scheduler::{self, Job};
use vacancy_monitor::sink::sheets::SheetsSink;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vacancy_monitor=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

struct MonitorJob {
    pipeline: IngestionPipeline,
}

#[async_trait]
impl Job for MonitorJob {
    async fn run(&mut self) {
        let report = self.pipeline.run_once().await;
        tracing::info!("{report}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env for local runs; a real deployment sets the environment itself.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::from_env().context("loading configuration")?;
    let client = reqwest::Client::builder()
        .timeout(cfg.http_timeout)
        .build()
        .context("building HTTP client")?;

    let fetcher = Box::new(GatewayFetcher::new(
        client.clone(),
        cfg.gateway.base_url.clone(),
        cfg.gateway.token.clone(),
    ));
    let sink = Box::new(SheetsSink::new(client.clone(), cfg.sheet.clone()));
    let notifier = Box::new(WebhookNotifier::new(client, cfg.alerts.webhook_url.clone()));
    let matcher = KeywordMatcher::new(&cfg.keywords);

    let mut pipeline = IngestionPipeline::new(
        fetcher,
        sink,
        notifier,
        matcher,
        PipelineCfg::from_app(&cfg),
    );
    pipeline.bootstrap().await.context("startup bootstrap")?;

    tracing::info!(
        channels = cfg.channels.len(),
        keywords = cfg.keywords.len(),
        known_rows = pipeline.known_keys(),
        interval_secs = cfg.poll_interval.as_secs(),
        "vacancy monitor started"
    );

    let mut job = MonitorJob { pipeline };
    scheduler::run_every(cfg.poll_interval, &mut job).await;
    Ok(())
}
