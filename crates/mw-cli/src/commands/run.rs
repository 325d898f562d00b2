use anyhow::{Context, Result};
use mw_config::ReporterConfig;
use mw_feed::HttpFeedClient;
use mw_notify::{ConsoleNotifier, Notifier, TelegramNotifier};
use mw_runtime::{run_loop, shutdown_signal, Reporter};

use super::load_config;

type LiveReporter = Reporter<HttpFeedClient, Box<dyn Notifier>>;

/// Fails when delivery credentials are missing and `dry_run` is false.
fn build_reporter(cfg: &ReporterConfig, dry_run: bool) -> Result<LiveReporter> {
    let secrets = mw_config::resolve_delivery_secrets(&cfg.telegram, !dry_run)?;

    let notifier: Box<dyn Notifier> = if dry_run {
        Box::new(ConsoleNotifier)
    } else {
        Box::new(
            TelegramNotifier::new(&cfg.telegram, &secrets, cfg.http.timeout)
                .context("telegram notifier setup failed")?,
        )
    };
    let source =
        HttpFeedClient::new(&cfg.feeds, &cfg.http).context("feed client setup failed")?;

    Ok(Reporter::from_config(cfg, source, notifier))
}

pub async fn run_once(config_paths: &[String], dry_run: bool) -> Result<()> {
    let (_loaded, cfg) = load_config(config_paths)?;
    let reporter = build_reporter(&cfg, dry_run)?;

    let outcome = reporter.run_cycle().await;
    println!("outcome={outcome}");
    Ok(())
}

pub async fn run_forever(config_paths: &[String], dry_run: bool) -> Result<()> {
    let (_loaded, cfg) = load_config(config_paths)?;
    let reporter = build_reporter(&cfg, dry_run)?;

    run_loop(&reporter, cfg.interval, shutdown_signal()).await;
    Ok(())
}
