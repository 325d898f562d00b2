//! Scenario: end-to-end poll cycles with in-memory feeds and notifier.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use mw_config::ReporterConfig;
use mw_feed::{FeedError, FeedKind, FeedSource};
use mw_notify::{Notifier, NotifyError};
use mw_runtime::{run_loop, CycleOutcome, Reporter};
use mw_schemas::EntityKey;
use serde_json::{json, Value};

/// Serves canned payloads; `None` simulates a failed fetch.
#[derive(Default)]
struct CannedFeeds {
    account_totals: Mutex<Option<Value>>,
    trades: Mutex<Option<Value>>,
    fetches: AtomicUsize,
}

impl CannedFeeds {
    fn new(account_totals: Option<Value>, trades: Option<Value>) -> Self {
        Self {
            account_totals: Mutex::new(account_totals),
            trades: Mutex::new(trades),
            fetches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl FeedSource for CannedFeeds {
    async fn fetch(&self, kind: FeedKind) -> Result<Value, FeedError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let slot = match kind {
            FeedKind::AccountTotals => &self.account_totals,
            FeedKind::Trades => &self.trades,
        };
        slot.lock()
            .unwrap()
            .clone()
            .ok_or(FeedError::Status { code: 503 })
    }
}

#[derive(Default)]
struct Outbox {
    sent: Mutex<Vec<String>>,
    fail: bool,
}

#[async_trait]
impl Notifier for Outbox {
    fn name(&self) -> &'static str {
        "outbox"
    }

    async fn deliver(&self, report: &str) -> Result<usize, NotifyError> {
        if self.fail {
            return Err(NotifyError::Transport("connection reset".to_string()));
        }
        self.sent.lock().unwrap().push(report.to_string());
        Ok(1)
    }
}

fn config(dir: &tempfile::TempDir) -> ReporterConfig {
    let mut cfg = ReporterConfig::defaults();
    cfg.snapshot_path = dir.path().join("snapshot.json");
    cfg
}

fn account_totals() -> Value {
    json!({"accountTotals": [
        {"model_id": "deepseek-chat-v3.1_119", "realized_pnl": 120.0, "dollar_equity": 10120.0,
         "total_unrealized_pnl": 5.5, "sharpe_ratio": 0.9,
         "positions": [{"symbol": "BTC", "side": "long", "quantity": 0.05,
                        "entry_price": 45000, "current_price": 45110,
                        "unrealized_pnl": 5.5, "leverage": 5, "confidence": 0.8}]},
        {"model_id": "gpt-5_0", "dollar_equity": 9000.0}
    ]})
}

fn trades() -> Value {
    json!({"trades": [
        {"model_id": "deepseek-chat-v3.1_119", "symbol": "ETH", "side": "long",
         "entry_price": 3000.0, "exit_price": 3100.0, "realized_net_pnl": 100.0}
    ]})
}

#[tokio::test]
async fn scenario_both_feeds_down_skips_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(&dir);
    let reporter = Reporter::from_config(&cfg, CannedFeeds::new(None, None), Outbox::default());

    assert_eq!(reporter.run_cycle().await, CycleOutcome::Skipped);
    assert!(!cfg.snapshot_path.exists());
    assert!(reporter.notifier().sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn scenario_first_cycle_reports_second_is_quiet() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(&dir);
    let reporter = Reporter::from_config(
        &cfg,
        CannedFeeds::new(Some(account_totals()), Some(trades())),
        Outbox::default(),
    );

    assert_eq!(
        reporter.run_cycle().await,
        CycleOutcome::Reported {
            delivered: true,
            new_records: 2,
            persisted: true
        }
    );
    assert_eq!(
        reporter.run_cycle().await,
        CycleOutcome::NoChanges { persisted: true }
    );
    assert_eq!(reporter.source().fetches.load(Ordering::SeqCst), 4);

    let sent = reporter.notifier().sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    let report = &sent[0];
    assert!(report.starts_with("NoF1 AI Trading Update - "));
    assert!(report.contains("*Deepseek*"));
    assert!(report.contains("- New/Updated: BTC Long | Qty: 0.05"));
    assert!(report.contains("- New/Updated: ETH Long | Entry: $3,000.00 () | Exit: $3,100.00 ()"));
    assert!(!report.contains("gpt"));

    let snap = reporter.store().load();
    assert_eq!(snap.accounts[&EntityKey::Deepseek].equity, 10120.0);
    assert_eq!(snap.activity[&EntityKey::Deepseek].recent_trades.len(), 1);
}

#[tokio::test]
async fn scenario_one_feed_down_still_reports_the_other() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(&dir);
    let reporter = Reporter::from_config(
        &cfg,
        CannedFeeds::new(None, Some(trades())),
        Outbox::default(),
    );

    let outcome = reporter.run_cycle().await;
    assert!(matches!(outcome, CycleOutcome::Reported { new_records: 1, .. }));
    // No account feed: the section still renders with zero figures.
    assert!(reporter.notifier().sent.lock().unwrap()[0].contains("Stats: PnL: $0.00"));
}

#[tokio::test]
async fn scenario_delivery_failure_still_persists() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(&dir);
    let outbox = Outbox {
        sent: Mutex::new(Vec::new()),
        fail: true,
    };
    let reporter = Reporter::from_config(
        &cfg,
        CannedFeeds::new(Some(account_totals()), None),
        outbox,
    );

    assert_eq!(
        reporter.run_cycle().await,
        CycleOutcome::Reported {
            delivered: false,
            new_records: 1,
            persisted: true
        }
    );
    assert!(cfg.snapshot_path.exists());
}

#[tokio::test]
async fn scenario_new_trade_in_later_cycle_is_the_only_one_reported() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(&dir);
    let reporter = Reporter::from_config(
        &cfg,
        CannedFeeds::new(None, Some(trades())),
        Outbox::default(),
    );
    reporter.run_cycle().await;

    *reporter.source().trades.lock().unwrap() = Some(json!({"trades": [
        {"model_id": "deepseek-chat-v3.1_119", "symbol": "ETH", "side": "long",
         "entry_price": 3000.0, "exit_price": 3100.0, "realized_net_pnl": 100.0},
        {"model_id": "grok-4", "symbol": "SOL", "side": "short",
         "entry_price": 150.0, "exit_price": 140.0, "realized_net_pnl": 40.0}
    ]}));
    let outcome = reporter.run_cycle().await;
    assert!(matches!(outcome, CycleOutcome::Reported { new_records: 1, .. }));

    let sent = reporter.notifier().sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert!(sent[1].contains("- New/Updated: SOL Short"));
    assert!(!sent[1].contains("- New/Updated: ETH"));
    assert!(sent[1].contains("*Deepseek*"));
}

#[tokio::test]
async fn scenario_loop_stops_on_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(&dir);
    let reporter = Reporter::from_config(
        &cfg,
        CannedFeeds::new(None, Some(trades())),
        Outbox::default(),
    );

    let cycles = run_loop(
        &reporter,
        Duration::from_millis(20),
        tokio::time::sleep(Duration::from_millis(70)),
    )
    .await;
    assert!(cycles >= 2, "cycles={cycles}");
    assert_eq!(reporter.source().fetches.load(Ordering::SeqCst) as u64, cycles * 2);
}

#[tokio::test]
async fn scenario_loop_runs_at_least_one_cycle_when_already_shut_down() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(&dir);
    let reporter = Reporter::from_config(
        &cfg,
        CannedFeeds::new(None, None),
        Outbox::default(),
    );
    let cycles = run_loop(&reporter, Duration::from_secs(60), std::future::ready(())).await;
    assert_eq!(cycles, 1);
}

#[tokio::test]
async fn scenario_snapshot_save_failure_still_reports() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(&dir);
    // A directory at the snapshot path: load degrades to empty, rename fails.
    cfg.snapshot_path = dir.path().join("occupied");
    std::fs::create_dir(&cfg.snapshot_path).unwrap();
    let reporter = Reporter::from_config(
        &cfg,
        CannedFeeds::new(Some(account_totals()), None),
        Outbox::default(),
    );

    let outcome = reporter.run_cycle().await;
    assert!(
        matches!(
            outcome,
            CycleOutcome::Reported {
                persisted: false,
                delivered: true,
                ..
            }
        ),
        "outcome={outcome}"
    );
    assert_eq!(reporter.notifier().sent.lock().unwrap().len(), 1);
    assert!(cfg.snapshot_path.is_dir());

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .filter(|n| n.to_string_lossy().contains(".tmp."))
        .collect();
    assert!(leftovers.is_empty(), "{leftovers:?}");
}
