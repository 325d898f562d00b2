use std::fmt;

use chrono::Utc;
use mw_config::ReporterConfig;
use mw_feed::{Canonicalizer, FeedKind, FeedSource};
use mw_notify::Notifier;
use mw_reconcile::reconcile;
use mw_report::ReportRenderer;
use mw_schemas::CanonicalState;
use mw_store::SnapshotStore;
use serde_json::Value;
use tracing::{info, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Both feeds failed. Nothing rendered, nothing persisted.
    Skipped,
    /// Nothing new; the snapshot was still refreshed.
    NoChanges { persisted: bool },
    /// A report was rendered and handed to the notifier.
    Reported {
        delivered: bool,
        new_records: usize,
        persisted: bool,
    },
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleOutcome::Skipped => f.write_str("skipped (both feeds unavailable)"),
            CycleOutcome::NoChanges { persisted } => {
                write!(f, "no changes (persisted={persisted})")
            }
            CycleOutcome::Reported {
                delivered,
                new_records,
                persisted,
            } => write!(
                f,
                "reported new_records={new_records} delivered={delivered} persisted={persisted}"
            ),
        }
    }
}

/// Owns everything one cycle needs. Generic over the feed source and the
/// notifier so tests can substitute in-memory fakes.
pub struct Reporter<F, N> {
    source: F,
    notifier: N,
    canonicalizer: Canonicalizer,
    store: SnapshotStore,
    renderer: ReportRenderer,
}

impl<F: FeedSource, N: Notifier> Reporter<F, N> {
    pub fn new(
        source: F,
        notifier: N,
        canonicalizer: Canonicalizer,
        store: SnapshotStore,
        renderer: ReportRenderer,
    ) -> Self {
        Self {
            source,
            notifier,
            canonicalizer,
            store,
            renderer,
        }
    }

    pub fn from_config(cfg: &ReporterConfig, source: F, notifier: N) -> Self {
        Self::new(
            source,
            notifier,
            Canonicalizer::new(cfg.roster.clone()),
            SnapshotStore::new(cfg.snapshot_path.clone()),
            ReportRenderer::new(cfg.report_title.clone(), cfg.roster.clone()),
        )
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn source(&self) -> &F {
        &self.source
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    async fn fetch_logged(&self, kind: FeedKind) -> Option<Value> {
        match self.source.fetch(kind).await {
            Ok(v) => {
                info!(feed = %kind, "feed fetch ok");
                Some(v)
            }
            Err(e) => {
                warn!(feed = %kind, error = %e, "feed fetch failed");
                None
            }
        }
    }

    fn persist(&self, state: &CanonicalState) -> bool {
        match self.store.save(state) {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    path = %self.store.path().display(),
                    error = %format!("{e:#}"),
                    "snapshot save failed; next cycle compares against the old snapshot"
                );
                false
            }
        }
    }

    pub async fn run_cycle(&self) -> CycleOutcome {
        let (account_raw, trades_raw) = tokio::join!(
            self.fetch_logged(FeedKind::AccountTotals),
            self.fetch_logged(FeedKind::Trades)
        );

        if account_raw.is_none() && trades_raw.is_none() {
            warn!("both feeds failed; skipping this cycle");
            return CycleOutcome::Skipped;
        }

        let accounts = self
            .canonicalizer
            .canonicalize_account_totals(&account_raw.unwrap_or(Value::Null));
        let trades = self
            .canonicalizer
            .canonicalize_trades(&trades_raw.unwrap_or(Value::Null));
        let mut diagnostics = accounts.diagnostics;
        diagnostics.merge(&trades.diagnostics);
        if !diagnostics.is_clean() {
            info!(%diagnostics, "lenient coercions applied");
        }

        let latest = CanonicalState::combine(accounts.state, trades.state);
        let previous = self.store.load();
        let outcome = reconcile(&latest, &previous);

        if !outcome.has_changes {
            let persisted = self.persist(&latest);
            info!(
                entities = latest.entities().len(),
                "no new or updated records; not sending a report"
            );
            return CycleOutcome::NoChanges { persisted };
        }

        let report = self
            .renderer
            .render(&outcome.accounts, &outcome.delta, Utc::now());

        let delivered = match self.notifier.deliver(&report).await {
            Ok(parts) => {
                info!(notifier = self.notifier.name(), parts, "report delivered");
                true
            }
            Err(e) => {
                warn!(notifier = self.notifier.name(), error = %e, "report delivery failed");
                false
            }
        };

        let persisted = self.persist(&latest);
        CycleOutcome::Reported {
            delivered,
            new_records: outcome.new_record_count(),
            persisted,
        }
    }
}
