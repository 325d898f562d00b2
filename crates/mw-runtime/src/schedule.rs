use std::future::Future;
use std::time::{Duration, Instant};

use mw_feed::FeedSource;
use mw_notify::Notifier;
use tracing::{info, warn};

use crate::Reporter;

/// Run cycles every `interval` until `shutdown` resolves. Returns the number
/// of cycles completed.
///
/// The sleep after a cycle is `interval - elapsed` (zero if the cycle
/// overran). Shutdown is honoured while sleeping and between cycles; an
/// in-flight cycle always runs to completion.
pub async fn run_loop<F, N, S>(reporter: &Reporter<F, N>, interval: Duration, shutdown: S) -> u64
where
    F: FeedSource,
    N: Notifier,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    info!(interval_secs = interval.as_secs_f64(), "reporter loop starting");

    let mut cycles: u64 = 0;
    loop {
        let started = Instant::now();
        let outcome = reporter.run_cycle().await;
        cycles += 1;
        info!(cycle = cycles, %outcome, elapsed_ms = started.elapsed().as_millis() as u64, "cycle finished");

        let pause = interval.saturating_sub(started.elapsed());
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = tokio::time::sleep(pause) => {}
        }
    }

    info!(cycles, "reporter stopped");
    cycles
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("SIGINT received; stopping after the current cycle"),
        _ = terminate => info!("SIGTERM received; stopping after the current cycle"),
    }
}
