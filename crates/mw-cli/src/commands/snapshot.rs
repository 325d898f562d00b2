use anyhow::Result;
use mw_report::format_money;
use mw_store::SnapshotStore;

pub fn show(path: &str) -> Result<()> {
    let store = SnapshotStore::new(path);
    let Some(state) = store.try_load()? else {
        println!("snapshot_present=false path={path}");
        return Ok(());
    };

    let entities = state.entities();
    println!(
        "snapshot_present=true path={} entities={} positions={} trades={}",
        path,
        entities.len(),
        state.position_count(),
        state.trade_count()
    );
    for key in entities {
        let acc = state.accounts.get(&key).cloned().unwrap_or_default();
        let activity = state.activity.get(&key).cloned().unwrap_or_default();
        println!(
            "{}: equity={} pnl={} unrealized={} sharpe={:.2} positions={} trades={}",
            key,
            format_money(acc.equity),
            format_money(acc.pnl),
            format_money(acc.unrealized),
            acc.sharpe,
            activity.open_positions.len(),
            activity.recent_trades.len()
        );
    }
    Ok(())
}
