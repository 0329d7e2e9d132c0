use super::rates::{rate_rows, rows_table};
use super::ui::{self, StyleType};
use crate::AppContext;
use crate::core::currency::normalize_code;
use crate::core::format::format_rate;
use crate::core::rate_manager::{RateCacheManager, RateSnapshot};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

fn render(snapshot: &RateSnapshot, favorites: &[String]) {
    ui::print_separator();
    ui::print_status(snapshot);
    if !snapshot.has_data() {
        return;
    }
    let rows = rate_rows(&snapshot.rates, &snapshot.base, "", |c| {
        favorites.iter().any(|f| f == c)
    });
    let rows: Vec<_> = rows.into_iter().filter(|r| r.is_favorite).collect();
    if rows.is_empty() {
        println!("{}", ui::style_text("No favorite rates to show", StyleType::Subtle));
        return;
    }
    println!("{}", rows_table("Rate", &rows, format_rate));
}

/// Keeps favorite rates for `base` on screen, refreshing whenever
/// connectivity changes, until interrupted.
pub async fn run(ctx: &AppContext, base: Option<&str>) -> Result<()> {
    let base = normalize_code(base.unwrap_or(&ctx.config.base_currency));
    let favorites = ctx.favorites()?.favorites().to_vec();

    // Forced offline mode is never overridden by the probe
    let probe_addr = ctx
        .config
        .connectivity
        .probe_addr
        .clone()
        .filter(|_| !ctx.connectivity.is_offline());
    let probe = probe_addr.map(|addr| {
        info!(addr = %addr, "Probing connectivity");
        ctx.connectivity.spawn_probe(
            addr,
            Duration::from_secs(ctx.config.connectivity.probe_interval_secs.max(1)),
            PROBE_TIMEOUT,
        )
    });
    let follower = tokio::spawn(RateCacheManager::run(Arc::clone(&ctx.manager)));

    let mut updates = ctx.manager.subscribe();
    let mut shown = ctx.manager.get_rates(&base).await;
    updates.mark_unchanged();
    render(&shown, &favorites);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                if !snapshot.is_loading && snapshot != shown {
                    render(&snapshot, &favorites);
                    shown = snapshot;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupted, stopping watch");
                break;
            }
        }
    }

    follower.abort();
    if let Some(probe) = probe {
        probe.abort();
    }
    Ok(())
}
