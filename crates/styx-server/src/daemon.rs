//! The daemon loop — periodically evaluates liveness for every configured will.

use crate::config::ServerConfig;
use anyhow::{Context, Result};
use std::time::Duration;
use styx_oracle::{LivenessOracle, TransactionServiceClient};

/// Run the daemon loop. Blocks forever (until shutdown signal).
pub async fn run(config: ServerConfig) -> Result<()> {
    log::info!("Styx server starting…");
    log::info!("  Service:    {}", config.service.base_url);
    log::info!(
        "  Interval:   {} seconds ({:.1} hours)",
        config.server.check_interval_secs,
        config.server.check_interval_secs as f64 / 3600.0
    );
    log::info!("  Wills:      {}", config.wills.len());
    for will in &config.wills {
        log::info!(
            "    [{}] safe {} owner {} ({} day timeframe)",
            will.label,
            will.safe,
            will.owner,
            will.timeframe_secs as f64 / 86_400.0
        );
    }

    let interval = Duration::from_secs(config.server.check_interval_secs);

    // Run first check immediately, then loop
    let mut first = true;
    loop {
        if !first {
            log::info!(
                "Sleeping {} seconds until next check…",
                config.server.check_interval_secs
            );
            tokio::time::sleep(interval).await;
        }
        first = false;

        match run_check_cycle(&config).await {
            Ok(()) => log::info!("Check cycle completed successfully."),
            Err(e) => log::error!("Check cycle failed: {:#}", e),
        }
    }
}

/// Execute a single check cycle: query the liveness oracle for each will.
pub async fn run_check_cycle(config: &ServerConfig) -> Result<()> {
    log::info!("Starting check cycle…");

    let client = TransactionServiceClient::new(&config.service.base_url)
        .with_context(|| format!("Failed to create client for {}", config.service.base_url))?;

    let oracle = LivenessOracle::with_timeout(
        client,
        Duration::from_secs(config.service.request_timeout_secs),
    );

    let mut open = 0usize;

    for will in &config.wills {
        let inactive = oracle
            .owner_inactive(&will.safe, &will.owner, will.timeframe_secs)
            .await;

        if inactive {
            open += 1;
            log::warn!(
                "🔴 [{}] Claim window OPEN: owner {} inactive on safe {} beyond {} seconds",
                will.label,
                will.owner,
                will.safe,
                will.timeframe_secs
            );
            log::warn!(
                "    [{}] Heir may now request payload release and submit execution.",
                will.label
            );
        } else {
            log::info!(
                "✅ [{}] Owner {} active on safe {} — claim window closed.",
                will.label,
                will.owner,
                will.safe
            );
        }
    }

    log::info!(
        "Cycle summary: {} of {} claim windows open.",
        open,
        config.wills.len()
    );

    Ok(())
}
