//! Styx Server — headless daemon for 24/7 claim-window monitoring
//!
//! Watches the configured wills and logs when an owner's inactivity has
//! crossed its threshold, meaning the heir's claim window is open. Designed
//! for Docker / server deployment.
//!
//! # Usage
//!
//! ```bash
//! styx-server --config /path/to/styx-server.toml
//! styx-server --check   # Run one check cycle and exit
//! styx-server --validate # Validate config and exit
//! ```

mod config;
mod daemon;

use anyhow::{Context, Result};
use std::path::PathBuf;

fn main() -> Result<()> {
    // Parse CLI args (minimal — no clap dependency needed)
    let args: Vec<String> = std::env::args().collect();

    let mut config_path = PathBuf::from("/config/styx-server.toml");
    let mut one_shot = false;
    let mut validate_only = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                i += 1;
                if i < args.len() {
                    config_path = PathBuf::from(&args[i]);
                } else {
                    anyhow::bail!("--config requires a path argument");
                }
            }
            "--check" | "--once" => {
                one_shot = true;
            }
            "--validate" => {
                validate_only = true;
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--version" | "-V" => {
                println!("styx-server {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            other => {
                anyhow::bail!("Unknown argument: {}", other);
            }
        }
        i += 1;
    }

    // Load config
    let mut server_config = config::ServerConfig::from_file(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    // Apply env overrides
    server_config.apply_env_overrides();

    // Validate
    server_config
        .validate()
        .context("Configuration validation failed")?;

    // Init logger
    std::env::set_var("RUST_LOG", &server_config.server.log_level);
    env_logger::init();

    if validate_only {
        println!("✅ Configuration is valid.");
        println!("  Service:        {}", server_config.service.base_url);
        println!(
            "  Check interval: {} secs",
            server_config.server.check_interval_secs
        );
        println!(
            "  Request budget: {} secs",
            server_config.service.request_timeout_secs
        );
        println!("  Wills:          {}", server_config.wills.len());
        for will in &server_config.wills {
            println!(
                "    [{}] safe {} owner {} timeframe {} secs",
                will.label, will.safe, will.owner, will.timeframe_secs
            );
        }
        return Ok(());
    }

    // Build tokio runtime
    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;

    if one_shot {
        log::info!("Running single check cycle…");
        rt.block_on(daemon::run_check_cycle(&server_config))?;
        log::info!("Done.");
    } else {
        // Install Ctrl-C handler for graceful shutdown
        let shutdown = rt.block_on(async {
            tokio::select! {
                result = daemon::run(server_config) => result,
                _ = tokio::signal::ctrl_c() => {
                    log::info!("Received shutdown signal. Exiting…");
                    Ok(())
                }
            }
        });

        if let Err(e) = shutdown {
            log::error!("Server error: {:#}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_help() {
    println!(
        r#"Styx Server — headless claim-window monitoring daemon

USAGE:
    styx-server [OPTIONS]

OPTIONS:
    -c, --config <PATH>   Config file path (default: /config/styx-server.toml)
    --check, --once       Run a single check cycle and exit
    --validate            Validate config file and exit
    -h, --help            Show this help message
    -V, --version         Show version

ENVIRONMENT VARIABLES (override config file):
    STYX_CHECK_INTERVAL   Check interval in seconds
    STYX_LOG_LEVEL        Log level (error/warn/info/debug/trace)
    STYX_SERVICE_URL      Transaction service base URL
    STYX_REQUEST_TIMEOUT  Per-evaluation wall-clock budget in seconds

EXAMPLES:
    # Run as daemon with config file
    styx-server --config /path/to/config.toml

    # Single check (useful for cron jobs)
    styx-server --config config.toml --check

    # Validate configuration
    styx-server --config config.toml --validate
"#
    );
}
