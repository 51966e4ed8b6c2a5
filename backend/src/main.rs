//! Service entry-point: loads settings, wires adapters and starts the HTTP server.

use std::sync::Arc;

use actix_web::cookie::SameSite;
use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use scholarships::domain::ApplyPolicy;
use scholarships::inbound::http::health::HealthState;
use scholarships::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use scholarships::outbound::wallet::{JsonRpcWalletProvider, WalletTimings};
use scholarships::server::{BuildMode, ServerConfig, create_server, load_session_key};
use scholarships::settings::ScholarshipSettings;

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {err}"))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ScholarshipSettings::load_from_iter(std::env::args_os())
        .map_err(|err| startup_error("load settings", err))?;
    let key = load_session_key(
        &settings.session_key_file(),
        BuildMode::from_debug_assertions(),
        settings.allow_ephemeral_session_key,
    )
    .map_err(|err| startup_error("load session key", err))?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|err| startup_error("settings", err))?;
    let government = settings
        .government_address()
        .map_err(|err| startup_error("settings", err))?;
    let financiers = settings
        .financier_addresses()
        .map_err(|err| startup_error("settings", err))?;
    let apply_policy = if settings.optimistic_apply {
        ApplyPolicy::Optimistic
    } else {
        ApplyPolicy::Strict
    };

    let mut config = ServerConfig::new(
        key,
        settings.cookie_secure(),
        SameSite::Lax,
        bind_addr,
        government,
    )
    .with_apply_policy(apply_policy)
    .with_cache_capacity(settings.wallet_cache_capacity());
    if financiers.is_empty() {
        warn!("no financier_addresses configured; any connected wallet may fund");
    } else {
        info!(count = financiers.len(), "funding restricted to registered financiers");
        config = config.with_financiers(financiers);
    }

    if let Some(database_url) = settings.database_url() {
        run_pending_migrations(database_url)
            .await
            .map_err(|err| startup_error("run migrations", err))?;
        let pool = DbPool::new(PoolConfig::new(database_url))
            .await
            .map_err(|err| startup_error("connect to database", err))?;
        config = config.with_db_pool(pool);
    }

    match settings
        .wallet_endpoint()
        .map_err(|err| startup_error("settings", err))?
    {
        Some(endpoint) => {
            let timings = WalletTimings {
                request_timeout: settings.wallet_request_timeout(),
                poll_interval: settings.confirmation_poll_interval(),
                confirmation_timeout: settings.confirmation_timeout(),
            };
            info!(endpoint = %endpoint.url, from = %endpoint.from, "wallet provider configured");
            let wallet = JsonRpcWalletProvider::new(endpoint.url, endpoint.from, timings)
                .map_err(|err| startup_error("build wallet client", err))?;
            config = config.with_wallet(Arc::new(wallet));
        }
        None => warn!("no wallet provider configured; funding is disabled"),
    }

    #[cfg(feature = "metrics")]
    {
        let prometheus = scholarships::server::metrics::build_prometheus()?;
        config = config.with_metrics(Some(prometheus));
    }

    info!(bind_addr = %config.bind_addr(), "starting scholarship service");
    let health_state = web::Data::new(HealthState::new());
    create_server(health_state, config)?.await
}
