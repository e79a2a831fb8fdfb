//! Campus Q&A server entry point.

use std::io;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig as _;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use campus_qa::inbound::http::health::HealthState;
use campus_qa::inbound::http::session_config::{BuildMode, SessionSettings};
use campus_qa::outbound::persistence::{DbPool, PoolConfig};
use campus_qa::settings::AppSettings;

mod server;

use server::{ServerConfig, create_server};

#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|err| io::Error::other(err.to_string()))?;
    let session = SessionSettings::from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(io::Error::other)?;
    info!(fingerprint = %session.fingerprint(), "session key loaded");

    let email_policy = settings
        .email_policy()
        .map_err(|err| io::Error::other(format!("invalid email pattern: {err}")))?;
    let mut config =
        ServerConfig::new(session, settings.bind_addr()).with_email_policy(email_policy);

    if let Some(url) = settings.database_url() {
        let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.pool_max_size))
            .await
            .map_err(|err| io::Error::other(format!("create database pool: {err}")))?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(addr = %settings.bind_addr(), "listening");
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
