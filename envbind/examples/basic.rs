//! Example binding a flat configuration from the process environment
//!
//! Run with e.g. `PORT=8080 DEBUG=true cargo run --example basic`

use envbind::EnvBind;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, EnvBind)]
struct Config {
    #[env("PORT,default=9090")]
    pub port: u16,

    #[env("DEBUG")]
    pub debug: bool,

    #[env("HOST,default=localhost")]
    pub host: String,

    #[env("TIMEOUT,default=30s")]
    pub timeout: Duration,

    #[env("ALLOWED_ORIGINS")]
    pub allowed_origins: Vec<String>,

    pub database: Database,
}

#[derive(Debug, Default, EnvBind)]
struct Database {
    #[env("DATABASE_URL,default=postgres://localhost/app")]
    pub url: String,

    #[env("DATABASE_POOL_SIZE,default=10")]
    pub pool_size: u32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;

    println!("Configuration:");
    println!("  Port: {}", config.port);
    println!("  Debug: {}", config.debug);
    println!("  Host: {}", config.host);
    println!("  Timeout: {:?}", config.timeout);
    println!("  Allowed origins: {:?}", config.allowed_origins);
    println!("  Database URL: {}", config.database.url);
    println!("  Database pool size: {}", config.database.pool_size);

    Ok(())
}
