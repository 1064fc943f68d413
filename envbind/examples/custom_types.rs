//! Example showing the extension points for custom field types

use envbind::{Binder, EnvBind, Json, Parsed, Scan, UnmarshalText};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Default, Clone, Copy)]
enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

impl Scan for LogLevel {
    fn scan(&mut self, raw: &str) -> anyhow::Result<()> {
        *self = match raw.to_ascii_lowercase().as_str() {
            "" | "info" => LogLevel::Info,
            "error" => LogLevel::Error,
            "warn" => LogLevel::Warn,
            "debug" => LogLevel::Debug,
            other => anyhow::bail!("unknown log level: {other}"),
        };
        Ok(())
    }
}

/// `user:password` pair.
#[derive(Debug, Default)]
struct Credentials {
    user: String,
    password: String,
}

impl UnmarshalText for Credentials {
    fn unmarshal_text(&mut self, text: &[u8]) -> anyhow::Result<()> {
        let text = std::str::from_utf8(text)?;
        let (user, password) = text
            .split_once(':')
            .ok_or_else(|| anyhow::anyhow!("expected user:password"))?;
        self.user = user.to_string();
        self.password = password.to_string();
        Ok(())
    }
}

#[derive(Debug, Default, EnvBind)]
struct Config {
    #[env("LOG_LEVEL")]
    pub log_level: LogLevel,

    #[env("LOG_LEVELS")]
    pub per_module: Vec<LogLevel>,

    #[env("CREDENTIALS,parser=text")]
    pub credentials: Credentials,

    #[env("LABELS,parser=json")]
    pub labels: Json<HashMap<String, String>>,

    #[env("MAX_BODY_BYTES,default=1048576")]
    pub max_body_bytes: Parsed<u64>,

    #[env("DATA_DIR,default=/var/lib/app")]
    pub data_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let env: HashMap<String, String> = [
        ("LOG_LEVEL", "debug"),
        ("LOG_LEVELS", "warn,error"),
        ("CREDENTIALS", "admin:secret"),
        ("LABELS", r#"{"team":"platform","tier":"1"}"#),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let mut config = Config::default();
    Binder::new(&env).bind(&mut config)?;

    println!("Log level: {:?}", config.log_level);
    println!("Per-module levels: {:?}", config.per_module);
    println!("User: {}", config.credentials.user);
    println!("Password set: {}", !config.credentials.password.is_empty());
    println!("Labels: {:?}", *config.labels);
    println!("Max body bytes: {}", *config.max_body_bytes);
    println!("Data dir: {}", config.data_dir.display());

    Ok(())
}
