//! Example using named setters to populate derived fields

use envbind::{Binder, EnvBind, Env, Setters};

#[derive(Debug, Default, EnvBind)]
struct Config {
    #[env("UPSTREAMS,default=a.internal:80;b.internal:80,setter=split_upstreams")]
    pub upstreams_raw: String,

    pub upstreams: Vec<String>,

    #[env("API_TOKEN,required,setter=set_token")]
    token: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut setters = Setters::new();
    setters
        .register::<Config, _>("split_upstreams", |config, raw| {
            config.upstreams = raw.split(';').map(str::to_string).collect();
            Ok(())
        })
        .register::<Config, _>("set_token", |config, raw| {
            if raw.len() < 8 {
                anyhow::bail!("token must be at least 8 characters");
            }
            config.token = raw.to_string();
            Ok(())
        });

    let mut config = Config::default();
    Binder::new(&Env).with_setters(&setters).bind(&mut config)?;

    println!("Upstreams: {:?}", config.upstreams);
    println!("Token length: {}", config.token.len());

    Ok(())
}
