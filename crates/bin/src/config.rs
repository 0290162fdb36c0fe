use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

/// Relay configuration, read once from the environment at startup.
pub struct Config {
    /// Port the relay listens on.
    pub port: u16,
    /// Email provider endpoint the code is forwarded to.
    pub provider_url: String,
    /// Bearer token for the provider API.
    pub provider_api_key: String,
    /// From-address the provider is asked to send as. Must match an address
    /// the provider has verified for the account.
    pub from_address: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("RELAY_PORT", "3000"),
            provider_url: try_load("PROVIDER_URL", "https://api.resend.com/emails"),
            provider_api_key: require("PROVIDER_API_KEY"),
            from_address: try_load(
                "RELAY_FROM_ADDRESS",
                "Vote Leaderboard <onboarding@resend.dev>",
            ),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

fn require(key: &str) -> String {
    env::var(key)
        .map_err(|_| {
            warn!("Required environment variable {key} is not set");
        })
        .expect("Environment misconfigured!")
}
