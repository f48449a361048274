use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use url::Url;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3001";
const DEFAULT_STATIC_DIR: &str = "../frontend/dist";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Where accepted leads are forwarded. Leads are only logged when unset.
    pub lead_webhook_url: Option<String>,
    pub bind_addr: SocketAddr,
    /// Built frontend (`trunk build` output).
    pub static_dir: PathBuf,
    /// Allowed CORS origin; any origin when unset.
    pub frontend_url: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bind_addr = non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("BIND_ADDR is not a socket address: {}", bind_addr))?;

        let lead_webhook_url = non_empty("LEAD_WEBHOOK_URL");
        if let Some(raw) = &lead_webhook_url {
            check_webhook_url(raw)?;
        }

        Ok(Self {
            lead_webhook_url,
            bind_addr,
            static_dir: PathBuf::from(non_empty("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string())),
            frontend_url: non_empty("FRONTEND_URL"),
        })
    }
}

fn check_webhook_url(raw: &str) -> anyhow::Result<()> {
    // Url::parse would percent-encode or strip these silently
    if raw.chars().any(char::is_whitespace) {
        anyhow::bail!("LEAD_WEBHOOK_URL must not contain whitespace: {:?}", raw);
    }
    let url = Url::parse(raw).with_context(|| format!("LEAD_WEBHOOK_URL is not a valid URL: {}", raw))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("LEAD_WEBHOOK_URL must be an http(s) URL, got {}", raw);
    }
    if url.host_str().map_or(true, str::is_empty) {
        anyhow::bail!("LEAD_WEBHOOK_URL has no host: {}", raw);
    }
    Ok(())
}
