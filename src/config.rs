use serde::Deserialize;
use std::io::Result;
use std::path::Path;
use tokio::fs;

pub const DEFAULT_API_BASE_URL: &str = "https://api.coincap.io/v2";
pub const DEFAULT_ICON_BASE_URL: &str = "https://assets.coincap.io/assets/icons";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String, // CoinCap REST root, `/assets` is appended
    pub icon_base_url: String, // Where `{symbol}@2x.png` logos are served from
    pub api_key: String, // Sent as a bearer token when not empty
    pub dedupe_by_id: bool, // Ignore records whose id is already on the board
    pub request_timeout_secs: u64, // A page request that takes longer counts as failed
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            icon_base_url: DEFAULT_ICON_BASE_URL.to_string(),
            api_key: String::new(),
            dedupe_by_id: false,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

pub async fn read_config(file_path: &Path) -> Result<Config> {
    let config_string = fs::read_to_string(file_path).await?;
    let config: Config = serde_json::from_str(config_string.as_str())?;
    Ok(config)
}
