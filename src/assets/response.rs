use reqwest::StatusCode;
use serde::Deserialize;

use crate::assets::error::FetchError;

/// One entry of the CoinCap `/assets` listing. Numbers arrive as decimal
/// text and are `null` when CoinCap has no value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub price_usd: Option<String>,
    pub vwap24_hr: Option<String>,
    pub change_percent24_hr: Option<String>,
    pub rank: Option<String>,
    pub supply: Option<String>,
    pub max_supply: Option<String>,
    pub market_cap_usd: Option<String>,
    pub volume_usd24_hr: Option<String>,
    pub explorer: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AssetsPage {
    data: Vec<AssetRecord>,
}

/// Turns a raw `/assets` response into its records.
///
/// Anything but `200 OK`, or a body without a `data` array, is a failure
/// of the whole page.
pub fn decode_page(status: StatusCode, body: &str) -> Result<Vec<AssetRecord>, FetchError> {
    if status != StatusCode::OK {
        return Err(FetchError::HttpStatus(status));
    }

    // example response
    // {"data":[{"id":"bitcoin","rank":"1","symbol":"BTC","name":"Bitcoin","priceUsd":"43000.5",...}],"timestamp":1700000000000}
    let page: AssetsPage = serde_json::from_str(body)?;
    Ok(page.data)
}
