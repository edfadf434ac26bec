use crate::assets::error::FetchError;
use crate::assets::request::{PageRequest, PageResponse, PAGE_SIZE};
use crate::assets::response::{decode_page, AssetRecord};
use reqwest::header;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;
use tracing::instrument;
use tracing::warn;

#[derive(Clone, Debug)]
pub struct ApiSettings {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl ApiSettings {
    /// Client whose requests give up after `timeout`, so a hung page
    /// resolves as a failure instead of never resolving.
    pub fn http_client(&self) -> Result<reqwest::Client, FetchError> {
        Ok(reqwest::Client::builder().timeout(self.timeout).build()?)
    }
}

/// Serves page requests until every sender is dropped.
///
/// Each request runs on its own task, so overlapping requests are neither
/// serialized nor cancelled and their responses may come back in any
/// order. Failures are reported once, never retried.
#[instrument(skip_all, fields(base_url = %settings.base_url))]
pub async fn consume_page_requests(
    mut job_receiver: UnboundedReceiver<PageRequest>,
    settings: ApiSettings,
) {
    let http_client = match settings.http_client() {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Error building HTTP client, no pages will be fetched: {}", e);
            return;
        }
    };

    while let Some(req) = job_receiver.recv().await {
        let http_client = http_client.clone();
        let settings = settings.clone();

        tokio::spawn(async move {
            debug!(
                "Consumer sending request for generation {} (offset {}) to CoinCap API",
                req.generation, req.offset
            );

            let result = fetch_page(&http_client, &settings, req.offset).await;
            if let Err(ref e) = result {
                warn!(
                    "Error calling CoinCap API for offset {}: {}",
                    req.offset, e
                );
            }

            let response = PageResponse {
                generation: req.generation,
                offset: req.offset,
                result,
            };

            if let Err(error) = req.resp_sender.send(response) {
                tracing::error!(
                    "Error sending page response to channel for generation {}: {}",
                    req.generation, error
                );
            }
        });
    }

    debug!("Page request channel closed, consumer exits");
}

pub fn page_url(base_url: &str, offset: u64) -> String {
    format!(
        "{}/assets?limit={}&offset={}",
        base_url.trim_end_matches('/'),
        PAGE_SIZE,
        offset
    )
}

pub async fn fetch_page(
    http_client: &reqwest::Client,
    settings: &ApiSettings,
    offset: u64,
) -> Result<Vec<AssetRecord>, FetchError> {
    let url = page_url(&settings.base_url, offset);

    let mut http_req_build = http_client
        .get(&url)
        .header(header::ACCEPT, "application/json");

    if !settings.api_key.is_empty() {
        http_req_build = http_req_build.bearer_auth(&settings.api_key);
    }

    let response = http_req_build.send().await?;
    let status = response.status();
    let body = response.text().await?;

    decode_page(status, &body)
}
