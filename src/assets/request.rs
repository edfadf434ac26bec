use crate::assets::error::FetchError;
use crate::assets::response::AssetRecord;
use std::result;
use tokio::sync::mpsc::UnboundedSender;

/// Records per page; the cursor advances by the same amount.
pub const PAGE_SIZE: u64 = 10;

#[derive(Debug)]
pub struct PageRequest {
    pub generation: u64,
    pub offset: u64,
    pub resp_sender: UnboundedSender<PageResponse>,
}

#[derive(Debug)]
pub struct PageResponse {
    pub generation: u64,
    pub offset: u64,
    pub result: result::Result<Vec<AssetRecord>, FetchError>,
}
