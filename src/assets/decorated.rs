use crate::assets::response::AssetRecord;
use crate::format::{format_usd, format_usd_compact};

/// An asset record with its display strings computed once, at fetch time.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoratedAsset {
    record: AssetRecord,
    formatted_price: String,
    formatted_market_cap: String,
    formatted_volume: String,
}

impl DecoratedAsset {
    pub fn new(record: AssetRecord) -> Self {
        let formatted_price = format_usd(record.price_usd.as_deref());
        let formatted_market_cap = format_usd_compact(record.market_cap_usd.as_deref());
        let formatted_volume = format_usd_compact(record.volume_usd24_hr.as_deref());

        Self {
            record,
            formatted_price,
            formatted_market_cap,
            formatted_volume,
        }
    }

    pub fn record(&self) -> &AssetRecord {
        &self.record
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn formatted_price(&self) -> &str {
        &self.formatted_price
    }

    pub fn formatted_market_cap(&self) -> &str {
        &self.formatted_market_cap
    }

    pub fn formatted_volume(&self) -> &str {
        &self.formatted_volume
    }
}

pub fn decorate_page(records: Vec<AssetRecord>) -> Vec<DecoratedAsset> {
    records.into_iter().map(DecoratedAsset::new).collect()
}
