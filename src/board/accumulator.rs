use indexmap::IndexMap;

use crate::assets::decorated::DecoratedAsset;

/// Decorated assets in the order they were merged.
///
/// `Append` keeps every record, including repeats of an id. `Unique` is
/// keyed by id and ignores a record whose id is already present.
#[derive(Debug, Clone)]
pub enum Accumulator {
    Append(Vec<DecoratedAsset>),
    Unique(IndexMap<String, DecoratedAsset>),
}

impl Accumulator {
    pub fn new(dedupe_by_id: bool) -> Self {
        if dedupe_by_id {
            Accumulator::Unique(IndexMap::new())
        } else {
            Accumulator::Append(Vec::new())
        }
    }

    /// Appends a page after the existing entries and returns how many
    /// records were actually added.
    pub fn extend(&mut self, page: Vec<DecoratedAsset>) -> usize {
        match self {
            Accumulator::Append(entries) => {
                let added = page.len();
                entries.extend(page);
                added
            }
            Accumulator::Unique(entries) => {
                let before = entries.len();
                for asset in page {
                    if !entries.contains_key(asset.id()) {
                        entries.insert(asset.id().to_string(), asset);
                    }
                }
                entries.len() - before
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Accumulator::Append(entries) => entries.len(),
            Accumulator::Unique(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = &DecoratedAsset> + '_> {
        match self {
            Accumulator::Append(entries) => Box::new(entries.iter()),
            Accumulator::Unique(entries) => Box::new(entries.values()),
        }
    }
}
