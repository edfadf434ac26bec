//! Paginated market board: cursor, search input and the accumulated
//! table rows.
//!
//! The board never performs IO. Each event is applied in place and the
//! side effects it calls for (fetch a page, navigate, re-render) are
//! returned to the caller.
//!
//! Every page request gets a generation number. Responses are merged in
//! the order their requests were issued: one that resolves early waits in
//! `parked` until all earlier generations have resolved, and a failed
//! generation just releases its slot. Requests time out in the consumer,
//! so every generation eventually resolves.

pub mod accumulator;
pub mod route;

use std::collections::BTreeMap;

use tracing::{debug, error, warn};

use crate::assets::decorated::{decorate_page, DecoratedAsset};
use crate::assets::error::FetchError;
use crate::assets::request::{PageResponse, PAGE_SIZE};
use crate::assets::response::AssetRecord;
use crate::board::accumulator::Accumulator;
use crate::board::route::{search_route, Route};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Fetching,
}

#[derive(Debug)]
pub enum Event {
    LoadMore,
    InputChanged(String),
    SubmitSearch,
    PageLoaded(PageResponse),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch { generation: u64, offset: u64 },
    Navigate(Route),
    Render,
}

#[derive(Debug)]
pub struct Board {
    cursor: u64,
    input: String,
    accumulator: Accumulator,
    next_generation: u64,
    next_to_merge: u64,
    parked: BTreeMap<u64, (u64, Result<Vec<AssetRecord>, FetchError>)>,
    banner: Option<String>,
}

impl Board {
    pub fn new(dedupe_by_id: bool) -> Self {
        Self {
            cursor: 0,
            input: String::new(),
            accumulator: Accumulator::new(dedupe_by_id),
            next_generation: 0,
            next_to_merge: 0,
            parked: BTreeMap::new(),
            banner: None,
        }
    }

    /// First cursor change: requests the page at offset 0.
    pub fn mount(&mut self) -> Vec<Effect> {
        vec![self.request_page()]
    }

    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::LoadMore => self.advance_cursor(),
            Event::InputChanged(text) => {
                self.input = text;
                Vec::new()
            }
            Event::SubmitSearch => self.submit_search().into_iter().collect(),
            Event::PageLoaded(response) => self.page_loaded(response),
        }
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn len(&self) -> usize {
        self.accumulator.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accumulator.is_empty()
    }

    pub fn assets(&self) -> impl Iterator<Item = &DecoratedAsset> + '_ {
        self.accumulator.iter()
    }

    /// `Fetching` while any issued generation is neither merged nor
    /// discarded.
    pub fn state(&self) -> FetchState {
        if self.next_to_merge < self.next_generation {
            FetchState::Fetching
        } else {
            FetchState::Idle
        }
    }

    fn advance_cursor(&mut self) -> Vec<Effect> {
        self.cursor += PAGE_SIZE;
        debug!("Cursor advanced to {}", self.cursor);
        vec![self.request_page()]
    }

    fn request_page(&mut self) -> Effect {
        let generation = self.next_generation;
        self.next_generation += 1;
        Effect::Fetch {
            generation,
            offset: self.cursor,
        }
    }

    fn submit_search(&self) -> Option<Effect> {
        let route = search_route(&self.input)?;
        debug!("Search submitted, navigating to {}", route);
        Some(Effect::Navigate(route))
    }

    fn page_loaded(&mut self, response: PageResponse) -> Vec<Effect> {
        let PageResponse {
            generation,
            offset,
            result,
        } = response;

        if generation < self.next_to_merge
            || generation >= self.next_generation
            || self.parked.contains_key(&generation)
        {
            warn!(
                "Ignoring response for unknown or already handled generation {}",
                generation
            );
            return Vec::new();
        }

        self.parked.insert(generation, (offset, result));

        let mut changed = false;
        while let Some((offset, result)) = self.parked.remove(&self.next_to_merge) {
            self.next_to_merge += 1;
            changed = true;

            match result {
                Ok(records) => {
                    let fetched = records.len();
                    let added = self.accumulator.extend(decorate_page(records));
                    debug!(
                        "Merged page at offset {}: {} fetched, {} added, {} total",
                        offset,
                        fetched,
                        added,
                        self.accumulator.len()
                    );
                    self.banner = None;
                }
                Err(e) => {
                    error!("Error fetching data for offset {}: {}", offset, e);
                    self.banner = Some(format!("Could not load assets at offset {}: {}", offset, e));
                }
            }
        }

        if changed {
            vec![Effect::Render]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::response::tests::record;

    fn page(prefix: &str, n: usize) -> Vec<AssetRecord> {
        (0..n)
            .map(|i| record(&format!("{}-{}", prefix, i), "SYM"))
            .collect()
    }

    fn loaded(generation: u64, offset: u64, result: Result<Vec<AssetRecord>, FetchError>) -> Event {
        Event::PageLoaded(PageResponse {
            generation,
            offset,
            result,
        })
    }

    fn ids(board: &Board) -> Vec<String> {
        board.assets().map(|a| a.id().to_string()).collect()
    }

    #[test]
    fn test_mount_fetches_first_page() {
        let mut board = Board::new(false);
        assert_eq!(FetchState::Idle, board.state());
        assert_eq!(vec![Effect::Fetch { generation: 0, offset: 0 }], board.mount());
        assert_eq!(0, board.cursor());
        assert_eq!(FetchState::Fetching, board.state());
    }

    #[test]
    fn test_load_more_advances_by_page_size() {
        let mut board = Board::new(false);
        board.mount();

        assert_eq!(
            vec![Effect::Fetch { generation: 1, offset: 10 }],
            board.handle(Event::LoadMore)
        );
        assert_eq!(
            vec![Effect::Fetch { generation: 2, offset: 20 }],
            board.handle(Event::LoadMore)
        );
        assert_eq!(20, board.cursor());
    }

    #[test]
    fn test_pages_are_appended() {
        let mut board = Board::new(false);
        board.mount();

        assert_eq!(vec![Effect::Render], board.handle(loaded(0, 0, Ok(page("a", 10)))));
        assert_eq!(10, board.len());
        assert_eq!(FetchState::Idle, board.state());

        board.handle(Event::LoadMore);
        board.handle(loaded(1, 10, Ok(page("b", 7))));
        assert_eq!(17, board.len());

        let ids = ids(&board);
        assert_eq!("a-0", ids[0]);
        assert_eq!("a-9", ids[9]);
        assert_eq!("b-0", ids[10]);
        assert_eq!("b-6", ids[16]);
    }

    #[test]
    fn test_failed_fetch_leaves_accumulator_unchanged() {
        let mut board = Board::new(false);
        board.mount();
        board.handle(loaded(0, 0, Ok(page("a", 10))));
        let before = ids(&board);

        board.handle(Event::LoadMore);
        let effects = board.handle(loaded(1, 10, Err(FetchError::Other("boom".to_string()))));

        assert_eq!(vec![Effect::Render], effects);
        assert_eq!(before, ids(&board));
        assert_eq!(FetchState::Idle, board.state());
        assert_eq!(
            Some("Could not load assets at offset 10: Other Error: boom"),
            board.banner()
        );

        board.handle(Event::LoadMore);
        board.handle(loaded(2, 20, Ok(page("c", 10))));
        assert_eq!(20, board.len());
        assert_eq!(None, board.banner());
    }

    #[test]
    fn test_out_of_order_responses_merge_in_issue_order() {
        let mut board = Board::new(false);
        board.mount();
        board.handle(Event::LoadMore);
        board.handle(Event::LoadMore);

        assert!(board.handle(loaded(2, 20, Ok(page("c", 2)))).is_empty());
        assert!(board.handle(loaded(1, 10, Ok(page("b", 2)))).is_empty());
        assert!(board.is_empty());
        assert_eq!(FetchState::Fetching, board.state());

        assert_eq!(vec![Effect::Render], board.handle(loaded(0, 0, Ok(page("a", 2)))));
        assert_eq!(vec!["a-0", "a-1", "b-0", "b-1", "c-0", "c-1"], ids(&board));
        assert_eq!(FetchState::Idle, board.state());
    }

    #[test]
    fn test_failed_generation_does_not_block_later_ones() {
        let mut board = Board::new(false);
        board.mount();
        board.handle(Event::LoadMore);

        board.handle(loaded(1, 10, Ok(page("b", 3))));
        assert!(board.is_empty());

        board.handle(loaded(0, 0, Err(FetchError::Other("timeout".to_string()))));
        assert_eq!(vec!["b-0", "b-1", "b-2"], ids(&board));
    }

    #[test]
    fn test_timed_out_first_page_releases_later_pages() {
        let mut board = Board::new(false);
        board.mount();
        for _ in 0..5 {
            board.handle(Event::LoadMore);
        }

        for generation in 1..=5 {
            board.handle(loaded(generation, generation * 10, Ok(page(&format!("p{}", generation), 10))));
        }
        assert!(board.is_empty());
        assert_eq!(FetchState::Fetching, board.state());

        let timeout = FetchError::Other("operation timed out".to_string());
        assert_eq!(vec![Effect::Render], board.handle(loaded(0, 0, Err(timeout))));
        assert_eq!(50, board.len());
        assert_eq!(FetchState::Idle, board.state());
        assert_eq!("p1-0", ids(&board)[0]);
    }

    #[test]
    fn test_unknown_and_repeated_generations_are_ignored() {
        let mut board = Board::new(false);
        board.mount();

        assert!(board.handle(loaded(5, 50, Ok(page("x", 1)))).is_empty());
        board.handle(loaded(0, 0, Ok(page("a", 1))));
        assert!(board.handle(loaded(0, 0, Ok(page("a", 1)))).is_empty());
        assert_eq!(1, board.len());
    }

    #[test]
    fn test_duplicate_pages_are_additive_by_default() {
        let mut board = Board::new(false);
        board.mount();
        board.handle(Event::LoadMore);
        board.handle(loaded(0, 0, Ok(page("a", 10))));
        board.handle(loaded(1, 10, Ok(page("a", 10))));
        assert_eq!(20, board.len());
    }

    #[test]
    fn test_duplicate_pages_ignored_with_dedupe() {
        let mut board = Board::new(true);
        board.mount();
        board.handle(Event::LoadMore);
        board.handle(loaded(0, 0, Ok(page("a", 10))));
        board.handle(loaded(1, 10, Ok(page("a", 10))));
        assert_eq!(10, board.len());
    }

    #[test]
    fn test_empty_search_is_noop() {
        let mut board = Board::new(false);
        assert!(board.handle(Event::SubmitSearch).is_empty());

        board.handle(Event::InputChanged(String::new()));
        assert!(board.handle(Event::SubmitSearch).is_empty());
    }

    #[test]
    fn test_search_navigates_to_detail() {
        let mut board = Board::new(false);
        assert!(board.handle(Event::InputChanged("bitcoin".to_string())).is_empty());
        assert_eq!("bitcoin", board.input());

        let effects = board.handle(Event::SubmitSearch);
        assert_eq!(vec![Effect::Navigate(Route::Detail("bitcoin".to_string()))], effects);
        match &effects[0] {
            Effect::Navigate(route) => assert_eq!("/detail/bitcoin", route.path()),
            other => panic!("unexpected effect {:?}", other),
        }
    }
}
