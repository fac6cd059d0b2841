//! Data fetching for screens
//!
//! A [`Screen`] owns one raw collection and its view state. Loads go through
//! a begin/complete pair: `begin` hands out a [`FetchTicket`] stamped with a
//! generation number, and `complete` drops any result whose ticket is no
//! longer current, so a slow response can never overwrite a newer one.

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::core::api::{ApiClient, ApiError, Listing, Pagination, Transport};
use crate::core::entity::Record;
use crate::core::view::CollectionView;

/// Lifecycle of a screen's data
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Mutating,
    /// Last request failed; the collection holds the previous data
    Error(String),
}

impl FetchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading | FetchState::Mutating)
    }
}

/// Proof of an outstanding request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// Where a screen's collection comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSource {
    /// Path below `/api`
    pub path: String,
    /// Response field holding the array when the body is an object
    pub field: String,
    pub query: Vec<(String, String)>,
}

impl ListSource {
    pub fn new(path: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            field: field.into(),
            query: Vec::new(),
        }
    }

    /// Add a query parameter; empty values are skipped
    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        let value = value.to_string();
        if !value.is_empty() {
            self.query.push((key.to_string(), value));
        }
        self
    }
}

/// One screen: source, collection view and fetch state
#[derive(Debug, Clone)]
pub struct Screen<T> {
    source: ListSource,
    pub view: CollectionView<T>,
    state: FetchState,
    generation: u64,
    pagination: Option<Pagination>,
}

impl<T: Record + Clone> Screen<T> {
    pub fn new(source: ListSource) -> Self {
        Self {
            source,
            view: CollectionView::new(),
            state: FetchState::Idle,
            generation: 0,
            pagination: None,
        }
    }

    pub fn source(&self) -> &ListSource {
        &self.source
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    pub fn records(&self) -> &[T] {
        self.view.raw()
    }

    /// Pagination reported by the backend on the last successful load
    pub fn pagination(&self) -> Option<Pagination> {
        self.pagination
    }

    /// Start a request; any earlier outstanding ticket becomes stale
    pub fn begin(&mut self) -> FetchTicket {
        self.generation += 1;
        self.state = FetchState::Loading;
        FetchTicket(self.generation)
    }

    /// Abandon whatever request is outstanding
    pub fn cancel(&mut self) {
        self.generation += 1;
        if self.state.is_loading() {
            self.state = if self.view.raw().is_empty() {
                FetchState::Idle
            } else {
                FetchState::Loaded
            };
        }
    }

    /// Whether a ticket still belongs to the newest request
    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Finish a request. Stale tickets are discarded with `Superseded`.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<Listing<T>, ApiError>,
    ) -> Result<(), ApiError> {
        if !self.is_current(ticket) {
            debug!(
                path = %self.source.path,
                ticket = ticket.0,
                current = self.generation,
                "discarding superseded response"
            );
            return Err(ApiError::Superseded);
        }

        match result {
            Ok(listing) => {
                self.view.replace(listing.items);
                self.pagination = listing.pagination;
                self.state = FetchState::Loaded;
                Ok(())
            }
            Err(e) => {
                warn!(path = %self.source.path, error = %e, "failed to load collection");
                self.state = FetchState::Error(e.user_message());
                Err(e)
            }
        }
    }

    /// Mark a mutation as outstanding
    /// Enter `Mutating`, returning the state to restore if the action is called off
    pub(crate) fn begin_mutation(&mut self) -> FetchState {
        std::mem::replace(&mut self.state, FetchState::Mutating)
    }

    pub(crate) fn cancel_mutation(&mut self, previous: FetchState) {
        self.state = previous;
    }

    /// Return to the loaded state after a mutation without refetching
    pub(crate) fn finish_mutation(&mut self, error: Option<&ApiError>) {
        self.state = match error {
            Some(e) => FetchState::Error(e.user_message()),
            None => FetchState::Loaded,
        };
    }
}

impl<T: Record + Clone + DeserializeOwned> Screen<T> {
    /// Fetch the collection and replace the raw data on success
    pub fn load<X: Transport>(&mut self, client: &ApiClient<X>) -> Result<(), ApiError> {
        let ticket = self.begin();
        let result = client.list::<T>(&self.source.path, &self.source.field, &self.source.query);
        self.complete(ticket, result)
    }
}

/// Run three independent fetches in parallel and return all results
///
/// There is no ordering between the three and no atomicity: each result is
/// returned as-is, and the caller decides how to merge partial failures.
pub fn fetch_parallel<A, B, C, FA, FB, FC>(a: FA, b: FB, c: FC) -> (A, B, C)
where
    A: Send,
    B: Send,
    C: Send,
    FA: FnOnce() -> A + Send,
    FB: FnOnce() -> B + Send,
    FC: FnOnce() -> C + Send,
{
    std::thread::scope(|scope| {
        let hb = scope.spawn(b);
        let hc = scope.spawn(c);
        let ra = a();
        let rb = hb.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic));
        let rc = hc.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic));
        (ra, rb, rc)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::RecordId;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: RecordId,
        name: String,
    }

    impl Record for Item {
        const RESOURCE: &'static str = "items";

        fn id(&self) -> &RecordId {
            &self.id
        }

        fn search_fields(&self) -> Vec<&str> {
            vec![&self.name]
        }
    }

    fn listing(names: &[&str]) -> Listing<Item> {
        Listing {
            items: names
                .iter()
                .enumerate()
                .map(|(i, n)| Item {
                    id: RecordId::from(i as u64),
                    name: n.to_string(),
                })
                .collect(),
            pagination: None,
        }
    }

    fn screen() -> Screen<Item> {
        Screen::new(ListSource::new("/items", "items"))
    }

    #[test]
    fn test_load_cycle() {
        let mut screen = screen();
        assert_eq!(screen.state(), &FetchState::Idle);
        let ticket = screen.begin();
        assert!(screen.state().is_loading());
        screen.complete(ticket, Ok(listing(&["a", "b"]))).unwrap();
        assert_eq!(screen.state(), &FetchState::Loaded);
        assert_eq!(screen.records().len(), 2);
    }

    #[test]
    fn test_stale_response_discarded() {
        let mut screen = screen();
        let first = screen.begin();
        let second = screen.begin();

        screen.complete(second, Ok(listing(&["new"]))).unwrap();
        let stale = screen.complete(first, Ok(listing(&["old", "older"])));

        assert!(matches!(stale, Err(ApiError::Superseded)));
        assert_eq!(screen.records().len(), 1);
        assert_eq!(screen.records()[0].name, "new");
    }

    #[test]
    fn test_cancelled_request_discarded() {
        let mut screen = screen();
        let ticket = screen.begin();
        screen.cancel();
        assert_eq!(screen.state(), &FetchState::Idle);
        assert!(screen.complete(ticket, Ok(listing(&["late"]))).is_err());
        assert!(screen.records().is_empty());
    }

    #[test]
    fn test_called_off_mutation_restores_state() {
        let mut screen = screen();
        let previous = screen.begin_mutation();
        assert_eq!(screen.state(), &FetchState::Mutating);
        screen.cancel_mutation(previous);
        assert_eq!(screen.state(), &FetchState::Idle);

        let ticket = screen.begin();
        let _ = screen.complete(ticket, Err(ApiError::Transport("offline".into())));
        let previous = screen.begin_mutation();
        screen.cancel_mutation(previous);
        assert_eq!(screen.state(), &FetchState::Error("Request failed. Please try again.".into()));
    }

    #[test]
    fn test_failure_keeps_previous_data() {
        let mut screen = screen();
        let ticket = screen.begin();
        screen.complete(ticket, Ok(listing(&["kept"]))).unwrap();

        let ticket = screen.begin();
        let result = screen.complete(ticket, Err(ApiError::Transport("offline".into())));
        assert!(result.is_err());
        assert!(matches!(screen.state(), FetchState::Error(_)));
        assert_eq!(screen.records()[0].name, "kept");
    }

    #[test]
    fn test_list_source_skips_empty_params() {
        let source = ListSource::new("/activity-logs", "logs")
            .param("page", 2)
            .param("search", "")
            .param("userType", "farmer");
        assert_eq!(
            source.query,
            vec![
                ("page".to_string(), "2".to_string()),
                ("userType".to_string(), "farmer".to_string())
            ]
        );
    }

    #[test]
    fn test_fetch_parallel_returns_all() {
        let (a, b, c) = fetch_parallel(|| 1, || "two", || Some(3.0));
        assert_eq!(a, 1);
        assert_eq!(b, "two");
        assert_eq!(c, Some(3.0));
    }
}
