use std::sync::{Mutex, MutexGuard, PoisonError};

use content_client::{FetchError, PageRequest, PageSource, SortSpec};
use content_common::{AccumulatedCollection, ContentItem};
use tracing::{debug, warn};

use crate::trigger::{LoadTrigger, SentinelEntry};

/// What a call to [`IncrementalPaginator::load_next`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page arrived; `added` of its `received` items were new.
    Loaded { added: usize, received: usize },
    /// Nothing was requested: a load is in flight or no pages remain.
    Skipped,
    /// The request failed; loading stays disabled until [`IncrementalPaginator::retry`].
    Failed(FetchError),
    /// The paginator was reset while the request was in flight.
    Discarded,
}

#[derive(Debug)]
struct FeedState<A> {
    items: AccumulatedCollection<A>,
    next_page: u32,
    has_more: bool,
    is_loading: bool,
    error: Option<FetchError>,
    generation: u64,
}

impl<A> FeedState<A> {
    fn fresh(generation: u64) -> Self {
        Self {
            items: AccumulatedCollection::new(),
            next_page: 1,
            has_more: true,
            is_loading: false,
            error: None,
            generation,
        }
    }
}

/// Clears `is_loading` if a load future is dropped before it resolves.
struct InFlight<'a, A> {
    state: &'a Mutex<FeedState<A>>,
    armed: bool,
}

impl<A> Drop for InFlight<'_, A> {
    fn drop(&mut self) {
        if self.armed {
            self.state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .is_loading = false;
        }
    }
}

/// Loads a resource one page at a time, on demand.
///
/// State lives behind a short-lived lock that is never held across the
/// fetch, so `load_next` can be called from several tasks; the
/// `is_loading` flag keeps at most one request in flight.
pub struct IncrementalPaginator<S, A> {
    source: S,
    page_size: u32,
    sort: Option<SortSpec>,
    state: Mutex<FeedState<A>>,
}

impl<S, A> IncrementalPaginator<S, A>
where
    S: PageSource<A>,
{
    pub fn new(source: S, page_size: u32) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            sort: None,
            state: Mutex::new(FeedState::fresh(0)),
        }
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    fn lock(&self) -> MutexGuard<'_, FeedState<A>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the next page unless a load is already running or the
    /// resource is exhausted.
    pub async fn load_next(&self) -> LoadOutcome {
        let (request, generation) = {
            let mut state = self.lock();
            if state.is_loading || !state.has_more {
                return LoadOutcome::Skipped;
            }
            state.is_loading = true;
            (
                PageRequest::new(state.next_page, self.page_size).with_sort(self.sort.clone()),
                state.generation,
            )
        };

        let mut in_flight = InFlight {
            state: &self.state,
            armed: true,
        };
        let result = self.source.fetch_page(&request).await;
        in_flight.armed = false;

        let mut state = self.lock();
        state.is_loading = false;
        if state.generation != generation {
            debug!(page = request.page, "discarding page for a reset paginator");
            return LoadOutcome::Discarded;
        }

        match result {
            Ok(page) => {
                let received = page.items.len();
                let last_page = page.meta.is_last_page();
                let added = state.items.extend(page.items);

                state.next_page += 1;
                state.has_more = received >= self.page_size as usize && !last_page;
                debug!(
                    page = request.page,
                    received,
                    added,
                    has_more = state.has_more,
                    "page loaded"
                );
                LoadOutcome::Loaded { added, received }
            }
            Err(error) => {
                warn!(page = request.page, %error, "incremental load failed");
                state.has_more = false;
                state.error = Some(error.clone());
                LoadOutcome::Failed(error)
            }
        }
    }

    /// Load if the sentinel observation says the end of the list is close.
    pub async fn on_sentinel(&self, trigger: &LoadTrigger, entry: SentinelEntry) -> LoadOutcome {
        if !trigger.should_load(entry) {
            return LoadOutcome::Skipped;
        }
        self.load_next().await
    }

    /// Re-enable loading after a failure. The next `load_next` asks for the
    /// page that failed.
    pub fn retry(&self) {
        let mut state = self.lock();
        if state.error.take().is_some() {
            state.has_more = true;
        }
    }

    /// Drop everything loaded so far. A request still in flight is
    /// discarded when it resolves, and no new one starts before that.
    pub fn reset(&self) {
        let mut state = self.lock();
        let (generation, in_flight) = (state.generation + 1, state.is_loading);
        *state = FeedState::fresh(generation);
        state.is_loading = in_flight;
    }

    /// Run `f` against the accumulated items without copying them.
    pub fn with_items<R>(&self, f: impl FnOnce(&[ContentItem<A>]) -> R) -> R {
        f(self.lock().items.items())
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    pub fn has_more(&self) -> bool {
        self.lock().has_more
    }

    pub fn is_loading(&self) -> bool {
        self.lock().is_loading
    }

    pub fn error(&self) -> Option<FetchError> {
        self.lock().error.clone()
    }

    pub fn next_page(&self) -> u32 {
        self.lock().next_page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }
}
