use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use content_client::{FetchError, PageRequest, PageSource};
use content_common::{AccumulatedCollection, Attributes, ContentItem, Page};
use content_filter::{derive, CategoryIndexBuilder, FilterState};
use serde::Serialize;
use tracing::debug;

use crate::exhaustive::Exhaustive;
use crate::incremental::{IncrementalPaginator, LoadOutcome};

/// Page source for views that were loaded up front and never fetch again.
#[derive(Debug, Clone, Copy)]
pub enum NoSource {}

#[async_trait]
impl<A: Send + 'static> PageSource<A> for NoSource {
    async fn fetch_page(&self, _request: &PageRequest) -> Result<Page<A>, FetchError> {
        match *self {}
    }
}

enum Feed<S, A> {
    Incremental(IncrementalPaginator<S, A>),
    Complete {
        items: AccumulatedCollection<A>,
        error: Option<FetchError>,
    },
}

/// Serializable form of a [`FetchError`] for UI layers.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub kind: &'static str,
    pub message: String,
}

impl From<&FetchError> for ErrorInfo {
    fn from(error: &FetchError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Everything a listing page renders, derived at one point in time.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot<A> {
    pub items: Vec<ContentItem<A>>,
    pub categories: Vec<String>,
    pub filter_state: FilterState,
    pub loaded: usize,
    pub has_more: bool,
    pub is_loading: bool,
    pub error: Option<ErrorInfo>,
}

/// A resource listing: loaded items plus the user's filter selection.
///
/// The derived list and the category menu are recomputed on every
/// [`snapshot`](Self::snapshot); categories always come from the whole
/// collection, not from the filtered list.
pub struct ResourceView<S, A> {
    feed: Feed<S, A>,
    filter_state: Mutex<FilterState>,
}

impl<S, A> ResourceView<S, A>
where
    S: PageSource<A>,
    A: Attributes + Clone,
{
    /// View that loads pages on demand through `load_more`.
    pub fn incremental(paginator: IncrementalPaginator<S, A>) -> Self {
        Self {
            feed: Feed::Incremental(paginator),
            filter_state: Mutex::new(FilterState::default()),
        }
    }

    pub fn filter_state(&self) -> FilterState {
        self.filter_state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_filter_state(&self, state: FilterState) {
        debug!(
            search = %state.search_term,
            category = %state.active_category,
            sort = %state.sort_by,
            "filter state changed"
        );
        *self.filter_state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Back to no search, `All` categories, newest first.
    pub fn clear_filters(&self) {
        self.set_filter_state(FilterState::cleared());
    }

    /// Ask for the next page; complete views have nothing more to load.
    pub async fn load_more(&self) -> LoadOutcome {
        match &self.feed {
            Feed::Incremental(paginator) => paginator.load_next().await,
            Feed::Complete { .. } => LoadOutcome::Skipped,
        }
    }

    pub fn has_more(&self) -> bool {
        match &self.feed {
            Feed::Incremental(paginator) => paginator.has_more(),
            Feed::Complete { .. } => false,
        }
    }

    pub fn is_loading(&self) -> bool {
        match &self.feed {
            Feed::Incremental(paginator) => paginator.is_loading(),
            Feed::Complete { .. } => false,
        }
    }

    pub fn error(&self) -> Option<FetchError> {
        match &self.feed {
            Feed::Incremental(paginator) => paginator.error(),
            Feed::Complete { error, .. } => error.clone(),
        }
    }

    /// Enable loading again after a failed page.
    pub fn retry(&self) {
        if let Feed::Incremental(paginator) = &self.feed {
            paginator.retry();
        }
    }

    fn with_items<R>(&self, f: impl FnOnce(&[ContentItem<A>]) -> R) -> R {
        match &self.feed {
            Feed::Incremental(paginator) => paginator.with_items(f),
            Feed::Complete { items, .. } => f(items.items()),
        }
    }

    pub fn snapshot(&self) -> ViewSnapshot<A> {
        let filter_state = self.filter_state();
        let (items, categories, loaded) = self.with_items(|all| {
            let mut builder = CategoryIndexBuilder::new();
            builder.extend(all);
            let derived: Vec<ContentItem<A>> =
                derive(all, &filter_state).into_iter().cloned().collect();
            (derived, builder.build().categories, all.len())
        });

        ViewSnapshot {
            items,
            categories,
            filter_state,
            loaded,
            has_more: self.has_more(),
            is_loading: self.is_loading(),
            error: self.error().as_ref().map(ErrorInfo::from),
        }
    }
}

impl<A> ResourceView<NoSource, A>
where
    A: Attributes + Clone,
{
    /// View over items that are already fully loaded.
    pub fn complete(items: impl IntoIterator<Item = ContentItem<A>>) -> Self {
        Self {
            feed: Feed::Complete {
                items: items.into_iter().collect(),
                error: None,
            },
            filter_state: Mutex::new(FilterState::default()),
        }
    }

    /// View over the outcome of [`crate::fetch_all`], keeping its error.
    pub fn from_exhaustive(result: Exhaustive<A>) -> Self {
        Self {
            feed: Feed::Complete {
                items: result.items.into_iter().collect(),
                error: result.error,
            },
            filter_state: Mutex::new(FilterState::default()),
        }
    }
}
