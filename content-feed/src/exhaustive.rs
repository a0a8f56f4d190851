use content_client::{FetchError, PageRequest, PageSource, SortSpec};
use content_common::{AccumulatedCollection, ContentItem};
use tracing::{debug, warn};

/// Upper bound on pages requested by [`fetch_all`], whatever the backend
/// reports as its page count.
pub const MAX_EXHAUSTIVE_PAGES: u32 = 1000;

/// Result of loading every page of a resource.
#[derive(Debug, Clone)]
pub struct Exhaustive<A> {
    /// Items in backend order, deduplicated by id
    pub items: Vec<ContentItem<A>>,
    pub pages_fetched: u32,
    /// Set when a page failed; `items` then holds the pages before it.
    pub error: Option<FetchError>,
}

impl<A> Exhaustive<A> {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Request page 1, read its page count, then fetch the remaining pages one
/// after another.
///
/// Stops at the first failing page and returns what was accumulated so far
/// together with the error; failed pages are not retried. An empty page also
/// ends the loop early.
pub async fn fetch_all<A, S>(source: &S, page_size: u32, sort: Option<SortSpec>) -> Exhaustive<A>
where
    S: PageSource<A> + ?Sized,
{
    let mut collection = AccumulatedCollection::new();
    let mut pages_fetched = 0;
    let mut page = 1;
    let mut page_count = 1;

    while page <= page_count {
        let request = PageRequest::new(page, page_size).with_sort(sort.clone());

        let fetched = match source.fetch_page(&request).await {
            Ok(fetched) => fetched,
            Err(error) => {
                warn!(page, pages_fetched, %error, "aborting exhaustive fetch");
                return Exhaustive {
                    items: collection.into_items(),
                    pages_fetched,
                    error: Some(error),
                };
            }
        };

        pages_fetched += 1;
        page_count = fetched.meta.page_count.min(MAX_EXHAUSTIVE_PAGES);

        let received = fetched.items.len();
        let added = collection.extend(fetched.items);
        debug!(page, page_count, received, added, "page accumulated");

        if received == 0 {
            break;
        }
        page += 1;
    }

    Exhaustive {
        items: collection.into_items(),
        pages_fetched,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use content_common::{Page, PaginationMeta};
    use std::sync::Mutex;

    struct ScriptedPages {
        pages: Vec<Result<Vec<i64>, FetchError>>,
        page_count: u32,
        requested: Mutex<Vec<u32>>,
    }

    #[async_trait]
    impl PageSource<String> for ScriptedPages {
        async fn fetch_page(&self, request: &PageRequest) -> Result<Page<String>, FetchError> {
            self.requested.lock().unwrap().push(request.page);
            let ids = self.pages[(request.page - 1) as usize].clone()?;
            Ok(Page {
                items: ids
                    .into_iter()
                    .map(|id| ContentItem::new(id, format!("item {id}")))
                    .collect(),
                meta: PaginationMeta {
                    page: request.page,
                    page_size: request.page_size,
                    page_count: self.page_count,
                    total: None,
                },
            })
        }
    }

    fn scripted(pages: Vec<Result<Vec<i64>, FetchError>>, page_count: u32) -> ScriptedPages {
        ScriptedPages {
            pages,
            page_count,
            requested: Mutex::new(Vec::new()),
        }
    }

    #[tokio::test]
    async fn zero_page_count_stops_after_first_page() {
        let source = scripted(vec![Ok(vec![])], 0);
        let result = fetch_all(&source, 10, None).await;

        assert!(result.items.is_empty());
        assert!(result.is_complete());
        assert_eq!(*source.requested.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn empty_page_ends_loop_before_reported_count() {
        let source = scripted(vec![Ok(vec![1, 2]), Ok(vec![]), Ok(vec![9])], 3);
        let result = fetch_all(&source, 2, None).await;

        assert_eq!(result.items.len(), 2);
        assert_eq!(result.pages_fetched, 2);
        assert_eq!(*source.requested.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn failure_on_first_page_returns_nothing() {
        let source = scripted(vec![Err(FetchError::Auth { status: 403 })], 1);
        let result = fetch_all(&source, 10, None).await;

        assert!(result.items.is_empty());
        assert_eq!(result.pages_fetched, 0);
        assert_eq!(result.error, Some(FetchError::Auth { status: 403 }));
    }
}
