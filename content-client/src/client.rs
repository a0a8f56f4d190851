use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use content_common::{ContentItem, Page, PaginationMeta, Resource, SortDirection};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{ClientConfig, ConfigError};
use crate::error::FetchError;
use crate::transport::{HttpTransport, RawResponse, Transport};

/// Server-side ordering: `sort=<field>:<asc|desc>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn to_query_value(&self) -> String {
        format!("{}:{}", self.field, self.direction.as_str())
    }
}

/// Which page to fetch, and how large pages are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
    pub sort: Option<SortSpec>,
}

impl PageRequest {
    /// Page numbers and sizes start at 1; zero is bumped to 1.
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
            sort: None,
        }
    }

    pub fn with_sort(mut self, sort: Option<SortSpec>) -> Self {
        self.sort = sort;
        self
    }
}

/// Anything that can produce one page of `A` at a time.
///
/// Paginators only talk to this trait, so tests can feed them pages
/// without a backend.
#[async_trait]
pub trait PageSource<A>: Send + Sync {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page<A>, FetchError>;
}

#[async_trait]
impl<A, S> PageSource<A> for Arc<S>
where
    A: Send + 'static,
    S: PageSource<A> + ?Sized,
{
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page<A>, FetchError> {
        (**self).fetch_page(request).await
    }
}

#[derive(Deserialize)]
struct MetaEnvelope {
    pagination: Option<PaginationMeta>,
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "A: DeserializeOwned"))]
struct ListEnvelope<A> {
    data: Option<Vec<ContentItem<A>>>,
    meta: Option<MetaEnvelope>,
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "A: DeserializeOwned"))]
struct SingleEnvelope<A> {
    data: Option<ContentItem<A>>,
}

/// Build `/api/<resource>?populate=..&sort=..&pagination[page]=..&pagination[pageSize]=..`.
pub fn list_path(resource: &str, populate: &str, request: &PageRequest) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("populate", populate);
    if let Some(sort) = &request.sort {
        query.append_pair("sort", &sort.to_query_value());
    }
    query.append_pair("pagination[page]", &request.page.to_string());
    query.append_pair("pagination[pageSize]", &request.page_size.to_string());

    format!("/api/{}?{}", encode_segment(resource), query.finish())
}

/// Build `/api/slugify/slugs/<resource>/<slug>?populate=..`.
pub fn slug_path(resource: &str, slug: &str, populate: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("populate", populate)
        .finish();

    format!(
        "/api/slugify/slugs/{}/{}?{}",
        encode_segment(resource),
        encode_segment(slug),
        query
    )
}

// form encoding turns spaces into `+`, which is wrong inside a path.
fn encode_segment(segment: &str) -> String {
    form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn check_status(response: &RawResponse) -> Result<(), FetchError> {
    match response.status {
        _ if response.is_success() => Ok(()),
        401 | 403 => Err(FetchError::Auth {
            status: response.status,
        }),
        status => Err(FetchError::Network(format!("unexpected HTTP status {status}"))),
    }
}

/// Decode a list response into a [`Page`].
pub fn decode_page<A: DeserializeOwned>(body: &str) -> Result<Page<A>, FetchError> {
    let envelope: ListEnvelope<A> = serde_json::from_str(body)?;
    let items = envelope
        .data
        .ok_or_else(|| FetchError::Schema("missing `data`".into()))?;
    let meta = envelope
        .meta
        .and_then(|meta| meta.pagination)
        .ok_or_else(|| FetchError::Schema("missing `meta.pagination`".into()))?;

    Ok(Page { items, meta })
}

/// Read-only client for the content backend.
pub struct FetchClient<T = HttpTransport> {
    transport: T,
    populate: String,
}

impl FetchClient<HttpTransport> {
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_transport(
            HttpTransport::new(config)?,
            config.populate(),
        ))
    }
}

impl<T: Transport> FetchClient<T> {
    pub fn with_transport(transport: T, populate: impl Into<String>) -> Self {
        Self {
            transport,
            populate: populate.into(),
        }
    }

    /// Fetch one page of `resource`, decoding entries as `A`.
    pub async fn fetch<A: DeserializeOwned>(
        &self,
        resource: &str,
        request: &PageRequest,
    ) -> Result<Page<A>, FetchError> {
        let path = list_path(resource, &self.populate, request);
        debug!(resource, page = request.page, page_size = request.page_size, "fetching page");

        let response = self.transport.get(&path).await?;
        check_status(&response).inspect_err(|e| {
            warn!(resource, page = request.page, error = %e, "page request rejected");
        })?;

        let page = decode_page::<A>(&response.body).inspect_err(|e| {
            warn!(resource, page = request.page, error = %e, "malformed page");
        })?;
        debug!(
            resource,
            page = page.meta.page,
            page_count = page.meta.page_count,
            items = page.items.len(),
            "page fetched"
        );
        Ok(page)
    }

    /// Fetch one page of a typed resource, using its default sort when the
    /// request does not specify one.
    pub async fn fetch_resource<A: Resource>(
        &self,
        request: &PageRequest,
    ) -> Result<Page<A>, FetchError> {
        let request = match (&request.sort, A::DEFAULT_SORT) {
            (None, Some((field, direction))) => request
                .clone()
                .with_sort(Some(SortSpec::new(field, direction))),
            _ => request.clone(),
        };
        self.fetch(A::PATH, &request).await
    }

    /// Look up a single item by slug. `Ok(None)` when it does not exist.
    pub async fn find_by_slug<A: DeserializeOwned>(
        &self,
        resource: &str,
        slug: &str,
    ) -> Result<Option<ContentItem<A>>, FetchError> {
        let path = slug_path(resource, slug, &self.populate);
        debug!(resource, slug, "looking up slug");

        let response = self.transport.get(&path).await?;
        if response.status == 404 {
            return Ok(None);
        }
        check_status(&response)?;

        let envelope: SingleEnvelope<A> = serde_json::from_str(&response.body)?;
        Ok(envelope.data)
    }

    /// A [`PageSource`] over an arbitrary collection name.
    pub fn collection<A>(self: &Arc<Self>, resource: impl Into<String>) -> Collection<T, A> {
        Collection {
            client: Arc::clone(self),
            resource: resource.into(),
            sort: None,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T, A> PageSource<A> for FetchClient<T>
where
    T: Transport,
    A: Resource,
{
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page<A>, FetchError> {
        self.fetch_resource::<A>(request).await
    }
}

/// Page source for a collection chosen at runtime, e.g. decoded as
/// [`content_common::Document`].
pub struct Collection<T, A> {
    client: Arc<FetchClient<T>>,
    resource: String,
    sort: Option<SortSpec>,
    _marker: PhantomData<fn() -> A>,
}

impl<T, A> Collection<T, A> {
    /// Sort applied when a request does not carry its own.
    pub fn with_default_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }
}

#[async_trait]
impl<T, A> PageSource<A> for Collection<T, A>
where
    T: Transport,
    A: DeserializeOwned + Send + 'static,
{
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page<A>, FetchError> {
        let request = match &request.sort {
            Some(_) => request.clone(),
            None => request.clone().with_sort(self.sort.clone()),
        };
        self.client.fetch::<A>(&self.resource, &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use content_common::{Attributes, BlogPost, Document, ItemId};
    use mockall::predicate::eq;
    use serde_json::json;

    fn page_body(ids: &[i64], page: u32, count_key: &str, count: u32) -> String {
        let data: Vec<_> = ids
            .iter()
            .map(|id| json!({ "id": id, "attributes": { "title": format!("Post {id}") } }))
            .collect();
        json!({
            "data": data,
            "meta": { "pagination": { "page": page, "pageSize": 2, count_key: count, "total": 5 } }
        })
        .to_string()
    }

    #[test]
    fn list_path_encodes_pagination_brackets() {
        let request =
            PageRequest::new(2, 10).with_sort(Some(SortSpec::new("publishedAt", SortDirection::Desc)));
        assert_eq!(
            list_path("blogs", "*", &request),
            "/api/blogs?populate=*&sort=publishedAt%3Adesc&pagination%5Bpage%5D=2&pagination%5BpageSize%5D=10"
        );
    }

    #[test]
    fn slug_path_escapes_segments() {
        assert_eq!(
            slug_path("blogs", "hello world", "*"),
            "/api/slugify/slugs/blogs/hello%20world?populate=*"
        );
    }

    #[test]
    fn page_request_bumps_zero_to_one() {
        let request = PageRequest::new(0, 0);
        assert_eq!((request.page, request.page_size), (1, 1));
    }

    #[tokio::test]
    async fn fetch_resource_applies_default_sort_and_decodes() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .with(eq("/api/blogs?populate=*&sort=publishedAt%3Adesc&pagination%5Bpage%5D=1&pagination%5BpageSize%5D=2"))
            .times(1)
            .returning(|_| Ok(RawResponse::new(200, page_body(&[1, 2], 1, "pageCount", 3))));

        let client = FetchClient::with_transport(transport, "*");
        let page: Page<BlogPost> = client.fetch_resource(&PageRequest::new(1, 2)).await.unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].id, ItemId::Int(1));
        assert_eq!(page.items[1].attributes.title(), "Post 2");
        assert_eq!(page.meta.page_count, 3);
    }

    #[tokio::test]
    async fn total_pages_is_normalized_to_page_count() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .returning(|_| Ok(RawResponse::new(200, page_body(&[3], 2, "totalPages", 3))));

        let client = Arc::new(FetchClient::with_transport(transport, "*"));
        let source = client.collection::<Document>("skills");
        let page = source.fetch_page(&PageRequest::new(2, 2)).await.unwrap();

        assert_eq!(page.meta.page_count, 3);
        assert_eq!(page.items[0].attributes.title(), "Post 3");
    }

    #[tokio::test]
    async fn unauthorized_and_forbidden_map_to_auth_error() {
        for status in [401, 403] {
            let mut transport = MockTransport::new();
            transport
                .expect_get()
                .times(1)
                .returning(move |_| Ok(RawResponse::new(status, r#"{"error":{}}"#)));

            let client = FetchClient::with_transport(transport, "*");
            let err = client
                .fetch::<Document>("blogs", &PageRequest::new(1, 10))
                .await
                .unwrap_err();
            assert_eq!(err, FetchError::Auth { status });
            assert_eq!(err.kind(), "auth");
        }
    }

    #[tokio::test]
    async fn server_error_maps_to_network_error() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .returning(|_| Ok(RawResponse::new(502, "bad gateway")));

        let client = FetchClient::with_transport(transport, "*");
        let err = client
            .fetch::<Document>("blogs", &PageRequest::new(1, 10))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "network");
    }

    #[tokio::test]
    async fn missing_envelope_fields_are_schema_errors() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .times(2)
            .returning(|path| {
                if path.contains("pagination%5Bpage%5D=1") {
                    Ok(RawResponse::new(200, r#"{"meta":{"pagination":{"page":1,"pageSize":10,"pageCount":1}}}"#))
                } else {
                    Ok(RawResponse::new(200, r#"{"data":[]}"#))
                }
            });

        let client = FetchClient::with_transport(transport, "*");
        for page in [1, 2] {
            let err = client
                .fetch::<Document>("blogs", &PageRequest::new(page, 10))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), "schema");
        }
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .returning(|_| Err(FetchError::Network("connection refused".into())));

        let client = FetchClient::with_transport(transport, "*");
        let err = client
            .fetch::<Document>("blogs", &PageRequest::new(1, 10))
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::Network("connection refused".into()));
    }

    #[tokio::test]
    async fn slug_lookup_handles_found_null_and_404() {
        let mut transport = MockTransport::new();
        transport.expect_get().returning(|path| {
            if path.contains("/hello-rust?") {
                Ok(RawResponse::new(
                    200,
                    r##"{"data":{"id":7,"attributes":{"title":"Hello Rust","content":"# Hi"}}}"##,
                ))
            } else if path.contains("/gone?") {
                Ok(RawResponse::new(404, r#"{"data":null}"#))
            } else {
                Ok(RawResponse::new(200, r#"{"data":null}"#))
            }
        });

        let client = FetchClient::with_transport(transport, "*");

        let found = client
            .find_by_slug::<BlogPost>("blogs", "hello-rust")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, ItemId::Int(7));
        assert_eq!(found.attributes.body(), Some("# Hi"));

        assert!(client
            .find_by_slug::<BlogPost>("blogs", "gone")
            .await
            .unwrap()
            .is_none());
        assert!(client
            .find_by_slug::<BlogPost>("blogs", "draft")
            .await
            .unwrap()
            .is_none());
    }
}
