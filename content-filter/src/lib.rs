use content_common::{AccumulatedCollection, Attributes, ContentItem, Document};
use std::cmp::Ordering;
use tracing::debug;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;
use wasm_bindgen::prelude::*;
use web_sys::console;

pub mod builder;
pub mod models;

pub use builder::{collect_categories, CategoryIndex, CategoryIndexBuilder};
pub use models::{FilterParams, FilterResult, FilterState, SortBy, UnknownSortOrder, ALL_CATEGORIES};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialisation hook: route panics to the browser console.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Primary collation key: canonical decomposition with combining marks
/// dropped, then lowercased, so `Éclair` files under `e`.
pub fn collation_key(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Title comparison used for alphabetical ordering. Base letters decide
/// first, then accents, then case, so the order is total.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

fn contains_term(field: Option<&str>, term: &str) -> bool {
    field.is_some_and(|text| text.to_lowercase().contains(term))
}

/// Case-insensitive substring match over title, teaser, body and categories.
/// `term` must already be lowercased.
pub fn matches_search<A: Attributes>(attributes: &A, term: &str) -> bool {
    contains_term(Some(attributes.title()), term)
        || contains_term(attributes.teaser(), term)
        || contains_term(attributes.body(), term)
        || attributes
            .categories()
            .iter()
            .any(|category| contains_term(Some(category.as_str()), term))
}

pub fn matches_category<A: Attributes>(attributes: &A, category: &str) -> bool {
    attributes
        .categories()
        .iter()
        .any(|candidate| candidate.trim() == category)
}

/// Sort in place. The sort is stable, so ties keep collection order.
pub fn apply_sorting<A: Attributes>(items: &mut [&ContentItem<A>], sort_by: SortBy) {
    match sort_by {
        SortBy::Newest => {
            items.sort_by(|a, b| b.attributes.timestamp().cmp(&a.attributes.timestamp()));
        }
        SortBy::Oldest => {
            items.sort_by(|a, b| a.attributes.timestamp().cmp(&b.attributes.timestamp()));
        }
        SortBy::Alphabetical => {
            items.sort_by_cached_key(|item| {
                let title = item.attributes.title();
                (collation_key(title), title.to_lowercase(), title.to_string())
            });
        }
    }
}

/// Apply a [`FilterState`] to a collection and return the list to render.
///
/// Search and category filters are independent of each other; the result
/// depends only on `items` and `state`, never on a previous derivation.
pub fn derive<'a, A: Attributes>(
    items: &'a [ContentItem<A>],
    state: &FilterState,
) -> Vec<&'a ContentItem<A>> {
    let term = state.normalized_search();
    let category = state.category_filter();

    let mut view: Vec<&ContentItem<A>> = items
        .iter()
        .filter(|item| {
            term.as_deref()
                .map_or(true, |term| matches_search(&item.attributes, term))
        })
        .filter(|item| category.map_or(true, |category| matches_category(&item.attributes, category)))
        .collect();

    apply_sorting(&mut view, state.sort_by);
    view
}

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("failed to parse items: {0}")]
    Items(#[source] serde_json::Error),

    #[error("failed to parse filter state: {0}")]
    State(#[source] serde_json::Error),

    #[error("failed to serialize result: {0}")]
    Output(#[source] serde_json::Error),
}

/// Client-side collection for one listing page: pages are appended as they
/// arrive, filters are applied on demand.
pub struct ContentFilter {
    items: AccumulatedCollection<Document>,
    categories: CategoryIndex,
}

impl ContentFilter {
    pub fn new() -> Self {
        Self {
            items: AccumulatedCollection::new(),
            categories: CategoryIndexBuilder::new().build(),
        }
    }

    /// Append one page of `{ id, attributes }` entries; already known ids
    /// are ignored. Returns the number of new items.
    pub fn append_json(&mut self, items_json: &str) -> Result<usize, FilterError> {
        let page: Vec<ContentItem<Document>> =
            serde_json::from_str(items_json).map_err(FilterError::Items)?;

        let added = self.items.extend(page);
        if added > 0 {
            let mut builder = CategoryIndexBuilder::new();
            builder.extend(self.items.items());
            self.categories = builder.build();
        }
        debug!(added, total = self.items.len(), "items appended");
        Ok(added)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn categories(&self) -> &[String] {
        &self.categories.categories
    }

    pub fn filter(&self, state: &FilterState) -> FilterResult<&ContentItem<Document>> {
        let items = derive(self.items.items(), state);
        FilterResult {
            total: items.len(),
            loaded: self.items.len(),
            categories: self.categories.categories.clone(),
            items,
        }
    }

    /// JSON in, JSON out; filter parameters are parsed leniently.
    pub fn filter_json(&self, params_json: &str) -> Result<String, FilterError> {
        let params: FilterParams = if params_json.trim().is_empty() {
            FilterParams::default()
        } else {
            serde_json::from_str(params_json).map_err(FilterError::State)?
        };
        let state = FilterState::from(params);
        serde_json::to_string(&self.filter(&state)).map_err(FilterError::Output)
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Browser-facing wrapper around [`ContentFilter`].
#[wasm_bindgen]
pub struct ContentFilterJS {
    inner: ContentFilter,
}

#[wasm_bindgen]
impl ContentFilterJS {
    #[wasm_bindgen(constructor)]
    pub fn new() -> ContentFilterJS {
        console_error_panic_hook::set_once();
        ContentFilterJS {
            inner: ContentFilter::new(),
        }
    }

    /// Append a page of items (JSON array); returns how many were new.
    #[wasm_bindgen]
    pub fn append(&mut self, items_json: &str) -> Result<usize, JsValue> {
        self.inner.append_json(items_json).map_err(|e| {
            console::log_1(&JsValue::from_str(&format!("append failed: {e}")));
            JsValue::from_str(&e.to_string())
        })
    }

    /// Categories of everything loaded so far, `All` first.
    #[wasm_bindgen]
    pub fn categories(&self) -> js_sys::Array {
        self.inner
            .categories()
            .iter()
            .map(|category| JsValue::from_str(category))
            .collect()
    }

    /// Filter and sort; `params_json` is `{ search, category, sort }`.
    #[wasm_bindgen]
    pub fn filter(&self, params_json: &str) -> Result<JsValue, JsValue> {
        let state = match serde_json::from_str::<FilterParams>(params_json) {
            Ok(params) => FilterState::from(params),
            Err(e) => {
                console::log_1(&JsValue::from_str(&format!("invalid filter params: {e}")));
                FilterState::default()
            }
        };

        serde_wasm_bindgen::to_value(&self.inner.filter(&state))
            .map_err(|e| JsValue::from_str(&format!("failed to serialize result: {e}")))
    }

    #[wasm_bindgen]
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.inner.len()
    }
}

impl Default for ContentFilterJS {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use content_common::ItemId;
    use serde_json::json;

    fn sample() -> Vec<ContentItem<Document>> {
        serde_json::from_value(json!([
            { "id": 1, "attributes": { "title": "A", "date": "2024-01-01", "categories": ["AI"] } },
            { "id": 2, "attributes": { "title": "B", "date": "2024-06-01", "categories": ["Health"] } }
        ]))
        .unwrap()
    }

    fn ids(view: &[&ContentItem<Document>]) -> Vec<ItemId> {
        view.iter().map(|item| item.id.clone()).collect()
    }

    #[test]
    fn empty_collection_derives_empty_view() {
        let items: Vec<ContentItem<Document>> = Vec::new();
        assert!(derive(&items, &FilterState::default()).is_empty());
    }

    #[test]
    fn newest_then_category_then_search() {
        let items = sample();
        let state = FilterState::default();
        assert_eq!(ids(&derive(&items, &state)), vec![ItemId::Int(2), ItemId::Int(1)]);

        let state = state.with_category("Health");
        assert_eq!(ids(&derive(&items, &state)), vec![ItemId::Int(2)]);

        let state = state.with_search("zzz");
        assert!(derive(&items, &state).is_empty());
    }

    #[test]
    fn derive_is_idempotent() {
        let items = sample();
        let state = FilterState::new().with_search("a").with_sort(SortBy::Oldest);
        assert_eq!(ids(&derive(&items, &state)), ids(&derive(&items, &state)));
    }

    #[test]
    fn alphabetical_is_independent_of_previous_sorts() {
        let items: Vec<ContentItem<Document>> = serde_json::from_value(json!([
            { "id": 1, "attributes": { "title": "cherry", "date": "2023-01-01" } },
            { "id": 2, "attributes": { "title": "Banana", "date": "2024-01-01" } },
            { "id": 3, "attributes": { "title": "apple" } },
            { "id": 4, "attributes": { "title": "banana", "date": "2022-01-01" } }
        ]))
        .unwrap();

        let alpha = FilterState::new().with_sort(SortBy::Alphabetical);
        let direct = ids(&derive(&items, &alpha));
        let _ = derive(&items, &alpha);
        let _ = derive(&items, &alpha.clone().with_sort(SortBy::Newest));
        let again = ids(&derive(&items, &alpha));

        assert_eq!(direct, again);
        assert_eq!(
            direct,
            vec![ItemId::Int(3), ItemId::Int(2), ItemId::Int(4), ItemId::Int(1)]
        );
    }

    #[test]
    fn accented_titles_sort_with_their_base_letter() {
        let items: Vec<ContentItem<Document>> = serde_json::from_value(json!([
            { "id": 1, "attributes": { "title": "Zebra" } },
            { "id": 2, "attributes": { "title": "Éclair" } },
            { "id": 3, "attributes": { "title": "apple" } },
            { "id": 4, "attributes": { "title": "eclair" } }
        ]))
        .unwrap();

        let view = derive(&items, &FilterState::new().with_sort(SortBy::Alphabetical));
        assert_eq!(
            ids(&view),
            vec![ItemId::Int(3), ItemId::Int(4), ItemId::Int(2), ItemId::Int(1)]
        );
        assert_eq!(locale_compare("Éclair", "Zebra"), Ordering::Less);
        assert_eq!(collation_key("Ñandú"), "nandu");
    }

    #[test]
    fn missing_timestamps_sort_as_earliest() {
        let items: Vec<ContentItem<Document>> = serde_json::from_value(json!([
            { "id": 1, "attributes": { "title": "undated" } },
            { "id": 2, "attributes": { "title": "dated", "date": "2020-01-01" } }
        ]))
        .unwrap();

        let newest = derive(&items, &FilterState::default());
        assert_eq!(ids(&newest), vec![ItemId::Int(2), ItemId::Int(1)]);

        let oldest = derive(&items, &FilterState::new().with_sort(SortBy::Oldest));
        assert_eq!(ids(&oldest), vec![ItemId::Int(1), ItemId::Int(2)]);
    }

    #[test]
    fn search_covers_teaser_body_and_categories() {
        let items: Vec<ContentItem<Document>> = serde_json::from_value(json!([
            { "id": 1, "attributes": { "title": "One", "excerpt": "About WebAssembly" } },
            { "id": 2, "attributes": { "title": "Two", "content": "deep dive into TOKIO" } },
            { "id": 3, "attributes": { "title": "Three", "categories": ["Machine Learning"] } }
        ]))
        .unwrap();

        let find = |term: &str| ids(&derive(&items, &FilterState::new().with_search(term)));
        assert_eq!(find("webassembly"), vec![ItemId::Int(1)]);
        assert_eq!(find("Tokio"), vec![ItemId::Int(2)]);
        assert_eq!(find("learning"), vec![ItemId::Int(3)]);
    }

    #[test]
    fn search_and_category_commute() {
        let items = sample();
        let a = FilterState::new().with_search("b").with_category("Health");
        let b = FilterState::new().with_category("Health").with_search("b");
        assert_eq!(ids(&derive(&items, &a)), ids(&derive(&items, &b)));
    }

    #[test]
    fn default_filter_lists_the_all_category() {
        let filter = ContentFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.categories(), ["All".to_string()]);

        let result = filter.filter(&FilterState::default());
        assert_eq!(result.categories, vec!["All".to_string()]);
        assert_eq!(result.total, 0);
    }

    #[test]
    fn content_filter_dedups_and_tracks_categories() {
        let mut filter = ContentFilter::new();
        assert_eq!(filter.categories(), ["All".to_string()]);

        let page1 = json!([
            { "id": 1, "attributes": { "title": "A", "categories": ["AI"] } },
            { "id": 2, "attributes": { "title": "B", "categories": ["Health"] } }
        ])
        .to_string();
        let page2 = json!([
            { "id": 2, "attributes": { "title": "B", "categories": ["Health"] } },
            { "id": 3, "attributes": { "title": "C", "categories": ["Rust"] } }
        ])
        .to_string();

        assert_eq!(filter.append_json(&page1).unwrap(), 2);
        assert_eq!(filter.append_json(&page2).unwrap(), 1);
        assert_eq!(filter.len(), 3);
        assert_eq!(filter.categories(), ["All", "AI", "Health", "Rust"]);

        let out: serde_json::Value =
            serde_json::from_str(&filter.filter_json(r#"{"category":"Rust"}"#).unwrap()).unwrap();
        assert_eq!(out["total"], 1);
        assert_eq!(out["loaded"], 3);
        assert_eq!(out["items"][0]["id"], 3);

        assert!(filter.append_json("not json").is_err());
        filter.clear();
        assert!(filter.is_empty());
    }
}
