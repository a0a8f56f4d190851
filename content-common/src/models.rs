use chrono::{DateTime, NaiveDate, Utc};
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a content item, unique within one resource.
///
/// The backend uses numeric ids for collection entries, but documents
/// addressed by slug or imported from elsewhere may carry string ids.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(untagged)]
pub enum ItemId {
    Int(i64),
    Str(String),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Int(id) => write!(f, "{id}"),
            ItemId::Str(id) => f.write_str(id),
        }
    }
}

impl From<i64> for ItemId {
    fn from(id: i64) -> Self {
        ItemId::Int(id)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        ItemId::Str(id.to_string())
    }
}

/// A single record of a resource: its id plus the resource-specific attributes.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ContentItem<A> {
    pub id: ItemId,
    pub attributes: A,
}

impl<A> ContentItem<A> {
    pub fn new(id: impl Into<ItemId>, attributes: A) -> Self {
        Self {
            id: id.into(),
            attributes,
        }
    }
}

/// The fields the filter pipeline reads from an item.
///
/// Everything except the title is optional; a resource without a teaser or
/// body simply keeps the default.
pub trait Attributes {
    fn title(&self) -> &str;

    fn teaser(&self) -> Option<&str> {
        None
    }

    fn body(&self) -> Option<&str> {
        None
    }

    fn categories(&self) -> &[String] {
        &[]
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        None
    }
}

/// Sort direction understood by the backend's `sort=<field>:<dir>` parameter.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// A backend collection whose entries deserialize into `Self`.
pub trait Resource: Attributes + DeserializeOwned + Send + Sync + 'static {
    /// Collection name used in `/api/<resource>`.
    const PATH: &'static str;

    /// Server-side ordering requested when the caller does not pick one.
    const DEFAULT_SORT: Option<(&'static str, SortDirection)> = None;
}

/// Category list of an item.
///
/// Accepts a flat list (`["AI", "Health"]`), a list of objects with a
/// `name`, or the relation wrapper `{ "data": [ { "attributes": { "name": .. } } ] }`
/// returned for populated relations. `null` becomes an empty list.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Categories(pub Vec<String>);

impl Categories {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for Categories {
    fn from(names: Vec<String>) -> Self {
        Categories(names)
    }
}

impl<const N: usize> From<[&str; N]> for Categories {
    fn from(names: [&str; N]) -> Self {
        Categories(names.iter().map(|name| name.to_string()).collect())
    }
}

#[derive(Deserialize)]
struct NamedEntry {
    name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CategoryEntry {
    Name(String),
    Nested { attributes: NamedEntry },
    Flat(NamedEntry),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CategoriesRepr {
    List(Vec<CategoryEntry>),
    Relation { data: Option<Vec<CategoryEntry>> },
}

impl<'de> Deserialize<'de> for Categories {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = match Option::<CategoriesRepr>::deserialize(deserializer)? {
            None => Vec::new(),
            Some(CategoriesRepr::List(entries)) => entries,
            Some(CategoriesRepr::Relation { data }) => data.unwrap_or_default(),
        };

        let names = entries
            .into_iter()
            .map(|entry| match entry {
                CategoryEntry::Name(name) => name,
                CategoryEntry::Nested { attributes } => attributes.name,
                CategoryEntry::Flat(named) => named.name,
            })
            .filter(|name| !name.trim().is_empty())
            .collect();

        Ok(Categories(names))
    }
}

/// Reference to an uploaded media file (cover image, logo, ...).
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MediaRef {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative_text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MediaFields {
    url: String,
    #[serde(default)]
    alternative_text: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MediaEntry {
    Nested { attributes: MediaFields },
    Flat(MediaFields),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MediaRepr {
    Entry(MediaEntry),
    Relation { data: Option<MediaEntry> },
}

impl MediaRef {
    /// Serde helper for optional media relations: `null`, `{ "data": null }`
    /// and missing fields all become `None`.
    pub fn deserialize_optional<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<MediaRef>, D::Error> {
        let entry = match Option::<MediaRepr>::deserialize(deserializer)? {
            None | Some(MediaRepr::Relation { data: None }) => return Ok(None),
            Some(MediaRepr::Relation { data: Some(entry) }) => entry,
            Some(MediaRepr::Entry(entry)) => entry,
        };

        let fields = match entry {
            MediaEntry::Nested { attributes } => attributes,
            MediaEntry::Flat(fields) => fields,
        };

        Ok(Some(MediaRef {
            url: fields.url,
            alternative_text: fields.alternative_text,
        }))
    }
}

/// Parse a backend timestamp: RFC 3339 or a plain `YYYY-MM-DD` date
/// (taken as midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Serde helper: a timestamp field that is absent, `null` or unparsable is
/// treated as missing instead of failing the whole page.
pub fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("pagination metadata is missing `page`")]
    MissingPage,

    #[error("pagination metadata is missing `pageSize`")]
    MissingPageSize,

    #[error("pagination metadata has neither `pageCount`, `totalPages` nor `total`")]
    MissingPageCount,

    #[error("`pageCount` ({page_count}) and `totalPages` ({total_pages}) disagree")]
    ConflictingPageCount { page_count: u32, total_pages: u32 },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPagination {
    page: Option<u32>,
    page_size: Option<u32>,
    page_count: Option<u32>,
    total_pages: Option<u32>,
    total: Option<u64>,
}

/// Pagination metadata normalized to one canonical page count.
///
/// Some collections report `pageCount`, others `totalPages`; both are
/// accepted and must agree when both are present.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(try_from = "RawPagination", rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
    pub total: Option<u64>,
}

impl TryFrom<RawPagination> for PaginationMeta {
    type Error = PaginationError;

    fn try_from(raw: RawPagination) -> Result<Self, Self::Error> {
        let page = raw.page.ok_or(PaginationError::MissingPage)?;
        let page_size = raw.page_size.ok_or(PaginationError::MissingPageSize)?;

        let page_count = match (raw.page_count, raw.total_pages) {
            (Some(page_count), Some(total_pages)) if page_count != total_pages => {
                return Err(PaginationError::ConflictingPageCount {
                    page_count,
                    total_pages,
                })
            }
            (Some(count), _) | (None, Some(count)) => count,
            (None, None) => match raw.total {
                Some(total) if page_size > 0 => {
                    u32::try_from(total.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX)
                }
                _ => return Err(PaginationError::MissingPageCount),
            },
        };

        Ok(PaginationMeta {
            page,
            page_size,
            page_count,
            total: raw.total,
        })
    }
}

impl PaginationMeta {
    pub fn is_last_page(&self) -> bool {
        self.page >= self.page_count
    }
}

/// One page of a resource as returned by the backend.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Page<A> {
    pub items: Vec<ContentItem<A>>,
    pub meta: PaginationMeta,
}
