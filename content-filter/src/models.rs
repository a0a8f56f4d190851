use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Synthetic category that matches every item.
pub const ALL_CATEGORIES: &str = "All";

/// Order of the derived list. Serialized lowercase; parsed and deserialized
/// case-insensitively.
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Latest timestamp first; items without one go last
    #[default]
    Newest,
    /// Earliest first; items without a timestamp come first
    Oldest,
    /// Title, case-insensitive
    Alphabetical,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown sort order `{0}`, expected newest, oldest or alphabetical")]
pub struct UnknownSortOrder(pub String);

impl FromStr for SortBy {
    type Err = UnknownSortOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" => Ok(SortBy::Newest),
            "oldest" => Ok(SortBy::Oldest),
            "alphabetical" => Ok(SortBy::Alphabetical),
            _ => Err(UnknownSortOrder(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for SortBy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(de::Error::custom)
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortBy::Newest => "newest",
            SortBy::Oldest => "oldest",
            SortBy::Alphabetical => "alphabetical",
        })
    }
}

/// User-controlled filter inputs. Never touches the underlying collection.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    #[serde(alias = "search")]
    pub search_term: String,
    #[serde(alias = "category")]
    pub active_category: String,
    #[serde(alias = "sort")]
    pub sort_by: SortBy,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            active_category: ALL_CATEGORIES.to_string(),
            sort_by: SortBy::default(),
        }
    }
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.active_category = category.into();
        self
    }

    pub fn with_sort(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    /// The "clear filters" action.
    pub fn cleared() -> Self {
        Self::default()
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Lowercased, trimmed search term; `None` when it matches everything.
    pub fn normalized_search(&self) -> Option<String> {
        let term = self.search_term.trim();
        (!term.is_empty()).then(|| term.to_lowercase())
    }

    /// Active category, `None` for the `All` wildcard (or an empty value).
    pub fn category_filter(&self) -> Option<&str> {
        let category = self.active_category.trim();
        (!category.is_empty() && category != ALL_CATEGORIES).then_some(category)
    }
}

/// Filter input as sent from the page script: every field optional,
/// unknown sort values fall back to `newest`.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    #[serde(alias = "searchTerm")]
    pub search: Option<String>,
    #[serde(alias = "activeCategory")]
    pub category: Option<String>,
    #[serde(alias = "sortBy")]
    pub sort: Option<String>,
}

impl From<FilterParams> for FilterState {
    fn from(params: FilterParams) -> Self {
        let defaults = FilterState::default();
        FilterState {
            search_term: params.search.unwrap_or(defaults.search_term),
            active_category: params
                .category
                .filter(|category| !category.trim().is_empty())
                .unwrap_or(defaults.active_category),
            sort_by: params
                .sort
                .and_then(|sort| sort.parse().ok())
                .unwrap_or(defaults.sort_by),
        }
    }
}

/// Derived list plus the numbers a listing page shows next to it.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FilterResult<T> {
    pub items: Vec<T>,
    /// Items after filtering
    pub total: usize,
    /// Items in the whole collection
    pub loaded: usize,
    pub categories: Vec<String>,
}
