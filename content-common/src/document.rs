use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{parse_timestamp, Attributes, Categories};

const TITLE_KEYS: &[&str] = &["title", "name"];
const TEASER_KEYS: &[&str] = &["excerpt", "teaser", "summary", "description"];
const BODY_KEYS: &[&str] = &["content", "body"];
const CATEGORY_KEYS: &[&str] = &["categories", "tags", "category"];
const TIMESTAMP_KEYS: &[&str] = &["date", "publishedAt", "createdAt"];

/// Untyped attribute bag for resources without a dedicated type.
///
/// Fields are looked up by their conventional names; the category list is
/// resolved once at deserialization time.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Document {
    fields: Map<String, Value>,
    categories: Vec<String>,
}

impl Document {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    fn first_str(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|key| self.fields.get(*key))
            .find_map(Value::as_str)
    }
}

fn resolve_categories(fields: &Map<String, Value>) -> Vec<String> {
    for key in CATEGORY_KEYS {
        match fields.get(*key) {
            None | Some(Value::Null) => continue,
            Some(Value::String(single)) if !single.trim().is_empty() => {
                return vec![single.clone()];
            }
            Some(value) => {
                if let Ok(categories) = serde_json::from_value::<Categories>(value.clone()) {
                    return categories.0;
                }
            }
        }
    }
    Vec::new()
}

impl From<Map<String, Value>> for Document {
    fn from(fields: Map<String, Value>) -> Self {
        let categories = resolve_categories(&fields);
        Document { fields, categories }
    }
}

impl From<Document> for Map<String, Value> {
    fn from(document: Document) -> Self {
        document.fields
    }
}

impl Attributes for Document {
    fn title(&self) -> &str {
        self.first_str(TITLE_KEYS).unwrap_or_default()
    }

    fn teaser(&self) -> Option<&str> {
        self.first_str(TEASER_KEYS)
    }

    fn body(&self) -> Option<&str> {
        self.first_str(BODY_KEYS)
    }

    fn categories(&self) -> &[String] {
        &self.categories
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        TIMESTAMP_KEYS
            .iter()
            .filter_map(|key| self.fields.get(*key).and_then(Value::as_str))
            .find_map(parse_timestamp)
    }
}
