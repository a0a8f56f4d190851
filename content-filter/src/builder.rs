use content_common::{Attributes, ContentItem};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::locale_compare;
use crate::models::ALL_CATEGORIES;

/// Distinct categories of a collection with their item counts.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryIndex {
    /// `All` first, then every distinct category in title order
    pub categories: Vec<String>,
    /// Number of items per category; `All` maps to the collection size
    pub counts: HashMap<String, usize>,
}

impl CategoryIndex {
    pub fn contains(&self, category: &str) -> bool {
        self.counts.contains_key(category)
    }

    pub fn count(&self, category: &str) -> usize {
        self.counts.get(category).copied().unwrap_or(0)
    }
}

/// Category index builder
///
/// Always fed the full accumulated collection, never a filtered subset,
/// so the category menu does not shrink while the user filters.
#[derive(Default)]
pub struct CategoryIndexBuilder {
    counts: HashMap<String, usize>,
    items: usize,
}

impl CategoryIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item<A: Attributes>(&mut self, item: &ContentItem<A>) {
        self.items += 1;

        let mut seen: Vec<&str> = Vec::new();
        for category in item.attributes.categories() {
            let category = category.trim();
            // the wildcard name is reserved
            if category.is_empty() || category == ALL_CATEGORIES || seen.contains(&category) {
                continue;
            }
            seen.push(category);
            *self.counts.entry(category.to_string()).or_insert(0) += 1;
        }
    }

    pub fn extend<'a, A: Attributes + 'a>(
        &mut self,
        items: impl IntoIterator<Item = &'a ContentItem<A>>,
    ) {
        for item in items {
            self.add_item(item);
        }
    }

    pub fn build(self) -> CategoryIndex {
        let mut names: Vec<String> = self.counts.keys().cloned().collect();
        names.sort_by(|a, b| locale_compare(a, b));

        let mut categories = Vec::with_capacity(names.len() + 1);
        categories.push(ALL_CATEGORIES.to_string());
        categories.extend(names);

        let mut counts = self.counts;
        counts.insert(ALL_CATEGORIES.to_string(), self.items);

        debug!(items = self.items, categories = categories.len() - 1, "category index built");
        CategoryIndex { categories, counts }
    }
}

/// Category list of a whole collection, `All` first.
pub fn collect_categories<A: Attributes>(items: &[ContentItem<A>]) -> Vec<String> {
    let mut builder = CategoryIndexBuilder::new();
    builder.extend(items);
    builder.build().categories
}

#[cfg(test)]
mod tests {
    use super::*;
    use content_common::Document;
    use serde_json::json;

    fn doc(id: i64, categories: &[&str]) -> ContentItem<Document> {
        serde_json::from_value(json!({
            "id": id,
            "attributes": { "title": format!("Item {id}"), "categories": categories }
        }))
        .unwrap()
    }

    #[test]
    fn empty_collection_only_has_all() {
        let items: Vec<ContentItem<Document>> = Vec::new();
        assert_eq!(collect_categories(&items), vec!["All".to_string()]);
    }

    #[test]
    fn union_of_categories_sorted_after_all() {
        let items = vec![
            doc(1, &["health", "AI"]),
            doc(2, &["Rust", "AI"]),
            doc(3, &[]),
        ];
        let index = {
            let mut builder = CategoryIndexBuilder::new();
            builder.extend(&items);
            builder.build()
        };

        assert_eq!(index.categories, vec!["All", "AI", "health", "Rust"]);
        assert_eq!(index.count("AI"), 2);
        assert_eq!(index.count("All"), 3);
        assert_eq!(index.count("Go"), 0);
        assert!(index.contains("Rust"));
    }

    #[test]
    fn accented_categories_follow_their_base_letter() {
        let items = vec![doc(1, &["Zoologie", "Économie"]), doc(2, &["art"])];
        assert_eq!(
            collect_categories(&items),
            vec!["All", "art", "Économie", "Zoologie"]
        );
    }

    #[test]
    fn duplicate_and_reserved_names_are_skipped() {
        let mut builder = CategoryIndexBuilder::new();
        builder.add_item(&ContentItem::new(
            1_i64,
            Document::from(
                json!({ "title": "x", "categories": ["AI", "AI", "All", " "] })
                    .as_object()
                    .cloned()
                    .unwrap(),
            ),
        ));
        let index = builder.build();
        assert_eq!(index.categories, vec!["All", "AI"]);
        assert_eq!(index.count("AI"), 1);
    }
}
