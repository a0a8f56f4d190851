use crate::models::{ContentItem, ItemId};
use std::collections::HashSet;

/// Items of one resource in arrival order, without duplicate ids.
///
/// Items are only ever appended: once present, an item keeps its position.
#[derive(Debug, Clone)]
pub struct AccumulatedCollection<A> {
    items: Vec<ContentItem<A>>,
    ids: HashSet<ItemId>,
}

impl<A> Default for AccumulatedCollection<A> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            ids: HashSet::new(),
        }
    }
}

impl<A> AccumulatedCollection<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unseen items; returns how many were added.
    pub fn extend(&mut self, items: impl IntoIterator<Item = ContentItem<A>>) -> usize {
        let before = self.items.len();
        for item in items {
            if self.ids.insert(item.id.clone()) {
                self.items.push(item);
            }
        }
        self.items.len() - before
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.ids.contains(id)
    }

    pub fn items(&self) -> &[ContentItem<A>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<ContentItem<A>> {
        self.items
    }
}

impl<A> FromIterator<ContentItem<A>> for AccumulatedCollection<A> {
    fn from_iter<I: IntoIterator<Item = ContentItem<A>>>(iter: I) -> Self {
        let mut collection = Self::new();
        collection.extend(iter);
        collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, title: &str) -> ContentItem<String> {
        ContentItem::new(id, title.to_string())
    }

    #[test]
    fn overlapping_pages_do_not_duplicate() {
        let mut collection = AccumulatedCollection::new();
        assert_eq!(collection.extend(vec![item(1, "a"), item(2, "b")]), 2);
        assert_eq!(collection.extend(vec![item(2, "b again"), item(3, "c")]), 1);

        let titles: Vec<&str> = collection
            .items()
            .iter()
            .map(|item| item.attributes.as_str())
            .collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
        assert!(collection.contains(&ItemId::Int(3)));
    }

    #[test]
    fn earlier_items_keep_their_position() {
        let mut collection: AccumulatedCollection<String> =
            vec![item(5, "e"), item(1, "a")].into_iter().collect();
        let prefix: Vec<ItemId> = collection.items().iter().map(|i| i.id.clone()).collect();

        collection.extend(vec![item(0, "z"), item(5, "dup")]);
        let after: Vec<ItemId> = collection.items().iter().map(|i| i.id.clone()).collect();
        assert_eq!(&after[..prefix.len()], prefix.as_slice());
        assert_eq!(collection.len(), 3);
    }
}
