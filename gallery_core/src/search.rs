//! Client-side search over already fetched records.

use crate::models::{Event, Organization, Photo};

/// Records that expose text fields to the search box.
pub trait Searchable {
    /// The designated text fields; absent optional fields are skipped.
    fn search_fields(&self) -> Vec<&str>;
}

impl Searchable for Organization {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }
}

impl Searchable for Event {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str()];
        if let Some(description) = self.description.as_deref() {
            fields.push(description);
        }
        fields
    }
}

impl Searchable for Photo {
    fn search_fields(&self) -> Vec<&str> {
        self.title().into_iter().collect()
    }
}

/// Case-insensitive substring match of `term` against the item's fields.
///
/// Whitespace only decides whether the term is blank; a non-blank term is
/// matched as typed, surrounding spaces included.
pub fn matches<T: Searchable>(item: &T, term: &str) -> bool {
    term.trim().is_empty() || matches_lowered(item, &term.to_lowercase())
}

fn matches_lowered<T: Searchable>(item: &T, needle: &str) -> bool {
    item.search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Keeps the items matching `term`, in their original order.
///
/// A blank term returns every item unchanged.
#[tracing::instrument(level = "debug", skip(items), fields(total = items.len()))]
pub fn search_filter<T: Searchable + Clone>(term: &str, items: &[T]) -> Vec<T> {
    if term.trim().is_empty() {
        return items.to_vec();
    }
    let needle = term.to_lowercase();
    items
        .iter()
        .filter(|item| matches_lowered(*item, &needle))
        .cloned()
        .collect()
}
