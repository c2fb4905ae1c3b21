//! Filtering and ordering of catalog listings

use shelfscan_core::CatalogBook;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Most recently added first
    #[default]
    AddedDesc,
    Title,
    Author,
    /// By location, then title
    Location,
}

impl SortOrder {
    pub const NAMES: [&'static str; 4] = ["added", "title", "author", "location"];

    fn compare(&self, a: &CatalogBook, b: &CatalogBook) -> Ordering {
        match self {
            Self::AddedDesc => b.added_at.cmp(&a.added_at),
            Self::Title => fold(a.title()).cmp(&fold(b.title())),
            Self::Author => fold(a.author()).cmp(&fold(b.author())),
            Self::Location => a
                .location
                .cmp(&b.location)
                .then_with(|| fold(a.title()).cmp(&fold(b.title()))),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "added" | "newest" => Ok(Self::AddedDesc),
            "title" => Ok(Self::Title),
            "author" => Ok(Self::Author),
            "location" => Ok(Self::Location),
            other => Err(format!(
                "unknown sort '{}', expected one of: {}",
                other,
                Self::NAMES.join(", ")
            )),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AddedDesc => "added",
            Self::Title => "title",
            Self::Author => "author",
            Self::Location => "location",
        };
        write!(f, "{}", name)
    }
}

/// Listing criteria; an unset filter matches everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookQuery {
    /// Case-insensitive substring of title, author or ISBN
    pub search: Option<String>,
    /// Case-insensitive substring of the category field
    pub category: Option<String>,
    /// Exact location
    pub location: Option<String>,
    pub sort: SortOrder,
}

impl BookQuery {
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, book: &CatalogBook) -> bool {
        matches_search(book, self.search.as_deref())
            && self.category.as_deref().map_or(true, |wanted| {
                contains_folded(book.record.category.as_deref(), wanted)
            })
            && self
                .location
                .as_deref()
                .map_or(true, |wanted| book.location == wanted)
    }

    /// Filters and sorts `books`
    pub fn apply(&self, books: Vec<CatalogBook>) -> Vec<CatalogBook> {
        let mut selected: Vec<CatalogBook> =
            books.into_iter().filter(|b| self.matches(b)).collect();
        selected.sort_by(|a, b| self.sort.compare(a, b));
        selected
    }
}

pub(crate) fn matches_search(book: &CatalogBook, query: Option<&str>) -> bool {
    let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) else {
        return true;
    };

    contains_folded(book.record.title.as_deref(), query)
        || contains_folded(book.record.author.as_deref(), query)
        || contains_folded(book.record.isbn.as_deref(), query)
}

fn contains_folded(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| fold(h).contains(&fold(needle)))
}

fn fold(s: &str) -> String {
    s.to_lowercase()
}
