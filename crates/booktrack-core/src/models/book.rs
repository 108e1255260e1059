//! Reading list entries and the payloads used to create and edit them.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use super::{is_blank, ValidationError};

/// Message shown when a required book field is missing.
pub const REQUIRED_BOOK_FIELDS: &str = "Title, Author, and Total Pages are required";

/// A book on the user's reading list, as returned by the backend.
///
/// Records are not validated server-side, so every field except `_id` may be
/// missing or null. One incomplete record must not hide the rest of the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Book {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub author: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "totalPages", default, deserialize_with = "deserialize_page_count")]
    pub total_pages: Option<u32>,
}

impl Book {
    /// Empty when the page count is unknown.
    pub fn pages_display(&self) -> String {
        match self.total_pages {
            None => String::new(),
            Some(1) => "1 page".to_string(),
            Some(n) => format!("{} pages", n),
        }
    }

    pub fn genre_display(&self) -> &str {
        self.genre.as_deref().unwrap_or("")
    }
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// The backend has stored page counts both as numbers and as numeric strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum PageCount {
    Number(u32),
    Text(String),
    Other(IgnoredAny),
}

/// Anything that isn't a whole page count reads as unknown.
fn deserialize_page_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<PageCount>::deserialize(deserializer)? {
        Some(PageCount::Number(n)) => Some(n),
        Some(PageCount::Text(s)) => s.trim().parse().ok(),
        Some(PageCount::Other(_)) | None => None,
    })
}

/// Body of `POST /api/books`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub description: String,
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
}

impl NewBook {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if is_blank(&self.title) || is_blank(&self.author) {
            return Err(ValidationError::new(REQUIRED_BOOK_FIELDS));
        }
        Ok(())
    }
}

/// Body of `PUT /api/books/{id}`. Fields left as `None` are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct BookUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "totalPages", skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
}

impl BookUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.genre.is_none()
            && self.description.is_none()
            && self.total_pages.is_none()
    }

    /// Required fields may be omitted from a partial update, but not blanked.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::new("Nothing to update"));
        }
        let blanked = |field: &Option<String>| field.as_deref().is_some_and(is_blank);
        if blanked(&self.title) || blanked(&self.author) {
            return Err(ValidationError::new(REQUIRED_BOOK_FIELDS));
        }
        Ok(())
    }

    /// Apply this update to a local copy of a book.
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(ref title) = self.title {
            book.title = title.clone();
        }
        if let Some(ref author) = self.author {
            book.author = author.clone();
        }
        if let Some(ref genre) = self.genre {
            book.genre = Some(genre.clone());
        }
        if let Some(ref description) = self.description {
            book.description = Some(description.clone());
        }
        if let Some(pages) = self.total_pages {
            book.total_pages = Some(pages);
        }
    }
}

/// Raw text of the add/edit book form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub description: String,
    pub total_pages: String,
}

impl BookDraft {
    /// Pre-fill the edit form from an existing book.
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            genre: book.genre.clone().unwrap_or_default(),
            description: book.description.clone().unwrap_or_default(),
            total_pages: book.total_pages.map(|n| n.to_string()).unwrap_or_default(),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn parse_pages(&self) -> Result<u32, ValidationError> {
        if is_blank(&self.title) || is_blank(&self.author) || is_blank(&self.total_pages) {
            return Err(ValidationError::new(REQUIRED_BOOK_FIELDS));
        }
        self.total_pages
            .trim()
            .parse()
            .map_err(|_| ValidationError::new("Total Pages must be a whole number"))
    }

    pub fn to_new_book(&self) -> Result<NewBook, ValidationError> {
        let total_pages = self.parse_pages()?;
        Ok(NewBook {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            genre: self.genre.trim().to_string(),
            description: self.description.trim().to_string(),
            total_pages,
        })
    }

    /// The edit form always submits every field.
    pub fn to_update(&self) -> Result<BookUpdate, ValidationError> {
        let book = self.to_new_book()?;
        Ok(BookUpdate {
            title: Some(book.title),
            author: Some(book.author),
            genre: Some(book.genre),
            description: Some(book.description),
            total_pages: Some(book.total_pages),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dune() -> Book {
        Book {
            id: "1".to_string(),
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            genre: Some("SF".to_string()),
            description: Some("...".to_string()),
            total_pages: Some(412),
        }
    }

    #[test]
    fn test_parse_book_numeric_pages() {
        let json = r#"{"_id":"1","title":"Dune","author":"Herbert","genre":"SF","description":"...","totalPages":412}"#;
        let book: Book = serde_json::from_str(json).expect("Failed to parse book JSON");
        assert_eq!(book, dune());
        assert_eq!(book.pages_display(), "412 pages");
    }

    #[test]
    fn test_parse_book_string_pages_and_missing_optionals() {
        let json = r#"{"_id":"2","title":"Emma","author":"Austen","totalPages":" 474 "}"#;
        let book: Book = serde_json::from_str(json).expect("Failed to parse book JSON");
        assert_eq!(book.total_pages, Some(474));
        assert_eq!(book.genre, None);
        assert_eq!(book.genre_display(), "");
    }

    #[test]
    fn test_parse_book_unknown_pages() {
        for pages in [r#""many""#, "null", "-3", "12.5", r#""""#] {
            let json = format!(r#"{{"_id":"3","title":"X","author":"Y","totalPages":{}}}"#, pages);
            let book: Book = serde_json::from_str(&json).expect("Failed to parse book JSON");
            assert_eq!(book.total_pages, None, "totalPages = {}", pages);
            assert_eq!(book.pages_display(), "");
        }
    }

    #[test]
    fn test_parse_book_missing_fields() {
        let book: Book = serde_json::from_str(r#"{"_id":"4","title":null}"#)
            .expect("Failed to parse book JSON");
        assert_eq!(book.title, "");
        assert_eq!(book.author, "");
        assert_eq!(book.total_pages, None);
        assert_eq!(BookDraft::from_book(&book).total_pages, "");

        // The id is still required to address the book
        assert!(serde_json::from_str::<Book>(r#"{"title":"Dune"}"#).is_err());
    }

    #[test]
    fn test_pages_display_singular() {
        let mut book = dune();
        book.total_pages = Some(1);
        assert_eq!(book.pages_display(), "1 page");
    }

    #[test]
    fn test_new_book_wire_format() {
        let body = NewBook {
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            genre: "SF".to_string(),
            description: String::new(),
            total_pages: 412,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["totalPages"], 412);
        assert_eq!(value["title"], "Dune");
        assert!(value.get("total_pages").is_none());
    }

    #[test]
    fn test_draft_requires_title_author_pages() {
        let mut draft = BookDraft {
            title: "".to_string(),
            author: "Herbert".to_string(),
            total_pages: "412".to_string(),
            ..Default::default()
        };
        assert_eq!(draft.to_new_book().unwrap_err().message(), REQUIRED_BOOK_FIELDS);

        draft.title = "Dune".to_string();
        draft.total_pages = "  ".to_string();
        assert_eq!(draft.to_new_book().unwrap_err().message(), REQUIRED_BOOK_FIELDS);

        draft.total_pages = "four hundred".to_string();
        assert!(draft.to_new_book().is_err());

        draft.total_pages = "412".to_string();
        let book = draft.to_new_book().unwrap();
        assert_eq!(book.total_pages, 412);
    }

    #[test]
    fn test_draft_round_trips_existing_book() {
        let draft = BookDraft::from_book(&dune());
        assert_eq!(draft.total_pages, "412");
        let update = draft.to_update().unwrap();
        let mut copy = dune();
        copy.title = "Old".to_string();
        update.apply_to(&mut copy);
        assert_eq!(copy, dune());
    }

    #[test]
    fn test_partial_update_skips_unset_fields() {
        let update = BookUpdate {
            total_pages: Some(500),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value, serde_json::json!({"totalPages": 500}));
    }

    #[test]
    fn test_update_validation() {
        assert!(BookUpdate::default().validate().is_err());
        let blanked = BookUpdate {
            title: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(blanked.validate().unwrap_err().message(), REQUIRED_BOOK_FIELDS);
    }
}
