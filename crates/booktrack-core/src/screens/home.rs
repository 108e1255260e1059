use tracing::debug;

use crate::api::ApiClient;
use crate::models::{Book, BookDraft};

use super::{Action, Notice, Outcome, Route, Transition};

const VIEW_BOOKS: Action = Action::new("view books", "fetch books");
const ADD_BOOK: Action = Action::new("add a book", "add book");

/// One line of the book list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRow {
    pub id: String,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub pages: String,
}

impl From<&Book> for BookRow {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            genre: book.genre_display().to_string(),
            pages: book.pages_display(),
        }
    }
}

/// The reading list plus the "Add New Book" form.
#[derive(Debug, Clone, Default)]
pub struct HomeScreen {
    books: Vec<Book>,
    pub draft: BookDraft,
}

impl HomeScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn rows(&self) -> Vec<BookRow> {
        self.books.iter().map(BookRow::from).collect()
    }

    pub fn find(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    /// Re-fetch the list. On failure the previous list stays on screen.
    pub async fn refresh(&mut self, client: &ApiClient) -> Outcome {
        match client.list_books().await {
            Ok(books) => {
                debug!(count = books.len(), "Book list refreshed");
                self.books = books;
                Outcome::stay()
            }
            Err(e) => Outcome::from_error(&e, VIEW_BOOKS),
        }
    }

    /// Submit the draft. The form is cleared and the list re-fetched only
    /// once the server has accepted the book.
    pub async fn add_book(&mut self, client: &ApiClient) -> Outcome {
        let book = match self.draft.to_new_book() {
            Ok(book) => book,
            Err(e) => return Outcome::error(e.message()),
        };

        match client.create_book(&book).await {
            Ok(created) => {
                debug!(id = %created.id, "Book created");
                self.draft.clear();
                let refreshed = self.refresh(client).await;
                if refreshed.is_error() {
                    return refreshed;
                }
                Outcome::stay().with_notice(Notice::success("Book added successfully"))
            }
            Err(e) => Outcome::from_error(&e, ADD_BOOK),
        }
    }

    /// Open the detail screen for the book at `index`.
    pub fn select(&self, index: usize) -> Outcome {
        match self.books.get(index) {
            Some(book) => Outcome::to(Transition::Navigate(Route::BookDetail(book.clone()))),
            None => Outcome::stay(),
        }
    }
}
