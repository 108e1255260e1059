use tracing::debug;

use crate::api::ApiClient;
use crate::models::{Book, BookDraft};

use super::{Action, Notice, Outcome, Transition};

const UPDATE_BOOK: Action = Action::new("update a book", "update book");
const DELETE_BOOK: Action = Action::new("delete a book", "delete book");

/// Edit or delete a single book.
#[derive(Debug, Clone)]
pub struct BookDetailScreen {
    book: Book,
    pub draft: BookDraft,
}

impl BookDetailScreen {
    pub fn new(book: Book) -> Self {
        let draft = BookDraft::from_book(&book);
        Self { book, draft }
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    pub async fn update(&mut self, client: &ApiClient) -> Outcome {
        let update = match self.draft.to_update() {
            Ok(update) => update,
            Err(e) => return Outcome::error(e.message()),
        };

        match client.update_book(&self.book.id, &update).await {
            Ok(_) => {
                debug!(id = %self.book.id, "Book updated");
                update.apply_to(&mut self.book);
                Outcome::to(Transition::Back).with_notice(Notice::success("Book updated successfully"))
            }
            Err(e) => Outcome::from_error(&e, UPDATE_BOOK),
        }
    }

    pub async fn delete(&mut self, client: &ApiClient) -> Outcome {
        match client.delete_book(&self.book.id).await {
            Ok(_) => {
                debug!(id = %self.book.id, "Book deleted");
                Outcome::to(Transition::Back).with_notice(Notice::success("Book deleted successfully"))
            }
            Err(e) => Outcome::from_error(&e, DELETE_BOOK),
        }
    }
}
