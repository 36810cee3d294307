use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::info;

use crate::datamodel::{Author, AuthorId, Book, BookId, SEED_AUTHORS, SEED_BOOKS};

struct Catalog {
    authors: Vec<Author>,
    books: Vec<Book>,
    next_author_id: AuthorId,
    next_book_id: BookId,
}

/// Shared handle to the in-memory authors and books.
///
/// Every read and write goes through a single lock, so concurrent requests
/// observe the same serial order of `add_*` calls.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Mutex<Catalog>>,
}

impl Store {
    #[cfg(test)]
    pub fn empty() -> Self {
        Self::with(Vec::new(), Vec::new())
    }

    pub fn seeded() -> Self {
        Self::with(
            SEED_AUTHORS.iter().map(Author::from).collect(),
            SEED_BOOKS.iter().map(Book::from).collect(),
        )
    }

    fn with(authors: Vec<Author>, books: Vec<Book>) -> Self {
        let next_author_id = authors.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        let next_book_id = books.iter().map(|b| b.id).max().unwrap_or(0) + 1;
        let catalog = Catalog {
            authors,
            books,
            next_author_id,
            next_book_id,
        };
        Self {
            inner: Arc::new(Mutex::new(catalog)),
        }
    }

    // Writers never leave the catalog half-updated, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Catalog> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn authors(&self) -> Vec<Author> {
        self.lock().authors.clone()
    }

    pub fn author(&self, id: AuthorId) -> Option<Author> {
        self.lock().authors.iter().find(|a| a.id == id).cloned()
    }

    pub fn books(&self) -> Vec<Book> {
        self.lock().books.clone()
    }

    pub fn book(&self, id: BookId) -> Option<Book> {
        self.lock().books.iter().find(|b| b.id == id).cloned()
    }

    /// Groups the books of each requested author, in insertion order.
    ///
    /// Every requested id is present in the result, authors without books map
    /// to an empty list.
    pub fn books_by_authors(&self, ids: &[AuthorId]) -> HashMap<AuthorId, Vec<Book>> {
        let mut books: HashMap<_, Vec<Book>> = ids.iter().map(|id| (*id, Vec::new())).collect();
        for book in &self.lock().books {
            if let Some(by_author) = books.get_mut(&book.author_id) {
                by_author.push(book.clone());
            }
        }
        books
    }

    /// Looks up the requested authors. Unknown ids are absent from the result.
    pub fn authors_by_ids(&self, ids: &[AuthorId]) -> HashMap<AuthorId, Author> {
        self.lock()
            .authors
            .iter()
            .filter(|a| ids.contains(&a.id))
            .map(|a| (a.id, a.clone()))
            .collect()
    }

    pub fn add_book(&self, name: String, author_id: AuthorId) -> Book {
        let mut catalog = self.lock();
        let book = Book {
            id: catalog.next_book_id,
            name,
            author_id,
        };
        catalog.next_book_id += 1;
        catalog.books.push(book.clone());

        info!(book.id = book.id, book.author_id = book.author_id, "added book");
        book
    }

    pub fn add_author(&self, name: String) -> Author {
        let mut catalog = self.lock();
        let author = Author {
            id: catalog.next_author_id,
            name,
        };
        catalog.next_author_id += 1;
        catalog.authors.push(author.clone());

        info!(author.id = author.id, "added author");
        author
    }

    /// Appends `book` as is, without assigning a fresh id.
    #[cfg(test)]
    pub fn insert_book(&self, book: Book) {
        let mut catalog = self.lock();
        catalog.next_book_id = catalog.next_book_id.max(book.id + 1);
        catalog.books.push(book);
    }
}
