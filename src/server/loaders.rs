use std::collections::HashMap;

use async_graphql::Context;
use tracing::debug;

use crate::datamodel::{Author, AuthorId, Book};
use crate::store::Store;

use super::dataloader::{BatchLoader, DataLoader};

pub trait Loaders {
    async fn load_books(&self, author: AuthorId) -> Vec<Book>;
    async fn load_author(&self, id: AuthorId) -> Option<Author>;
    /// Must be called after every store write.
    fn clear_loaders(&self);
}

impl Loaders for Context<'_> {
    async fn load_books(&self, author: AuthorId) -> Vec<Book> {
        self.data_unchecked::<DataLoader<LoadBooks>>()
            .load(author)
            .await
            .unwrap_or_default()
    }

    async fn load_author(&self, id: AuthorId) -> Option<Author> {
        self.data_unchecked::<DataLoader<LoadAuthors>>()
            .load(id)
            .await
    }

    fn clear_loaders(&self) {
        self.data_unchecked::<DataLoader<LoadBooks>>().clear();
        self.data_unchecked::<DataLoader<LoadAuthors>>().clear();
    }
}

/// Books grouped by their `author_id`.
pub struct LoadBooks {
    pub store: Store,
}
impl BatchLoader for LoadBooks {
    type K = AuthorId;
    type V = Vec<Book>;

    fn load_batch(
        &mut self,
        keys: Vec<Self::K>,
    ) -> impl Future<Output = HashMap<Self::K, Self::V>> + Send + 'static {
        let store = self.store.clone();
        async move {
            debug!(authors = ?keys, "resolving books by author");
            store.books_by_authors(&keys)
        }
    }
}

pub struct LoadAuthors {
    pub store: Store,
}
impl BatchLoader for LoadAuthors {
    type K = AuthorId;
    type V = Author;

    fn load_batch(
        &mut self,
        keys: Vec<Self::K>,
    ) -> impl Future<Output = HashMap<Self::K, Self::V>> + Send + 'static {
        let store = self.store.clone();
        async move {
            debug!(ids = ?keys, "resolving authors");
            store.authors_by_ids(&keys)
        }
    }
}
