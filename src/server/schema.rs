use async_graphql::{ComplexObject, Context, Object};

use crate::datamodel::{Author, AuthorId, Book, BookId};
use crate::store::Store;

use super::loaders::Loaders;

#[ComplexObject]
impl Author {
    async fn books(&self, ctx: &Context<'_>) -> Vec<Book> {
        ctx.load_books(self.id).await
    }
}

#[ComplexObject]
impl Book {
    /// `null` when no author with `authorId` exists.
    async fn author(&self, ctx: &Context<'_>) -> Option<Author> {
        ctx.load_author(self.author_id).await
    }
}

fn store<'a>(ctx: &Context<'a>) -> &'a Store {
    ctx.data_unchecked::<Store>()
}

pub struct RootQuery;

/// Root Query
#[Object(name = "Query")]
impl RootQuery {
    /// A single book
    async fn book(&self, ctx: &Context<'_>, id: Option<BookId>) -> Option<Book> {
        id.and_then(|id| store(ctx).book(id))
    }

    /// List of all books
    async fn books(&self, ctx: &Context<'_>) -> Vec<Book> {
        store(ctx).books()
    }

    /// A single author
    async fn author(&self, ctx: &Context<'_>, id: Option<AuthorId>) -> Option<Author> {
        id.and_then(|id| store(ctx).author(id))
    }

    /// List of authors
    async fn authors(&self, ctx: &Context<'_>) -> Vec<Author> {
        store(ctx).authors()
    }
}

pub struct RootMutation;

/// Root Mutation
#[Object(name = "Mutation")]
impl RootMutation {
    /// Add a book
    async fn add_book(&self, ctx: &Context<'_>, name: String, author_id: AuthorId) -> Book {
        let book = store(ctx).add_book(name, author_id);
        ctx.clear_loaders();
        book
    }

    /// Add an author
    async fn add_author(&self, ctx: &Context<'_>, name: String) -> Author {
        let author = store(ctx).add_author(name);
        ctx.clear_loaders();
        author
    }
}
