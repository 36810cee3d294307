use async_graphql::SimpleObject;

pub type AuthorId = i32;
pub type BookId = i32;

/// Author of the book
#[derive(SimpleObject, Clone, Debug, PartialEq, Eq)]
#[graphql(complex)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
}

/// Book name and the author
#[derive(SimpleObject, Clone, Debug, PartialEq, Eq)]
#[graphql(complex)]
pub struct Book {
    pub id: BookId,
    pub name: String,
    // Not checked against the known authors.
    pub author_id: AuthorId,
}

pub struct SeedAuthor {
    pub id: AuthorId,
    pub name: &'static str,
}

pub struct SeedBook {
    pub id: BookId,
    pub name: &'static str,
    pub author_id: AuthorId,
}

impl From<&SeedAuthor> for Author {
    fn from(seed: &SeedAuthor) -> Self {
        Self {
            id: seed.id,
            name: seed.name.into(),
        }
    }
}

impl From<&SeedBook> for Book {
    fn from(seed: &SeedBook) -> Self {
        Self {
            id: seed.id,
            name: seed.name.into(),
            author_id: seed.author_id,
        }
    }
}

pub static SEED_AUTHORS: &[SeedAuthor] = &[
    SeedAuthor {
        id: 1,
        name: "J. K. Rowling",
    },
    SeedAuthor {
        id: 2,
        name: "J. R. R. Tolkien",
    },
    SeedAuthor {
        id: 3,
        name: "Brent Weeks",
    },
];

pub static SEED_BOOKS: &[SeedBook] = &[
    SeedBook {
        id: 1,
        name: "Harry Potter and the Chamber of Secrets",
        author_id: 1,
    },
    SeedBook {
        id: 2,
        name: "Harry Potter and the Prisoner of Azkaban",
        author_id: 1,
    },
    SeedBook {
        id: 3,
        name: "Harry Potter and the Goblet of Fire",
        author_id: 1,
    },
    SeedBook {
        id: 4,
        name: "The Fellowship of the Ring",
        author_id: 2,
    },
    SeedBook {
        id: 5,
        name: "The Two Towers",
        author_id: 2,
    },
    SeedBook {
        id: 6,
        name: "The Return of the King",
        author_id: 2,
    },
    SeedBook {
        id: 7,
        name: "The Way of Shadows",
        author_id: 3,
    },
    SeedBook {
        id: 8,
        name: "Beyond the Shadows",
        author_id: 3,
    },
];
