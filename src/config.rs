use std::net::SocketAddr;

use clap::{Parser, ValueEnum};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    /// Books and their authors, with `addBook` and `addAuthor` mutations.
    Catalog,
    /// A single `hello` query.
    Hello,
}

#[derive(Parser, Debug)]
#[command(about = "Serves a small in-memory GraphQL API")]
pub struct Options {
    #[arg(long, default_value = "0.0.0.0:5000")]
    pub listen: SocketAddr,

    /// Which schema to serve at `/graphql`.
    #[arg(long, value_enum, default_value_t = Variant::Catalog)]
    pub variant: Variant,

    /// Print the schema SDL and exit.
    #[arg(long)]
    pub print_schema: bool,
}
