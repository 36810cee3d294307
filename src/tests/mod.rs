use cynic::{MutationBuilder as _, QueryBuilder as _};
use serde_json::{Value, json};

use crate::client::{
    AddAuthor, AddAuthorVariables, AddBook, AddBookVariables, AllBooks, AuthorById, BookById,
    Client, IdVariables, Library,
};
use crate::config::Variant;
use crate::server::make_app;
use crate::store::Store;


fn catalog_server() -> testserver::Server {
    testserver::Server::with_router(make_app(Variant::Catalog, Store::seeded()))
}

async fn get(server: &testserver::Server, query: &str) -> reqwest::Response {
    let mut url = server.graphql_url();
    url.query_pairs_mut().append_pair("query", query);
    reqwest::Client::new()
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_library() {
    let server = catalog_server();
    let client = Client::new(server.graphql_url());

    let res = client.run(Library::build(())).await.data.unwrap();

    let authors: Vec<_> = res
        .authors
        .iter()
        .map(|a| (a.id, a.books.iter().map(|b| b.id).collect::<Vec<_>>()))
        .collect();
    assert_eq!(
        authors,
        [(1, vec![1, 2, 3]), (2, vec![4, 5, 6]), (3, vec![7, 8])]
    );
    assert_eq!(res.authors[1].name, "J. R. R. Tolkien");
}

#[tokio::test]
async fn test_book_by_id() {
    let server = catalog_server();
    let client = Client::new(server.graphql_url());

    let book = client
        .run(BookById::build(IdVariables { id: Some(5) }))
        .await
        .data
        .unwrap()
        .book
        .unwrap();
    assert_eq!(book.name, "The Two Towers");
    assert_eq!(book.author.unwrap().id, book.author_id);

    let missing = client.run(BookById::build(IdVariables { id: Some(999) })).await;
    assert!(missing.errors.is_none());
    assert!(missing.data.unwrap().book.is_none());

    let omitted = client.run(BookById::build(IdVariables { id: None })).await;
    assert!(omitted.data.unwrap().book.is_none());
}

#[tokio::test]
async fn test_add_book() {
    let server = catalog_server();
    let client = Client::new(server.graphql_url());

    let added = client
        .run(AddBook::build(AddBookVariables {
            name: "X".into(),
            author_id: 1,
        }))
        .await
        .data
        .unwrap()
        .add_book;
    assert_eq!(added.id, 9);

    let books = client.run(AllBooks::build(())).await.data.unwrap().books;
    assert_eq!(books.len(), 9);
    assert_eq!(books.last(), Some(&added));

    let author = client
        .run(AuthorById::build(IdVariables { id: Some(1) }))
        .await
        .data
        .unwrap()
        .author
        .unwrap();
    let ids: Vec<_> = author.books.iter().map(|b| b.id).collect();
    assert_eq!(ids, [1, 2, 3, 9]);
}

#[tokio::test]
async fn test_add_author() {
    let server = catalog_server();
    let client = Client::new(server.graphql_url());

    let added = client
        .run(AddAuthor::build(AddAuthorVariables {
            name: "Robin Hobb".into(),
        }))
        .await
        .data
        .unwrap()
        .add_author;
    assert_eq!(added.id, 4);

    let author = client
        .run(AuthorById::build(IdVariables { id: Some(4) }))
        .await
        .data
        .unwrap()
        .author
        .unwrap();
    assert_eq!(author.name, "Robin Hobb");
    assert!(author.books.is_empty());
}

#[tokio::test]
async fn test_graphiql() {
    let server = catalog_server();

    let res = reqwest::get(server.graphql_url()).await.unwrap();
    assert!(res.status().is_success());
    let page = res.text().await.unwrap();
    assert!(page.contains("graphiql"));
}

#[tokio::test]
async fn test_get_query() {
    let server = catalog_server();

    let res: Value = get(&server, "{ book(id: 2) { id name } }")
        .await
        .json()
        .await
        .unwrap();
    let book = json!({ "id": 2, "name": "Harry Potter and the Prisoner of Azkaban" });
    assert_eq!(res, json!({ "data": { "book": book } }));
}

#[tokio::test]
async fn test_get_mutation_is_rejected() {
    let store = Store::seeded();
    let server = testserver::Server::with_router(make_app(Variant::Catalog, store.clone()));

    let res = get(&server, r#"mutation { addBook(name: "X", authorId: 1) { id } }"#).await;
    assert_eq!(res.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(store.books().len(), 8);
}

#[tokio::test]
async fn test_invalid_query() {
    let server = catalog_server();

    let res: Value = reqwest::Client::new()
        .post(server.graphql_url())
        .json(&json!({ "query": "{ book(id: 1) { title } }" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(!res["errors"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_hello() {
    let server = testserver::Server::with_router(make_app(Variant::Hello, Store::seeded()));

    let res: Value = reqwest::Client::new()
        .post(server.graphql_url())
        .json(&json!({ "query": "{ hello }" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(res, json!({ "data": { "hello": "Helloooooo" } }));

    let res: Value = get(&server, "{ hello }").await.json().await.unwrap();
    assert_eq!(res, json!({ "data": { "hello": "Helloooooo" } }));
}
