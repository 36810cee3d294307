use async_graphql::http::{GraphiQLSource, parse_query_string};
use async_graphql::parser::parse_query;
use async_graphql::parser::types::{DocumentOperations, OperationType};
use async_graphql::{EmptyMutation, EmptySubscription, Request, Response, Schema};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::Router;
use axum::extract::{RawQuery, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response as HttpResponse};
use axum::routing::get;
use tracing::{Instrument as _, info_span};

use crate::config::Variant;
use crate::store::Store;

mod dataloader;
mod hello;
mod loaders;
mod schema;

use dataloader::DataLoader;
use hello::HelloQuery;
use loaders::{LoadAuthors, LoadBooks};
use schema::{RootMutation, RootQuery};

pub const GRAPHQL_PATH: &str = "/graphql";

pub type CatalogSchema = Schema<RootQuery, RootMutation, EmptySubscription>;
pub type HelloSchema = Schema<HelloQuery, EmptyMutation, EmptySubscription>;

#[derive(Clone)]
struct CatalogState {
    schema: CatalogSchema,
    store: Store,
}

pub fn catalog_schema(store: Store) -> CatalogSchema {
    Schema::build(RootQuery, RootMutation, EmptySubscription)
        .data(store)
        .finish()
}

pub fn hello_schema() -> HelloSchema {
    Schema::build(HelloQuery, EmptyMutation, EmptySubscription).finish()
}

/// The SDL of the given variant, as served by [`make_app`].
pub fn sdl(variant: Variant) -> String {
    match variant {
        Variant::Catalog => catalog_schema(Store::seeded()).sdl(),
        Variant::Hello => hello_schema().sdl(),
    }
}

/// Runs `req` with fresh per-request loaders, so relations are resolved in batches.
pub async fn execute_catalog(schema: &CatalogSchema, store: &Store, req: Request) -> Response {
    let load_books = DataLoader::new(LoadBooks {
        store: store.clone(),
    });
    let load_authors = DataLoader::new(LoadAuthors {
        store: store.clone(),
    });
    let req = req.data(load_books.clone()).data(load_authors.clone());

    let execute = schema.execute(req);
    load_authors.wrap(load_books.wrap(execute)).await
}

fn graphiql() -> HttpResponse {
    Html(GraphiQLSource::build().endpoint(GRAPHQL_PATH).finish()).into_response()
}

/// How a `GET` on the endpoint is answered.
enum GetRequest {
    Explorer,
    Execute(Request),
    Reject(HttpResponse),
}

/// Requests without a `query` parameter get the GraphiQL explorer.
/// Mutations are only accepted over `POST`.
fn get_request(raw: Option<&str>) -> GetRequest {
    let Some(raw) = raw.filter(|q| !q.is_empty()) else {
        return GetRequest::Explorer;
    };
    let req = match parse_query_string(raw) {
        Ok(req) => req,
        Err(err) => {
            return GetRequest::Reject((StatusCode::BAD_REQUEST, err.to_string()).into_response());
        }
    };

    if req.query.is_empty() {
        GetRequest::Explorer
    } else if is_mutation(&req) {
        GetRequest::Reject(
            (
                StatusCode::METHOD_NOT_ALLOWED,
                [(header::ALLOW, "POST")],
                "mutations can only be sent with POST",
            )
                .into_response(),
        )
    } else {
        GetRequest::Execute(req)
    }
}

fn is_mutation(req: &Request) -> bool {
    // Syntax errors are left to the executor to report.
    let Ok(doc) = parse_query(&req.query) else {
        return false;
    };
    let operation = match &doc.operations {
        DocumentOperations::Single(op) => Some(op),
        DocumentOperations::Multiple(ops) => match req.operation_name.as_deref() {
            Some(name) => ops.get(name),
            None if ops.len() == 1 => ops.values().next(),
            None => None,
        },
    };
    operation.is_some_and(|op| op.node.ty == OperationType::Mutation)
}

async fn run_catalog(state: &CatalogState, req: Request) -> GraphQLResponse {
    let span = info_span!(
        "graphql_request",
        variant = "catalog",
        operation = req.operation_name.as_deref()
    );
    execute_catalog(&state.schema, &state.store, req)
        .instrument(span)
        .await
        .into()
}

async fn run_hello(schema: &HelloSchema, req: Request) -> GraphQLResponse {
    let span = info_span!(
        "graphql_request",
        variant = "hello",
        operation = req.operation_name.as_deref()
    );
    schema.execute(req).instrument(span).await.into()
}

#[axum::debug_handler]
async fn catalog_get(State(state): State<CatalogState>, RawQuery(raw): RawQuery) -> HttpResponse {
    match get_request(raw.as_deref()) {
        GetRequest::Explorer => graphiql(),
        GetRequest::Execute(req) => run_catalog(&state, req).await.into_response(),
        GetRequest::Reject(res) => res,
    }
}

#[axum::debug_handler]
async fn catalog_post(State(state): State<CatalogState>, req: GraphQLRequest) -> GraphQLResponse {
    run_catalog(&state, req.into_inner()).await
}

#[axum::debug_handler]
async fn hello_get(State(schema): State<HelloSchema>, RawQuery(raw): RawQuery) -> HttpResponse {
    match get_request(raw.as_deref()) {
        GetRequest::Explorer => graphiql(),
        GetRequest::Execute(req) => run_hello(&schema, req).await.into_response(),
        GetRequest::Reject(res) => res,
    }
}

#[axum::debug_handler]
async fn hello_post(State(schema): State<HelloSchema>, req: GraphQLRequest) -> GraphQLResponse {
    run_hello(&schema, req.into_inner()).await
}

pub fn make_app(variant: Variant, store: Store) -> Router {
    match variant {
        Variant::Catalog => {
            let state = CatalogState {
                schema: catalog_schema(store.clone()),
                store,
            };
            Router::new()
                .route(GRAPHQL_PATH, get(catalog_get).post(catalog_post))
                .with_state(state)
        }
        Variant::Hello => Router::new()
            .route(GRAPHQL_PATH, get(hello_get).post(hello_post))
            .with_state(hello_schema()),
    }
}
