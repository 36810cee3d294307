use async_graphql::Object;

pub struct HelloQuery;

#[Object(name = "Query")]
impl HelloQuery {
    async fn hello(&self) -> String {
        "Helloooooo".into()
    }
}
