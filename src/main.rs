use anyhow::Context as _;
use clap::Parser as _;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

use config::Options;
use server::make_app;
use store::Store;

mod config;
mod datamodel;
mod server;
mod store;

#[cfg(test)]
mod tests;

fn init_tracing() {
    let filter_layer = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,catalog=debug"));
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for ctrl-c, graceful shutdown disabled");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let options = Options::parse();

    if options.print_schema {
        print!("{}", server::sdl(options.variant));
        return Ok(());
    }

    init_tracing();

    let app = make_app(options.variant, Store::seeded());

    let listener = tokio::net::TcpListener::bind(options.listen)
        .await
        .with_context(|| format!("failed to bind {}", options.listen))?;
    info!(
        address = %options.listen,
        variant = ?options.variant,
        "serving GraphQL at {}",
        server::GRAPHQL_PATH
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}
