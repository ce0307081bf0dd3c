/*
 *     Copyright (C) 2023  Fritz Ochsmann
 *
 *     This program is free software: you can redistribute it and/or modify
 *     it under the terms of the GNU Affero General Public License as published
 *     by the Free Software Foundation, either version 3 of the License, or
 *     (at your option) any later version.
 *
 *     This program is distributed in the hope that it will be useful,
 *     but WITHOUT ANY WARRANTY; without even the implied warranty of
 *     MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *     GNU Affero General Public License for more details.
 *
 *     You should have received a copy of the GNU Affero General Public License
 *     along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

#[macro_use]
extern crate serde;
#[macro_use]
extern crate thiserror;
#[macro_use]
extern crate getset;
#[macro_use]
extern crate tracing;
#[macro_use]
extern crate serde_json;

use crate::auth::middleware::load_session;
use crate::prelude::*;
use aide::axum::ApiRouter;
use aide::openapi::OpenApi;
use axum::middleware::from_fn_with_state;
use axum::{Extension, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod auth;
mod calendar;
mod cleanup;
mod config;
mod database;
mod error;
mod forms;
mod routes;
mod state;

/// Builds the application with its api documentation.
pub fn router(connection: DatabaseConnection) -> Router {
    let state = ApplicationState::from(connection);

    aide::gen::infer_responses(true);
    let mut api = OpenApi::default();

    let router = ApiRouter::new()
        .merge(routes::router(state.clone()))
        .nest_api_service("/docs", routes::openapi::router(state.clone()))
        .finish_api_with(&mut api, routes::openapi::transform_api)
        .layer(Extension(Arc::new(api)))
        .layer(from_fn_with_state(state, load_session))
        .layer(CompressionLayer::new().gzip(true))
        .layer(TraceLayer::new_for_http());
    aide::gen::infer_responses(false);

    router
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    // surface a broken environment as an error instead of a panic on first use
    config::load()?;
    lazy_static::initialize(&CONFIGURATION);

    let (cleanup_sender, cleanup_receiver) = kanal::unbounded_async::<()>();
    let (axum_sender, axum_receiver) = kanal::unbounded_async::<()>();

    let connection = database::connect().await?;
    // expired sessions are removed periodically
    cleanup::spawn(connection.clone(), cleanup_receiver);

    let addr: SocketAddr = CONFIGURATION.bind_address().parse()?;
    let server = axum::Server::try_bind(&addr)?;
    let router = router(connection);
    info!("Listening on {}", addr);

    tokio::spawn(async move {
        let result = server
            .serve(router.into_make_service())
            .with_graceful_shutdown(async move {
                axum_receiver.recv().await.ok();
            })
            .await;

        if let Err(error) = result {
            error!("Server stopped unexpectedly: {}", error);
        }
    });

    match tokio::signal::ctrl_c().await {
        Ok(()) => {}
        Err(error) => {
            error!("Unable to listen for shutdown signal: {}", error);
        }
    }

    info!("Received shutdown signal... Shutting down...");
    // shutdown
    cleanup_sender.send(()).await?;
    axum_sender.send(()).await?;

    Ok(())
}

pub mod prelude {
    pub use crate::config::CONFIGURATION;
    pub use crate::database::id::Id;
    pub use crate::database::DatabaseConnection;
    pub use crate::error::*;
    pub use crate::routes::extractor::Json;
    pub use crate::sql_span;
    pub use crate::state::ApplicationState;
    pub use async_trait::async_trait;
    pub use schemars::JsonSchema;
    pub use todo_codegen::DataWriter;
}
