#![warn(clippy::pedantic)]

mod config;
mod error;
mod extract;
mod model;
mod openapi;
mod ratelimit;
mod route;
mod store;
mod trace;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use aide::{axum::ApiRouter, openapi::OpenApi};
use axum::{
	body::Body,
	extract::Request,
	http::Response,
	Extension, ServiceExt,
};
use sqlx::postgres::PgPoolOptions;
use tower::Layer;
use tower_governor::GovernorLayer;
use tower_http::{
	compression::CompressionLayer,
	cors::CorsLayer,
	normalize_path::NormalizePathLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};
use tracing::Span;

/// The store every handler reads from and writes to.
pub type Database = Arc<dyn store::Store>;
pub type AppState = State;

/// The shared application state.
///
/// This should contain all shared dependencies that handlers need to access,
/// such as the store or a cache client.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub database: Database,
}

/// Builds the routes of the service along with their `OpenAPI` documentation.
pub fn app(state: AppState) -> axum::Router {
	let mut api = OpenApi::default();

	ApiRouter::new()
		.nest("/api/posts", route::post::routes())
		.nest("/docs", route::docs::routes())
		.finish_api_with(&mut api, openapi::docs)
		.layer(Extension(Arc::new(api)))
		.with_state(state)
}

fn make_span(request: &Request) -> Span {
	let request_id = request
		.headers()
		.get("x-request-id")
		.and_then(|value| value.to_str().ok())
		.unwrap_or_default();

	tracing::info_span!(
		"request",
		method = %request.method(),
		uri = %request.uri(),
		request_id,
	)
}

fn on_response(response: &Response<Body>, latency: Duration, _span: &Span) {
	tracing::info!(
		histogram.latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
		status = response.status().as_u16(),
		"finished request"
	);
}

async fn shutdown_signal() {
	if let Err(error) = tokio::signal::ctrl_c().await {
		tracing::error!(%error, "failed to listen for shutdown signal");
	}

	tracing::info!("shutting down");
}

#[tokio::main]
async fn main() {
	let config = config::Config::from_env().expect("failed to read configuration");
	let _otel = trace::init_tracing_subscriber(&config).expect("failed to initialize tracing");

	let pool = PgPoolOptions::new()
		.max_connections(config.database_max_connections)
		.connect(&config.database_url)
		.await
		.expect("failed to connect to database");

	sqlx::migrate!()
		.run(&pool)
		.await
		.expect("failed to run migrations");

	let state = State {
		database: Arc::new(store::PgStore::new(pool)),
	};

	let limiter = ratelimit::from_config(&config).expect("rate limits must be non-zero");
	ratelimit::cleanup_old_limits(&[&limiter]);

	let app = app(state)
		.layer(
			TraceLayer::new_for_http()
				.make_span_with(make_span)
				.on_response(on_response),
		)
		.layer(GovernorLayer { config: limiter })
		.layer(CompressionLayer::new())
		.layer(CorsLayer::permissive())
		.layer(PropagateRequestIdLayer::x_request_id())
		.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

	// the path has to be normalized before the router sees it
	let app = NormalizePathLayer::trim_trailing_slash().layer(app);

	let listener = tokio::net::TcpListener::bind((config.host, config.port))
		.await
		.expect("failed to bind to port");

	tracing::info!("listening on {}:{}", config.host, config.port);

	axum::serve(
		listener,
		ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
	)
	.with_graceful_shutdown(shutdown_signal())
	.await
	.expect("server failed");
}
