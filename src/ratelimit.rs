use std::{sync::Arc, time::Duration};

use axum::{
	body::Body,
	http::StatusCode,
	response::{IntoResponse, Response},
};
use governor::{
	clock::QuantaInstant,
	middleware::{RateLimitingMiddleware, StateInformationMiddleware},
};
use tower_governor::{
	governor::{GovernorConfig, GovernorConfigBuilder},
	key_extractor::{KeyExtractor, PeerIpKeyExtractor},
	GovernorError,
};

use crate::{config::Config, error::AppError};

pub type Limiter = Arc<GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>>;

/// Per-IP limits shared by every route.
///
/// Returns `None` when the configured rates cannot form a quota (a zero rate or burst).
pub fn from_config(config: &Config) -> Option<Limiter> {
	GovernorConfigBuilder::default()
		.per_second(config.rate_limit_per_second)
		.burst_size(config.rate_limit_burst)
		.use_headers()
		.error_handler(error_handler)
		.finish()
		.map(Arc::new)
}

fn error_handler(error: GovernorError) -> Response<Body> {
	match error {
		GovernorError::TooManyRequests { wait_time, headers } => {
			let mut response = AppError::RateLimited(wait_time).into_response();

			if let Some(headers) = headers {
				response.headers_mut().extend(headers);
			}

			response
		}
		error => {
			tracing::error!(?error, "rate limiter failed");

			StatusCode::INTERNAL_SERVER_ERROR.into_response()
		}
	}
}

/// Periodically drops limiter state for clients that have not been seen recently.
pub fn cleanup_old_limits<T, M>(configs: &[&Arc<GovernorConfig<T, M>>])
where
	T: KeyExtractor,
	<T as KeyExtractor>::Key: Send + Sync + 'static,
	M: RateLimitingMiddleware<QuantaInstant> + Send + Sync + 'static,
{
	let limiters = configs
		.iter()
		.map(|config| config.limiter().clone())
		.collect::<Vec<_>>();
	let interval = Duration::from_secs(60);

	std::thread::spawn(move || loop {
		std::thread::sleep(interval);

		for limiter in &limiters {
			tracing::debug!("rate limiting storage size: {}", limiter.len());

			limiter.retain_recent();
		}
	});
}
