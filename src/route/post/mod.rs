use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;

use crate::{error, store, AppState};

pub mod model;
pub mod route;
pub mod service;

/// An error raised by a post operation.
///
/// Apart from [`Error::Store`], the messages are presented to the client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("User not found")]
	UnknownUser(i64),
	#[error("Post not found")]
	UnknownPost(i64),
	#[error("Inactive user cannot create posts")]
	InactiveAuthor(i64),
	#[error("Inactive user cannot update posts")]
	InactiveEditor(i64),
	#[error("Only author can update post")]
	UpdateByNonAuthor { post: i64, user: i64 },
	#[error("Only author can delete post")]
	DeleteByNonAuthor { post: i64, user: i64 },
	#[error("Cannot like your own post")]
	OwnPostLike { post: i64, user: i64 },
	#[error("store error: {0}")]
	Store(#[from] store::Error),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route(
			"/",
			get_with(list_posts, list_posts_docs).post_with(create_post, create_post_docs),
		)
		.api_route(
			"/:id",
			get_with(get_post, get_post_docs)
				.put_with(update_post, update_post_docs)
				.delete_with(delete_post, delete_post_docs),
		)
		.api_route("/:id/likes", post_with(toggle_like, toggle_like_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownUser(..) | Self::UnknownPost(..) => StatusCode::NOT_FOUND,
			Self::InactiveAuthor(..) | Self::InactiveEditor(..) | Self::OwnPostLike { .. } => {
				StatusCode::PRECONDITION_FAILED
			}
			Self::UpdateByNonAuthor { .. } | Self::DeleteByNonAuthor { .. } => StatusCode::FORBIDDEN,
			Self::Store(store::Error::Conflict(..)) => StatusCode::CONFLICT,
			Self::Store(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		let message = error::Message::new(self.to_string());

		match *self {
			Self::UnknownUser(user) | Self::InactiveAuthor(user) | Self::InactiveEditor(user) => {
				message.detail("user", user)
			}
			Self::UnknownPost(post) => message.detail("post", post),
			Self::UpdateByNonAuthor { post, user }
			| Self::DeleteByNonAuthor { post, user }
			| Self::OwnPostLike { post, user } => message.detail("post", post).detail("user", user),
			Self::Store(store::Error::Conflict(constraint)) => {
				error::Message::new("conflict").detail("constraint", constraint)
			}
			Self::Store(..) => error::Message::new("internal_error"),
		}
		.into_vec()
	}
}
