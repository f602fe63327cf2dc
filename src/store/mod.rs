//! Persistence for users, posts and likes.
//!
//! All access goes through a [`Transaction`] opened with [`Store::begin`].
//! Nothing is persisted until [`Transaction::commit`] is called; dropping a
//! transaction rolls it back.

#[cfg(test)]
pub mod memory;
pub mod postgres;

use crate::model::{Post, PostLike, User};

pub use postgres::PgStore;

/// An error raised by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("unique constraint {0} violated")]
	Conflict(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

#[axum::async_trait]
pub trait Store: Send + Sync {
	async fn begin(&self) -> Result<Box<dyn Transaction>>;
}

#[axum::async_trait]
pub trait Transaction: Send {
	async fn find_user(&mut self, id: i64) -> Result<Option<User>>;

	async fn find_post(&mut self, id: i64) -> Result<Option<Post>>;

	/// Like [`Transaction::find_post`], but holds the post against concurrent
	/// writers until the transaction ends.
	async fn lock_post(&mut self, id: i64) -> Result<Option<Post>>;

	/// All posts, newest first.
	async fn list_posts(&mut self) -> Result<Vec<Post>>;

	/// The `limit` most liked posts, newest first among equal counts.
	async fn list_popular_posts(&mut self, limit: i64) -> Result<Vec<Post>>;

	async fn insert_post(&mut self, author_id: i64, title: &str, content: &str) -> Result<Post>;

	async fn update_post(&mut self, id: i64, title: &str, content: &str) -> Result<Post>;

	/// Deletes a post along with its likes.
	async fn delete_post(&mut self, id: i64) -> Result<()>;

	async fn find_like(&mut self, post_id: i64, user_id: i64) -> Result<Option<PostLike>>;

	async fn insert_like(&mut self, post_id: i64, user_id: i64) -> Result<PostLike>;

	async fn delete_like(&mut self, id: i64) -> Result<()>;

	/// Adds `delta` to the post's like count, returning the new count.
	async fn add_like_count(&mut self, post_id: i64, delta: i64) -> Result<i64>;

	async fn commit(self: Box<Self>) -> Result<()>;
}
