use schemars::JsonSchema;
use serde::Serialize;

/// Whether a user may still author posts.
///
/// A user moves from `Active` to `Resigned` exactly once and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
	Active,
	Resigned,
}

/// The part of a user that decides what they may do.
///
/// Users are owned by an external user-management system, this service
/// only ever reads them.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
	pub id: i64,
	pub status: UserStatus,
}

impl User {
	pub fn is_active(&self) -> bool {
		self.status == UserStatus::Active
	}
}

/// A single post, together with the name of its author.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
	/// The unique identifier of the post.
	pub id: i64,
	/// The user that wrote the post.
	pub author_id: i64,
	/// The display name of the author.
	pub author_name: String,
	/// The title of the post.
	pub title: String,
	/// The body of the post.
	pub content: String,
	/// The number of users that currently like the post.
	pub like_count: i64,
	/// The creation time of the post.
	pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Post {
	pub fn is_author(&self, user_id: i64) -> bool {
		self.author_id == user_id
	}
}

/// A like left by a user on a post. At most one exists per (post, user).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostLike {
	pub id: i64,
}
