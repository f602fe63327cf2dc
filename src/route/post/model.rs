pub use crate::{model::Post, route::model::IdInput};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// The body used to create or replace a post.
#[derive(Debug, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostInput {
	/// The user performing the request.
	#[validate(range(min = 1))]
	pub user_id: i64,
	/// The title of the post.
	#[validate(length(min = 1, max = 255))]
	pub title: String,
	/// The body of the post.
	#[validate(length(min = 1))]
	pub content: String,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeInput {
	/// The user liking or unliking the post.
	#[validate(range(min = 1))]
	pub user_id: i64,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteInput {
	/// The user deleting the post, who must be its author.
	#[validate(range(min = 1))]
	pub user_id: i64,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct ListInput {
	/// Return only the ten most liked posts instead of every post.
	#[serde(default)]
	pub popular: bool,
}

/// The state of a post's likes after a toggle.
#[derive(Debug, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatus {
	pub post_id: i64,
	/// The number of likes on the post, including this toggle.
	pub like_count: i64,
	/// Whether the user now likes the post.
	pub liked: bool,
}
