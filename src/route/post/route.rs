use axum::extract::State;
use macros::route;

use crate::{
	extract::{Json, Path, Query},
	openapi::tag,
	Database,
};

use super::{model, service, RouteError};

/// Create post
/// Creates a new post written by the given user, who must be active.
#[route(
	tag = tag::POST,
	error(status = 404, description = "The user does not exist."),
	error(status = 412, description = "The user is no longer active.")
)]
pub async fn create_post(
	State(database): State<Database>,
	Json(input): Json<model::PostInput>,
) -> Result<Json<model::Post>, RouteError> {
	let post = service::create_post(&*database, input.user_id, &input.title, &input.content).await?;

	Ok(Json(post))
}

/// Get single post
/// Returns a single post by its unique id.
#[route(tag = tag::POST, error(status = 404, description = "The post does not exist."))]
pub async fn get_post(
	State(database): State<Database>,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::Post>, RouteError> {
	Ok(Json(service::get_post(&*database, path.id).await?))
}

/// List posts
/// Returns every post newest first or, with `popular=true`, the ten most liked posts.
#[route(tag = tag::POST)]
pub async fn list_posts(
	State(database): State<Database>,
	Query(input): Query<model::ListInput>,
) -> Result<Json<Vec<model::Post>>, RouteError> {
	Ok(Json(service::list_posts(&*database, input.popular).await?))
}

/// Update post
/// Replaces the title and content of a post. Only its author may do so, and only while active.
#[route(
	tag = tag::POST,
	error(status = 403, description = "The user is not the author of the post."),
	error(status = 404, description = "The user or post does not exist."),
	error(status = 412, description = "The user is no longer active.")
)]
pub async fn update_post(
	State(database): State<Database>,
	Path(path): Path<model::IdInput>,
	Json(input): Json<model::PostInput>,
) -> Result<Json<model::Post>, RouteError> {
	let post = service::update_post(
		&*database,
		path.id,
		input.user_id,
		&input.title,
		&input.content,
	)
	.await?;

	Ok(Json(post))
}

/// Delete post
/// Deletes a post and its likes. Only its author may do so.
#[route(
	tag = tag::POST,
	error(status = 403, description = "The user is not the author of the post."),
	error(status = 404, description = "The post does not exist.")
)]
pub async fn delete_post(
	State(database): State<Database>,
	Path(path): Path<model::IdInput>,
	Query(input): Query<model::DeleteInput>,
) -> Result<(), RouteError> {
	service::delete_post(&*database, path.id, input.user_id).await?;

	Ok(())
}

/// Toggle like
/// Likes the post if the user has not liked it yet, otherwise removes the like. Authors cannot like their own posts.
#[route(
	tag = tag::LIKE,
	error(status = 404, description = "The user or post does not exist."),
	error(status = 412, description = "The user wrote the post.")
)]
pub async fn toggle_like(
	State(database): State<Database>,
	Path(path): Path<model::IdInput>,
	Json(input): Json<model::LikeInput>,
) -> Result<Json<model::LikeStatus>, RouteError> {
	Ok(Json(
		service::toggle_like(&*database, path.id, input.user_id).await?,
	))
}
