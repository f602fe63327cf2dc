//! Post and like rules.
//!
//! Every operation runs inside a single store transaction. Returning early with
//! an error drops the transaction, so nothing it wrote is kept.

use crate::{
	model::{Post, User},
	store::{Store, Transaction},
};

use super::{model::LikeStatus, Error};

/// The most posts returned by [`list_posts`] when asking for popular ones.
pub const POPULAR_LIMIT: i64 = 10;

async fn load_user(tx: &mut dyn Transaction, user_id: i64) -> Result<User, Error> {
	tx.find_user(user_id)
		.await?
		.ok_or(Error::UnknownUser(user_id))
}

#[tracing::instrument(skip(store, title, content))]
pub async fn create_post(
	store: &dyn Store,
	user_id: i64,
	title: &str,
	content: &str,
) -> Result<Post, Error> {
	let mut tx = store.begin().await?;

	let author = load_user(tx.as_mut(), user_id).await?;
	if !author.is_active() {
		return Err(Error::InactiveAuthor(user_id));
	}

	let post = tx.insert_post(author.id, title, content).await?;
	tx.commit().await?;

	tracing::info!(post_id = post.id, "created post");

	Ok(post)
}

#[tracing::instrument(skip(store))]
pub async fn get_post(store: &dyn Store, post_id: i64) -> Result<Post, Error> {
	let mut tx = store.begin().await?;
	let post = tx.find_post(post_id).await?;

	tx.commit().await?;

	post.ok_or(Error::UnknownPost(post_id))
}

/// Lists every post newest first, or only the [`POPULAR_LIMIT`] most liked ones.
#[tracing::instrument(skip(store))]
pub async fn list_posts(store: &dyn Store, popular: bool) -> Result<Vec<Post>, Error> {
	let mut tx = store.begin().await?;
	let posts = if popular {
		tx.list_popular_posts(POPULAR_LIMIT).await?
	} else {
		tx.list_posts().await?
	};

	tx.commit().await?;

	Ok(posts)
}

/// Replaces the title and content of a post.
///
/// The requesting user must still be active and must be the author.
#[tracing::instrument(skip(store, title, content))]
pub async fn update_post(
	store: &dyn Store,
	post_id: i64,
	user_id: i64,
	title: &str,
	content: &str,
) -> Result<Post, Error> {
	let mut tx = store.begin().await?;

	let editor = load_user(tx.as_mut(), user_id).await?;
	if !editor.is_active() {
		return Err(Error::InactiveEditor(user_id));
	}

	let post = tx
		.lock_post(post_id)
		.await?
		.ok_or(Error::UnknownPost(post_id))?;

	if !post.is_author(user_id) {
		return Err(Error::UpdateByNonAuthor {
			post: post_id,
			user: user_id,
		});
	}

	let post = tx.update_post(post_id, title, content).await?;
	tx.commit().await?;

	tracing::info!("updated post");

	Ok(post)
}

#[tracing::instrument(skip(store))]
pub async fn delete_post(store: &dyn Store, post_id: i64, user_id: i64) -> Result<(), Error> {
	let mut tx = store.begin().await?;

	let post = tx
		.lock_post(post_id)
		.await?
		.ok_or(Error::UnknownPost(post_id))?;

	if !post.is_author(user_id) {
		return Err(Error::DeleteByNonAuthor {
			post: post_id,
			user: user_id,
		});
	}

	tx.delete_post(post_id).await?;
	tx.commit().await?;

	tracing::info!("deleted post");

	Ok(())
}

/// Likes the post if the user has not liked it yet, otherwise takes the like back.
#[tracing::instrument(skip(store))]
pub async fn toggle_like(store: &dyn Store, post_id: i64, user_id: i64) -> Result<LikeStatus, Error> {
	let mut tx = store.begin().await?;

	// locked first so concurrent toggles on this post queue up behind us
	let post = tx
		.lock_post(post_id)
		.await?
		.ok_or(Error::UnknownPost(post_id))?;
	let user = load_user(tx.as_mut(), user_id).await?;

	if post.is_author(user.id) {
		return Err(Error::OwnPostLike {
			post: post_id,
			user: user_id,
		});
	}

	let (like_count, liked) = match tx.find_like(post_id, user_id).await? {
		Some(like) => {
			tx.delete_like(like.id).await?;
			(tx.add_like_count(post_id, -1).await?, false)
		}
		None => {
			tx.insert_like(post_id, user_id).await?;
			(tx.add_like_count(post_id, 1).await?, true)
		}
	};

	tx.commit().await?;

	tracing::info!(
		monotonic_counter.post_likes_toggled = 1_u64,
		liked,
		like_count,
		"toggled like"
	);

	Ok(LikeStatus {
		post_id,
		like_count,
		liked,
	})
}
