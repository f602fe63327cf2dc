use sqlx::{PgPool, Postgres};

use super::{Error, Result, Store, Transaction};
use crate::model::{Post, PostLike, User};

const LIKE_CONSTRAINT: &str = "post_like_post_id_user_id_key";

/// Selects a post joined with its author's name.
const SELECT_POST: &str = r#"
	SELECT p.id, p.author_id, u.name AS author_name, p.title, p.content, p.like_count, p.created_at
	FROM post p
	JOIN "user" u ON u.id = p.author_id
"#;

/// A [`Store`] backed by a `PostgreSQL` connection pool.
#[derive(Clone)]
pub struct PgStore {
	pool: PgPool,
}

impl PgStore {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}
}

#[axum::async_trait]
impl Store for PgStore {
	async fn begin(&self) -> Result<Box<dyn Transaction>> {
		let tx = self.pool.begin().await?;

		Ok(Box::new(PgTransaction { tx }))
	}
}

pub struct PgTransaction {
	tx: sqlx::Transaction<'static, Postgres>,
}

#[axum::async_trait]
impl Transaction for PgTransaction {
	async fn find_user(&mut self, id: i64) -> Result<Option<User>> {
		let user = sqlx::query_as::<_, User>(r#"SELECT id, status FROM "user" WHERE id = $1"#)
			.bind(id)
			.fetch_optional(&mut *self.tx)
			.await?;

		Ok(user)
	}

	async fn find_post(&mut self, id: i64) -> Result<Option<Post>> {
		let post = sqlx::query_as::<_, Post>(&format!("{SELECT_POST} WHERE p.id = $1"))
			.bind(id)
			.fetch_optional(&mut *self.tx)
			.await?;

		Ok(post)
	}

	async fn lock_post(&mut self, id: i64) -> Result<Option<Post>> {
		let post = sqlx::query_as::<_, Post>(&format!("{SELECT_POST} WHERE p.id = $1 FOR UPDATE OF p"))
			.bind(id)
			.fetch_optional(&mut *self.tx)
			.await?;

		Ok(post)
	}

	async fn list_posts(&mut self) -> Result<Vec<Post>> {
		let posts = sqlx::query_as::<_, Post>(&format!(
			"{SELECT_POST} ORDER BY p.created_at DESC, p.id DESC"
		))
		.fetch_all(&mut *self.tx)
		.await?;

		Ok(posts)
	}

	async fn list_popular_posts(&mut self, limit: i64) -> Result<Vec<Post>> {
		let posts = sqlx::query_as::<_, Post>(&format!(
			"{SELECT_POST} ORDER BY p.like_count DESC, p.created_at DESC, p.id DESC LIMIT $1"
		))
		.bind(limit)
		.fetch_all(&mut *self.tx)
		.await?;

		Ok(posts)
	}

	async fn insert_post(&mut self, author_id: i64, title: &str, content: &str) -> Result<Post> {
		let post = sqlx::query_as::<_, Post>(
			r#"
				WITH p AS (
					INSERT INTO post (author_id, title, content)
					VALUES ($1, $2, $3)
					RETURNING *
				)
				SELECT p.id, p.author_id, u.name AS author_name, p.title, p.content, p.like_count, p.created_at
				FROM p
				JOIN "user" u ON u.id = p.author_id
			"#,
		)
		.bind(author_id)
		.bind(title)
		.bind(content)
		.fetch_one(&mut *self.tx)
		.await?;

		Ok(post)
	}

	async fn update_post(&mut self, id: i64, title: &str, content: &str) -> Result<Post> {
		let post = sqlx::query_as::<_, Post>(
			r#"
				WITH p AS (
					UPDATE post
					SET title = $2, content = $3
					WHERE id = $1
					RETURNING *
				)
				SELECT p.id, p.author_id, u.name AS author_name, p.title, p.content, p.like_count, p.created_at
				FROM p
				JOIN "user" u ON u.id = p.author_id
			"#,
		)
		.bind(id)
		.bind(title)
		.bind(content)
		.fetch_one(&mut *self.tx)
		.await?;

		Ok(post)
	}

	async fn delete_post(&mut self, id: i64) -> Result<()> {
		// post_like rows go with it through ON DELETE CASCADE
		sqlx::query("DELETE FROM post WHERE id = $1")
			.bind(id)
			.execute(&mut *self.tx)
			.await?;

		Ok(())
	}

	async fn find_like(&mut self, post_id: i64, user_id: i64) -> Result<Option<PostLike>> {
		let like = sqlx::query_as::<_, PostLike>(
			"SELECT id FROM post_like WHERE post_id = $1 AND user_id = $2",
		)
		.bind(post_id)
		.bind(user_id)
		.fetch_optional(&mut *self.tx)
		.await?;

		Ok(like)
	}

	async fn insert_like(&mut self, post_id: i64, user_id: i64) -> Result<PostLike> {
		sqlx::query_as::<_, PostLike>(
			"INSERT INTO post_like (post_id, user_id) VALUES ($1, $2) RETURNING id",
		)
		.bind(post_id)
		.bind(user_id)
		.fetch_one(&mut *self.tx)
		.await
		.map_err(|e| match e {
			sqlx::Error::Database(ref d) if d.constraint() == Some(LIKE_CONSTRAINT) => {
				Error::Conflict(LIKE_CONSTRAINT)
			}
			e => Error::Database(e),
		})
	}

	async fn delete_like(&mut self, id: i64) -> Result<()> {
		sqlx::query("DELETE FROM post_like WHERE id = $1")
			.bind(id)
			.execute(&mut *self.tx)
			.await?;

		Ok(())
	}

	async fn add_like_count(&mut self, post_id: i64, delta: i64) -> Result<i64> {
		let count = sqlx::query_scalar::<_, i64>(
			"UPDATE post SET like_count = like_count + $2 WHERE id = $1 RETURNING like_count",
		)
		.bind(post_id)
		.bind(delta)
		.fetch_one(&mut *self.tx)
		.await?;

		Ok(count)
	}

	async fn commit(self: Box<Self>) -> Result<()> {
		self.tx.commit().await?;

		Ok(())
	}
}
