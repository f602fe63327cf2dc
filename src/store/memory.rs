use std::{collections::BTreeMap, sync::Arc};

use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{Error, Result, Store, Transaction};
use crate::model::{Post, PostLike, User, UserStatus};

#[derive(Clone)]
struct UserRecord {
	id: i64,
	name: String,
	status: UserStatus,
}

#[derive(Clone)]
struct PostRecord {
	id: i64,
	author_id: i64,
	title: String,
	content: String,
	like_count: i64,
	created_at: DateTime<Utc>,
}

#[derive(Clone)]
struct LikeRecord {
	id: i64,
	post_id: i64,
	user_id: i64,
}

#[derive(Clone, Default)]
struct Tables {
	users: BTreeMap<i64, UserRecord>,
	posts: BTreeMap<i64, PostRecord>,
	likes: BTreeMap<i64, LikeRecord>,
	next_id: i64,
	tick: i64,
}

impl Tables {
	fn next_id(&mut self) -> i64 {
		self.next_id += 1;
		self.next_id
	}

	/// A logical clock, one second per row written.
	fn now(&mut self) -> DateTime<Utc> {
		self.tick += 1;
		Utc.timestamp_opt(1_700_000_000 + self.tick, 0)
			.single()
			.unwrap_or_default()
	}

	fn hydrate(&self, record: &PostRecord) -> Post {
		let author_name = self
			.users
			.get(&record.author_id)
			.map(|user| user.name.clone())
			.unwrap_or_default();

		Post {
			id: record.id,
			author_id: record.author_id,
			author_name,
			title: record.title.clone(),
			content: record.content.clone(),
			like_count: record.like_count,
			created_at: record.created_at,
		}
	}

	fn sorted(&self, key: impl Fn(&PostRecord) -> (i64, DateTime<Utc>, i64)) -> Vec<Post> {
		let mut records = self.posts.values().collect::<Vec<_>>();

		records.sort_by_key(|record| std::cmp::Reverse(key(record)));
		records.into_iter().map(|record| self.hydrate(record)).collect()
	}
}

/// A [`Store`] kept entirely in memory.
///
/// Transactions are serialized: one holds the lock from `begin` until it is
/// committed or dropped, and works on a copy of the tables in the meantime.
/// Ids come from a single counter and timestamps from a logical clock, so
/// fixtures are the same on every run.
#[derive(Clone, Default)]
pub struct MemoryStore {
	tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn insert_user(&self, name: &str) -> User {
		let mut tables = self.tables.lock().await;
		let user = UserRecord {
			id: tables.next_id(),
			name: name.into(),
			status: UserStatus::Active,
		};

		tables.users.insert(user.id, user.clone());
		User {
			id: user.id,
			status: user.status,
		}
	}

	pub async fn resign_user(&self, id: i64) {
		if let Some(user) = self.tables.lock().await.users.get_mut(&id) {
			user.status = UserStatus::Resigned;
		}
	}

	pub async fn like_rows(&self, post_id: i64) -> usize {
		self.tables
			.lock()
			.await
			.likes
			.values()
			.filter(|like| like.post_id == post_id)
			.count()
	}

	pub async fn post(&self, id: i64) -> Option<Post> {
		let tables = self.tables.lock().await;

		tables.posts.get(&id).map(|record| tables.hydrate(record))
	}
}

#[axum::async_trait]
impl Store for MemoryStore {
	async fn begin(&self) -> Result<Box<dyn Transaction>> {
		let guard = self.tables.clone().lock_owned().await;
		let work = guard.clone();

		Ok(Box::new(MemoryTransaction { guard, work }))
	}
}

pub struct MemoryTransaction {
	guard: OwnedMutexGuard<Tables>,
	work: Tables,
}

#[axum::async_trait]
impl Transaction for MemoryTransaction {
	async fn find_user(&mut self, id: i64) -> Result<Option<User>> {
		Ok(self.work.users.get(&id).map(|user| User {
			id: user.id,
			status: user.status,
		}))
	}

	async fn find_post(&mut self, id: i64) -> Result<Option<Post>> {
		Ok(self
			.work
			.posts
			.get(&id)
			.map(|record| self.work.hydrate(record)))
	}

	async fn lock_post(&mut self, id: i64) -> Result<Option<Post>> {
		self.find_post(id).await
	}

	async fn list_posts(&mut self) -> Result<Vec<Post>> {
		Ok(self.work.sorted(|p| (0, p.created_at, p.id)))
	}

	async fn list_popular_posts(&mut self, limit: i64) -> Result<Vec<Post>> {
		let mut posts = self.work.sorted(|p| (p.like_count, p.created_at, p.id));

		posts.truncate(usize::try_from(limit).unwrap_or(0));
		Ok(posts)
	}

	async fn insert_post(&mut self, author_id: i64, title: &str, content: &str) -> Result<Post> {
		let record = PostRecord {
			id: self.work.next_id(),
			author_id,
			title: title.into(),
			content: content.into(),
			like_count: 0,
			created_at: self.work.now(),
		};
		let post = self.work.hydrate(&record);

		self.work.posts.insert(record.id, record);
		Ok(post)
	}

	async fn update_post(&mut self, id: i64, title: &str, content: &str) -> Result<Post> {
		let record = self
			.work
			.posts
			.get_mut(&id)
			.ok_or(Error::Database(sqlx::Error::RowNotFound))?;

		record.title = title.into();
		record.content = content.into();

		let record = record.clone();
		Ok(self.work.hydrate(&record))
	}

	async fn delete_post(&mut self, id: i64) -> Result<()> {
		self.work.posts.remove(&id);
		self.work.likes.retain(|_, like| like.post_id != id);

		Ok(())
	}

	async fn find_like(&mut self, post_id: i64, user_id: i64) -> Result<Option<PostLike>> {
		Ok(self
			.work
			.likes
			.values()
			.find(|like| like.post_id == post_id && like.user_id == user_id)
			.map(|like| PostLike { id: like.id }))
	}

	async fn insert_like(&mut self, post_id: i64, user_id: i64) -> Result<PostLike> {
		if self.find_like(post_id, user_id).await?.is_some() {
			return Err(Error::Conflict("post_like_post_id_user_id_key"));
		}

		let like = LikeRecord {
			id: self.work.next_id(),
			post_id,
			user_id,
		};

		self.work.likes.insert(like.id, like.clone());
		Ok(PostLike { id: like.id })
	}

	async fn delete_like(&mut self, id: i64) -> Result<()> {
		self.work.likes.remove(&id);

		Ok(())
	}

	async fn add_like_count(&mut self, post_id: i64, delta: i64) -> Result<i64> {
		let record = self
			.work
			.posts
			.get_mut(&post_id)
			.ok_or(Error::Database(sqlx::Error::RowNotFound))?;

		record.like_count += delta;
		Ok(record.like_count)
	}

	async fn commit(self: Box<Self>) -> Result<()> {
		let Self { mut guard, work } = *self;

		*guard = work;
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[tokio::test]
	async fn test_dropped_transaction_is_discarded() {
		let store = MemoryStore::new();
		let user = store.insert_user("a").await;

		let mut tx = store.begin().await.unwrap();
		let post = tx.insert_post(user.id, "title", "content").await.unwrap();
		drop(tx);

		assert!(store.post(post.id).await.is_none());

		let mut tx = store.begin().await.unwrap();
		let post = tx.insert_post(user.id, "title", "content").await.unwrap();
		tx.commit().await.unwrap();

		assert_eq!(store.post(post.id).await.unwrap().author_name, "a");
	}

	#[tokio::test]
	async fn test_delete_post_removes_likes() {
		let store = MemoryStore::new();
		let author = store.insert_user("a").await;
		let reader = store.insert_user("b").await;

		let mut tx = store.begin().await.unwrap();
		let post = tx.insert_post(author.id, "title", "content").await.unwrap();
		tx.insert_like(post.id, reader.id).await.unwrap();
		assert!(matches!(
			tx.insert_like(post.id, reader.id).await,
			Err(Error::Conflict(..))
		));
		tx.delete_post(post.id).await.unwrap();
		tx.commit().await.unwrap();

		assert_eq!(store.like_rows(post.id).await, 0);
	}
}
