use chrono::Utc;
use serde_json::{Map, Value};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::marker::PhantomData;

use super::filter::{json_path, Field, Filter, Scalar};
use super::{timestamp, Document, StoreError};

/// Typed handle on one collection.
///
/// Reads return owned values decoded from the stored JSON; there is no live
/// handle back into the store.
pub struct Collection<T> {
    pool: SqlitePool,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("pool", &self.pool)
            .finish()
    }
}

impl<T: Document> Collection<T> {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        T::COLLECTION
    }

    /// Insert a new document and return it as stored.
    pub async fn insert(&self, doc: &T) -> Result<T, StoreError> {
        let json = serde_json::to_string(doc)?;

        sqlx::query(&format!(
            "INSERT INTO {} (id, doc_key, slug, doc, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
            T::COLLECTION
        ))
        .bind(doc.id())
        .bind(doc.key())
        .bind(doc.slug())
        .bind(&json)
        .bind(timestamp(doc.created_at()))
        .bind(timestamp(doc.updated_at()))
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::from_write(T::COLLECTION, e))?;

        self.find_by_id(doc.id())
            .await?
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))
    }

    /// Documents matching `filter`, newest first, skipping `skip` and taking
    /// at most `limit`.
    pub async fn find(&self, filter: &Filter, skip: u64, limit: u64) -> Result<Vec<T>, StoreError> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT doc FROM {}", T::COLLECTION));
        filter.push_where(&mut qb);
        qb.push(" ORDER BY created_at DESC, seq DESC LIMIT ");
        qb.push_bind(to_i64(limit));
        qb.push(" OFFSET ");
        qb.push_bind(to_i64(skip));

        let rows: Vec<String> = qb.build_query_scalar().fetch_all(&self.pool).await?;
        rows.iter().map(|doc| decode(doc)).collect()
    }

    pub async fn count(&self, filter: &Filter) -> Result<u64, StoreError> {
        let mut qb =
            QueryBuilder::<Sqlite>::new(format!("SELECT COUNT(*) FROM {}", T::COLLECTION));
        filter.push_where(&mut qb);

        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    pub async fn find_one(&self, filter: &Filter) -> Result<Option<T>, StoreError> {
        Ok(self.find(filter, 0, 1).await?.into_iter().next())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<T>, StoreError> {
        self.find_one(&Filter::new().eq(Field::Id, id)).await
    }

    /// Whether any document matches, without decoding it.
    pub async fn exists(&self, filter: &Filter) -> Result<bool, StoreError> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT 1 FROM {}", T::COLLECTION));
        filter.push_where(&mut qb);
        qb.push(" LIMIT 1");

        let row: Option<i64> = qb.build_query_scalar().fetch_optional(&self.pool).await?;
        Ok(row.is_some())
    }

    /// Overwrite the top-level fields in `patch` on the document with store
    /// id `id` and return the post-write document. Fields not in `patch` are
    /// left untouched. Returns `None` when no document has that id.
    ///
    /// The write is a single statement, so it is atomic with respect to
    /// concurrent writers of the same document.
    pub async fn update_by_id(
        &self,
        id: &str,
        patch: &Map<String, Value>,
    ) -> Result<Option<T>, StoreError> {
        let now = timestamp(Utc::now());

        let mut qb =
            QueryBuilder::<Sqlite>::new(format!("UPDATE {} SET doc = json_set(doc", T::COLLECTION));
        for (field, value) in patch {
            qb.push(", ");
            qb.push_bind(json_path(field));
            qb.push(", json(");
            qb.push_bind(value.to_string());
            qb.push(")");
        }
        qb.push(", '$.updated_at', ");
        qb.push_bind(now.clone());
        qb.push("), updated_at = ");
        qb.push_bind(now);

        if let Some(key) = patch.get(T::KEY_FIELD).and_then(Value::as_str) {
            qb.push(", doc_key = ");
            qb.push_bind(key.to_string());
        }
        if let Some(slug) = patch.get("slug").and_then(Value::as_str) {
            qb.push(", slug = ");
            qb.push_bind(slug.to_string());
        }

        qb.push(" WHERE id = ");
        qb.push_bind(id.to_string());
        qb.push(" RETURNING doc");

        let row: Option<String> = qb
            .build_query_scalar()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::from_write(T::COLLECTION, e))?;

        row.as_deref().map(decode).transpose()
    }

    /// Add each `(path, delta)` to the numeric field at `path` (a missing
    /// field counts as zero) on the first document matching `filter`.
    ///
    /// The increments are applied by the database in one statement, so
    /// concurrent increments compose instead of overwriting each other.
    /// Integer sums must stay within `i64` and real sums within
    /// [`MAX_STORED_REAL`]; otherwise nothing is written and
    /// [`StoreError::OutOfRange`] is returned.
    pub async fn increment(
        &self,
        filter: &Filter,
        deltas: &[(&'static str, Scalar)],
    ) -> Result<Option<T>, StoreError> {
        let now = timestamp(Utc::now());

        let mut qb =
            QueryBuilder::<Sqlite>::new(format!("UPDATE {} SET doc = json_set(doc", T::COLLECTION));
        for (path, delta) in deltas {
            qb.push(", ");
            qb.push_bind(json_path(path));
            qb.push(", COALESCE(json_extract(doc, ");
            qb.push_bind(json_path(path));
            qb.push("), 0) + ");
            delta.push_bind(&mut qb);
        }
        qb.push(", '$.updated_at', ");
        qb.push_bind(now.clone());
        qb.push("), updated_at = ");
        qb.push_bind(now);

        qb.push(format!(
            " WHERE seq = (SELECT seq FROM {}",
            T::COLLECTION
        ));
        filter.push_where(&mut qb);
        qb.push(" LIMIT 1)");
        for (path, delta) in deltas {
            push_range_guard(&mut qb, path, delta);
        }
        qb.push(" RETURNING doc");

        let row: Option<String> = qb
            .build_query_scalar()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::from_write(T::COLLECTION, e))?;

        match row {
            Some(doc) => decode(&doc).map(Some),
            // Documents are never deleted, so a match here means a guard
            // refused the write.
            None if self.exists(filter).await? => Err(StoreError::OutOfRange {
                collection: T::COLLECTION,
            }),
            None => Ok(None),
        }
    }
}

/// Largest real an increment may produce. Kept well below `f64::MAX` so the
/// text SQLite renders for the value still parses back as a finite `f64`.
pub const MAX_STORED_REAL: f64 = 1e300;

/// ` AND <current value of path> + delta stays representable`.
fn push_range_guard(qb: &mut QueryBuilder<'_, Sqlite>, path: &str, delta: &Scalar) {
    match delta {
        Scalar::Integer(d) if *d >= 0 => {
            push_current(qb, path);
            qb.push(" <= ");
            qb.push_bind(i64::MAX - d);
        }
        Scalar::Integer(d) => {
            push_current(qb, path);
            qb.push(" >= ");
            qb.push_bind(i64::MIN - d);
        }
        Scalar::Real(r) => {
            // An infinite or NaN sum fails the comparison too.
            push_current(qb, path);
            qb.push(" + ");
            qb.push_bind(*r);
            qb.push(" BETWEEN ");
            qb.push_bind(-MAX_STORED_REAL);
            qb.push(" AND ");
            qb.push_bind(MAX_STORED_REAL);
        }
        Scalar::Text(_) | Scalar::Bool(_) => {}
    }
}

fn push_current(qb: &mut QueryBuilder<'_, Sqlite>, path: &str) {
    qb.push(" AND COALESCE(json_extract(doc, ");
    qb.push_bind(json_path(path));
    qb.push("), 0)");
}

fn decode<T: Document>(doc: &str) -> Result<T, StoreError> {
    Ok(serde_json::from_str(doc)?)
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::new_object_id;
    use crate::db::test_support::setup_db;
    use crate::models::Workout;
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn workout(uid: &str, difficulty: &str, minutes: u32, age_secs: i64) -> Workout {
        let at = Utc::now() - Duration::seconds(age_secs);
        serde_json::from_value(json!({
            "_id": new_object_id(),
            "uid": uid,
            "slug": format!("{}-slug", uid),
            "title": format!("Workout {}", uid),
            "difficulty": difficulty,
            "duration_minutes": minutes,
            "created_at": at,
            "updated_at": at,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find_by_id() {
        let db = setup_db().await;
        let workouts = Collection::<Workout>::new(db.pool.clone());

        let w = workout("w1", "easy", 10, 0);
        let created = workouts.insert(&w).await.unwrap();
        assert_eq!(created.uid, "w1");

        let fetched = workouts.find_by_id(&w.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert!(workouts.find_by_id(&new_object_id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_key_and_slug_rejected() {
        let db = setup_db().await;
        let workouts = Collection::<Workout>::new(db.pool.clone());

        workouts.insert(&workout("w1", "easy", 10, 0)).await.unwrap();

        let err = workouts
            .insert(&workout("w1", "easy", 10, 0))
            .await
            .unwrap_err();
        assert!(err.is_duplicate_key());

        let mut same_slug = workout("w2", "easy", 10, 0);
        same_slug.slug = "w1-slug".to_string();
        let err = workouts.insert(&same_slug).await.unwrap_err();
        assert!(err.is_duplicate_key());
    }

    #[tokio::test]
    async fn test_find_sorts_newest_first_and_paginates() {
        let db = setup_db().await;
        let workouts = Collection::<Workout>::new(db.pool.clone());

        for (i, uid) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            // "a" is oldest, "e" newest
            workouts
                .insert(&workout(uid, "easy", 10, 100 - i as i64))
                .await
                .unwrap();
        }

        let all = Filter::new();
        let first: Vec<String> = workouts
            .find(&all, 0, 2)
            .await
            .unwrap()
            .into_iter()
            .map(|w| w.uid)
            .collect();
        let second: Vec<String> = workouts
            .find(&all, 2, 2)
            .await
            .unwrap()
            .into_iter()
            .map(|w| w.uid)
            .collect();

        assert_eq!(first, vec!["e", "d"]);
        assert_eq!(second, vec!["c", "b"]);
        assert_eq!(workouts.count(&all).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_filters_by_path_and_range() {
        let db = setup_db().await;
        let workouts = Collection::<Workout>::new(db.pool.clone());

        workouts.insert(&workout("w1", "hard", 15, 3)).await.unwrap();
        workouts.insert(&workout("w2", "hard", 20, 2)).await.unwrap();
        workouts.insert(&workout("w3", "hard", 40, 1)).await.unwrap();
        workouts.insert(&workout("w4", "easy", 30, 0)).await.unwrap();

        let filter = Filter::new()
            .eq(Field::Path("difficulty"), "hard")
            .range(Field::Path("duration_minutes"), Some(20.0), Some(40.0));

        let found: Vec<String> = workouts
            .find(&filter, 0, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|w| w.uid)
            .collect();
        assert_eq!(found, vec!["w3", "w2"]);
        assert_eq!(workouts.count(&filter).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_by_id_sets_only_patched_fields() {
        let db = setup_db().await;
        let workouts = Collection::<Workout>::new(db.pool.clone());
        let w = workouts.insert(&workout("w1", "easy", 10, 0)).await.unwrap();

        let patch = json!({ "title": "Renamed", "slug": "renamed" });
        let updated = workouts
            .update_by_id(&w.id, patch.as_object().unwrap())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.slug, "renamed");
        assert_eq!(updated.difficulty.as_deref(), Some("easy"));
        assert!(updated.updated_at >= w.updated_at);

        // slug column follows the document
        let by_slug = workouts
            .find_one(&Filter::new().eq(Field::Slug, "renamed"))
            .await
            .unwrap();
        assert!(by_slug.is_some());
    }

    #[tokio::test]
    async fn test_update_by_id_missing_returns_none() {
        let db = setup_db().await;
        let workouts = Collection::<Workout>::new(db.pool.clone());

        let patch = json!({ "title": "Nope" });
        let result = workouts
            .update_by_id(&new_object_id(), patch.as_object().unwrap())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_to_taken_slug_is_duplicate_key() {
        let db = setup_db().await;
        let workouts = Collection::<Workout>::new(db.pool.clone());
        workouts.insert(&workout("w1", "easy", 10, 1)).await.unwrap();
        let w2 = workouts.insert(&workout("w2", "easy", 10, 0)).await.unwrap();

        let patch = json!({ "slug": "w1-slug" });
        let err = workouts
            .update_by_id(&w2.id, patch.as_object().unwrap())
            .await
            .unwrap_err();
        assert!(err.is_duplicate_key());
    }

    #[tokio::test]
    async fn test_increment_composes() {
        let db = setup_db().await;
        let workouts = Collection::<Workout>::new(db.pool.clone());
        workouts.insert(&workout("w1", "easy", 10, 0)).await.unwrap();

        let by_uid = Filter::new().eq(Field::Key, "w1");
        let deltas = [("stats.views", Scalar::Integer(1))];

        let (a, b) = tokio::join!(
            workouts.increment(&by_uid, &deltas),
            workouts.increment(&by_uid, &deltas)
        );
        a.unwrap().unwrap();
        b.unwrap().unwrap();

        let updated = workouts
            .increment(&by_uid, &[("stats.avg_rating", Scalar::Real(4.5))])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.stats.views, 2);
        assert_eq!(updated.stats.avg_rating, 4.5);
    }

    #[tokio::test]
    async fn test_increment_past_range_leaves_document_untouched() {
        let db = setup_db().await;
        let workouts = Collection::<Workout>::new(db.pool.clone());
        workouts.insert(&workout("w1", "easy", 10, 0)).await.unwrap();
        let by_uid = Filter::new().eq(Field::Key, "w1");

        workouts
            .increment(&by_uid, &[("stats.views", Scalar::Integer(i64::MAX - 1))])
            .await
            .unwrap()
            .unwrap();
        let err = workouts
            .increment(&by_uid, &[("stats.views", Scalar::Integer(2))])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::OutOfRange { .. }));

        workouts
            .increment(&by_uid, &[("stats.avg_rating", Scalar::Real(1e300))])
            .await
            .unwrap()
            .unwrap();
        let err = workouts
            .increment(
                &by_uid,
                &[
                    ("stats.completions", Scalar::Integer(1)),
                    ("stats.avg_rating", Scalar::Real(1e300)),
                ],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::OutOfRange { .. }));

        // Neither refused write touched any field.
        let stored = workouts.find_one(&by_uid).await.unwrap().unwrap();
        assert_eq!(stored.stats.views, (i64::MAX - 1) as u64);
        assert_eq!(stored.stats.completions, 0);
        assert_eq!(stored.stats.avg_rating, 1e300);
        assert_eq!(workouts.find(&Filter::new(), 0, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_increment_unknown_returns_none() {
        let db = setup_db().await;
        let workouts = Collection::<Workout>::new(db.pool.clone());

        let result = workouts
            .increment(
                &Filter::new().eq(Field::Key, "missing"),
                &[("stats.views", Scalar::Integer(1))],
            )
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_exists() {
        let db = setup_db().await;
        let workouts = Collection::<Workout>::new(db.pool.clone());
        let w = workouts.insert(&workout("w1", "easy", 10, 0)).await.unwrap();

        assert!(workouts
            .exists(&Filter::new().eq(Field::Id, w.id.as_str()))
            .await
            .unwrap());
        assert!(!workouts
            .exists(&Filter::new().eq(Field::Id, new_object_id()))
            .await
            .unwrap());
    }
}
