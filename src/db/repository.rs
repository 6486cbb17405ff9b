//! Repository for generic document CRUD.
//!
//! Table names come from `Entity::COLLECTION` constants, never from user
//! input; every value is bound as a statement parameter.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{Entity, ListOrder, Record, RESERVED_FIELDS};

/// Database repository for all collections.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List every record in a collection in its listing order.
    pub async fn list<T: Entity>(&self) -> Result<Vec<Record<T>>, AppError> {
        let order_by = match T::LIST_ORDER {
            ListOrder::Ascending => "sort_order IS NULL, sort_order ASC, rowid ASC",
            ListOrder::NewestFirst => "rowid DESC",
        };
        let sql = format!(
            "SELECT id, doc, created_at, updated_at FROM {} ORDER BY {}",
            T::COLLECTION,
            order_by
        );

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter().map(record_from_row).collect()
    }

    /// Get a record by ID.
    pub async fn get<T: Entity>(&self, id: &str) -> Result<Option<Record<T>>, AppError> {
        let sql = format!(
            "SELECT id, doc, created_at, updated_at FROM {} WHERE id = ?",
            T::COLLECTION
        );

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(record_from_row).transpose()
    }

    /// Find the first record whose top-level document field equals `value`.
    pub async fn find_by<T: Entity>(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Option<Record<T>>, AppError> {
        let sql = format!(
            "SELECT id, doc, created_at, updated_at FROM {} WHERE json_extract(doc, ?) = ? ORDER BY rowid LIMIT 1",
            T::COLLECTION
        );

        let row = sqlx::query(&sql)
            .bind(format!("$.{}", field))
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(record_from_row).transpose()
    }

    /// Count the records in a collection.
    pub async fn count<T: Entity>(&self) -> Result<i64, AppError> {
        let sql = format!("SELECT COUNT(*) AS n FROM {}", T::COLLECTION);
        let row = sqlx::query(&sql).fetch_one(&self.pool).await?;
        Ok(row.get("n"))
    }

    /// Validate and insert a new record with a generated ID.
    pub async fn create<T: Entity>(&self, fields: T) -> Result<Record<T>, AppError> {
        fields.validate()?;
        let record = Record::new(fields);
        let doc = encode_doc(&record.fields)?;

        let sql = format!(
            "INSERT INTO {} (id, doc, sort_order, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
            T::COLLECTION
        );

        sqlx::query(&sql)
            .bind(&record.id)
            .bind(&doc)
            .bind(record.fields.sort_key())
            .bind(record.created_at)
            .bind(record.updated_at)
            .execute(&self.pool)
            .await?;

        Ok(record)
    }

    /// Insert the entity's default record if the collection is empty.
    ///
    /// Returns true when a record was created.
    pub async fn ensure_default<T: Entity>(&self) -> Result<bool, AppError> {
        let Some(fields) = T::default_record() else {
            return Ok(false);
        };
        Ok(self.create_if_empty(fields).await?.is_some())
    }

    /// Validate and insert a record only if the collection is empty.
    ///
    /// The emptiness check and the insert are one statement, so concurrent
    /// callers create at most one record. Returns `None` when the collection
    /// already held a record.
    pub async fn create_if_empty<T: Entity>(
        &self,
        fields: T,
    ) -> Result<Option<Record<T>>, AppError> {
        fields.validate()?;
        let record = Record::new(fields);
        let doc = encode_doc(&record.fields)?;

        let sql = format!(
            "INSERT INTO {table} (id, doc, sort_order, created_at, updated_at)
             SELECT ?, ?, ?, ?, ? WHERE NOT EXISTS (SELECT 1 FROM {table})",
            table = T::COLLECTION
        );

        let result = sqlx::query(&sql)
            .bind(&record.id)
            .bind(&doc)
            .bind(record.fields.sort_key())
            .bind(record.created_at)
            .bind(record.updated_at)
            .execute(&self.pool)
            .await?;

        Ok((result.rows_affected() > 0).then_some(record))
    }

    /// Replace a record's document with `changes` merged over the stored one.
    ///
    /// Fields absent from `changes` keep their stored values. The id and
    /// timestamps are owned by the store and cannot be overwritten.
    pub async fn replace<T: Entity>(
        &self,
        id: &str,
        changes: Map<String, Value>,
    ) -> Result<Record<T>, AppError> {
        let existing = self
            .get::<T>(id)
            .await?
            .ok_or_else(|| not_found::<T>(id))?;

        let mut doc = match serde_json::to_value(&existing.fields) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(AppError::Internal(format!(
                    "{} document is not a JSON object",
                    T::LABEL
                )))
            }
            Err(e) => return Err(AppError::Internal(e.to_string())),
        };
        for (key, value) in changes {
            if !RESERVED_FIELDS.contains(&key.as_str()) {
                doc.insert(key, value);
            }
        }

        let fields: T = serde_json::from_value(Value::Object(doc)).map_err(|e| {
            AppError::Validation(format!("Invalid {}: {}", T::LABEL.to_lowercase(), e))
        })?;
        fields.validate()?;

        let updated_at = Utc::now();
        let encoded = encode_doc(&fields)?;

        let sql = format!(
            "UPDATE {} SET doc = ?, sort_order = ?, updated_at = ? WHERE id = ?",
            T::COLLECTION
        );

        let result = sqlx::query(&sql)
            .bind(&encoded)
            .bind(fields.sort_key())
            .bind(updated_at)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            // Deleted between read and write
            return Err(not_found::<T>(id));
        }

        Ok(Record {
            id: existing.id,
            fields,
            created_at: existing.created_at,
            updated_at,
        })
    }

    /// Delete a record.
    pub async fn delete<T: Entity>(&self, id: &str) -> Result<(), AppError> {
        let sql = format!("DELETE FROM {} WHERE id = ?", T::COLLECTION);

        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(not_found::<T>(id));
        }

        Ok(())
    }
}

/// Not-found error naming the entity.
pub fn not_found<T: Entity>(id: &str) -> AppError {
    AppError::NotFound(format!("{} {} not found", T::LABEL, id))
}

fn encode_doc<T: Entity>(fields: &T) -> Result<String, AppError> {
    serde_json::to_string(fields)
        .map_err(|e| AppError::Internal(format!("Failed to encode {}: {}", T::LABEL, e)))
}

/// Helper to convert a row to a record.
fn record_from_row<T: Entity>(row: &SqliteRow) -> Result<Record<T>, AppError> {
    let doc: String = row.try_get("doc")?;
    let fields: T = serde_json::from_str(&doc).map_err(|e| {
        AppError::Internal(format!("Corrupt {} document: {}", T::LABEL, e))
    })?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

    Ok(Record {
        id: row.try_get("id")?,
        fields,
        created_at,
        updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::models::{About, Admin, Message, Skill};
    use serde_json::json;
    use tempfile::TempDir;

    async fn repo() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let url = format!("sqlite://{}", temp_dir.path().join("test.sqlite").display());
        let pool = init_database(&url).await.expect("Failed to init DB");
        (Repository::new(pool), temp_dir)
    }

    fn skill(name: &str, order: Option<i64>) -> Skill {
        Skill {
            name: name.to_string(),
            icon: None,
            category: None,
            order,
        }
    }

    fn changes(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let (repo, _dir) = repo().await;

        let created = repo.create(skill("Rust", Some(1))).await.unwrap();
        let fetched = repo.get::<Skill>(&created.id).await.unwrap().unwrap();

        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.fields, created.fields);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_fields() {
        let (repo, _dir) = repo().await;

        let result = repo.create(skill("  ", None)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(repo.count::<Skill>().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_orders_by_order_field_then_insertion() {
        let (repo, _dir) = repo().await;

        repo.create(skill("Unordered", None)).await.unwrap();
        repo.create(skill("Third", Some(9))).await.unwrap();
        repo.create(skill("First", Some(1))).await.unwrap();
        repo.create(skill("Second", Some(1))).await.unwrap();

        let names: Vec<String> = repo
            .list::<Skill>()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.fields.name)
            .collect();

        assert_eq!(names, vec!["First", "Second", "Third", "Unordered"]);
    }

    #[tokio::test]
    async fn test_messages_list_newest_first() {
        let (repo, _dir) = repo().await;

        for name in ["Older", "Newer"] {
            repo.create(Message {
                name: name.to_string(),
                email: "visitor@example.com".to_string(),
                subject: None,
                message: "Hi".to_string(),
                read: false,
            })
            .await
            .unwrap();
        }

        let list = repo.list::<Message>().await.unwrap();
        assert_eq!(list[0].fields.name, "Newer");
        assert_eq!(list[1].fields.name, "Older");
    }

    #[tokio::test]
    async fn test_replace_merges_and_keeps_id() {
        let (repo, _dir) = repo().await;
        let created = repo.create(skill("Go", Some(5))).await.unwrap();

        let updated = repo
            .replace::<Skill>(
                &created.id,
                changes(json!({ "icon": "/go.svg", "id": "hijacked", "createdAt": "1970-01-01T00:00:00Z" })),
            )
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.fields.name, "Go");
        assert_eq!(updated.fields.order, Some(5));
        assert_eq!(updated.fields.icon.as_deref(), Some("/go.svg"));
        assert!(repo.get::<Skill>("hijacked").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replace_rejects_invalid_result() {
        let (repo, _dir) = repo().await;
        let created = repo.create(skill("Go", None)).await.unwrap();

        let blank = repo
            .replace::<Skill>(&created.id, changes(json!({ "name": "" })))
            .await;
        assert!(matches!(blank, Err(AppError::Validation(_))));

        let wrong_type = repo
            .replace::<Skill>(&created.id, changes(json!({ "order": "first" })))
            .await;
        assert!(matches!(wrong_type, Err(AppError::Validation(_))));

        let stored = repo.get::<Skill>(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.fields.name, "Go");
    }

    #[tokio::test]
    async fn test_replace_and_delete_missing_are_not_found() {
        let (repo, _dir) = repo().await;

        let replaced = repo.replace::<Skill>("missing", Map::new()).await;
        assert!(matches!(replaced, Err(AppError::NotFound(_))));

        let deleted = repo.delete::<Skill>("missing").await;
        assert!(matches!(deleted, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_then_get_is_none() {
        let (repo, _dir) = repo().await;
        let created = repo.create(skill("Go", None)).await.unwrap();

        repo.delete::<Skill>(&created.id).await.unwrap();
        assert!(repo.get::<Skill>(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ensure_default_is_idempotent() {
        let (repo, _dir) = repo().await;

        assert!(repo.ensure_default::<About>().await.unwrap());
        assert!(!repo.ensure_default::<About>().await.unwrap());
        assert_eq!(repo.count::<About>().await.unwrap(), 1);

        // Collections without a default are left alone
        assert!(!repo.ensure_default::<Skill>().await.unwrap());
        assert_eq!(repo.count::<Skill>().await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_create_if_empty_admits_one_concurrent_writer() {
        let (repo, _dir) = repo().await;

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.create_if_empty(skill(&format!("Skill {}", i), None)).await
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap().is_some() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(repo.count::<Skill>().await.unwrap(), 1);

        assert!(repo.create_if_empty(skill("Late", None)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unique_fields_conflict() {
        let (repo, _dir) = repo().await;
        let admin = Admin {
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
        };

        repo.create(admin.clone()).await.unwrap();

        let same_username = Admin {
            email: "other@example.com".to_string(),
            ..admin.clone()
        };
        assert!(matches!(
            repo.create(same_username).await,
            Err(AppError::Conflict(_))
        ));

        let same_email = Admin {
            username: "other".to_string(),
            ..admin
        };
        assert!(matches!(
            repo.create(same_email).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_find_by_field() {
        let (repo, _dir) = repo().await;
        let created = repo
            .create(Admin {
                username: "admin".to_string(),
                email: "admin@example.com".to_string(),
                password_hash: "$argon2id$placeholder".to_string(),
            })
            .await
            .unwrap();

        let by_email = repo
            .find_by::<Admin>("email", "admin@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, created.id);
        assert!(repo
            .find_by::<Admin>("username", "nobody")
            .await
            .unwrap()
            .is_none());
    }
}
