//! Namespace and entry operations.
//!
//! Every write is a full-entry replace keyed by the content-addressed
//! entry key; there is no partial update path. Bulk install registers the
//! namespace and writes all entries in one transaction so the namespace
//! only becomes visible fully populated.

use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

use super::connection::CacheDb;
use super::key::entry_key;
use crate::Error;
use crate::backend::BackendResponse;

/// An immutable snapshot of a successful upstream response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredResponse {
    pub key: String,
    pub namespace: String,
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub headers_json: Option<String>,
    pub body: Vec<u8>,
    pub fetched_at: String,
}

impl StoredResponse {
    /// Snapshot an upstream response for storage under `namespace`/`url`.
    pub fn capture(namespace: &str, url: &str, response: &BackendResponse) -> Self {
        Self {
            key: entry_key(namespace, url),
            namespace: namespace.to_string(),
            url: url.to_string(),
            status: response.status,
            content_type: response.content_type.clone(),
            headers_json: serde_json::to_string(&response.headers).ok(),
            body: response.body.to_vec(),
            fetched_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Stored header pairs, empty if none were captured.
    pub fn headers(&self) -> Vec<(String, String)> {
        self.headers_json
            .as_deref()
            .and_then(|json| serde_json::from_str(json).ok())
            .unwrap_or_default()
    }
}

impl CacheDb {
    /// Insert or fully replace one entry, registering its namespace if
    /// this is the namespace's first write.
    pub async fn put_entry(&self, entry: &StoredResponse) -> Result<(), Error> {
        let entry = entry.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                register_namespace(&tx, &entry.namespace)?;
                upsert_entry(&tx, &entry)?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up an entry by namespace and URL.
    ///
    /// Returns None on a cache miss; a miss is a normal branch, not an
    /// error.
    pub async fn get_entry(&self, namespace: &str, url: &str) -> Result<Option<StoredResponse>, Error> {
        let key = entry_key(namespace, url);
        self.conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT key, namespace, url, status, content_type, headers_json, body, fetched_at
                     FROM entries WHERE key = ?1",
                )?;

                let result = stmt.query_row(params![key], |row| {
                    Ok(StoredResponse {
                        key: row.get(0)?,
                        namespace: row.get(1)?,
                        url: row.get(2)?,
                        status: row.get::<_, i64>(3)? as u16,
                        content_type: row.get(4)?,
                        headers_json: row.get(5)?,
                        body: row.get(6)?,
                        fetched_at: row.get(7)?,
                    })
                });

                match result {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Register `namespace` and write every entry in one transaction.
    ///
    /// All-or-nothing: if anything fails the transaction rolls back and
    /// the namespace is not registered. Entries already present for the
    /// namespace are dropped first, so a reinstall fully replaces it.
    pub async fn install_namespace(&self, namespace: &str, entries: Vec<StoredResponse>) -> Result<(), Error> {
        let namespace = namespace.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                register_namespace(&tx, &namespace)?;
                tx.execute("DELETE FROM entries WHERE namespace = ?1", params![namespace])?;
                for entry in &entries {
                    upsert_entry(&tx, entry)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Names of every registered namespace.
    pub async fn list_namespaces(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM namespaces ORDER BY name")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a namespace and, via cascade, all of its entries.
    ///
    /// Returns the number of entries removed.
    pub async fn delete_namespace(&self, namespace: &str) -> Result<u64, Error> {
        let namespace = namespace.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let tx = conn.transaction()?;
                let count: i64 = tx.query_row(
                    "SELECT COUNT(*) FROM entries WHERE namespace = ?1",
                    params![namespace],
                    |row| row.get(0),
                )?;
                tx.execute("DELETE FROM namespaces WHERE name = ?1", params![namespace])?;
                tx.commit()?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries in a namespace.
    pub async fn count_entries(&self, namespace: &str) -> Result<u64, Error> {
        let namespace = namespace.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM entries WHERE namespace = ?1",
                    params![namespace],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Drop the oldest entries of a namespace until count <= max_entries.
    ///
    /// Returns the number of deleted entries.
    pub async fn trim_namespace(&self, namespace: &str, max_entries: usize) -> Result<u64, Error> {
        let namespace = namespace.to_string();
        let max = max_entries as i64;
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM entries WHERE namespace = ?1",
                    params![namespace],
                    |row| row.get(0),
                )?;
                if count <= max {
                    return Ok(0);
                }

                let to_delete = count - max;
                let deleted = conn.execute(
                    "DELETE FROM entries WHERE key IN (
                        SELECT key FROM entries WHERE namespace = ?1
                        ORDER BY fetched_at ASC LIMIT ?2
                    )",
                    params![namespace, to_delete],
                )?;
                Ok(deleted as u64)
            })
            .await
            .map_err(Error::from)
    }
}

fn register_namespace(tx: &rusqlite::Transaction<'_>, namespace: &str) -> Result<(), rusqlite::Error> {
    tx.execute(
        "INSERT OR IGNORE INTO namespaces (name, created_at) VALUES (?1, ?2)",
        params![namespace, chrono::Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

fn upsert_entry(tx: &rusqlite::Transaction<'_>, entry: &StoredResponse) -> Result<(), rusqlite::Error> {
    tx.execute(
        "INSERT INTO entries (key, namespace, url, status, content_type, headers_json, body, fetched_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(key) DO UPDATE SET
            namespace = excluded.namespace,
            url = excluded.url,
            status = excluded.status,
            content_type = excluded.content_type,
            headers_json = excluded.headers_json,
            body = excluded.body,
            fetched_at = excluded.fetched_at",
        params![
            entry.key,
            entry.namespace,
            entry.url,
            entry.status as i64,
            entry.content_type,
            entry.headers_json,
            entry.body,
            entry.fetched_at,
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn sample_response(body: &str) -> BackendResponse {
        BackendResponse {
            status: 200,
            content_type: Some("text/html".to_string()),
            headers: vec![("content-type".to_string(), "text/html".to_string())],
            body: Bytes::from(body.to_string()),
        }
    }

    #[tokio::test]
    async fn test_put_and_get_roundtrip() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let entry = StoredResponse::capture("api-v1", "/api/skills", &sample_response("[]"));

        db.put_entry(&entry).await.unwrap();

        let cached = db.get_entry("api-v1", "/api/skills").await.unwrap().unwrap();
        assert_eq!(cached.url, "/api/skills");
        assert_eq!(cached.status, 200);
        assert_eq!(cached.body, b"[]");
        assert_eq!(cached.headers(), vec![("content-type".to_string(), "text/html".to_string())]);
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let result = db.get_entry("api-v1", "/api/none").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_put_fully_replaces() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let old = StoredResponse::capture("api-v1", "/api/skills", &sample_response("old"));
        let new = StoredResponse::capture("api-v1", "/api/skills", &sample_response("new"));

        db.put_entry(&old).await.unwrap();
        db.put_entry(&new).await.unwrap();

        let cached = db.get_entry("api-v1", "/api/skills").await.unwrap().unwrap();
        assert_eq!(cached.body, b"new");
        assert_eq!(db.count_entries("api-v1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_install_namespace_bulk() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let entries = vec![
            StoredResponse::capture("static-v1", "/", &sample_response("home")),
            StoredResponse::capture("static-v1", "/static/css/style.css", &sample_response("css")),
        ];

        db.install_namespace("static-v1", entries).await.unwrap();

        assert_eq!(db.count_entries("static-v1").await.unwrap(), 2);
        assert_eq!(db.list_namespaces().await.unwrap(), vec!["static-v1".to_string()]);
    }

    #[tokio::test]
    async fn test_install_replaces_previous_contents() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.install_namespace(
            "static-v1",
            vec![StoredResponse::capture("static-v1", "/old.css", &sample_response("old"))],
        )
        .await
        .unwrap();

        db.install_namespace(
            "static-v1",
            vec![StoredResponse::capture("static-v1", "/", &sample_response("home"))],
        )
        .await
        .unwrap();

        assert_eq!(db.count_entries("static-v1").await.unwrap(), 1);
        assert!(db.get_entry("static-v1", "/old.css").await.unwrap().is_none());
        assert!(db.get_entry("static-v1", "/").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_namespace_cascades() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put_entry(&StoredResponse::capture("api-v0", "/api/skills", &sample_response("[]")))
            .await
            .unwrap();
        db.put_entry(&StoredResponse::capture("api-v1", "/api/skills", &sample_response("[]")))
            .await
            .unwrap();

        let deleted = db.delete_namespace("api-v0").await.unwrap();
        assert_eq!(deleted, 1);

        assert!(db.get_entry("api-v0", "/api/skills").await.unwrap().is_none());
        assert!(db.get_entry("api-v1", "/api/skills").await.unwrap().is_some());
        assert_eq!(db.list_namespaces().await.unwrap(), vec!["api-v1".to_string()]);
    }

    #[tokio::test]
    async fn test_trim_namespace_drops_oldest() {
        let db = CacheDb::open_in_memory().await.unwrap();
        for (i, url) in ["/api/a", "/api/b", "/api/c"].iter().enumerate() {
            let mut entry = StoredResponse::capture("api-v1", url, &sample_response("x"));
            // Deterministic ordering regardless of wall-clock resolution.
            entry.fetched_at = format!("2026-01-0{}T00:00:00+00:00", i + 1);
            db.put_entry(&entry).await.unwrap();
        }

        let deleted = db.trim_namespace("api-v1", 2).await.unwrap();
        assert_eq!(deleted, 1);
        assert!(db.get_entry("api-v1", "/api/a").await.unwrap().is_none());
        assert!(db.get_entry("api-v1", "/api/c").await.unwrap().is_some());

        assert_eq!(db.trim_namespace("api-v1", 2).await.unwrap(), 0);
    }
}
