//! SQLite persistence for connector parameters.

use super::cipher::ParameterCipher;
use super::Parameters;
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

/// Encrypted parameter storage backed by SQLite.
///
/// # Schema
/// ```sql
/// CREATE TABLE parameters (
///     webservice_id TEXT NOT NULL,
///     name TEXT NOT NULL,
///     value TEXT NOT NULL,        -- base64(nonce || ciphertext)
///     updated_at TEXT NOT NULL,   -- RFC 3339
///     PRIMARY KEY (webservice_id, name)
/// );
/// ```
pub struct ParameterStore {
    conn: Mutex<Connection>,
    cipher: ParameterCipher,
}

impl ParameterStore {
    /// Creates or opens a parameter store.
    ///
    /// # Arguments
    /// * `db_path` - Path to SQLite database file (`:memory:` for tests)
    /// * `encryption_key` - Base64-encoded 32-byte master key
    pub fn new<P: AsRef<Path>>(db_path: P, encryption_key: &str) -> Result<Self> {
        let cipher = ParameterCipher::from_base64(encryption_key).context("Invalid encryption key")?;

        let conn = Connection::open(db_path).context("Failed to open parameters database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS parameters (
                webservice_id TEXT NOT NULL,
                name          TEXT NOT NULL,
                value         TEXT NOT NULL,
                updated_at    TEXT NOT NULL,
                PRIMARY KEY (webservice_id, name)
            );",
        )
        .context("Failed to create parameters table")?;

        Ok(Self {
            conn: Mutex::new(conn),
            cipher,
        })
    }

    /// Replaces every stored parameter of a webservice with `parameters`.
    ///
    /// Runs in one transaction: either the whole set is written or nothing is.
    pub fn save(&self, webservice_id: &str, parameters: &Parameters) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction().context("Failed to begin transaction")?;

        tx.execute(
            "DELETE FROM parameters WHERE webservice_id = ?1",
            params![webservice_id],
        )
        .context("Failed to clear previous parameters")?;

        for (name, value) in parameters {
            let sealed = self
                .cipher
                .seal(value)
                .with_context(|| format!("Failed to encrypt parameter {}", name))?;
            tx.execute(
                "INSERT INTO parameters (webservice_id, name, value, updated_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![webservice_id, name, sealed, now],
            )
            .with_context(|| format!("Failed to store parameter {}", name))?;
        }

        tx.commit().context("Failed to commit parameters")?;
        Ok(())
    }

    /// Loads all parameters of a webservice (empty when none were saved).
    pub fn load(&self, webservice_id: &str) -> Result<Parameters> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT name, value FROM parameters WHERE webservice_id = ?1 ORDER BY name")
            .context("Failed to prepare query")?;

        let rows = stmt
            .query_map(params![webservice_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .context("Failed to execute query")?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read results")?;

        let mut parameters = Parameters::new();
        for (name, sealed) in rows {
            let value = self
                .cipher
                .open(&sealed)
                .with_context(|| format!("Failed to decrypt parameter {}", name))?;
            parameters.insert(name, value);
        }

        Ok(parameters)
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

    fn create_test_store() -> ParameterStore {
        let key = BASE64.encode([0u8; 32]);
        ParameterStore::new(":memory:", &key).expect("Failed to create test store")
    }

    fn sample_parameters() -> Parameters {
        let mut parameters = Parameters::new();
        parameters.insert("Token".to_string(), "shpat_abc".to_string());
        parameters.insert("WsHost".to_string(), "https://demo.myshopify.com".to_string());
        parameters
    }

    #[test]
    fn test_save_and_load() {
        let store = create_test_store();
        store.save("ws-1", &sample_parameters()).unwrap();

        let loaded = store.load("ws-1").unwrap();
        assert_eq!(loaded, sample_parameters());
    }

    #[test]
    fn test_load_unknown_webservice_is_empty() {
        let store = create_test_store();
        assert!(store.load("missing").unwrap().is_empty());
    }

    #[test]
    fn test_save_replaces_previous_set() {
        let store = create_test_store();
        store.save("ws-1", &sample_parameters()).unwrap();

        let mut next = Parameters::new();
        next.insert("Token".to_string(), "shpat_new".to_string());
        store.save("ws-1", &next).unwrap();

        let loaded = store.load("ws-1").unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get("Token").map(String::as_str), Some("shpat_new"));
    }

    #[test]
    fn test_webservices_are_isolated() {
        let store = create_test_store();
        store.save("ws-1", &sample_parameters()).unwrap();
        store.save("ws-2", &Parameters::new()).unwrap();

        assert!(store.load("ws-2").unwrap().is_empty());
        assert_eq!(store.load("ws-1").unwrap().len(), 2);
    }

    #[test]
    fn test_values_are_encrypted_at_rest() {
        let store = create_test_store();
        store.save("ws-1", &sample_parameters()).unwrap();

        let conn = store.conn.lock().unwrap();
        let raw: String = conn
            .query_row(
                "SELECT value FROM parameters WHERE webservice_id = 'ws-1' AND name = 'Token'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(!raw.contains("shpat_abc"));
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parameters.db");
        let key = BASE64.encode([7u8; 32]);

        ParameterStore::new(&path, &key)
            .unwrap()
            .save("ws-1", &sample_parameters())
            .unwrap();

        let reopened = ParameterStore::new(&path, &key).unwrap();
        assert_eq!(reopened.get("ws-1", "Token").unwrap().as_deref(), Some("shpat_abc"));
    }

    #[test]
    fn test_invalid_encryption_key() {
        assert!(ParameterStore::new(":memory:", "short").is_err());
        assert!(ParameterStore::new(":memory:", "not-valid-base64!@#$").is_err());
    }
}
