//! Content store: content items and their translations, in SQLite.

use crate::error::{Error, Result};
use crate::i18n::Langcode;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// A language-specific variant of a content item's text fields.
#[derive(Debug, Clone, Serialize)]
pub struct Translation {
    pub item_id: i64,
    pub langcode: Langcode,
    pub title: String,
    pub body: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A content item with its full translation mapping.
///
/// The canonical translation is the one whose langcode equals
/// `canonical_langcode`; it is created together with the item and cannot
/// be deleted on its own.
#[derive(Debug, Clone, Serialize)]
pub struct ContentItem {
    pub id: i64,
    pub canonical_langcode: Langcode,
    pub created_at: String,
    pub translations: Vec<Translation>,
}

impl ContentItem {
    /// The translation for `langcode`, if one exists.
    pub fn translation(&self, langcode: &str) -> Option<&Translation> {
        self.translations
            .iter()
            .find(|tr| tr.langcode.as_str() == langcode)
    }

    /// The canonical translation.
    pub fn canonical_translation(&self) -> Option<&Translation> {
        self.translation(self.canonical_langcode.as_str())
    }
}

#[derive(Clone)]
pub struct ContentStore {
    conn: Arc<Mutex<Connection>>,
}

impl ContentStore {
    /// Open the database and create the schema if needed.
    pub fn new(database_path: &str) -> Result<Self> {
        let conn = Connection::open(database_path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS content_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                canonical_langcode TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS translations (
                item_id INTEGER NOT NULL REFERENCES content_items(id) ON DELETE CASCADE,
                langcode TEXT NOT NULL,
                title TEXT NOT NULL,
                body TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (item_id, langcode)
            );",
        )?;
        Ok(())
    }

    /// Create a content item together with its canonical translation.
    pub fn create_item(
        &self,
        langcode: &Langcode,
        title: &str,
        body: &str,
    ) -> Result<ContentItem> {
        let mut conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();

        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO content_items (canonical_langcode, created_at) VALUES (?1, ?2)",
            params![langcode.as_str(), now],
        )?;
        let item_id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO translations (item_id, langcode, title, body, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![item_id, langcode.as_str(), title, body, now],
        )?;
        tx.commit()?;

        load_item(&conn, item_id)?
            .ok_or_else(|| Error::Internal(format!("Item {} vanished after insert", item_id)))
    }

    /// Fetch a content item with its translations.
    pub fn get_item(&self, id: i64) -> Result<ContentItem> {
        let conn = self.conn.lock().unwrap();
        load_item(&conn, id)?.ok_or_else(|| Error::NotFound(format!("Content item {}", id)))
    }

    /// All content items, each with its full translation mapping.
    pub fn list_items(&self) -> Result<Vec<ContentItem>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt =
            conn.prepare("SELECT id FROM content_items ORDER BY id")?;
        let ids: Vec<i64> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;

        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(item) = load_item(&conn, id)? {
                items.push(item);
            }
        }
        Ok(items)
    }

    /// Create or update the translation for `(item_id, langcode)`.
    ///
    /// Updating preserves `created_at` and bumps `updated_at`.
    pub fn upsert_translation(
        &self,
        item_id: i64,
        langcode: &Langcode,
        title: &str,
        body: &str,
    ) -> Result<Translation> {
        let conn = self.conn.lock().unwrap();
        require_item(&conn, item_id)?;

        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO translations (item_id, langcode, title, body, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT (item_id, langcode) DO UPDATE SET
                 title = excluded.title,
                 body = excluded.body,
                 updated_at = excluded.updated_at",
            params![item_id, langcode.as_str(), title, body, now],
        )?;

        load_translation(&conn, item_id, langcode.as_str())?.ok_or_else(|| {
            Error::Internal(format!(
                "Translation {}/{} vanished after upsert",
                item_id, langcode
            ))
        })
    }

    /// Delete one translation. The canonical translation is protected;
    /// delete the item instead.
    pub fn delete_translation(&self, item_id: i64, langcode: &Langcode) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let canonical = require_item(&conn, item_id)?;

        if canonical.as_str() == langcode.as_str() {
            return Err(Error::Conflict(format!(
                "Translation {} is the canonical translation of item {}; delete the item instead",
                langcode, item_id
            )));
        }

        let deleted = conn.execute(
            "DELETE FROM translations WHERE item_id = ?1 AND langcode = ?2",
            params![item_id, langcode.as_str()],
        )?;
        if deleted == 0 {
            return Err(Error::NotFound(format!(
                "Translation {} of content item {}",
                langcode, item_id
            )));
        }
        Ok(())
    }

    /// Delete a content item and, via cascade, all of its translations.
    pub fn delete_item(&self, id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM content_items WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Content item {}", id)));
        }
        Ok(())
    }

    pub fn item_count(&self) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row("SELECT COUNT(*) FROM content_items", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn translation_count(&self) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row("SELECT COUNT(*) FROM translations", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn require_item(conn: &Connection, item_id: i64) -> Result<Langcode> {
    let canonical: Option<String> = conn
        .query_row(
            "SELECT canonical_langcode FROM content_items WHERE id = ?1",
            params![item_id],
            |row| row.get(0),
        )
        .optional()?;

    match canonical {
        Some(code) => Langcode::new(&code),
        None => Err(Error::NotFound(format!("Content item {}", item_id))),
    }
}

fn load_item(conn: &Connection, id: i64) -> Result<Option<ContentItem>> {
    let header: Option<(String, String)> = conn
        .query_row(
            "SELECT canonical_langcode, created_at FROM content_items WHERE id = ?1",
            params![id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let Some((canonical_langcode, created_at)) = header else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT item_id, langcode, title, body, created_at, updated_at
         FROM translations WHERE item_id = ?1 ORDER BY langcode",
    )?;
    let rows: Vec<(i64, String, String, String, String, String)> = stmt
        .query_map(params![id], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        })?
        .collect::<rusqlite::Result<_>>()?;

    let mut translations = Vec::with_capacity(rows.len());
    for (item_id, langcode, title, body, created_at, updated_at) in rows {
        translations.push(Translation {
            item_id,
            langcode: Langcode::new(&langcode)?,
            title,
            body,
            created_at,
            updated_at,
        });
    }

    Ok(Some(ContentItem {
        id,
        canonical_langcode: Langcode::new(&canonical_langcode)?,
        created_at,
        translations,
    }))
}

fn load_translation(
    conn: &Connection,
    item_id: i64,
    langcode: &str,
) -> Result<Option<Translation>> {
    let row: Option<(String, String, String, String)> = conn
        .query_row(
            "SELECT title, body, created_at, updated_at
             FROM translations WHERE item_id = ?1 AND langcode = ?2",
            params![item_id, langcode],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .optional()?;

    let Some((title, body, created_at, updated_at)) = row else {
        return Ok(None);
    };

    Ok(Some(Translation {
        item_id,
        langcode: Langcode::new(langcode)?,
        title,
        body,
        created_at,
        updated_at,
    }))
}
