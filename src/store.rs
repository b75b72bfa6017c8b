//! Keyed record store and mirror consistency.
//!
//! The store is a SQLite mapping from content-derived identifier to the
//! contact serialized as JSON, plus a normalized haystack column for
//! substring search. Every call opens and closes its own connection; the
//! store and the CSV mirror are only held open inside a single operation.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::{params, Connection, TransactionBehavior};
use thiserror::Error;

use crate::config::Config;
use crate::contact::Contact;
use crate::mirror;
use crate::search;

pub const INIT_HINT: &str =
    "If you are running rolo for the first time, use --init to create the required directories.";

/// Store conditions callers react to, as opposed to plumbing failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("contact with id {0:?} does not exist")]
    NotFound(String),
}

/// Result of a bulk import run.
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

pub struct PhoneBook {
    config: Config,
}

impl PhoneBook {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn connect(&self) -> Result<Connection> {
        let dir = &self.config.store_dir;
        if !dir.is_dir() {
            bail!(
                "store directory {} does not exist\n{}",
                dir.display(),
                INIT_HINT
            );
        }
        let conn = Connection::open(self.config.db_path())?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "FULL")?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS contacts (
              id       TEXT PRIMARY KEY,
              data     TEXT NOT NULL,
              haystack TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_contacts_haystack ON contacts(haystack);
        "#,
        )?;
        Ok(conn)
    }

    /// Persist the contact, assigning the content-derived identifier when
    /// absent. Identical content collides to the same identifier; callers
    /// check collection membership first to avoid overwriting. With
    /// `flush` the mirror is regenerated from the full store plus the
    /// just-saved contact.
    pub fn save(&self, contact: &mut Contact, flush: bool) -> Result<()> {
        if contact.is_empty() {
            bail!("refusing to persist an empty contact");
        }
        let conn = self.connect()?;
        upsert(&conn, contact)?;
        drop(conn);

        if flush {
            self.flush(Some(contact))?;
        }
        Ok(())
    }

    /// Full record list in stable display order.
    pub fn load_all(&self) -> Result<Vec<Contact>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT data FROM contacts")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut contacts = Vec::new();
        for row in rows {
            contacts.push(decode(&row?)?);
        }
        sort_for_display(&mut contacts);
        Ok(contacts)
    }

    /// Single record lookup by identifier.
    pub fn load(&self, id: &str) -> Result<Option<Contact>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT data FROM contacts WHERE id = ?1")?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(decode(&row.get::<_, String>(0)?)?)),
            None => Ok(None),
        }
    }

    /// Delete the keyed record if present. Deletion is idempotent: an
    /// absent identifier is a no-op. With `flush` the mirror is
    /// regenerated without the removed record.
    pub fn remove(&self, id: &str, flush: bool) -> Result<()> {
        let conn = self.connect()?;
        conn.execute("DELETE FROM contacts WHERE id = ?1", params![id])?;
        drop(conn);

        if flush {
            self.flush(None)?;
        }
        Ok(())
    }

    /// Re-save an existing record. The contact's current identifier must
    /// be present in the store; on `StoreError::NotFound` neither the
    /// store nor the mirror is touched. The record is re-keyed under the
    /// identifier derived from its current content.
    pub fn update(&self, contact: &mut Contact) -> Result<()> {
        let old_id = match contact.id.clone() {
            Some(id) => id,
            None => return Err(StoreError::NotFound(String::new()).into()),
        };

        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let exists: bool = tx
            .prepare("SELECT 1 FROM contacts WHERE id = ?1")?
            .exists(params![old_id])?;
        if !exists {
            return Err(StoreError::NotFound(old_id).into());
        }
        tx.execute("DELETE FROM contacts WHERE id = ?1", params![old_id])?;
        contact.id = None;
        upsert(&tx, contact)?;
        tx.commit()?;
        drop(conn);

        self.flush(Some(contact))
    }

    /// Contacts whose serialized field set contains the query as a
    /// substring, via a LIKE scan over the normalized haystack column.
    pub fn find_all(&self, query: &str) -> Result<Vec<Contact>> {
        let normalized = match search::normalize_query(query) {
            Some(n) => n,
            None => return Ok(Vec::new()),
        };
        let pattern = search::like_pattern(&normalized);

        let conn = self.connect()?;
        let mut stmt =
            conn.prepare("SELECT data FROM contacts WHERE haystack LIKE ?1 ESCAPE '\\'")?;
        let rows = stmt.query_map([&pattern], |row| row.get::<_, String>(0))?;

        let mut contacts = Vec::new();
        for row in rows {
            contacts.push(decode(&row?)?);
        }
        sort_for_display(&mut contacts);
        Ok(contacts)
    }

    /// Regenerate the mirror file from the full store. A just-saved
    /// contact is appended when the store does not already list it, so
    /// the mirror never trails the record that triggered the flush.
    pub fn flush(&self, just_saved: Option<&Contact>) -> Result<()> {
        let dir = &self.config.mirror_dir;
        if !dir.is_dir() {
            bail!(
                "mirror directory {} does not exist\n{}",
                dir.display(),
                INIT_HINT
            );
        }

        let mut contacts = self.load_all()?;
        if let Some(saved) = just_saved {
            let listed = contacts
                .iter()
                .any(|c| c.id.is_some() && c.id == saved.id);
            if !listed {
                contacts.push(saved.clone());
            }
        }
        mirror::write(&self.config.mirror_path(), &contacts)
    }

    /// Stream records from a CSV or JSON file, saving each row without a
    /// per-row mirror flush; the mirror is regenerated once after the
    /// final row. Malformed entries are warned about and skipped.
    pub fn import_from(&self, path: &Path) -> Result<ImportReport> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read upload file {}", path.display()))?;

        let mut rows = match ext.as_str() {
            "csv" => mirror::parse(&content)?,
            "json" => parse_json(&content)?,
            other => bail!("unsupported upload format {other:?} (expected .csv or .json)"),
        };

        let conn = self.connect()?;
        let pb = ProgressBar::new(rows.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb.set_message("Uploading contacts...");

        let mut imported = 0usize;
        let mut skipped = 0usize;
        for contact in &mut rows {
            pb.inc(1);
            if contact.is_empty() {
                skipped += 1;
                continue;
            }
            contact.id = None;
            upsert(&conn, contact)?;
            imported += 1;
        }
        pb.finish_and_clear();
        drop(conn);

        self.flush(None)?;
        Ok(ImportReport { imported, skipped })
    }
}

fn upsert(conn: &Connection, contact: &mut Contact) -> Result<()> {
    if contact.id.is_none() {
        contact.id = Some(contact.derived_id());
    }
    let data = serde_json::to_string(contact)?;
    conn.execute(
        "INSERT OR REPLACE INTO contacts (id, data, haystack) VALUES (?1, ?2, ?3)",
        params![contact.id, data, search::haystack(contact)],
    )?;
    Ok(())
}

fn decode(data: &str) -> Result<Contact> {
    serde_json::from_str(data).context("corrupt contact record in store")
}

fn sort_for_display(contacts: &mut [Contact]) {
    contacts.sort_by_key(|c| (c.short_view().to_lowercase(), c.id.clone()));
}

fn parse_json(content: &str) -> Result<Vec<Contact>> {
    let entries: Vec<serde_json::Value> =
        serde_json::from_str(content).context("upload file is not a JSON array")?;

    let mut contacts = Vec::new();
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<Contact>(entry) {
            Ok(contact) => contacts.push(contact),
            Err(err) => {
                eprintln!("warning: skipping entry #{}: {err}", index + 1);
                contacts.push(Contact::default());
            }
        }
    }
    Ok(contacts)
}
