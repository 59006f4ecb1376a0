use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use serde::de::DeserializeOwned;

use crate::db::{self, queries};
use crate::models::content::{CHAT_CONTEXT_KEY, FAQS_KEY, NOTICE_KEY, PACKAGES_KEY, REVIEWS_KEY};
use crate::models::package::default_packages;
use crate::models::{FaqEntry, LocalizedText, Package, Review, SiteContent};

/// Key/value store for admin-editable site copy. Values are JSON documents.
pub trait ContentRepository: Send + Sync {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>>;

    fn save(&self, key: &str, value: &str) -> anyhow::Result<()>;

    fn keys(&self) -> anyhow::Result<Vec<String>>;

    fn packages(&self) -> anyhow::Result<Vec<Package>> {
        Ok(load_json(self, PACKAGES_KEY)?.unwrap_or_else(default_packages))
    }

    fn package(&self, id: &str) -> anyhow::Result<Option<Package>> {
        Ok(self.packages()?.into_iter().find(|p| p.id == id))
    }

    fn faqs(&self) -> anyhow::Result<Vec<FaqEntry>> {
        Ok(load_json(self, FAQS_KEY)?.unwrap_or_default())
    }

    fn notice(&self) -> anyhow::Result<Option<LocalizedText>> {
        load_json(self, NOTICE_KEY)
    }

    fn reviews(&self) -> anyhow::Result<Vec<Review>> {
        Ok(load_json(self, REVIEWS_KEY)?.unwrap_or_default())
    }

    /// Free-form instructions the admin gives the FAQ assistant.
    fn chat_context(&self) -> anyhow::Result<String> {
        Ok(load_json(self, CHAT_CONTEXT_KEY)?.unwrap_or_default())
    }

    fn snapshot(&self) -> anyhow::Result<SiteContent> {
        Ok(SiteContent {
            packages: self.packages()?,
            faqs: self.faqs()?,
            notice: self.notice()?,
            reviews: self.reviews()?,
        })
    }
}

/// Reads a JSON value. Stored values that no longer deserialize are treated as
/// absent so a bad edit cannot take the booking flow down.
fn load_json<T, R>(repo: &R, key: &str) -> anyhow::Result<Option<T>>
where
    T: DeserializeOwned,
    R: ContentRepository + ?Sized,
{
    let Some(raw) = repo.load(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(
                key,
                error = %e,
                "stored content does not match its schema, using default"
            );
            Ok(None)
        }
    }
}

/// Checks that `value` has the shape expected for a well-known key. Unknown keys
/// accept any JSON.
pub fn validate(key: &str, value: &serde_json::Value) -> anyhow::Result<()> {
    fn check<T: DeserializeOwned>(key: &str, value: &serde_json::Value) -> anyhow::Result<()> {
        serde_json::from_value::<T>(value.clone())
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!("invalid value for {key}: {e}"))
    }

    match key {
        PACKAGES_KEY => {
            let packages: Vec<Package> = serde_json::from_value(value.clone())
                .map_err(|e| anyhow::anyhow!("invalid value for {key}: {e}"))?;
            let mut ids: Vec<&str> = packages.iter().map(|p| p.id.as_str()).collect();
            ids.sort_unstable();
            let before = ids.len();
            ids.dedup();
            anyhow::ensure!(ids.len() == before, "package ids must be unique");
            Ok(())
        }
        FAQS_KEY => check::<Vec<FaqEntry>>(key, value),
        NOTICE_KEY => check::<LocalizedText>(key, value),
        REVIEWS_KEY => check::<Vec<Review>>(key, value),
        CHAT_CONTEXT_KEY => check::<String>(key, value),
        _ => Ok(()),
    }
}

pub struct SqliteContent {
    db: Arc<Mutex<Connection>>,
}

impl SqliteContent {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }
}

impl ContentRepository for SqliteContent {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
        let conn = db::lock(&self.db);
        queries::get_content(&conn, key)
    }

    fn save(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let conn = db::lock(&self.db);
        queries::set_content(&conn, key, value)
    }

    fn keys(&self) -> anyhow::Result<Vec<String>> {
        let conn = db::lock(&self.db);
        queries::list_content_keys(&conn)
    }
}
