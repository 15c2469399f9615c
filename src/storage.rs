// Persistence adapter shared by the filesystem and the settings documents.
// Values are JSON documents stored under a namespaced key. One designated key
// is mirrored into a long-lived cookie jar so it can be restored if the
// primary store is wiped.

use chrono::{DateTime, Duration, Utc};
use ciborium::{from_reader, into_writer};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sled::{Db, Tree};
use std::path::Path;
use tracing::instrument;

use crate::config::StorageConfig;
use crate::errors::Result;

pub trait Persistence: Send + Sync {
    // Writes are fire-and-forget. Implementations log failures and carry on,
    // the caller's in-memory state stays authoritative.
    fn save(&self, key: &str, value: &Value);
    fn load(&self, key: &str) -> Option<Value>;

    fn save_data(&self, key: &str, value: &Value) {
        self.save(&format!("{}.json", key), value)
    }

    fn load_data(&self, key: &str) -> Option<Value> {
        self.load(&format!("{}.json", key))
    }
}

#[derive(Serialize, Deserialize)]
struct CookieRecord {
    value: String,
    expires_at: i64,
}

pub struct SledStore {
    db: Db,
    cookies: Tree,
    config: StorageConfig,
}

impl SledStore {
    #[instrument(skip(config))]
    pub fn open(path: &Path, config: StorageConfig) -> Result<SledStore> {
        let db = match sled::open(path) {
            Ok(db) => db,
            Err(e) => {
                tracing::error!(
                    "Sled failed to open database at path {}: {}",
                    path.display(),
                    e
                );
                return Err(e.into());
            }
        };
        SledStore::from_db(db, config)
    }

    /// A store that disappears when dropped.
    pub fn temporary(config: StorageConfig) -> Result<SledStore> {
        let db = sled::Config::new().temporary(true).open()?;
        SledStore::from_db(db, config)
    }

    fn from_db(db: Db, config: StorageConfig) -> Result<SledStore> {
        let cookies = db.open_tree("cookies")?;
        Ok(SledStore {
            db,
            cookies,
            config,
        })
    }

    fn primary_key(&self, key: &str) -> String {
        format!("{}{}", self.config.prefix, key)
    }

    /// Keys currently held in the primary store, without the namespace prefix.
    pub fn keys(&self) -> Vec<String> {
        self.db
            .scan_prefix(self.config.prefix.as_bytes())
            .keys()
            .filter_map(|k| k.ok())
            .filter_map(|k| String::from_utf8(k.to_vec()).ok())
            .filter_map(|k| k.strip_prefix(&self.config.prefix).map(str::to_string))
            .collect()
    }

    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    fn set_cookie(&self, name: &str, value: String, now: DateTime<Utc>) {
        let expires = now + Duration::days(self.config.cookie_days);
        let record = CookieRecord {
            value,
            expires_at: expires.timestamp_millis(),
        };
        let mut bytes = Vec::new();
        if let Err(e) = into_writer(&record, &mut bytes) {
            tracing::error!("Failed to encode cookie {}: {}", name, e);
            return;
        }
        if let Err(e) = self.cookies.insert(name.as_bytes(), bytes) {
            tracing::error!("Failed to store cookie {}: {}", name, e);
        }
    }

    fn get_cookie(&self, name: &str, now: DateTime<Utc>) -> Option<String> {
        let bytes = match self.cookies.get(name.as_bytes()) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::error!("Failed to read cookie {}: {}", name, e);
                return None;
            }
        };
        let record: CookieRecord = match from_reader(bytes.as_ref()) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Discarding undecodable cookie {}: {}", name, e);
                return None;
            }
        };
        if record.expires_at <= now.timestamp_millis() {
            tracing::info!("Cookie {} has expired", name);
            if let Err(e) = self.cookies.remove(name.as_bytes()) {
                tracing::error!("Failed to remove expired cookie {}: {}", name, e);
            }
            return None;
        }
        Some(record.value)
    }

    fn save_at(&self, key: &str, value: &Value, now: DateTime<Utc>) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize {}: {}", key, e);
                return;
            }
        };
        if let Err(e) = self.db.insert(self.primary_key(key).as_bytes(), json.as_bytes()) {
            tracing::error!("Storage write for {} failed: {}", key, e);
            return;
        }
        if key == self.config.cookie_key {
            self.set_cookie(&self.config.cookie_name, json, now);
        }
    }

    /// Restores the mirrored key from its cookie when the primary store lost
    /// it, then seeds any missing default documents and backfills `createdAt`.
    #[instrument(skip(self))]
    pub fn init_storage(&self, now: DateTime<Utc>) {
        let primary = self.primary_key(&self.config.cookie_key);
        let has_primary = matches!(self.db.contains_key(primary.as_bytes()), Ok(true));
        if !has_primary {
            if let Some(cookie) = self.get_cookie(&self.config.cookie_name, now) {
                tracing::info!("Restoring {} from cookie", self.config.cookie_key);
                if let Err(e) = self.db.insert(primary.as_bytes(), cookie.as_bytes()) {
                    tracing::error!("Failed to restore {} from cookie: {}", primary, e);
                }
            }
        }

        let created_at = now.timestamp_millis();
        for (file, default) in default_documents(created_at) {
            match self.load(&file) {
                None => {
                    tracing::info!("Creating default document {}", file);
                    self.save_at(&file, &default, now);
                }
                Some(Value::Object(mut current)) if !current.contains_key("createdAt") => {
                    current.insert("createdAt".to_string(), json!(created_at));
                    self.save_at(&file, &Value::Object(current), now);
                }
                Some(_) => (),
            }
        }
    }
}

impl Persistence for SledStore {
    fn save(&self, key: &str, value: &Value) {
        self.save_at(key, value, Utc::now())
    }

    fn load(&self, key: &str) -> Option<Value> {
        let bytes = match self.db.get(self.primary_key(key).as_bytes()) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::error!("Storage read for {} failed: {}", key, e);
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Stored value for {} is not valid JSON: {}", key, e);
                None
            }
        }
    }
}

fn default_documents(created_at: i64) -> Vec<(String, Value)> {
    vec![
        (
            "history.json".to_string(),
            json!({"logs": [], "commands": [], "createdAt": created_at}),
        ),
        (
            "mood.json".to_string(),
            json!({"current": "neutral", "createdAt": created_at}),
        ),
        (
            "bg.json".to_string(),
            json!({"current": "default", "custom_url": "", "createdAt": created_at}),
        ),
        (
            "general.json".to_string(),
            json!({
                "theme": "light",
                "sfx": true,
                "music": true,
                "prompt": "",
                "createdAt": created_at
            }),
        ),
        ("log1.json".to_string(), json!({"createdAt": created_at})),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn store() -> SledStore {
        SledStore::temporary(StorageConfig::default()).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn load_missing_key_is_none() {
        assert!(store().load("nothing.json").is_none());
    }

    #[test]
    fn save_then_load() {
        let store = store();
        store.save("mood.json", &json!({"current": "happy"}));
        assert_eq!(store.load("mood.json"), Some(json!({"current": "happy"})));
        assert_eq!(store.keys(), vec!["mood.json".to_string()]);
    }

    #[test]
    fn legacy_helpers_append_json_suffix() {
        let store = store();
        store.save_data("vfs_data", &json!({"root": {}}));
        assert!(store.load("vfs_data.json").is_some());
        assert_eq!(store.load_data("vfs_data"), Some(json!({"root": {}})));
    }

    #[test]
    fn init_storage_seeds_defaults() {
        let store = store();
        store.init_storage(now());
        let general = store.load("general.json").unwrap();
        assert_eq!(general["theme"], "light");
        assert_eq!(general["createdAt"], now().timestamp_millis());
        let mut keys = store.keys();
        keys.sort();
        assert_eq!(
            keys,
            vec!["bg.json", "general.json", "history.json", "log1.json", "mood.json"]
        );
    }

    #[test]
    fn init_storage_backfills_created_at_without_touching_values() {
        let store = store();
        store.save("mood.json", &json!({"current": "sleepy"}));
        store.init_storage(now());
        let mood = store.load("mood.json").unwrap();
        assert_eq!(mood["current"], "sleepy");
        assert_eq!(mood["createdAt"], now().timestamp_millis());
    }

    #[test]
    fn cookie_restores_wiped_settings() {
        let store = store();
        store.save_at("general.json", &json!({"theme": "dark"}), now());
        store.db.remove("delta_os_general.json").unwrap();
        assert!(store.load("general.json").is_none());

        store.init_storage(now() + Duration::days(30));
        let general = store.load("general.json").unwrap();
        assert_eq!(general["theme"], "dark");
    }

    #[test]
    fn expired_cookie_is_ignored() {
        let store = store();
        store.save_at("general.json", &json!({"theme": "dark"}), now());
        store.db.remove("delta_os_general.json").unwrap();

        store.init_storage(now() + Duration::days(366));
        let general = store.load("general.json").unwrap();
        assert_eq!(general["theme"], "light");
    }

    #[test]
    fn expired_cookie_is_removed_on_read() {
        let store = store();
        store.save_at("general.json", &json!({"theme": "dark"}), now());
        assert!(store.get_cookie("delta_settings", now() + Duration::days(366)).is_none());
        assert!(store.cookies.get("delta_settings").unwrap().is_none());
    }

    #[test]
    fn only_the_designated_key_is_mirrored() {
        let store = store();
        store.save_at("mood.json", &json!({"current": "happy"}), now());
        assert!(store.get_cookie("delta_settings", now()).is_none());
        store.save_at("general.json", &json!({"theme": "dark"}), now());
        assert!(store.get_cookie("delta_settings", now()).is_some());
    }
}
