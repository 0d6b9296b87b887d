//! Local persistence: a string key-value store plus typed accessors for
//! the draft, the two profile lists and the signed-in user.
//!
//! Readers tolerate missing keys and malformed JSON by treating them as
//! absent; the bad value is logged and left in place until overwritten.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::model::{InvoiceDocument, ProfileKind, SavedProfile};

pub const DRAFT_KEY: &str = "invoice_draft";
pub const SENDERS_KEY: &str = "invoice_saved_senders";
pub const CLIENTS_KEY: &str = "invoice_saved_clients";
pub const USER_KEY: &str = "invoice_user";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-process store, used by tests and embedders with their own persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// A JSON object on disk, rewritten in full on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open `path`, starting empty when the file is missing or unreadable
    /// as a JSON object.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                log::warn!("ignoring malformed store {}: {e}", path.display());
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let text = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, text)
            .map_err(|e| Error::Storage(format!("writing {}: {e}", self.path.display())))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}

fn profiles_key(kind: ProfileKind) -> &'static str {
    match kind {
        ProfileKind::Sender => SENDERS_KEY,
        ProfileKind::Client => CLIENTS_KEY,
    }
}

/// Parse a stored JSON value, treating malformed content as absent.
fn read_json<T: serde::de::DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            log::warn!("ignoring malformed {key}: {e}");
            Ok(None)
        }
    }
}

pub fn save_draft(store: &dyn KeyValueStore, doc: &InvoiceDocument) -> Result<()> {
    store.set(DRAFT_KEY, &serde_json::to_string(doc)?)
}

pub fn load_draft(store: &dyn KeyValueStore) -> Result<Option<InvoiceDocument>> {
    read_json(store, DRAFT_KEY)
}

pub fn load_profiles(store: &dyn KeyValueStore, kind: ProfileKind) -> Result<Vec<SavedProfile>> {
    Ok(read_json(store, profiles_key(kind))?.unwrap_or_default())
}

fn store_profiles(store: &dyn KeyValueStore, kind: ProfileKind, profiles: &[SavedProfile]) -> Result<()> {
    store.set(profiles_key(kind), &serde_json::to_string(profiles)?)
}

/// Save a profile. A profile whose name matches an existing one
/// case-insensitively replaces it in place, keeping the old id.
pub fn save_profile(store: &dyn KeyValueStore, kind: ProfileKind, mut profile: SavedProfile) -> Result<SavedProfile> {
    if profile.name.trim().is_empty() {
        return Err(Error::Storage(format!("{} profile needs a name", kind.label())));
    }
    let mut profiles = load_profiles(store, kind)?;
    let name = profile.name.to_lowercase();
    match profiles.iter_mut().find(|p| p.name.to_lowercase() == name) {
        Some(existing) => {
            profile.id = existing.id.clone();
            *existing = profile.clone();
        }
        None => {
            if profile.id.is_empty() {
                profile.id = uuid::Uuid::new_v4().to_string();
            }
            profiles.push(profile.clone());
        }
    }
    store_profiles(store, kind, &profiles)?;
    Ok(profile)
}

/// Remove a profile by id; returns whether one was removed.
pub fn delete_profile(store: &dyn KeyValueStore, kind: ProfileKind, id: &str) -> Result<bool> {
    let mut profiles = load_profiles(store, kind)?;
    let before = profiles.len();
    profiles.retain(|p| p.id != id);
    if profiles.len() == before {
        return Ok(false);
    }
    store_profiles(store, kind, &profiles)?;
    Ok(true)
}

pub fn current_user(store: &dyn KeyValueStore) -> Result<Option<String>> {
    Ok(store.get(USER_KEY)?.filter(|u| !u.is_empty()))
}

pub fn set_user(store: &dyn KeyValueStore, user: &str) -> Result<()> {
    store.set(USER_KEY, user)
}

pub fn clear_user(store: &dyn KeyValueStore) -> Result<()> {
    store.remove(USER_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InvoiceItem;

    fn profile(name: &str) -> SavedProfile {
        SavedProfile {
            id: String::new(),
            name: name.into(),
            address: "1 Road".into(),
            email: "a@b.test".into(),
            logo: None,
        }
    }

    #[test]
    fn draft_round_trips() {
        let store = MemoryStore::new();
        let mut doc = InvoiceDocument::default();
        doc.items.push(InvoiceItem {
            id: "b7".into(),
            description: "Hosting".into(),
            quantity: 3.0,
            unit_price: 12.5,
        });
        save_draft(&store, &doc).unwrap();
        assert_eq!(load_draft(&store).unwrap(), Some(doc));
    }

    #[test]
    fn malformed_json_reads_as_absent() {
        let store = MemoryStore::new();
        store.set(DRAFT_KEY, "{not json").unwrap();
        store.set(SENDERS_KEY, "[1, 2").unwrap();
        assert_eq!(load_draft(&store).unwrap(), None);
        assert!(load_profiles(&store, ProfileKind::Sender).unwrap().is_empty());
    }

    #[test]
    fn same_name_replaces_in_place() {
        let store = MemoryStore::new();
        let first = save_profile(&store, ProfileKind::Client, profile("Globex")).unwrap();
        save_profile(&store, ProfileKind::Client, profile("Initech")).unwrap();
        let mut again = profile("GLOBEX");
        again.address = "2 Road".into();
        let replaced = save_profile(&store, ProfileKind::Client, again).unwrap();

        let all = load_profiles(&store, ProfileKind::Client).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, first.id);
        assert_eq!(replaced.id, first.id);
        assert_eq!(all[0].address, "2 Road");
        assert!(load_profiles(&store, ProfileKind::Sender).unwrap().is_empty());
    }

    #[test]
    fn empty_name_is_rejected() {
        let store = MemoryStore::new();
        assert!(matches!(
            save_profile(&store, ProfileKind::Sender, profile("  ")),
            Err(Error::Storage(_))
        ));
    }

    #[test]
    fn delete_by_id() {
        let store = MemoryStore::new();
        let p = save_profile(&store, ProfileKind::Sender, profile("Acme")).unwrap();
        assert!(delete_profile(&store, ProfileKind::Sender, &p.id).unwrap());
        assert!(!delete_profile(&store, ProfileKind::Sender, &p.id).unwrap());
    }

    #[test]
    fn file_store_persists_and_survives_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");
        {
            let store = FileStore::open(&path).unwrap();
            set_user(&store, "me@example.com").unwrap();
        }
        let store = FileStore::open(&path).unwrap();
        assert_eq!(current_user(&store).unwrap().as_deref(), Some("me@example.com"));
        clear_user(&store).unwrap();
        assert_eq!(current_user(&store).unwrap(), None);

        fs::write(&path, "garbage").unwrap();
        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get(USER_KEY).unwrap(), None);
    }
}
