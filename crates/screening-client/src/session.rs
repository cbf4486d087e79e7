//! Persisted session state: the session id plus the batch waiting to be answered.

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use screening_spec::{QuestionBatch, RawDescriptor};

use crate::error::SessionError;

pub const SESSION_KEY: &str = "expungement_session_id";
pub const QUESTIONS_KEY: &str = "current_questions";
pub const FILENAMES_KEY: &str = "current_filenames";

/// Key/value storage with browser session-storage semantics.
pub trait SessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), SessionError>;
    fn remove(&mut self, key: &str) -> Result<(), SessionError>;
    /// Drop every entry, whatever state the backing storage is in.
    fn clear(&mut self) -> Result<(), SessionError>;
}

/// In-process store; forgotten when the process exits.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), SessionError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionError> {
        self.entries.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SessionError> {
        self.entries.clear();
        Ok(())
    }
}

/// JSON object on disk, rewritten on every change.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, SessionError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if entries.is_empty() {
            return self.delete();
        }
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(serde_json::to_string_pretty(entries)?.as_bytes())?;
        tmp.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }

    fn delete(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), SessionError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value);
        self.save(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionError> {
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SessionError> {
        self.delete()
    }
}

/// Session state handed to every page controller.
#[derive(Debug)]
pub struct SessionContext<S> {
    store: S,
}

impl<S: SessionStore> SessionContext<S> {
    /// Wrap a store, keeping whatever it already holds.
    pub fn init(store: S) -> Self {
        Self { store }
    }

    pub fn session_id(&self) -> Result<Option<String>, SessionError> {
        Ok(self
            .store
            .get(SESSION_KEY)?
            .filter(|id| !id.is_empty()))
    }

    pub fn set_session_id(&mut self, id: &str) -> Result<(), SessionError> {
        self.store.set(SESSION_KEY, id.to_string())
    }

    pub fn store_batch(
        &mut self,
        questions: &[RawDescriptor],
        filenames: &[String],
    ) -> Result<(), SessionError> {
        self.store
            .set(QUESTIONS_KEY, serde_json::to_string(questions)?)?;
        self.store
            .set(FILENAMES_KEY, serde_json::to_string(filenames)?)
    }

    /// The batch waiting to be answered, if any.
    pub fn pending_batch(&self) -> Result<Option<QuestionBatch>, SessionError> {
        let Some(questions) = self.store.get(QUESTIONS_KEY)? else {
            return Ok(None);
        };
        let questions = serde_json::from_str(&questions)?;
        let filenames = match self.store.get(FILENAMES_KEY)? {
            Some(raw) => decode_filenames(&raw)?,
            None => Vec::new(),
        };
        Ok(Some(QuestionBatch {
            questions,
            filenames,
        }))
    }

    /// Drop the consumed batch but keep the session.
    pub fn clear_batch(&mut self) -> Result<(), SessionError> {
        self.store.remove(QUESTIONS_KEY)?;
        self.store.remove(FILENAMES_KEY)
    }

    /// Forget the session and everything tied to it.
    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.store.clear()
    }
}

/// Filenames are stored as JSON; a stored `null` means none.
fn decode_filenames(raw: &str) -> Result<Vec<String>, SessionError> {
    Ok(serde_json::from_str::<Option<Vec<String>>>(raw)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn descriptors() -> Vec<RawDescriptor> {
        serde_json::from_value(json!([
            { "question": "Is anything pending?", "response_type": "Boolean" }
        ]))
        .expect("descriptors")
    }

    #[test]
    fn memory_store_round_trips_batch() {
        let mut session = SessionContext::init(MemoryStore::default());
        assert_eq!(session.session_id().expect("id"), None);
        session.set_session_id("abc").expect("set");
        session
            .store_batch(&descriptors(), &["prelim_questions.json".to_string()])
            .expect("store");

        let batch = session.pending_batch().expect("load").expect("batch");
        assert_eq!(batch.questions.len(), 1);
        assert_eq!(batch.filenames, vec!["prelim_questions.json"]);

        session.clear_batch().expect("clear batch");
        assert!(session.pending_batch().expect("load").is_none());
        assert_eq!(session.session_id().expect("id").as_deref(), Some("abc"));

        session.clear().expect("clear");
        assert_eq!(session.session_id().expect("id"), None);
    }

    #[test]
    fn file_store_survives_reopen_and_clear_removes_file() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("session.json");

        let mut session = SessionContext::init(FileStore::new(&path));
        session.set_session_id("abc").expect("set");
        session.store_batch(&descriptors(), &[]).expect("store");
        assert!(path.exists());

        let mut reopened = SessionContext::init(FileStore::new(&path));
        assert_eq!(reopened.session_id().expect("id").as_deref(), Some("abc"));
        assert!(reopened.pending_batch().expect("load").is_some());

        reopened.clear().expect("clear");
        assert!(!path.exists());
        reopened.clear().expect("clearing twice is fine");
    }

    #[test]
    fn corrupt_file_can_still_be_cleared() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"expungement_session_id": "abc""#).expect("write");

        let mut session = SessionContext::init(FileStore::new(&path));
        assert!(matches!(session.session_id(), Err(SessionError::Corrupt(_))));

        session.clear().expect("clear");
        assert!(!path.exists());
        assert_eq!(session.session_id().expect("id"), None);
        session.set_session_id("def").expect("set");
        assert_eq!(session.session_id().expect("id").as_deref(), Some("def"));
    }

    #[test]
    fn file_store_leaves_no_temp_files_behind() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("nested.json");
        let mut store = FileStore::new(&path);
        store.set(SESSION_KEY, "abc".into()).expect("set");
        let saved: BTreeMap<String, String> =
            serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("json");
        assert_eq!(saved.get(SESSION_KEY).map(String::as_str), Some("abc"));
        assert_eq!(fs::read_dir(dir.path()).expect("dir").count(), 1);
    }

    #[test]
    fn null_filenames_decode_as_empty() {
        let mut store = MemoryStore::default();
        store
            .set(QUESTIONS_KEY, serde_json::to_string(&descriptors()).expect("json"))
            .expect("set");
        store.set(FILENAMES_KEY, "null".into()).expect("set");
        let session = SessionContext::init(store);
        let batch = session.pending_batch().expect("load").expect("batch");
        assert!(batch.filenames.is_empty());
    }
}
