use std::path::{Path, PathBuf};

use ledgerbot_ledger::Balances;

use super::{SnapshotError, SnapshotStore, decode_balances, encode_balances};

/// Snapshot store backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SnapshotError {
        SnapshotError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Write `data` via a `.tmp` sibling so a crash mid-write never leaves a
    /// truncated ledger behind.
    fn atomic_write(&self, data: &[u8]) -> Result<(), SnapshotError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, data).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<Balances>, SnapshotError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => decode_balances(&raw).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&self, balances: &Balances) -> Result<(), SnapshotError> {
        let body = encode_balances(balances)?;
        self.atomic_write(body.as_bytes())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerbot_core::UserId;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("userdata.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_writes_pretty_json_and_leaves_no_tmp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("userdata.json");
        let store = JsonFileStore::new(&path);

        store.save(&Balances::from([(uid("u1"), 500)])).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\n  \"u1\": 500\n}");
        assert!(!dir.path().join("userdata.tmp").exists());
        assert_eq!(store.load().unwrap(), Some(Balances::from([(uid("u1"), 500)])));
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data/bot/userdata.json"));
        store.save(&Balances::new()).unwrap();
        assert_eq!(store.load().unwrap(), Some(Balances::new()));
    }

    #[test]
    fn corrupt_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("userdata.json");
        std::fs::write(&path, "{\"u1\": 5").unwrap();
        assert!(matches!(JsonFileStore::new(&path).load(), Err(SnapshotError::Decode(_))));
    }

    #[test]
    fn unreadable_path_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be.
        let store = JsonFileStore::new(dir.path());
        assert!(matches!(store.load(), Err(SnapshotError::Io { .. })));
    }

    #[test]
    fn load_then_save_is_idempotent_modulo_key_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("userdata.json");
        std::fs::write(&path, r#"{"u2": 7, "u1": 3}"#).unwrap();

        let store = JsonFileStore::new(&path);
        let loaded = store.load().unwrap().unwrap();
        store.save(&loaded).unwrap();

        let reloaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, reloaded);
        let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({ "u1": 3, "u2": 7 }));
    }
}
