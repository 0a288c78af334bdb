use schedule_core::ids::{StoreId, WeekId};
use schedule_storage::SqliteStorage;
use tempfile::TempDir;

use crate::store::TestStore;

/// A file-backed database that several engines can open at once.
pub struct TestDatabase {
    _dir: TempDir,
    path: String,
    store_id: StoreId,
    week_id: WeekId,
}

impl TestDatabase {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("schedule.db").to_string_lossy().into_owned();
        Ok(Self {
            _dir: dir,
            path,
            store_id: StoreId::new(),
            week_id: WeekId::new(2026, 42)?,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Open another handle on the same file, scoped to the shared store week.
    pub fn open(&self) -> Result<TestStore, Box<dyn std::error::Error>> {
        TestStore::with_storage(SqliteStorage::open(&self.path)?, self.store_id, self.week_id)
    }
}
