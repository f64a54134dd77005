// crates/chih-daemon/src/persistence.rs
//
// Ledger snapshots on disk.
//
// The pool, the vault and the signed-call replay state are saved together as
// one JSON document so a restart never sees pool custody and vault balances
// from different moments, and never forgets which nonces were spent.
// Writes go to a temporary file that is renamed over the previous snapshot.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use chih_core::ChihError;
use chih_ledger::{PoolSnapshot, VaultSnapshot};
use chih_rpc::AuthSnapshot;

/// Everything needed to resume the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedLedger {
    /// RFC 3339 time the snapshot was taken.
    pub saved_at: String,
    pub pool: PoolSnapshot,
    pub vault: VaultSnapshot,
    /// Spent nonces and faucet claims.
    #[serde(default)]
    pub auth: AuthSnapshot,
}

impl PersistedLedger {
    pub fn new(pool: PoolSnapshot, vault: VaultSnapshot, auth: AuthSnapshot) -> Self {
        Self {
            saved_at: chrono::Utc::now().to_rfc3339(),
            pool,
            vault,
            auth,
        }
    }
}

/// A snapshot file at a fixed path.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot, or `None` if none has been written yet.
    pub fn load(&self) -> Result<Option<PersistedLedger>, ChihError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ChihError::Storage(format!(
                    "read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };
        let ledger = serde_json::from_str(&contents)?;
        Ok(Some(ledger))
    }

    /// Write the snapshot atomically.
    pub fn save(&self, ledger: &PersistedLedger) -> Result<(), ChihError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ChihError::Storage(format!("create {}: {}", parent.display(), e)))?;
        }
        let json = serde_json::to_string_pretty(ledger)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .map_err(|e| ChihError::Storage(format!("write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| ChihError::Storage(format!("rename {}: {}", tmp.display(), e)))?;
        tracing::debug!("Ledger snapshot written to {}", self.path.display());
        Ok(())
    }
}
