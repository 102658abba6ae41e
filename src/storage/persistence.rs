//! Vault persistence layer
//!
//! Provides save/load functionality for a vault snapshot: its guardian set,
//! transactions, balances, and event history.

use crate::multisig::{Address, EventLog, GuardianRegistry, GuardianSet, VaultState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub vault_file: String,
    pub backup_enabled: bool,
    pub max_backups: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".vault_data"),
            vault_file: "vault.json".to_string(),
            backup_enabled: true,
            max_backups: 5,
        }
    }
}

/// Everything needed to resume a vault
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VaultSnapshot {
    pub address: Address,
    pub guardians: GuardianSet,
    pub state: VaultState,
    pub history: EventLog,
    pub saved_at: DateTime<Utc>,
}

impl VaultSnapshot {
    /// Capture a snapshot
    pub fn new(guardians: GuardianSet, state: VaultState, history: EventLog) -> Self {
        Self {
            address: guardians.vault_address(),
            guardians,
            state,
            history,
            saved_at: Utc::now(),
        }
    }

    /// Check that the snapshot describes a consistent vault
    ///
    /// Deserialization bypasses the guardian-set constructor and the store's
    /// ID counter, so the set, the ID sequence, and the ledger totals are
    /// re-checked here.
    pub fn validate(&self) -> Result<(), StorageError> {
        GuardianSet::new(
            self.guardians.guardian_list().to_vec(),
            self.guardians.required_quorum(),
            self.guardians.label.clone(),
        )
        .map_err(|e| StorageError::InvalidData(e.to_string()))?;

        if self.address != self.guardians.vault_address() {
            return Err(StorageError::InvalidData(format!(
                "Vault address {} does not match guardian set",
                self.address
            )));
        }
        if self.state.balances().treasury() != &self.address {
            return Err(StorageError::InvalidData(format!(
                "Treasury {} does not belong to vault {}",
                self.state.balances().treasury(),
                self.address
            )));
        }

        self.state.verify().map_err(StorageError::InvalidData)
    }
}

/// Vault storage manager
pub struct VaultStorage {
    config: StorageConfig,
}

impl VaultStorage {
    /// Create a new storage manager
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self { config })
    }

    /// Create with default configuration
    pub fn with_defaults() -> Result<Self, StorageError> {
        Self::new(StorageConfig::default())
    }

    /// Get the vault file path
    fn vault_path(&self) -> PathBuf {
        self.config.data_dir.join(&self.config.vault_file)
    }

    /// Get a backup file path
    fn backup_path(&self, index: usize) -> PathBuf {
        self.config
            .data_dir
            .join(format!("{}.backup.{}", self.config.vault_file, index))
    }

    /// Save a snapshot to disk
    pub fn save(&self, snapshot: &VaultSnapshot) -> Result<(), StorageError> {
        let path = self.vault_path();

        if self.config.backup_enabled && self.config.max_backups > 0 && path.exists() {
            self.rotate_backups()?;
            fs::copy(&path, self.backup_path(0))?;
        }

        // Write to temporary file first
        let temp_path = self.config.data_dir.join("vault.tmp");
        let file = fs::File::create(&temp_path)?;
        let writer = BufWriter::new(file);

        serde_json::to_writer_pretty(writer, snapshot)?;

        // Atomic rename
        fs::rename(&temp_path, &path)?;

        log::debug!("Saved vault {} to {:?}", snapshot.address, path);
        Ok(())
    }

    /// Load the snapshot from disk
    pub fn load(&self) -> Result<VaultSnapshot, StorageError> {
        let path = self.vault_path();

        if !path.exists() {
            return Err(StorageError::InvalidData(
                "Vault file not found".to_string(),
            ));
        }

        read_snapshot(&path)
    }

    /// Check if a saved vault exists
    pub fn exists(&self) -> bool {
        self.vault_path().exists()
    }

    /// Delete the saved vault
    pub fn delete(&self) -> Result<(), StorageError> {
        let path = self.vault_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Rotate backup files
    fn rotate_backups(&self) -> Result<(), StorageError> {
        // Delete oldest backup
        let oldest = self.backup_path(self.config.max_backups - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        // Shift existing backups
        for i in (0..self.config.max_backups - 1).rev() {
            let current = self.backup_path(i);
            if current.exists() {
                fs::rename(&current, self.backup_path(i + 1))?;
            }
        }

        Ok(())
    }

    /// Restore from a backup
    pub fn restore_backup(&self, backup_index: usize) -> Result<VaultSnapshot, StorageError> {
        let backup_path = self.backup_path(backup_index);

        if !backup_path.exists() {
            return Err(StorageError::InvalidData(format!(
                "Backup {} not found",
                backup_index
            )));
        }

        read_snapshot(&backup_path)
    }

    /// List available backups
    pub fn list_backups(&self) -> Vec<usize> {
        (0..self.config.max_backups)
            .filter(|&i| self.backup_path(i).exists())
            .collect()
    }

    /// Get storage statistics
    pub fn stats(&self) -> Result<StorageStats, StorageError> {
        let path = self.vault_path();

        let file_size = if path.exists() {
            fs::metadata(&path)?.len()
        } else {
            0
        };

        Ok(StorageStats {
            file_size,
            backup_count: self.list_backups().len(),
            data_dir: self.config.data_dir.clone(),
        })
    }
}

/// Storage statistics
#[derive(Debug)]
pub struct StorageStats {
    pub file_size: u64,
    pub backup_count: usize,
    pub data_dir: PathBuf,
}

fn read_snapshot(path: &Path) -> Result<VaultSnapshot, StorageError> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    let snapshot: VaultSnapshot = serde_json::from_reader(reader)?;
    snapshot.validate()?;
    Ok(snapshot)
}

/// Save a snapshot to a specific file path
pub fn save_to_file(snapshot: &VaultSnapshot, path: &Path) -> Result<(), StorageError> {
    let file = fs::File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, snapshot)?;
    Ok(())
}

/// Load a snapshot from a specific file path
pub fn load_from_file(path: &Path) -> Result<VaultSnapshot, StorageError> {
    read_snapshot(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multisig::{ExecutionController, VaultEvent};

    fn snapshot_with_activity() -> VaultSnapshot {
        let guardians = GuardianSet::new(
            vec![Address::from("a"), Address::from("b")],
            2,
            Some("ops".to_string()),
        )
        .unwrap();
        let (mut controller, authority) =
            ExecutionController::new(guardians.vault_address(), guardians.clone());
        let mut state = controller.new_state();

        controller
            .deposit(&mut state, &Address::from("funder"), 50)
            .unwrap();
        controller
            .submit(
                &mut state,
                &authority.act_for(&Address::from("a")),
                Address::from("dest"),
                5,
                vec![0xde, 0xad],
                false,
            )
            .unwrap();

        VaultSnapshot::new(guardians, state, controller.history().clone())
    }

    fn storage_in(dir: &Path, max_backups: usize) -> VaultStorage {
        let config = StorageConfig {
            data_dir: dir.to_path_buf(),
            max_backups,
            ..Default::default()
        };
        VaultStorage::new(config).unwrap()
    }

    #[test]
    fn test_save_load_vault() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = storage_in(temp_dir.path(), 5);
        let snapshot = snapshot_with_activity();

        storage.save(&snapshot).unwrap();
        assert!(storage.exists());

        let loaded = storage.load().unwrap();
        assert_eq!(loaded.address, snapshot.address);
        assert_eq!(loaded.guardians, snapshot.guardians);
        assert_eq!(loaded.state.balances().treasury_balance(), 50);

        let tx = loaded.state.store().get(0).unwrap();
        assert_eq!(tx.data, vec![0xde, 0xad]);
        assert!(loaded
            .state
            .store()
            .confirmations(0)
            .unwrap()
            .is_confirmed_by(&Address::from("a")));
        assert_eq!(
            loaded.history.events().first(),
            Some(&VaultEvent::Deposit {
                sender: Address::from("funder"),
                value: 50
            })
        );
    }

    #[test]
    fn test_load_missing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = storage_in(temp_dir.path(), 5);

        assert!(!storage.exists());
        assert!(matches!(storage.load(), Err(StorageError::InvalidData(_))));
    }

    #[test]
    fn test_backup_rotation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = storage_in(temp_dir.path(), 3);
        let snapshot = snapshot_with_activity();

        for _ in 0..5 {
            storage.save(&snapshot).unwrap();
        }

        assert_eq!(storage.list_backups(), vec![0, 1, 2]);
        assert!(storage.restore_backup(0).is_ok());
        assert!(storage.restore_backup(7).is_err());
        assert_eq!(storage.stats().unwrap().backup_count, 3);
    }

    #[test]
    fn test_rewound_id_counter_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("export.json");
        let snapshot = snapshot_with_activity();
        assert!(snapshot.state.store().exists(0));

        let mut json = serde_json::to_value(&snapshot).unwrap();
        json["state"]["store"]["next_id"] = serde_json::json!(0);
        fs::write(&path, serde_json::to_vec(&json).unwrap()).unwrap();

        assert!(matches!(
            load_from_file(&path),
            Err(StorageError::InvalidData(_))
        ));
    }

    #[test]
    fn test_unbalanced_ledger_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("export.json");
        let snapshot = snapshot_with_activity();

        let mut json = serde_json::to_value(&snapshot).unwrap();
        json["state"]["balances"]["total_deposited"] = serde_json::json!(1_000_000);
        fs::write(&path, serde_json::to_vec(&json).unwrap()).unwrap();

        assert!(matches!(
            load_from_file(&path),
            Err(StorageError::InvalidData(_))
        ));
    }

    #[test]
    fn test_tampered_address_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("export.json");
        let mut snapshot = snapshot_with_activity();
        snapshot.address = Address::from("0xdeadbeef");

        save_to_file(&snapshot, &path).unwrap();

        assert!(matches!(
            load_from_file(&path),
            Err(StorageError::InvalidData(_))
        ));
    }
}
