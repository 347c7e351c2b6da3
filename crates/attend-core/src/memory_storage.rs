use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard},
};

use attend_domain::Ledger;

use crate::{storage::LedgerStorage, CoreError};

/// Process-local [`LedgerStorage`] used by tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStorage {
    ledgers: Mutex<BTreeMap<String, Ledger>>,
}

impl InMemoryLedgerStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.guard().map(|ledgers| ledgers.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn guard(&self) -> Result<MutexGuard<'_, BTreeMap<String, Ledger>>, CoreError> {
        self.ledgers
            .lock()
            .map_err(|_| CoreError::Storage("in-memory ledger store lock poisoned".into()))
    }
}

impl LedgerStorage for InMemoryLedgerStorage {
    fn load_ledger(&self, key: &str) -> Result<Option<Ledger>, CoreError> {
        Ok(self.guard()?.get(key).cloned())
    }

    fn save_ledger(&self, key: &str, ledger: &Ledger) -> Result<(), CoreError> {
        self.guard()?.insert(key.to_string(), ledger.clone());
        Ok(())
    }

    fn delete_ledger(&self, key: &str) -> Result<(), CoreError> {
        self.guard()?.remove(key);
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.guard()?.keys().cloned().collect())
    }
}
