use attend_domain::Ledger;

use crate::CoreError;

/// Key-value persistence contract for student ledgers.
///
/// Keys are opaque student identifiers. Implementations own retry and
/// timeout behaviour; callers treat every method as a synchronous call.
pub trait LedgerStorage: Send + Sync {
    /// Returns `None` when nothing is stored under `key`.
    fn load_ledger(&self, key: &str) -> Result<Option<Ledger>, CoreError>;
    fn save_ledger(&self, key: &str, ledger: &Ledger) -> Result<(), CoreError>;
    /// Removes the ledger stored under `key`; missing keys are not an error.
    fn delete_ledger(&self, key: &str) -> Result<(), CoreError>;
    /// Lists stored keys in ascending order.
    fn list_keys(&self) -> Result<Vec<String>, CoreError>;
}
