use std::path::Path;

use eyre::Result;
use log::info;
use storage::portable::{self, ImportError};

use crate::Ledger;

impl Ledger {
    /// Writes the whole state as a portable JSON document, same shape
    /// as the persisted one.
    pub fn export_to(&self, path: &Path) -> Result<()> {
        portable::write_portable(path, &self.state)?;
        info!("Exported state to {}", path.display());
        Ok(())
    }

    /// Full-replace import. Only the top-level shape is validated;
    /// interior damage degrades at the read sites. The caller confirms
    /// beforehand — once invoked, the replacement is unconditional.
    pub fn import_from(&mut self, path: &Path) -> Result<(), ImportError> {
        let snapshot = portable::read_portable(path)?;
        self.state = snapshot;
        self.dirty();
        info!("Imported state from {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use model::amount::Amount;

    #[test]
    fn test_export_then_import_round_trip() {
        let (dir, mut ledger) = testutil::ledger();
        ledger.add_participant("Иванова Анна");
        ledger.set_rent(Amount::int(70000));

        let file = dir.path().join("export.json");
        ledger.export_to(&file).unwrap();

        let (_dir2, mut other) = testutil::ledger();
        other.import_from(&file).unwrap();
        assert_eq!(other.state().participants.len(), 1);
        assert_eq!(other.state().rent_amount, Amount::int(70000));
    }

    #[test]
    fn test_import_rejects_wrong_shape_and_keeps_state() {
        let (dir, mut ledger) = testutil::ledger();
        ledger.add_participant("Иванова Анна");

        let file = dir.path().join("broken.json");
        std::fs::write(&file, r#"{"participants": []}"#).unwrap();
        assert!(matches!(
            ledger.import_from(&file),
            Err(ImportError::MissingSection("blocks"))
        ));
        // The rejected import must not have replaced anything.
        assert_eq!(ledger.state().participants.len(), 1);
    }
}
