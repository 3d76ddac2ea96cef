pub mod debounce;
pub mod portable;

use std::{
    fs,
    io::Write as _,
    path::{Path, PathBuf},
};

use eyre::{Context as _, Result};
use model::snapshot::StateSnapshot;

const TMP_SUFFIX: &str = "tmp";

/// Filesystem-backed JSON persistence for the state document. One file,
/// replaced as a whole on every save.
#[derive(Clone, Debug)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> JsonStore {
        JsonStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the document, seeding the initial state when no file exists
    /// yet. Interior damage (malformed attendance keys, non-numeric
    /// rent) is absorbed by the tolerant document deserializers.
    pub fn load(&self) -> Result<StateSnapshot> {
        if !self.path.exists() {
            log::info!(
                "No document at {}, starting from the initial state",
                self.path.display()
            );
            return Ok(StateSnapshot::initial());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }

    /// Writes through a temp file and renames, so a crash mid-write
    /// never truncates the document.
    pub fn save(&self, snapshot: &StateSnapshot) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
            }
        }
        let tmp = self.path.with_extension(TMP_SUFFIX);
        let mut file = fs::File::create(&tmp)
            .with_context(|| format!("Failed to create {}", tmp.display()))?;
        file.write_all(&serde_json::to_vec_pretty(snapshot)?)?;
        file.flush()?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}
