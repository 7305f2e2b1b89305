use crate::codec::LedgerCodec;
use crate::ledger::Ledger;
use anyhow::Context;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Ledger persisted as a single text file.
#[derive(Debug, Clone)]
pub struct LedgerFile {
    path: PathBuf,
}

impl LedgerFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the ledger. A missing file is a first run and yields an empty ledger.
    pub fn load(&self, codec: &dyn LedgerCodec) -> anyhow::Result<Ledger> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no ledger file yet; starting empty");
                return Ok(Ledger::empty());
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read ledger {}", self.path.display()));
            }
        };

        codec.parse(&text).with_context(|| {
            format!(
                "failed to parse {} ledger {}",
                codec.format_name(),
                self.path.display()
            )
        })
    }

    /// Writes the serialized ledger next to the target and renames it into place, so an
    /// interrupted write leaves the previous ledger intact.
    pub fn save(&self, ledger: &Ledger, codec: &dyn LedgerCodec) -> anyhow::Result<()> {
        let text = codec
            .serialize(ledger)
            .with_context(|| format!("failed to serialize {} ledger", codec.format_name()))?;
        let tmp = self.tmp_path();

        std::fs::write(&tmp, text.as_bytes())
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path).with_context(|| {
            format!("failed to move {} to {}", tmp.display(), self.path.display())
        })?;

        tracing::info!(
            path = %self.path.display(),
            bytes = text.len(),
            records = ledger.len(),
            "ledger written"
        );
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
