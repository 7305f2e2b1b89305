pub mod error;
pub mod json;
pub mod markdown;

pub use error::CodecError;
pub use json::JsonCodec;
pub use markdown::{ColumnLabels, MarkdownCodec};

use crate::domain::record::Record;
use crate::ledger::Ledger;

/// Text representation of a ledger. The reconciler never depends on a concrete format.
pub trait LedgerCodec: Send + Sync {
    fn format_name(&self) -> &'static str;

    /// Renders the ledger, or refuses when a record could not be read back as written.
    fn serialize(&self, ledger: &Ledger) -> Result<String, CodecError>;

    fn parse(&self, text: &str) -> Result<Ledger, CodecError>;
}

fn check_prices(record: &Record) -> Result<(), CodecError> {
    if record.start_price.is_finite() && record.end_price.is_finite() {
        return Ok(());
    }
    Err(CodecError::Unrepresentable {
        company: record.company.clone(),
        date: record.date.clone(),
        reason: "prices must be finite numbers",
    })
}
