use crate::codec::{check_prices, CodecError, LedgerCodec};
use crate::ledger::Ledger;

/// Self-describing alternative to the Markdown table.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl LedgerCodec for JsonCodec {
    fn format_name(&self) -> &'static str {
        "json"
    }

    fn serialize(&self, ledger: &Ledger) -> Result<String, CodecError> {
        // serde_json writes non-finite floats as null, which would not parse back.
        for record in ledger.records() {
            check_prices(record)?;
        }
        let mut out = serde_json::to_string_pretty(ledger)?;
        out.push('\n');
        Ok(out)
    }

    fn parse(&self, text: &str) -> Result<Ledger, CodecError> {
        Ok(serde_json::from_str(text)?)
    }
}
