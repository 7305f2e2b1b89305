use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of hex characters kept from the content digest.
pub const FINGERPRINT_LEN: usize = 4;

/// One analyst recommendation as published by the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub company: String,
    /// `YYYY-MM-DD`, kept as an opaque token. Ordering is lexicographic.
    pub date: String,
    pub start_price: f64,
    pub end_price: f64,
}

/// Identity of a record within the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordKey<'a> {
    pub company: &'a str,
    pub date: &'a str,
}

impl Record {
    pub fn new(
        company: impl Into<String>,
        date: impl Into<String>,
        start_price: f64,
        end_price: f64,
    ) -> Self {
        Self {
            company: company.into(),
            date: date.into(),
            start_price,
            end_price,
        }
    }

    pub fn key(&self) -> RecordKey<'_> {
        RecordKey {
            company: &self.company,
            date: &self.date,
        }
    }

    /// Relative distance from the publication price to the target, e.g. `0.2` for +20%.
    pub fn change_percent(&self) -> f64 {
        self.end_price / self.start_price - 1.0
    }

    /// Short content hash over the canonical display string.
    ///
    /// Any change to one of the four stored fields (at display precision) changes the
    /// fingerprint with overwhelming probability. Not a security property.
    pub fn fingerprint(&self) -> String {
        short_digest(self.to_string().as_bytes())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({:.2} ---({})---> {:.2})",
            self.date,
            self.company,
            self.start_price,
            format_percent(self.change_percent()),
            self.end_price
        )
    }
}

/// Formats a ratio as a percentage with two decimals (`0.5` -> `"50.00%"`).
pub fn format_percent(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

/// First `FINGERPRINT_LEN` lowercase hex chars of the MD5 of `bytes`.
pub(crate) fn short_digest(bytes: &[u8]) -> String {
    let digest = Md5::digest(bytes);
    let mut hex = format!("{digest:x}");
    hex.truncate(FINGERPRINT_LEN);
    hex
}
