use crate::domain::record::{short_digest, Record};
use serde::{Deserialize, Serialize};

/// Header date used while the ledger holds no records.
pub const EMPTY_HEADER_DATE: &str = "0000-00-00";

/// Ordered recommendation history plus the date of its newest entry.
///
/// Records are kept sorted by `date` descending (plain string order, stable for equal
/// dates) and are unique per `(company, date)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    header_date: String,
    records: Vec<Record>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Appended,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub appended: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl MergeSummary {
    pub fn count(&mut self, outcome: MergeOutcome) {
        match outcome {
            MergeOutcome::Appended => self.appended += 1,
            MergeOutcome::Updated => self.updated += 1,
            MergeOutcome::Unchanged => self.unchanged += 1,
        }
    }

    pub fn changed(&self) -> bool {
        self.appended + self.updated > 0
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::empty()
    }
}

impl Ledger {
    pub fn empty() -> Self {
        Self {
            header_date: EMPTY_HEADER_DATE.to_string(),
            records: Vec::new(),
        }
    }

    /// Rebuilds a ledger from persisted state as-is. No sorting happens here.
    pub fn from_parts(header_date: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            header_date: header_date.into(),
            records,
        }
    }

    pub fn header_date(&self) -> &str {
        &self.header_date
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Applies one incoming record.
    ///
    /// A record whose `(company, date)` is already present replaces the stored entry in
    /// place when its fingerprint differs and is ignored otherwise; anything else is
    /// appended. The whole sequence is re-sorted afterwards so the ledger is consistent
    /// between calls.
    pub fn merge(&mut self, incoming: Record) -> MergeOutcome {
        let existing = self
            .records
            .iter()
            .position(|entry| entry.key() == incoming.key());

        let outcome = match existing {
            Some(idx) if self.records[idx].fingerprint() != incoming.fingerprint() => {
                self.records[idx] = incoming;
                MergeOutcome::Updated
            }
            Some(_) => MergeOutcome::Unchanged,
            None => {
                self.records.push(incoming);
                MergeOutcome::Appended
            }
        };

        // Vec::sort_by is stable; equal dates keep insertion order.
        self.records.sort_by(|a, b| b.date.cmp(&a.date));
        if let Some(newest) = self.records.first() {
            self.header_date = newest.date.clone();
        }

        outcome
    }

    pub fn merge_all<I>(&mut self, incoming: I) -> MergeSummary
    where
        I: IntoIterator<Item = Record>,
    {
        let mut summary = MergeSummary::default();
        for record in incoming {
            summary.count(self.merge(record));
        }
        summary
    }

    /// Short digest over every record fingerprint in ledger order.
    pub fn fingerprint(&self) -> String {
        let base: String = self.records.iter().map(Record::fingerprint).collect();
        short_digest(base.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acme(end: f64) -> Record {
        Record::new("ACME", "2024-01-10", 10.0, end)
    }

    fn is_sorted_desc(ledger: &Ledger) -> bool {
        ledger
            .records()
            .windows(2)
            .all(|w| w[0].date >= w[1].date)
    }

    #[test]
    fn empty_ledger_uses_sentinel_header() {
        let ledger = Ledger::empty();
        assert_eq!(ledger.header_date(), EMPTY_HEADER_DATE);
        assert!(ledger.is_empty());
        assert_eq!(Ledger::default(), ledger);
    }

    #[test]
    fn new_record_is_appended_and_sets_header() {
        let mut ledger = Ledger::empty();
        assert_eq!(ledger.merge(acme(12.0)), MergeOutcome::Appended);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.header_date(), "2024-01-10");
    }

    #[test]
    fn same_record_twice_is_a_noop() {
        let mut once = Ledger::empty();
        once.merge(acme(12.0));

        let mut twice = once.clone();
        assert_eq!(twice.merge(acme(12.0)), MergeOutcome::Unchanged);
        assert_eq!(twice, once);
    }

    #[test]
    fn changed_prices_replace_the_entry() {
        let mut ledger = Ledger::empty();
        ledger.merge(acme(12.0));
        let before = ledger.records()[0].fingerprint();

        assert_eq!(ledger.merge(acme(15.0)), MergeOutcome::Updated);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.records()[0].end_price, 15.0);
        assert_ne!(ledger.records()[0].fingerprint(), before);

        let cheaper_start = Record::new("ACME", "2024-01-10", 9.0, 15.0);
        assert_eq!(ledger.merge(cheaper_start), MergeOutcome::Updated);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.records()[0].start_price, 9.0);
    }

    #[test]
    fn update_keeps_position_among_equal_dates() {
        let mut ledger = Ledger::empty();
        ledger.merge(Record::new("AAA", "2024-01-10", 1.0, 2.0));
        ledger.merge(Record::new("BBB", "2024-01-10", 1.0, 2.0));
        ledger.merge(Record::new("CCC", "2024-01-10", 1.0, 2.0));

        ledger.merge(Record::new("AAA", "2024-01-10", 1.0, 3.0));

        let companies: Vec<_> = ledger.records().iter().map(|r| r.company.as_str()).collect();
        assert_eq!(companies, ["AAA", "BBB", "CCC"]);
        assert_eq!(ledger.records()[0].end_price, 3.0);
    }

    #[test]
    fn equal_dates_are_not_tie_broken_by_company() {
        let mut ledger = Ledger::empty();
        ledger.merge(Record::new("Zeta", "2024-01-10", 1.0, 2.0));
        ledger.merge(Record::new("Alpha", "2024-01-10", 1.0, 2.0));
        assert_eq!(ledger.records()[0].company, "Zeta");
        assert_eq!(ledger.records()[1].company, "Alpha");
    }

    #[test]
    fn newer_record_moves_to_front_and_header_follows() {
        let mut ledger = Ledger::empty();
        ledger.merge(Record::new("ACME", "2024-01-10", 10.0, 12.0));
        ledger.merge(Record::new("BETA", "2024-02-01", 20.0, 30.0));

        assert_eq!(ledger.header_date(), "2024-02-01");
        assert_eq!(ledger.records()[0].company, "BETA");

        // An older record lands behind without touching the header.
        ledger.merge(Record::new("GAMMA", "2023-12-31", 5.0, 6.0));
        assert_eq!(ledger.header_date(), "2024-02-01");
        assert_eq!(ledger.records()[2].company, "GAMMA");
    }

    #[test]
    fn identity_stays_unique_across_mixed_merges() {
        let incoming = vec![
            Record::new("ACME", "2024-01-10", 10.0, 12.0),
            Record::new("BETA", "2024-01-12", 20.0, 25.0),
            Record::new("ACME", "2024-01-10", 10.0, 14.0),
            Record::new("ACME", "2024-01-11", 10.0, 11.0),
            Record::new("BETA", "2024-01-12", 20.0, 25.0),
            Record::new("DELTA", "2023-11-30", 3.0, 2.5),
        ];

        let mut ledger = Ledger::empty();
        let summary = ledger.merge_all(incoming);

        assert_eq!(
            summary,
            MergeSummary {
                appended: 4,
                updated: 1,
                unchanged: 1
            }
        );
        assert!(summary.changed());
        assert_eq!(ledger.len(), 4);
        assert!(is_sorted_desc(&ledger));
        assert_eq!(ledger.header_date(), ledger.records()[0].date);

        let acme_10: Vec<_> = ledger
            .records()
            .iter()
            .filter(|r| r.company == "ACME" && r.date == "2024-01-10")
            .collect();
        assert_eq!(acme_10.len(), 1);
        assert_eq!(acme_10[0].end_price, 14.0);
    }

    #[test]
    fn merge_fixes_header_of_loaded_ledger() {
        let mut ledger = Ledger::from_parts(
            "1999-01-01",
            vec![Record::new("ACME", "2024-01-10", 10.0, 12.0)],
        );
        ledger.merge(Record::new("ACME", "2024-01-10", 10.0, 12.0));
        assert_eq!(ledger.header_date(), "2024-01-10");
    }

    #[test]
    fn ledger_fingerprint_tracks_contents() {
        assert_eq!(Ledger::empty().fingerprint(), "d41d");

        let mut ledger = Ledger::empty();
        ledger.merge(acme(12.0));
        assert_eq!(ledger.fingerprint(), "9cca");

        ledger.merge(acme(15.0));
        assert_eq!(ledger.fingerprint(), "c2aa");
    }

    #[test]
    fn unchanged_summary_reports_no_change() {
        let mut ledger = Ledger::empty();
        ledger.merge(acme(12.0));
        let summary = ledger.merge_all([acme(12.0)]);
        assert!(!summary.changed());
        assert_eq!(summary.unchanged, 1);
    }
}
