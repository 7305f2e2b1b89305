pub mod html;
pub mod mdm;
pub mod price;
pub mod provider;

use crate::ledger::{Ledger, MergeSummary};
use anyhow::Result;

/// Merges every candidate on `page` into `ledger`, in page order.
///
/// Candidates are consumed as they are parsed; the first broken row aborts the run.
pub fn reconcile_page(ledger: &mut Ledger, page: &str) -> Result<MergeSummary> {
    let mut summary = MergeSummary::default();
    for candidate in mdm::parse_candidates(page)? {
        let record = candidate?;
        let company = record.company.clone();
        let date = record.date.clone();
        let outcome = ledger.merge(record);
        tracing::debug!(%company, %date, ?outcome, "merged recommendation");
        summary.count(outcome);
    }
    Ok(summary)
}
