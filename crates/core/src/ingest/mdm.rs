use crate::domain::record::Record;
use crate::ingest::html::{elements, Element};
use crate::ingest::price::{is_numeric_cell, parse_price};
use anyhow::{Context, Result};
use chrono::NaiveDate;

pub const DEFAULT_SOURCE_URL: &str =
    "https://www.mdm.pl/ui-pub/site/analizy_i_rynek/analizy_i_rekomendacje/analiza_fundamentalna/rekomendacje";

/// Class of the recommendations table on the source page.
pub const TABLE_CLASS: &str = "content-rekomendacja";

// Cell layout: company, recommendation, date, price on publication, horizon, target, ...
const COMPANY_CELL: usize = 0;
const DATE_CELL: usize = 2;
const START_PRICE_CELL: usize = 3;
const END_PRICE_CELL: usize = 5;
const MIN_CELLS: usize = 6;

/// Lazily turns the rows of the recommendations table into records.
///
/// Rows with too few cells, or whose target cell is not purely numeric (e.g. a
/// recommendation published without a target), are skipped. A row that has a target but
/// a broken company, date or publication price yields an error.
pub fn parse_candidates(page: &str) -> Result<impl Iterator<Item = Result<Record>> + '_> {
    let table = elements(page, "table")
        .find(|t| t.has_class(TABLE_CLASS))
        .with_context(|| format!("no <table class=\"{TABLE_CLASS}\"> on recommendations page"))?;
    let body = table
        .children("tbody")
        .next()
        .context("recommendations table has no <tbody>")?;

    Ok(body
        .children("tr")
        .enumerate()
        .filter_map(|(idx, row)| parse_row(idx + 1, &row).transpose()))
}

fn parse_row(row_no: usize, row: &Element<'_>) -> Result<Option<Record>> {
    let cells: Vec<String> = row.children("td").map(|cell| cell.text()).collect();
    if cells.len() < MIN_CELLS {
        tracing::debug!(row_no, cells = cells.len(), "skipping short recommendations row");
        return Ok(None);
    }

    let company = &cells[COMPANY_CELL];
    let end_raw = &cells[END_PRICE_CELL];
    if !is_numeric_cell(end_raw) {
        tracing::debug!(row_no, %company, target = %end_raw, "skipping row without numeric target");
        return Ok(None);
    }

    anyhow::ensure!(!company.is_empty(), "row {row_no}: company must be non-empty");
    anyhow::ensure!(
        !company.contains('|'),
        "row {row_no}: company must not contain '|' (got {company:?})"
    );

    let date = &cells[DATE_CELL];
    anyhow::ensure!(
        is_iso_date(date),
        "row {row_no} ({company}): date must be YYYY-MM-DD (got {date:?})"
    );

    let start_raw = &cells[START_PRICE_CELL];
    let start_price = parse_price(start_raw)
        .filter(|p| *p > 0.0)
        .with_context(|| format!("row {row_no} ({company}): invalid price on publication {start_raw:?}"))?;
    let end_price = parse_price(end_raw)
        .with_context(|| format!("row {row_no} ({company}): invalid target price {end_raw:?}"))?;

    Ok(Some(Record::new(
        company.as_str(),
        date.as_str(),
        start_price,
        end_price,
    )))
}

// Zero-padded dates keep string order equal to calendar order.
fn is_iso_date(s: &str) -> bool {
    s.len() == 10 && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}
