use crate::codec::{check_prices, CodecError, LedgerCodec};
use crate::domain::record::{format_percent, Record};
use crate::ledger::Ledger;

pub const COLUMN_COUNT: usize = 6;

const HEADER_MARKER: &str = "# ";
const HEADER_DATE_LEN: usize = 10;
const FIELD_SEPARATOR: &str = " | ";
const BORDER_ROW: &str = "---|---|---|---|---|---";

/// Titles of the table's header row. Presentation only; never read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLabels(pub [&'static str; COLUMN_COUNT]);

impl ColumnLabels {
    pub const ENGLISH: Self = Self([
        "checksum",
        "date",
        "company",
        "starting price",
        "change",
        "ending price",
    ]);

    /// Labels of ledgers written by the previous Polish-language tool.
    pub const POLISH: Self = Self([
        "checksum",
        "data",
        "spółka",
        "cena początkowa",
        "zmiana",
        "cena końcowa",
    ]);

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Self::ENGLISH),
            "pl" => Some(Self::POLISH),
            _ => None,
        }
    }
}

impl Default for ColumnLabels {
    fn default() -> Self {
        Self::ENGLISH
    }
}

/// Pipe-delimited Markdown table, one recommendation per row.
///
/// ```text
/// # 2024-01-10
/// checksum | date | company | starting price | change | ending price
/// ---|---|---|---|---|---
/// cfad | 2024-01-10 | ACME | 10.00 | 20.00% | 12.00
/// ```
#[derive(Debug, Clone, Default)]
pub struct MarkdownCodec {
    labels: ColumnLabels,
}

impl MarkdownCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_labels(labels: ColumnLabels) -> Self {
        Self { labels }
    }
}

impl LedgerCodec for MarkdownCodec {
    fn format_name(&self) -> &'static str {
        "markdown"
    }

    fn serialize(&self, ledger: &Ledger) -> Result<String, CodecError> {
        let mut out = String::new();
        out.push_str(HEADER_MARKER);
        out.push_str(ledger.header_date());
        out.push('\n');
        out.push_str(&self.labels.0.join(FIELD_SEPARATOR));
        out.push('\n');
        out.push_str(BORDER_ROW);
        out.push('\n');
        for record in ledger.records() {
            out.push_str(&render_row(record)?);
            out.push('\n');
        }
        Ok(out)
    }

    fn parse(&self, text: &str) -> Result<Ledger, CodecError> {
        let mut lines = text.lines();
        let header = lines
            .next()
            .filter(|line| !line.trim().is_empty())
            .ok_or(CodecError::MissingHeader)?;
        let header_date = parse_header_date(header)?;

        // Column titles and border row carry no data.
        lines.next();
        lines.next();

        let mut records = Vec::new();
        for (idx, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            records.push(parse_row(line, idx + 4)?);
        }

        Ok(Ledger::from_parts(header_date, records))
    }
}

fn render_row(record: &Record) -> Result<String, CodecError> {
    check_prices(record)?;
    check_cell(record, &record.company, "company")?;
    check_cell(record, &record.date, "date")?;

    Ok(format!(
        "{} | {} | {} | {:.2} | {} | {:.2}",
        record.fingerprint(),
        record.date,
        record.company,
        record.start_price,
        format_percent(record.change_percent()),
        record.end_price
    ))
}

/// Text cells are split on `|` and trimmed when read back.
fn check_cell(record: &Record, value: &str, column: &'static str) -> Result<(), CodecError> {
    let reason = if value.contains('|') {
        "contains the column separator '|'"
    } else if value.contains(['\n', '\r']) {
        "contains a line break"
    } else if value.trim() != value {
        "has leading or trailing whitespace"
    } else {
        return Ok(());
    };
    tracing::debug!(column, value, reason, "record cannot be written as a table row");
    Err(CodecError::Unrepresentable {
        company: record.company.clone(),
        date: record.date.clone(),
        reason,
    })
}

fn parse_header_date(line: &str) -> Result<String, CodecError> {
    let malformed = || CodecError::MalformedHeader {
        line: line.to_string(),
    };
    let rest = line.strip_prefix(HEADER_MARKER).ok_or_else(malformed)?;
    let date: String = rest.chars().take(HEADER_DATE_LEN).collect();
    if date.chars().count() != HEADER_DATE_LEN {
        return Err(malformed());
    }
    Ok(date)
}

fn parse_row(line: &str, line_no: usize) -> Result<Record, CodecError> {
    let fields: Vec<&str> = line.split('|').map(str::trim).collect();
    if fields.len() != COLUMN_COUNT {
        return Err(CodecError::ColumnCount {
            line_no,
            expected: COLUMN_COUNT,
            got: fields.len(),
        });
    }

    // fields[0] is the stored checksum and fields[4] the derived change; both are
    // recomputed from the remaining columns.
    Ok(Record {
        date: fields[1].to_string(),
        company: fields[2].to_string(),
        start_price: parse_number(fields[3], line_no, "starting price")?,
        end_price: parse_number(fields[5], line_no, "ending price")?,
    })
}

fn parse_number(value: &str, line_no: usize, column: &'static str) -> Result<f64, CodecError> {
    // f64::from_str also accepts "NaN" and "inf".
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CodecError::InvalidPrice {
            line_no,
            column,
            value: value.to_string(),
        })
}
