/// Parses a price cell as printed by the source, e.g. `"12,50"`, `"1 234,5"` or `"1,234.50"`.
///
/// Spaces (including non-breaking ones) are thousands separators. When both `,` and `.`
/// appear, whichever comes last is the decimal separator; a lone comma is a decimal
/// separator.
pub fn parse_price(raw: &str) -> Option<f64> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }

    let normalized = match (compact.rfind(','), compact.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => compact.replace('.', "").replace(',', "."),
        (_, Some(_)) => compact.replace(',', ""),
        _ => compact.replace(',', "."),
    };

    normalized
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Whether a cell only contains digits and separators (`^[0-9,.]+$`).
pub fn is_numeric_cell(raw: &str) -> bool {
    !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit() || b == b',' || b == b'.')
}
