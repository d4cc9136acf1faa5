//! Plain-text tables and number formatting for tool reports.

use comfy_table::{presets, CellAlignment, Table};

/// Render rows as an ASCII table. Columns from `numeric_from` onward are
/// right-aligned.
pub(crate) fn render_table(headers: &[&str], rows: Vec<Vec<String>>, numeric_from: usize) -> String {
    let mut table = Table::new();
    table.load_preset(presets::ASCII_FULL_CONDENSED);
    table.set_header(headers.to_vec());
    for row in rows {
        table.add_row(row);
    }
    for index in numeric_from..headers.len() {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
    table.to_string()
}

/// Prefix every line of `text` with `prefix`
pub(crate) fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| format!("{}{}", prefix, line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `1234567` -> `"1,234,567"`
pub(crate) fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Fixed-point with thousands separators: `1234.5` -> `"1,234.50"`
pub(crate) fn decimal(value: f64, places: usize) -> String {
    let formatted = format!("{:.*}", places, value.abs());
    let (whole, fraction) = match formatted.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (formatted.as_str(), None),
    };
    let sign = if value < 0.0 && formatted.chars().any(|c| ('1'..='9').contains(&c)) {
        "-"
    } else {
        ""
    };
    let whole = thousands(whole.parse::<u64>().unwrap_or(0));
    match fraction {
        Some(fraction) => format!("{}{}.{}", sign, whole, fraction),
        None => format!("{}{}", sign, whole),
    }
}
