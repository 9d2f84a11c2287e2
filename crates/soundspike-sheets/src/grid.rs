//! Serde model for the export endpoint's `table.rows[].c[].v` payload and
//! coercion helpers over the heterogeneous cell values.
//!
//! ## Observed shape from live gviz exports
//!
//! Cells arrive as `{"v": <value>}` objects where `v` may be a string, a
//! number (including spreadsheet date serials), a boolean, or `null`; whole
//! cells may also be `null` inside the `c` array for sparse rows. Trailing
//! cells are sometimes omitted entirely, so rows are not guaranteed
//! rectangular. `#[serde(default)]` absorbs all of these.

use serde::Deserialize;
use serde_json::Value;

/// A raw 2-D cell grid: one `Vec<Value>` per row, row 0 being the header.
pub type Grid = Vec<Vec<Value>>;

/// Top-level gviz response after envelope stripping.
#[derive(Debug, Deserialize)]
pub struct GvizResponse {
    pub table: GvizTable,
}

#[derive(Debug, Deserialize)]
pub struct GvizTable {
    #[serde(default)]
    pub rows: Vec<GvizRow>,
}

#[derive(Debug, Deserialize)]
pub struct GvizRow {
    #[serde(default)]
    pub c: Vec<Option<GvizCell>>,
}

#[derive(Debug, Deserialize)]
pub struct GvizCell {
    #[serde(default)]
    pub v: Value,
}

impl GvizResponse {
    /// Flatten into the plain cell grid the parsers consume. Missing cells
    /// become `Value::Null`.
    #[must_use]
    pub fn into_grid(self) -> Grid {
        self.table
            .rows
            .into_iter()
            .map(|row| {
                row.c
                    .into_iter()
                    .map(|cell| cell.map_or(Value::Null, |c| c.v))
                    .collect()
            })
            .collect()
    }
}

/// Coerce a cell to non-empty text. Numbers stringify (sheet authors
/// sometimes enter numeric-looking names); null, booleans, and
/// whitespace-only strings yield `None`.
#[must_use]
pub fn cell_text(cell: &Value) -> Option<String> {
    match cell {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Coerce a cell to an integer count with `parseInt`-like semantics:
/// numbers truncate toward zero, strings parse an optional sign plus leading
/// digits (`"1,200"` stops at the comma and yields 1), anything else is 0.
#[must_use]
pub fn cell_count(cell: &Value) -> i64 {
    match cell {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i
            } else {
                #[allow(clippy::cast_possible_truncation)]
                n.as_f64().map_or(0, |f| f.trunc() as i64)
            }
        }
        Value::String(s) => parse_leading_int(s.trim()),
        _ => 0,
    }
}

/// Parse an optional sign followed by leading ASCII digits; 0 if none.
fn parse_leading_int(s: &str) -> i64 {
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let digits: &str = {
        let end = rest
            .as_bytes()
            .iter()
            .position(|b| !b.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return 0;
    }
    digits.parse::<i64>().map_or(0, |n| sign * n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn into_grid_handles_null_cells_and_ragged_rows() {
        let response: GvizResponse = serde_json::from_value(json!({
            "table": {
                "rows": [
                    {"c": [{"v": "Sound"}, {"v": "2024-01-01"}]},
                    {"c": [{"v": "Alpha"}, null]},
                    {"c": []}
                ]
            }
        }))
        .unwrap();
        let grid = response.into_grid();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[1], vec![json!("Alpha"), Value::Null]);
        assert!(grid[2].is_empty());
    }

    #[test]
    fn cell_text_trims_and_rejects_empty() {
        assert_eq!(cell_text(&json!("  Alpha ")), Some("Alpha".to_string()));
        assert_eq!(cell_text(&json!("   ")), None);
        assert_eq!(cell_text(&Value::Null), None);
        assert_eq!(cell_text(&json!(42)), Some("42".to_string()));
        assert_eq!(cell_text(&json!(true)), None);
    }

    #[test]
    fn cell_count_truncates_numbers() {
        assert_eq!(cell_count(&json!(50)), 50);
        assert_eq!(cell_count(&json!(50.9)), 50);
        assert_eq!(cell_count(&json!(-3.2)), -3);
    }

    #[test]
    fn cell_count_parses_leading_digits() {
        assert_eq!(cell_count(&json!("120")), 120);
        assert_eq!(cell_count(&json!("120 posts")), 120);
        assert_eq!(cell_count(&json!("-4")), -4);
        assert_eq!(cell_count(&json!("n/a")), 0);
        assert_eq!(cell_count(&Value::Null), 0);
    }
}
