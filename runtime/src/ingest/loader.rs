//! Read a tabular keyword export into untyped rows.
//!
//! Three formats are accepted: CSV with a header row, the first sheet of a
//! spreadsheet (`.xlsx`/`.xls`), and the JSON rows the search-console client
//! hands over (either a bare array of objects or an object with a `data`
//! array).

use crate::error::{AnalyzerError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use tracing::debug;

/// Untyped table: header names as written in the file, one string per cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
}

impl RawTable {
    /// Cell at (`row`, `col`), empty when the record is short.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.records
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Load a file, choosing the parser from its extension.
pub fn load_table(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let table = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path).map_err(|e| AnalyzerError::unreadable(path, e))?;
            parse_csv(file).map_err(|e| AnalyzerError::unreadable(path, e))?
        }
        "xlsx" | "xls" => read_first_sheet(path).map_err(|e| AnalyzerError::unreadable(path, e))?,
        "json" => {
            let text =
                std::fs::read_to_string(path).map_err(|e| AnalyzerError::unreadable(path, e))?;
            parse_json_rows(&text).map_err(|e| AnalyzerError::unreadable(path, e))?
        }
        other => {
            return Err(AnalyzerError::unreadable(
                path,
                format!("unsupported file type '.{other}' (expected .csv, .xlsx, .xls or .json)"),
            ))
        }
    };

    debug!(
        "loaded {} rows with {} columns from {}",
        table.records.len(),
        table.headers.len(),
        path.display()
    );
    Ok(table)
}

/// Parse CSV with a header row. A UTF-8 byte-order mark on the first header
/// is stripped; spreadsheet exports often carry one.
pub fn parse_csv<R: std::io::Read>(reader: R) -> std::result::Result<RawTable, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut records = Vec::new();
    for record in rdr.records() {
        let record = record?;
        records.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable { headers, records })
}

/// Read the first worksheet. Its first row is the header row; numeric cells
/// are rendered without a trailing `.0` when integral.
pub fn read_first_sheet(path: &Path) -> std::result::Result<RawTable, String> {
    let mut workbook = open_workbook_auto(path).map_err(|e| e.to_string())?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| "workbook has no sheets".to_string())?
        .map_err(|e| e.to_string())?;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|r| r.iter().map(cell_text).collect())
        .unwrap_or_default();
    let records = rows
        .map(|r| r.iter().map(cell_text).collect::<Vec<_>>())
        .filter(|r: &Vec<String>| r.iter().any(|c| !c.is_empty()))
        .collect();

    Ok(RawTable { headers, records })
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

/// Parse JSON rows. The union of row keys becomes the header row; numbers
/// and booleans are stringified, `null` becomes an empty cell.
pub fn parse_json_rows(text: &str) -> std::result::Result<RawTable, String> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(|e| e.to_string())?;

    let rows = match &value {
        serde_json::Value::Array(rows) => rows,
        serde_json::Value::Object(obj) => match obj.get("data") {
            Some(serde_json::Value::Array(rows)) => rows,
            _ => return Err("expected an array of rows or an object with a 'data' array".into()),
        },
        _ => return Err("expected an array of rows".into()),
    };

    let mut headers: Vec<String> = Vec::new();
    for row in rows {
        let obj = row
            .as_object()
            .ok_or_else(|| "every row must be a JSON object".to_string())?;
        for key in obj.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.clone());
            }
        }
    }

    let records = rows
        .iter()
        .filter_map(|row| row.as_object())
        .map(|obj| {
            headers
                .iter()
                .map(|h| match obj.get(h) {
                    None | Some(serde_json::Value::Null) => String::new(),
                    Some(serde_json::Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                })
                .collect()
        })
        .collect();

    Ok(RawTable { headers, records })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_strips_bom() {
        let data = "\u{feff}Keyword,URL,Search Volume\nred shoes,https://x.com/a,100\n";
        let table = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["Keyword", "URL", "Search Volume"]);
        assert_eq!(table.records.len(), 1);
        assert_eq!(table.cell(0, 1), "https://x.com/a");
    }

    #[test]
    fn test_parse_csv_short_record() {
        let data = "query,page,clicks\nshoes,https://x.com/\n";
        let table = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(table.cell(0, 2), "");
        assert_eq!(table.cell(5, 0), "");
    }

    #[test]
    fn test_parse_json_rows_from_api_client() {
        let text = r#"[
            {"page": "https://x.com/a", "query": "red shoes", "clicks": 3, "impressions": 40, "ctr": 0.075, "position": 7.5},
            {"page": "https://x.com/b", "query": "green hat", "clicks": 0, "impressions": 9, "ctr": 0, "position": null}
        ]"#;
        let table = parse_json_rows(text).unwrap();
        let col = |name: &str| table.headers.iter().position(|h| h == name).unwrap();
        assert_eq!(table.headers.len(), 6);
        assert_eq!(table.cell(0, col("clicks")), "3");
        assert_eq!(table.cell(0, col("ctr")), "0.075");
        assert_eq!(table.cell(0, col("query")), "red shoes");
        assert_eq!(table.cell(1, col("position")), "");
    }

    #[test]
    fn test_parse_json_rows_data_wrapper() {
        let text = r#"{"success": true, "data": [{"Query": "q", "Page": "p"}], "count": 1}"#;
        let table = parse_json_rows(text).unwrap();
        assert_eq!(table.headers.len(), 2);
        assert_eq!(table.records.len(), 1);
        let page = table.headers.iter().position(|h| h == "Page").unwrap();
        assert_eq!(table.cell(0, page), "p");
    }

    #[test]
    fn test_parse_json_rows_rejects_scalars() {
        assert!(parse_json_rows("42").is_err());
        assert!(parse_json_rows("[1, 2]").is_err());
        assert!(parse_json_rows("{not json").is_err());
    }

    #[test]
    fn test_load_table_rejects_unknown_extension() {
        let err = load_table(Path::new("keywords.txt")).unwrap_err();
        assert!(matches!(err, AnalyzerError::UnreadableInput { .. }));
        assert!(err.to_string().contains(".xlsx"));
    }

    #[test]
    fn test_load_table_reads_first_sheet_of_workbook() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("ranks.xlsx");
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, h) in ["Keyword", "URL", "Search Volume", "Position"].iter().enumerate() {
            sheet.write_string(0, col as u16, *h).unwrap();
        }
        sheet.write_string(1, 0, "red shoes").unwrap();
        sheet.write_string(1, 1, "https://x.com/a").unwrap();
        sheet.write_number(1, 2, 1200.0).unwrap();
        sheet.write_number(1, 3, 7.5).unwrap();
        workbook.add_worksheet().write_string(0, 0, "ignored").unwrap();
        workbook.save(&path).unwrap();

        let table = load_table(&path).unwrap();
        assert_eq!(table.headers, vec!["Keyword", "URL", "Search Volume", "Position"]);
        assert_eq!(table.records.len(), 1);
        assert_eq!(table.cell(0, 0), "red shoes");
        assert_eq!(table.cell(0, 2), "1200");
        assert_eq!(table.cell(0, 3), "7.5");
    }

    #[test]
    fn test_load_table_corrupt_workbook_is_unreadable() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("broken.xlsx");
        std::fs::write(&path, "Keyword,URL\n").unwrap();
        let err = load_table(&path).unwrap_err();
        assert!(matches!(err, AnalyzerError::UnreadableInput { .. }));
    }

    #[test]
    fn test_load_table_missing_file() {
        let err = load_table(Path::new("/nonexistent/keywords.csv")).unwrap_err();
        assert!(matches!(err, AnalyzerError::UnreadableInput { .. }));
    }
}
