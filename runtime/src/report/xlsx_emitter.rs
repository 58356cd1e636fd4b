//! Spreadsheet report: one workbook per run.

use super::{ReportEmitter, ReportTables, MAPPING_COLUMNS};
use crate::error::{AnalyzerError, Result};
use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet, XlsxError};
use std::path::{Path, PathBuf};
use tracing::info;

pub const PRESENCE_SHEET: &str = "On-Page Targeting";
pub const MAPPING_SHEET: &str = "Keyword Mapping";

const HEADER_FILL: &str = "#9B5277";
const YES_FILL: &str = "#BDD6AC";
const NO_FILL: &str = "#C58C8A";
const MAIN_FILL: &str = "#FFD966";
const SECONDARY_FILL: &str = "#C9DAF8";

struct Palette {
    header: Format,
    body: Format,
    yes: Format,
    no: Format,
    main: Format,
    secondary: Format,
}

impl Palette {
    fn new() -> Self {
        let body = Format::new()
            .set_align(FormatAlign::Left)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap();
        Self {
            header: Format::new()
                .set_bold()
                .set_font_color("#FFFFFF")
                .set_background_color(HEADER_FILL)
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter),
            yes: body.clone().set_background_color(YES_FILL),
            no: body.clone().set_background_color(NO_FILL),
            main: body.clone().set_bold().set_background_color(MAIN_FILL),
            secondary: body.clone().set_background_color(SECONDARY_FILL),
            body,
        }
    }
}

/// Tracks the widest cell per column; widths are capped per column.
struct ColumnWidths(Vec<usize>);

impl ColumnWidths {
    fn new(headers: &[&str]) -> Self {
        Self(headers.iter().map(|h| h.chars().count()).collect())
    }

    fn observe(&mut self, col: usize, cell: &str) {
        if let Some(w) = self.0.get_mut(col) {
            *w = (*w).max(cell.chars().count());
        }
    }

    fn apply(
        &self,
        sheet: &mut Worksheet,
        cap: impl Fn(usize) -> usize,
    ) -> std::result::Result<(), XlsxError> {
        for (col, width) in self.0.iter().enumerate() {
            let width = (width + 2).min(cap(col));
            sheet.set_column_width(col as u16, width as f64)?;
        }
        Ok(())
    }
}

/// Writes `<output_dir>/<report_name>.xlsx` with an on-page sheet and a
/// keyword mapping sheet. Returns the file name as the report reference.
pub struct XlsxReportEmitter {
    output_dir: PathBuf,
}

impl XlsxReportEmitter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn write_presence(
        sheet: &mut Worksheet,
        tables: &ReportTables,
        palette: &Palette,
    ) -> std::result::Result<(), XlsxError> {
        sheet.set_name(PRESENCE_SHEET)?;
        let headers = tables.presence_headers();
        let zone_columns = 2..super::PRESENCE_COLUMNS.len();
        let mut widths = ColumnWidths::new(&headers);

        for (col, header) in headers.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *header, &palette.header)?;
        }
        for (i, record) in tables.presence_records().enumerate() {
            let row = i as u32 + 1;
            for (col, cell) in record.iter().enumerate() {
                widths.observe(col, cell);
                let format = match cell.as_str() {
                    "YES" if zone_columns.contains(&col) => &palette.yes,
                    "NO" if zone_columns.contains(&col) => &palette.no,
                    _ => &palette.body,
                };
                match cell.parse::<f64>() {
                    Ok(n) if col >= zone_columns.end => {
                        sheet.write_number_with_format(row, col as u16, n, format)?
                    }
                    _ => sheet.write_string_with_format(row, col as u16, cell, format)?,
                };
            }
        }

        widths.apply(sheet, |_| 50)?;
        sheet.set_freeze_panes(1, 0)?;
        Ok(())
    }

    fn write_mapping(
        sheet: &mut Worksheet,
        tables: &ReportTables,
        palette: &Palette,
    ) -> std::result::Result<(), XlsxError> {
        sheet.set_name(MAPPING_SHEET)?;
        let mut widths = ColumnWidths::new(&MAPPING_COLUMNS);

        for (col, header) in MAPPING_COLUMNS.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *header, &palette.header)?;
        }
        for (i, record) in tables.mapping_records().enumerate() {
            let row = i as u32 + 1;
            for (col, cell) in record.iter().enumerate() {
                widths.observe(col, cell);
                let format = match col {
                    1 => &palette.main,
                    2 => &palette.secondary,
                    _ => &palette.body,
                };
                sheet.write_string_with_format(row, col as u16, cell, format)?;
            }
        }

        widths.apply(sheet, |col| match col {
            0 => 60,
            2 => 80,
            _ => 30,
        })?;
        sheet.set_freeze_panes(1, 0)?;
        Ok(())
    }

    fn write_workbook(&self, path: &Path, tables: &ReportTables) -> std::result::Result<(), String> {
        std::fs::create_dir_all(&self.output_dir)
            .map_err(|e| format!("{}: {e}", self.output_dir.display()))?;

        let palette = Palette::new();
        let mut workbook = Workbook::new();
        Self::write_presence(workbook.add_worksheet(), tables, &palette)
            .map_err(|e| e.to_string())?;
        Self::write_mapping(workbook.add_worksheet(), tables, &palette)
            .map_err(|e| e.to_string())?;
        workbook
            .save(path)
            .map_err(|e| format!("{}: {e}", path.display()))
    }
}

impl ReportEmitter for XlsxReportEmitter {
    fn emit(&self, tables: &ReportTables) -> Result<String> {
        let name = format!("{}.xlsx", tables.report_name());
        let path = self.output_dir.join(&name);

        self.write_workbook(&path, tables)
            .map_err(AnalyzerError::EmissionFailure)?;

        info!(
            rows = tables.rows.len(),
            pages = tables.mapping.len(),
            "report written to {}",
            path.display()
        );
        Ok(name)
    }
}
