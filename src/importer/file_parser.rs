// ==========================================
// NCIP Registry Import - Sheet file parsers
// ==========================================
// Upstream adapter: Excel (.xlsx/.xls/.ods) / CSV (.csv) → RawSheet
// Cells are stringified and trimmed; fully blank rows are skipped
// ==========================================

use crate::domain::RawSheet;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::FileParser;
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDateTime, NaiveTime};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};

// banner rows above the real header are single merged cells
const MIN_HEADER_CELLS: usize = 2;

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|cell| cell.is_empty())
}

/// Locate the header row and split the grid into a RawSheet.
fn sheet_from_grid(sheet_name: &str, grid: Vec<Vec<String>>) -> ImportResult<RawSheet> {
    let header_idx = grid
        .iter()
        .position(|row| row.iter().filter(|c| !c.is_empty()).count() >= MIN_HEADER_CELLS)
        .or_else(|| grid.iter().position(|row| !is_blank(row)))
        .ok_or_else(|| ImportError::MissingHeaderRow(sheet_name.to_string()))?;

    let mut rows = grid.into_iter().skip(header_idx);
    let header_row = rows.next().unwrap_or_default();
    let data_rows: Vec<Vec<String>> = rows.filter(|row| !is_blank(row)).collect();

    debug!(
        sheet = sheet_name,
        header_idx,
        columns = header_row.len(),
        rows = data_rows.len(),
        "sheet tabulated"
    );
    Ok(RawSheet::new(sheet_name, header_row, data_rows))
}

// ==========================================
// CSV Parser
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_sheets(&self, file_path: &Path) -> ImportResult<Vec<RawSheet>> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false) // header row is located like in workbooks
            .flexible(true) // rows may differ in length
            .from_reader(file);

        let mut grid = Vec::new();
        for result in reader.records() {
            let record = result?;
            grid.push(record.iter().map(|v| v.trim().to_string()).collect());
        }

        let sheet_name = file_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Sheet1");
        Ok(vec![sheet_from_grid(sheet_name, grid)?])
    }
}

// ==========================================
// Excel Parser
// ==========================================
// Every worksheet becomes one RawSheet; the sheet name carries the region
pub struct ExcelParser;

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        // date cells hold a serial number; "DATE APPROVED" should read as a date
        Data::DateTime(dt) if dt.is_datetime() => match dt.as_datetime() {
            Some(datetime) => datetime_text(datetime),
            None => dt.as_f64().to_string(),
        },
        other => other.to_string().trim().to_string(),
    }
}

/// `YYYY-MM-DD`, with the time only when it is not midnight.
fn datetime_text(datetime: NaiveDateTime) -> String {
    if datetime.time() == NaiveTime::MIN {
        datetime.format("%Y-%m-%d").to_string()
    } else {
        datetime.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

impl FileParser for ExcelParser {
    fn parse_sheets(&self, file_path: &Path) -> ImportResult<Vec<RawSheet>> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if !matches!(ext.as_str(), "xlsx" | "xls" | "xlsm" | "ods") {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;
        let sheet_names = workbook.sheet_names().to_vec();
        if sheet_names.is_empty() {
            return Err(ImportError::NoWorksheets);
        }

        let mut sheets = Vec::with_capacity(sheet_names.len());
        for sheet_name in &sheet_names {
            let range = workbook.worksheet_range(sheet_name)?;
            let grid: Vec<Vec<String>> = range
                .rows()
                .map(|row| row.iter().map(cell_text).collect())
                .collect();

            match sheet_from_grid(sheet_name, grid) {
                Ok(sheet) => sheets.push(sheet),
                // an empty tab next to populated ones is not fatal
                Err(ImportError::MissingHeaderRow(name)) => {
                    warn!(sheet = %name, "worksheet has no header row, skipped");
                }
                Err(e) => return Err(e),
            }
        }

        if sheets.is_empty() {
            return Err(ImportError::NoWorksheets);
        }
        Ok(sheets)
    }
}

// ==========================================
// Universal parser (dispatch by extension)
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_sheets(&self, file_path: &Path) -> ImportResult<Vec<RawSheet>> {
        match extension_of(file_path).as_str() {
            "csv" => CsvParser.parse_sheets(file_path),
            "xlsx" | "xls" | "xlsm" | "ods" => ExcelParser.parse_sheets(file_path),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_csv_parser_valid_file() {
        let file = csv_file(&[
            "Survey No.,Applicant,Area",
            "R1-01, Apo Mining ,12.5",
            "R1-02,Hydro Corp,3",
        ]);

        let sheets = CsvParser.parse_sheets(file.path()).unwrap();

        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].header_row, vec!["Survey No.", "Applicant", "Area"]);
        assert_eq!(sheets[0].data_rows.len(), 2);
        assert_eq!(sheets[0].data_rows[0][1], "Apo Mining");
    }

    #[test]
    fn test_csv_parser_skips_banner_and_blank_rows() {
        let file = csv_file(&[
            "NATIONAL COMMISSION ON INDIGENOUS PEOPLES,,",
            ",,",
            "Survey No.,Applicant,Area",
            "R1-01,Apo Mining,12.5",
            ",,",
            "R1-02,Hydro Corp",
        ]);

        let sheets = CsvParser.parse_sheets(file.path()).unwrap();

        assert_eq!(sheets[0].header_row[0], "Survey No.");
        assert_eq!(sheets[0].data_rows.len(), 2);
        assert_eq!(sheets[0].data_rows[1].len(), 2);
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_sheets(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_csv_parser_empty_file_has_no_header() {
        let file = csv_file(&[]);
        let result = CsvParser.parse_sheets(file.path());
        assert!(matches!(result, Err(ImportError::MissingHeaderRow(_))));
    }

    #[test]
    fn test_universal_parser_rejects_unknown_extension() {
        let result = UniversalFileParser.parse_sheets(Path::new("registry.pdf"));
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(ext)) if ext == "pdf"));
    }

    #[test]
    fn test_excel_date_cells_render_as_dates() {
        // 45292 is 2024-01-01 in the 1900 date system
        let date = Data::DateTime(ExcelDateTime::new(45292.0, ExcelDateTimeType::DateTime, false));
        assert_eq!(cell_text(&date), "2024-01-01");

        let with_time =
            Data::DateTime(ExcelDateTime::new(45292.5, ExcelDateTimeType::DateTime, false));
        assert_eq!(cell_text(&with_time), "2024-01-01 12:00:00");

        let iso = Data::DateTimeIso(" 2023-06-30 ".to_string());
        assert_eq!(cell_text(&iso), "2023-06-30");

        assert_eq!(cell_text(&Data::Float(120.0)), "120");
    }
}
