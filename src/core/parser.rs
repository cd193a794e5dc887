//! Tabular parser: turns uploaded CSV / XLSX / XLS bytes into ordered raw rows.
//!
//! Row order in the output is the row order of the file. Distribution depends on it.

use crate::domain::model::{FileFormat, ParsedTable, RawRow};
use crate::utils::error::{LeadError, Result};
use calamine::{Data, Reader, Xls, Xlsx};
use std::io::Cursor;

#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    pub delimiter: u8,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

pub fn parse(bytes: &[u8], format: FileFormat, options: &ParseOptions) -> Result<ParsedTable> {
    parse_with_header_check(bytes, format, options, |_| Ok(()))
}

/// Same as [`parse`], but runs `check_headers` as soon as the header row is known
/// and before any data row is read. A file without a header row skips the check
/// and yields an empty table.
pub fn parse_with_header_check<F>(
    bytes: &[u8],
    format: FileFormat,
    options: &ParseOptions,
    check_headers: F,
) -> Result<ParsedTable>
where
    F: FnOnce(&[String]) -> Result<()>,
{
    tracing::debug!("Parsing {} bytes as {}", bytes.len(), format.as_str());
    match format {
        FileFormat::Csv => parse_csv(bytes, options.delimiter, check_headers),
        FileFormat::Xlsx => {
            let workbook = Xlsx::new(Cursor::new(bytes)).map_err(spreadsheet_error)?;
            parse_first_sheet(workbook, check_headers)
        }
        FileFormat::Xls => {
            let workbook = Xls::new(Cursor::new(bytes)).map_err(spreadsheet_error)?;
            parse_first_sheet(workbook, check_headers)
        }
    }
}

fn spreadsheet_error(e: impl std::fmt::Display) -> LeadError {
    LeadError::SpreadsheetError {
        message: e.to_string(),
    }
}

fn parse_csv<F>(bytes: &[u8], delimiter: u8, check_headers: F) -> Result<ParsedTable>
where
    F: FnOnce(&[String]) -> Result<()>,
{
    // 自己檢查欄位數，才能回報出錯的行號
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut records = reader.records();

    let headers: Vec<String> = loop {
        match records.next() {
            None => return Ok(ParsedTable::default()),
            Some(record) => {
                let record = record?;
                if is_blank(&record) {
                    continue;
                }
                break record.iter().map(str::to_string).collect();
            }
        }
    };

    check_headers(&headers)?;

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        if is_blank(&record) {
            continue;
        }

        if record.len() != headers.len() {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            return Err(LeadError::MalformedRow {
                line,
                expected: headers.len(),
                found: record.len(),
            });
        }

        let data = headers
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect::<Vec<_>>();
        rows.push(RawRow { data });
    }

    tracing::debug!("CSV parsed: {} columns, {} rows", headers.len(), rows.len());
    Ok(ParsedTable { headers, rows })
}

/// A line with nothing but whitespace. Delimiter-only lines such as `,,` are
/// kept as rows of empty fields.
fn is_blank(record: &csv::StringRecord) -> bool {
    record.len() <= 1 && record.iter().all(|field| field.is_empty())
}

fn parse_first_sheet<'a, R, F>(mut workbook: R, check_headers: F) -> Result<ParsedTable>
where
    R: Reader<Cursor<&'a [u8]>>,
    R::Error: std::fmt::Display,
    F: FnOnce(&[String]) -> Result<()>,
{
    // 只讀第一張工作表，其餘忽略
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(spreadsheet_error)?,
        None => return Ok(ParsedTable::default()),
    };

    let mut sheet_rows = range
        .rows()
        .map(|cells| cells.iter().map(cell_text).collect::<Vec<_>>())
        .filter(|cells| cells.iter().any(|cell| !cell.is_empty()));

    let columns = match sheet_rows.next() {
        Some(columns) => columns,
        None => return Ok(ParsedTable::default()),
    };

    // 標題為空白的欄位不納入
    let headers: Vec<String> = columns.iter().filter(|h| !h.is_empty()).cloned().collect();
    check_headers(&headers)?;

    let rows: Vec<RawRow> = sheet_rows
        .map(|cells| {
            let data = columns
                .iter()
                .zip(cells)
                .filter(|(header, _)| !header.is_empty())
                .map(|(header, value)| (header.clone(), value))
                .collect::<Vec<_>>();
            RawRow { data }
        })
        .collect();

    tracing::debug!("Sheet parsed: {} columns, {} rows", headers.len(), rows.len());
    Ok(ParsedTable { headers, rows })
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}
