//! Presentation adapters for the ordered record set: terminal grid,
//! clipboard payload and Excel workbook.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use arboard::Clipboard;
use colored::Colorize;
use comfy_table::Table;
use rust_xlsxwriter::{Format, FormatBorder, RowNum, Workbook};

use crate::record::{HEADERS, InvoiceRecord};

/// Render records as a bordered grid with the spreadsheet header row.
#[must_use]
pub fn render_table(records: &[InvoiceRecord]) -> Table {
    let mut table = Table::new();
    table.set_header(HEADERS.to_vec());
    for record in records {
        table.add_row(record.columns().to_vec());
    }
    table
}

/// Build the tab-joined clipboard payload.
///
/// Each row carries extra empty columns between the issuer name, the
/// expense type and the total so the paste lands in the right columns of
/// the target spreadsheet layout.
#[must_use]
pub fn clipboard_payload(records: &[InvoiceRecord]) -> String {
    records
        .iter()
        .map(|record| {
            let [uuid, fecha, rfc, nombre, tipo, total] = record.columns();
            format!("{uuid}\t{fecha}\t{rfc}\t{nombre}\t\t\t\t{tipo}\t\t\t{total}")
        })
        .collect::<Vec<String>>()
        .join("\n")
}

/// Deliver the payload to the system clipboard.
///
/// # Errors
/// Returns an error if the clipboard cannot be opened or written.
pub fn copy_to_clipboard(payload: &str) -> Result<()> {
    let mut clipboard = Clipboard::new().context("Failed to open system clipboard")?;
    clipboard
        .set_text(payload)
        .context("Failed to write to system clipboard")?;
    Ok(())
}

/// Save records to an Excel workbook.
///
/// The output path can name the `.xlsx` file directly; any other path is
/// treated as a directory and `facturas.xlsx` is created inside it.
///
/// # Errors
/// Returns an error if the workbook cannot be written.
pub fn write_to_excel(records: &[InvoiceRecord], output_path: &Path) -> Result<()> {
    let output_file = excel_file_path(output_path);
    println!(
        "{}",
        format!("Writing data to Excel: {}", output_file.display()).green()
    );

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet().set_name("Facturas")?;
    let header_format = Format::new().set_bold().set_border(FormatBorder::Thin);

    for (column, header) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, column as u16, *header, &header_format)?;
    }
    let mut row: RowNum = 1;
    for record in records {
        for (column, value) in record.columns().iter().enumerate() {
            sheet.write_string(row, column as u16, *value)?;
        }
        row += 1;
    }
    sheet.autofit();

    workbook
        .save(&output_file)
        .with_context(|| format!("Failed to save Excel file: {}", output_file.display()))?;
    Ok(())
}

fn excel_file_path(output_path: &Path) -> PathBuf {
    if output_path
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"))
    {
        output_path.to_path_buf()
    } else {
        output_path.join("facturas.xlsx")
    }
}
