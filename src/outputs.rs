use chrono::{DateTime, Local};
use clap::ValueEnum;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::{DATETIME_FORMAT, ParserConfig};
use crate::error::{ParserError, Result};
use crate::modes::Mode;
use crate::table::ResultTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Bordered, left-aligned table.
    Pretty,
    /// CSV file under the results directory.
    File,
}

/// Renders `table` as selected; `None` prints plain lines.
pub fn dispatch(
    table: &ResultTable,
    format: Option<OutputFormat>,
    mode: Mode,
    config: &ParserConfig,
) -> Result<()> {
    match format {
        None => {
            let stdout = io::stdout();
            default_output(table, &mut stdout.lock()).map_err(|e| ParserError::io("<stdout>", e))
        }
        Some(OutputFormat::Pretty) => {
            println!("{}", pretty_table(table));
            Ok(())
        }
        Some(OutputFormat::File) => {
            file_output(table, mode, &config.results_dir(), Local::now()).map(|_| ())
        }
    }
}

/// One line per row, fields separated by a space.
pub fn default_output<W: Write>(table: &ResultTable, out: &mut W) -> io::Result<()> {
    for row in table.all_rows() {
        writeln!(out, "{}", row.join(" "))?;
    }
    Ok(())
}

pub fn pretty_table(table: &ResultTable) -> String {
    let mut widths: Vec<usize> = table.header().iter().map(|h| h.chars().count()).collect();
    for row in table.rows() {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let border: String = widths
        .iter()
        .map(|w| format!("+{}", "-".repeat(w + 2)))
        .collect::<String>()
        + "+";

    let render_row = |row: &[String]| -> String {
        let cells: String = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("| {:<width$} ", cell, width = width))
            .collect();
        cells + "|"
    };

    let mut lines = vec![border.clone(), render_row(table.header()), border.clone()];
    lines.extend(table.rows().iter().map(|row| render_row(row)));
    lines.push(border);
    lines.join("\n")
}

/// `<mode>_<YYYY-MM-DD_HH-MM-SS>.csv`
pub fn results_file_name(mode: Mode, now: DateTime<Local>) -> String {
    format!("{}_{}.csv", mode.name(), now.format(DATETIME_FORMAT))
}

/// Writes the table as a Unix-dialect CSV into `results_dir`.
pub fn file_output(
    table: &ResultTable,
    mode: Mode,
    results_dir: &Path,
    now: DateTime<Local>,
) -> Result<PathBuf> {
    fs::create_dir_all(results_dir).map_err(|e| ParserError::io(results_dir, e))?;
    let file_path = results_dir.join(results_file_name(mode, now));

    let file = File::create(&file_path).map_err(|e| ParserError::io(&file_path, e))?;
    let mut writer = BufWriter::new(file);
    for row in table.all_rows() {
        write_csv_row(&mut writer, row).map_err(|e| ParserError::io(&file_path, e))?;
    }
    writer.flush().map_err(|e| ParserError::io(&file_path, e))?;

    log::info!("Results saved: {}", file_path.display());
    Ok(file_path)
}

/// Every field quoted, embedded quotes doubled, `\n` terminated.
pub fn write_csv_row<W: Write>(mut w: W, row: &[String]) -> io::Result<()> {
    let line = row
        .iter()
        .map(|cell| format!("\"{}\"", cell.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(",");
    writeln!(w, "{}", line)
}
