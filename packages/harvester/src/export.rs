//! CSV export of harvested rows.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::{output_file_name, HarvestConfig};
use crate::error::Result;
use crate::types::OutputRow;

/// UTF-8 byte-order mark so spreadsheet applications detect the encoding.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Write rows to `openlibrary_<row count>.csv` in `output_dir`.
///
/// Rows keep their insertion order; columns follow [`OutputRow::COLUMNS`],
/// plus `author_work_count` when `with_author_stats` is set.
///
/// # Returns
/// Path of the written file
pub fn write_csv(rows: &[OutputRow], output_dir: &Path, with_author_stats: bool) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;

    let file_name = output_file_name(rows.len());
    let output_file = output_dir.join(&file_name);
    let temp_file = output_dir.join(format!(".{file_name}.tmp"));

    // Write to temp file first, then sync and rename for atomicity
    {
        let mut file = File::create(&temp_file)?;
        file.write_all(UTF8_BOM)?;

        let mut writer = csv::Writer::from_writer(file);
        let mut header: Vec<&str> = OutputRow::COLUMNS.to_vec();
        if with_author_stats {
            header.push(OutputRow::AUTHOR_WORK_COUNT_COLUMN);
        }
        writer.write_record(&header)?;
        for row in rows {
            writer.write_record(row.to_record(with_author_stats))?;
        }

        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
    }

    // On Windows, rename fails if the destination already exists
    #[cfg(target_os = "windows")]
    if output_file.exists() {
        fs::remove_file(&output_file)?;
    }

    fs::rename(&temp_file, &output_file)?;

    Ok(output_file)
}

/// Export rows as configured. Returns `None` when CSV output is disabled.
pub fn export_rows(rows: &[OutputRow], config: &HarvestConfig) -> Result<Option<PathBuf>> {
    if !config.output_csv {
        tracing::debug!(rows = rows.len(), "CSV output disabled, skipping export");
        return Ok(None);
    }

    let path = write_csv(rows, &config.output_dir, config.author_stats)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "Saved dataset");
    Ok(Some(path))
}
