use std::collections::HashSet;
use std::io::{Cursor, Write};

use anyhow::{anyhow, Context, Result};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use backend_domain::ports::ArchivePackager;
use backend_domain::ArchiveEntry;

/// ZIP archives with stored entries; PNG payloads are already compressed.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipPackager;

impl ArchivePackager for ZipPackager {
    fn package_files(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .unix_permissions(0o644);
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let mut seen = HashSet::new();

        for entry in entries {
            if !seen.insert(entry.path.as_str()) {
                return Err(anyhow!("duplicate archive path '{}'", entry.path));
            }
            writer
                .start_file(entry.path.as_str(), options)
                .with_context(|| format!("cannot add {}", entry.path))?;
            writer.write_all(&entry.bytes)?;
        }

        let cursor = writer.finish().context("cannot finish archive")?;
        Ok(cursor.into_inner())
    }
}
