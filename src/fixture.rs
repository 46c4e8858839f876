//! In-memory fixture archive uploaded into the container before the checks.

use anyhow::{anyhow, Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use log::debug;
use std::path::Path;
use tar_rs as tar;

/// A gzip-compressed tar of a local directory tree
pub struct FixtureArchive {
    bytes: Vec<u8>,
}

impl FixtureArchive {
    /// Packs `start_folder/relative_source` with entry names rooted at
    /// `relative_source`, so unpacking under `/var/www` yields `/var/www/html/...`.
    pub fn build(start_folder: &Path, relative_source: &str) -> Result<Self> {
        let source_dir = start_folder.join(relative_source);
        if !source_dir.is_dir() {
            return Err(anyhow!(
                "Fixture directory does not exist: {}",
                source_dir.display()
            ));
        }

        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        builder
            .append_dir_all(relative_source, &source_dir)
            .with_context(|| format!("Failed to archive {}", source_dir.display()))?;

        let bytes = builder
            .into_inner()
            .context("Failed to finish fixture archive")?
            .finish()
            .context("Failed to compress fixture archive")?;

        debug!(
            "Packed {} into {} bytes",
            source_dir.display(),
            bytes.len()
        );
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
