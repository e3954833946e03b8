//! Treatments read from a local JSON dump
//!
//! The file holds the same JSON array the Nightscout treatments endpoint
//! returns. Every record is handed to the pipeline; window filtering is
//! left to it.

use async_trait::async_trait;
use carbstat_core::error::Result;
use carbstat_core::source::TreatmentSource;
use carbstat_core::types::{DateWindow, RawTreatment};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads treatments from a JSON file
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Create a source reading `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TreatmentSource for FileSource {
    async fn fetch(&self, _window: &DateWindow) -> Result<Vec<RawTreatment>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let treatments: Vec<RawTreatment> = serde_json::from_str(&content)?;
        debug!(
            "Loaded {} treatments from {}",
            treatments.len(),
            self.path.display()
        );
        Ok(treatments)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
