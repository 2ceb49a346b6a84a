use crate::data_structures::ConversationExport;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

pub const DEFAULT_EXPORT_PATH: &str = "./conversation/conversations.json";

pub struct DataLoader;

impl DataLoader {
    pub fn new() -> Self {
        Self
    }

    /// Opens, reads and closes the export before returning.
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<ConversationExport> {
        let file = File::open(&path)
            .with_context(|| format!("Failed to open file: {}", path.as_ref().display()))?;

        let export = self
            .load_from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse export: {}", path.as_ref().display()))?;

        debug!(
            path = %path.as_ref().display(),
            conversations = export.len(),
            "Loaded conversation export"
        );

        Ok(export)
    }

    pub fn load_from_reader<R: Read>(&self, reader: R) -> Result<ConversationExport> {
        serde_json::from_reader(reader).context("Failed to parse JSON")
    }

    pub fn load_from_str(&self, content: &str) -> Result<ConversationExport> {
        serde_json::from_str(content).context("Failed to parse JSON")
    }
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}
