// Step 1: file upload and the Upload -> Configure transition.
use super::PricingSession;
use crate::data::csv_parser::{ColumnMapping, ParsedTable, SAMPLE_CSV};
use crate::error::{SessionError, UploadError};
use shared::Step;
use std::path::Path;

impl PricingSession {
    /// Replaces the current file. On error nothing from the new file is kept
    /// and the previous one stays loaded.
    pub fn load_file(&mut self, file_name: &str, text: &str) -> Result<(), SessionError> {
        if self.step != Step::Upload {
            return Err(self.transition_error(Step::Upload, "files can only be loaded at the upload step"));
        }
        match Self::parse_upload(file_name, text) {
            Ok(table) => {
                self.mapping = ColumnMapping::infer(&table.headers);
                tracing::info!(
                    session_id = %self.id,
                    file = %file_name,
                    rows = table.rows.len(),
                    name_column = self.mapping.name,
                    price_column = self.mapping.price,
                    "Loaded CSV file"
                );
                self.file_name = Some(file_name.to_string());
                self.table = Some(table);
                self.products.clear();
                self.selected = None;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(session_id = %self.id, file = %file_name, error = %e, "Rejected upload");
                self.error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    fn parse_upload(file_name: &str, text: &str) -> Result<ParsedTable, UploadError> {
        if !file_name.to_lowercase().ends_with(".csv") {
            return Err(UploadError::NotCsv {
                file_name: file_name.to_string(),
            });
        }
        Ok(ParsedTable::parse(text)?)
    }

    /// Reads a file from disk; the handle is released once the text is read.
    pub fn load_path(&mut self, path: &Path) -> Result<(), SessionError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(source) => {
                let e = UploadError::Io {
                    path: path.display().to_string(),
                    source,
                };
                self.error = Some(e.to_string());
                return Err(e.into());
            }
        };
        self.load_file(&file_name, &text)
    }

    pub fn clear_file(&mut self) {
        self.file_name = None;
        self.table = None;
        self.error = None;
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn table(&self) -> Option<&ParsedTable> {
        self.table.as_ref()
    }

    pub fn step1_valid(&self) -> bool {
        self.file_name.is_some() && self.table.as_ref().is_some_and(|t| !t.rows.is_empty())
    }

    pub fn continue_to_configure(&mut self) -> Result<(), SessionError> {
        if self.step != Step::Upload {
            return Err(self.transition_error(Step::Configure, "only reachable from the upload step"));
        }
        if !self.step1_valid() {
            return Err(self.transition_error(Step::Configure, "load a CSV file with at least one data row first"));
        }
        self.step = Step::Configure;
        Ok(())
    }

    pub fn sample_csv() -> &'static str {
        SAMPLE_CSV
    }
}
