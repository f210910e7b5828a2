//! Spreadsheet layout configuration
//!
//! Names the spreadsheet and the worksheet that holds each document kind.

use thiserror::Error;

use crate::shared::document::DocumentKind;

/// Default worksheet names
pub const DEFAULT_CANVAS_SHEET: &str = "Canvas";
pub const DEFAULT_CHARACTER_SHEET: &str = "Character";
pub const DEFAULT_TIMELINE_SHEET: &str = "Timeline";

/// Spreadsheet layout used by the spreadsheet document store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetsConfig {
    /// Spreadsheet (workbook) ID
    pub spreadsheet_id: String,
    /// Worksheet holding canvas chunks
    pub canvas_sheet: String,
    /// Worksheet holding character rows
    pub character_sheet: String,
    /// Worksheet holding timeline rows
    pub timeline_sheet: String,
}

impl SheetsConfig {
    /// Create a new SheetsConfigBuilder
    pub fn builder() -> SheetsConfigBuilder {
        SheetsConfigBuilder::default()
    }

    /// Worksheet that stores the given kind
    pub fn sheet_for(&self, kind: DocumentKind) -> &str {
        match kind {
            DocumentKind::Canvas => &self.canvas_sheet,
            DocumentKind::Character => &self.character_sheet,
            DocumentKind::Timeline => &self.timeline_sheet,
        }
    }

    /// Validate the configuration
    ///
    /// Each kind needs its own non-empty worksheet; the chunked and
    /// single-row layouts cannot share one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spreadsheet_id.trim().is_empty() {
            return Err(ConfigError::MissingValue("spreadsheet_id"));
        }
        let names = [&self.canvas_sheet, &self.character_sheet, &self.timeline_sheet];
        if names.iter().any(|n| n.trim().is_empty()) {
            return Err(ConfigError::MissingValue("sheet name"));
        }
        for (i, a) in names.iter().enumerate() {
            if names[i + 1..].contains(a) {
                return Err(ConfigError::DuplicateSheet((*a).clone()));
            }
        }
        Ok(())
    }
}

/// Builder for SheetsConfig
#[derive(Debug, Default)]
pub struct SheetsConfigBuilder {
    spreadsheet_id: Option<String>,
    canvas_sheet: Option<String>,
    character_sheet: Option<String>,
    timeline_sheet: Option<String>,
}

impl SheetsConfigBuilder {
    /// Set the spreadsheet ID
    pub fn spreadsheet_id(mut self, id: impl Into<String>) -> Self {
        self.spreadsheet_id = Some(id.into());
        self
    }

    /// Set the canvas worksheet name
    pub fn canvas_sheet(mut self, name: impl Into<String>) -> Self {
        self.canvas_sheet = Some(name.into());
        self
    }

    /// Set the character worksheet name
    pub fn character_sheet(mut self, name: impl Into<String>) -> Self {
        self.character_sheet = Some(name.into());
        self
    }

    /// Set the timeline worksheet name
    pub fn timeline_sheet(mut self, name: impl Into<String>) -> Self {
        self.timeline_sheet = Some(name.into());
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<SheetsConfig, ConfigError> {
        let config = SheetsConfig {
            spreadsheet_id: self
                .spreadsheet_id
                .ok_or(ConfigError::MissingValue("spreadsheet_id"))?,
            canvas_sheet: self
                .canvas_sheet
                .unwrap_or_else(|| DEFAULT_CANVAS_SHEET.to_string()),
            character_sheet: self
                .character_sheet
                .unwrap_or_else(|| DEFAULT_CHARACTER_SHEET.to_string()),
            timeline_sheet: self
                .timeline_sheet
                .unwrap_or_else(|| DEFAULT_TIMELINE_SHEET.to_string()),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("worksheet '{0}' is assigned to more than one document kind")]
    DuplicateSheet(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: &'static str, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_applies_default_sheet_names() {
        let config = SheetsConfig::builder().spreadsheet_id("abc").build().unwrap();
        assert_eq!(config.sheet_for(DocumentKind::Canvas), "Canvas");
        assert_eq!(config.sheet_for(DocumentKind::Character), "Character");
        assert_eq!(config.sheet_for(DocumentKind::Timeline), "Timeline");
    }

    #[test]
    fn test_missing_spreadsheet_id() {
        let err = SheetsConfig::builder().build().unwrap_err();
        assert_eq!(err, ConfigError::MissingValue("spreadsheet_id"));
    }

    #[test]
    fn test_duplicate_sheet_rejected() {
        let err = SheetsConfig::builder()
            .spreadsheet_id("abc")
            .character_sheet("Docs")
            .timeline_sheet("Docs")
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateSheet("Docs".to_string()));
    }

    #[test]
    fn test_blank_sheet_rejected() {
        let err = SheetsConfig::builder()
            .spreadsheet_id("abc")
            .canvas_sheet("  ")
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingValue("sheet name"));
    }
}
