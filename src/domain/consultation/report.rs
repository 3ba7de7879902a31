//! The downloadable consultation report.

use serde::Serialize;

use crate::domain::foundation::Timestamp;

/// File name offered to the browser.
pub const REPORT_FILENAME: &str = "consultation-report.md";

/// Media type of the download.
pub const REPORT_MEDIA_TYPE: &str = "text/markdown; charset=utf-8";

/// The final assistant message, exported verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportArtifact {
    content: String,
    generated_at: Timestamp,
}

impl ReportArtifact {
    pub(crate) fn new(content: impl Into<String>, generated_at: Timestamp) -> Self {
        Self {
            content: content.into(),
            generated_at,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }

    pub fn generated_at(&self) -> &Timestamp {
        &self.generated_at
    }

    pub fn filename(&self) -> &'static str {
        REPORT_FILENAME
    }

    pub fn media_type(&self) -> &'static str {
        REPORT_MEDIA_TYPE
    }
}
