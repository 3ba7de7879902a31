//! Detection of model output that is already a finished report.
//!
//! The model is instructed to wrap up on its own once it has enough
//! information. When it does, its reply opens a report section instead of
//! asking another question, and the consultation must move to `Reported`
//! even though no limit was hit.

/// Predicate over assistant output: "does this look like a finished report?"
pub trait ReportDetector: Send + Sync {
    fn is_report(&self, assistant_text: &str) -> bool;
}

/// Matches Markdown headings whose title contains an accepted variant.
///
/// Heading lines are normalised before comparison: leading `#` marks and
/// whitespace are stripped, then any leading emoji or punctuation, and the
/// rest is lower-cased. So `### 🩺 Pattern Differentiation`,
/// `## pattern differentiation` and `# **Pattern Differentiation**` all match
/// the variant `Pattern Differentiation`.
#[derive(Debug, Clone)]
pub struct HeadingReportDetector {
    variants: Vec<String>,
}

impl HeadingReportDetector {
    /// Creates a detector from heading titles. Blank titles are ignored.
    pub fn new<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let variants = variants
            .into_iter()
            .map(|v| normalize_title(v.as_ref()))
            .filter(|v| !v.is_empty())
            .collect();
        Self { variants }
    }

    /// Normalised variants, in insertion order.
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    fn heading_matches(&self, line: &str) -> bool {
        let trimmed = line.trim_start();
        if !trimmed.starts_with('#') {
            return false;
        }
        let title = normalize_title(trimmed.trim_start_matches('#'));
        self.variants.iter().any(|v| title.contains(v.as_str()))
    }
}

impl ReportDetector for HeadingReportDetector {
    fn is_report(&self, assistant_text: &str) -> bool {
        assistant_text.lines().any(|line| self.heading_matches(line))
    }
}

fn normalize_title(raw: &str) -> String {
    raw.trim()
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .trim_end_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}
