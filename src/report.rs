//! Structured report model and its plain-text renderer.
//!
//! Formatters build a [`Report`]; presentation is left to [`Report::render_text`]
//! or to any other consumer of the serialized model.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Rendered in place of a missing or null value.
pub const PLACEHOLDER: &str = "N/A";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum EntryLevel {
    #[default]
    Info,
    Success,
    Warning,
    Critical,
}

/// A single line of a section: either a labeled value or free text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportLine {
    Row {
        label: String,
        value: String,
        level: EntryLevel,
    },
    Text {
        text: String,
        level: EntryLevel,
    },
}

impl ReportLine {
    pub fn row(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Row {
            label: label.into(),
            value: value.into(),
            level: EntryLevel::Info,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            level: EntryLevel::Info,
        }
    }

    pub fn with_level(mut self, new_level: EntryLevel) -> Self {
        match &mut self {
            Self::Row { level, .. } | Self::Text { level, .. } => *level = new_level,
        }
        self
    }

    pub fn level(&self) -> EntryLevel {
        match self {
            Self::Row { level, .. } | Self::Text { level, .. } => *level,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSection {
    pub title: String,
    pub lines: Vec<ReportLine>,
}

impl ReportSection {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    pub fn row(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.lines.push(ReportLine::row(label, value));
        self
    }

    /// Adds a row whose value may be missing; missing values render [`PLACEHOLDER`].
    pub fn row_or_placeholder<V: ToString>(self, label: impl Into<String>, value: Option<V>) -> Self {
        let value = value
            .map(|v| v.to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string());
        self.row(label, value)
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.lines.push(ReportLine::text(text));
        self
    }

    pub fn line(mut self, line: ReportLine) -> Self {
        self.lines.push(line);
        self
    }

    pub fn push(&mut self, line: ReportLine) {
        self.lines.push(line);
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Ordered list of titled sections. Empty sections are never stored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    pub sections: Vec<ReportSection>,
}

impl Report {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sections: Vec::new(),
        }
    }

    /// Appends the section unless it has no lines.
    pub fn push(&mut self, section: ReportSection) {
        if !section.is_empty() {
            self.sections.push(section);
        }
    }

    pub fn section(&self, title: &str) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.title == title)
    }

    pub fn has_section(&self, title: &str) -> bool {
        self.section(title).is_some()
    }

    /// Renders the report as a plain text block.
    pub fn render_text(&self) -> String {
        let mut out = format!("=== {} ===\n", self.title);
        for section in &self.sections {
            out.push('\n');
            out.push_str(&section.title);
            out.push('\n');
            out.push_str(&"-".repeat(section.title.chars().count()));
            out.push('\n');

            let width = section
                .lines
                .iter()
                .filter_map(|line| match line {
                    ReportLine::Row { label, .. } => Some(label.chars().count()),
                    ReportLine::Text { .. } => None,
                })
                .max()
                .unwrap_or(0);

            for line in &section.lines {
                let marker = match line.level() {
                    EntryLevel::Info => "",
                    EntryLevel::Success => "[ok] ",
                    EntryLevel::Warning => "[!] ",
                    EntryLevel::Critical => "[!!] ",
                };
                match line {
                    ReportLine::Row { label, value, .. } => {
                        out.push_str(&format!("{marker}{label:<width$} : {value}\n"));
                    }
                    ReportLine::Text { text, .. } => {
                        out.push_str(&format!("{marker}{text}\n"));
                    }
                }
            }
        }
        out
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sections_are_dropped() {
        let mut report = Report::new("Test");
        report.push(ReportSection::new("Empty"));
        report.push(ReportSection::new("Full").row("a", "b"));
        assert_eq!(report.sections.len(), 1);
        assert!(!report.has_section("Empty"));
    }

    #[test]
    fn test_placeholder_for_missing_values() {
        let section = ReportSection::new("S").row_or_placeholder::<String>("ip", None);
        assert_eq!(section.lines[0], ReportLine::row("ip", PLACEHOLDER));
    }

    #[test]
    fn test_render_aligns_labels() {
        let mut report = Report::new("Scan");
        report.push(
            ReportSection::new("Summary")
                .row("Target", "example.com")
                .row("IP", "93.184.216.34")
                .text("done"),
        );
        let text = report.render_text();
        assert!(text.starts_with("=== Scan ===\n"));
        assert!(text.contains("Summary\n-------\n"));
        assert!(text.contains("Target : example.com\n"));
        assert!(text.contains("IP     : 93.184.216.34\n"));
        assert!(text.contains("\ndone\n"));
    }

    #[test]
    fn test_render_marks_levels() {
        let mut report = Report::new("R");
        report.push(
            ReportSection::new("Warnings")
                .text("plain")
                .line(ReportLine::text("gps").with_level(EntryLevel::Critical)),
        );
        let text = report.render_text();
        assert!(text.contains("[!!] gps"));
    }
}
