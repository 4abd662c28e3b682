//! Turns service payloads into display-ready reports.
//!
//! Each task kind has its own formatter. They never fail: missing values
//! render [`PLACEHOLDER`](crate::report::PLACEHOLDER) and sections with nothing
//! to show are left out.

use secrecy::{ExposeSecret, SecretString};

use crate::models::{GeneratedPassword, MetadataReport, ScanResult, TaskOutput, TypeSpecific};
use crate::report::{EntryLevel, Report, ReportLine, ReportSection};
use crate::strength::{PasswordAnalysis, StrengthStrategy};

pub const SUMMARY: &str = "Summary";
pub const OPEN_PORTS: &str = "Open Ports";
pub const PASSWORD: &str = "Generated Password";
pub const FILE_INFO: &str = "File Information";
pub const ANALYSIS_ERROR: &str = "Analysis Error";
pub const DOCUMENT_PROPERTIES: &str = "Document Properties";
pub const SENSITIVE_DATA: &str = "Sensitive Data";
pub const EXIF: &str = "EXIF";
pub const ADDITIONAL_INFO: &str = "Additional Image Info";
pub const WARNINGS: &str = "Warnings";

pub const NO_OPEN_PORTS: &str = "No open ports found";

/// Property values that carry no information.
const SENTINEL_VALUES: [&str; 3] = ["Unknown", "None", "Untitled"];

/// EXIF tags shown first, in this order, when present.
const EXIF_PRIORITY: [&str; 9] = [
    "GPSInfo",
    "Make",
    "Model",
    "Software",
    "DateTime",
    "DateTimeOriginal",
    "Artist",
    "Copyright",
    "LensModel",
];

/// Raw EXIF fields shown when none of the priority tags is present.
const EXIF_FALLBACK_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatOptions {
    pub strength: StrengthStrategy,
}

/// Formats any task payload.
pub fn format(output: &TaskOutput, options: &FormatOptions) -> Report {
    match output {
        TaskOutput::PortScan(scan) => format_scan(scan),
        TaskOutput::PasswordGeneration(generated) => format_password(generated, options.strength),
        TaskOutput::MetadataAnalysis(report) => format_metadata(report),
    }
}

/// Formats a payload straight to text.
pub fn format_text(output: &TaskOutput, options: &FormatOptions) -> String {
    format(output, options).render_text()
}

pub fn format_scan(scan: &ScanResult) -> Report {
    let mut report = Report::new("Port Scan Results");

    let mut summary = ReportSection::new(SUMMARY)
        .row_or_placeholder("Target", scan.target.as_ref())
        .row_or_placeholder("Resolved IP", scan.ip.as_ref())
        .row_or_placeholder("Scan duration", scan.scan_time.as_ref())
        .row_or_placeholder("Ports scanned", scan.scanned_ports.as_ref());
    if let Some(count) = &scan.open_count {
        summary = summary.row("Open ports", count);
    }
    if let Some(avg) = &scan.avg_time_per_port {
        summary = summary.row("Avg time per port", avg);
    }
    if let Some(ts) = &scan.timestamp {
        summary = summary.row("Timestamp", ts);
    }
    report.push(summary);

    let mut ports = ReportSection::new(OPEN_PORTS);
    if scan.open_ports.is_empty() {
        ports.push(ReportLine::text(NO_OPEN_PORTS));
    }
    for open in &scan.open_ports {
        ports.push(
            ReportLine::text(format!(
                "{}/tcp  {} ({})",
                open.port,
                open.service.as_deref().unwrap_or("unknown"),
                open.response_time.as_deref().unwrap_or("?"),
            ))
            .with_level(EntryLevel::Success),
        );
    }
    report.push(ports);

    report
}

pub fn format_password(generated: &GeneratedPassword, strategy: StrengthStrategy) -> Report {
    let analysis = PasswordAnalysis::new(
        SecretString::new(generated.password.expose_secret().into()),
        generated.generated_from_phrase,
    );
    let mut report = Report::new("Password Generator");

    let yes_no = |flag: bool| if flag { "Yes" } else { "No" };
    let mut section = ReportSection::new(PASSWORD)
        .row("Password", analysis.password.expose_secret())
        .row("Length", format!("{} characters", analysis.length))
        .row("Entropy", format!("{:.2} bits", analysis.entropy_bits()))
        .row("Strength", analysis.label(strategy).to_string())
        .row(
            "Legacy score",
            format!("{}/100 ({})", analysis.legacy.value, analysis.legacy.label),
        )
        .row("Uppercase", yes_no(analysis.has_uppercase()))
        .row("Numbers", yes_no(analysis.has_numbers()))
        .row("Symbols", yes_no(analysis.has_symbols()));

    if let Some(reported) = generated.reported.as_ref().and_then(|a| a.strength.as_ref()) {
        section = section.row("Service strength", reported);
    }

    let origin = if analysis.generated_from_phrase {
        "Derived from your passphrase"
    } else {
        "Randomly generated"
    };
    report.push(section.text(origin));

    report
}

pub fn format_metadata(metadata: &MetadataReport) -> Report {
    let mut report = Report::new("Metadata Analysis");
    let info = &metadata.file_info;

    report.push(
        ReportSection::new(FILE_INFO)
            .row_or_placeholder("Filename", info.filename.as_ref())
            .row_or_placeholder("Size", info.size.as_ref())
            .row_or_placeholder("MIME type", info.mime_type.as_ref())
            .row_or_placeholder("Extension", info.extension.as_ref())
            .row("File type", metadata.file_type.as_str())
            .row_or_placeholder("Created", info.created.as_ref())
            .row_or_placeholder("Modified", info.modified.as_ref())
            .row_or_placeholder("Accessed", info.accessed.as_ref())
            .row_or_placeholder("Analyzed at", metadata.timestamp.as_ref()),
    );

    match metadata.analysis_error() {
        Some(error) => report.push(
            ReportSection::new(ANALYSIS_ERROR)
                .line(ReportLine::text(error).with_level(EntryLevel::Warning)),
        ),
        None => {
            if let Some(section) = type_specific_section(metadata.type_specific()) {
                report.push(section);
            }
        }
    }

    if let Some(properties) = metadata.document_properties() {
        let mut section = ReportSection::new(DOCUMENT_PROPERTIES);
        for (key, value) in properties {
            if is_informative(&value) {
                section = section.row(key, value);
            }
        }
        report.push(section);
    }

    if let Some(sensitive) = metadata.sensitive_data() {
        let mut section = ReportSection::new(SENSITIVE_DATA);
        for (key, value) in sensitive {
            section.push(ReportLine::row(key, value).with_level(EntryLevel::Warning));
        }
        report.push(section);
    }

    report.push(exif_section(metadata));

    if let Some(additional) = metadata.additional_info() {
        let mut section = ReportSection::new(ADDITIONAL_INFO);
        for (key, value) in additional {
            section = section.row(key, value);
        }
        report.push(section);
    }

    let mut warnings = ReportSection::new(WARNINGS);
    for warning in &metadata.warnings {
        warnings.push(ReportLine::text(warning).with_level(warning_level(warning)));
    }
    report.push(warnings);

    report
}

fn type_specific_section(fields: TypeSpecific) -> Option<ReportSection> {
    let section = match fields {
        TypeSpecific::Image {
            dimensions,
            format,
            mode,
        } => ReportSection::new("Image Details")
            .row_or_placeholder("Dimensions", dimensions)
            .row_or_placeholder("Format", format)
            .row_or_placeholder("Color mode", mode),
        TypeSpecific::Pdf { pages, encrypted } => ReportSection::new("PDF Details")
            .row_or_placeholder("Pages", pages)
            .row_or_placeholder("Encrypted", encrypted),
        TypeSpecific::Word {
            paragraphs,
            tables,
            sections,
        } => ReportSection::new("Word Document Details")
            .row_or_placeholder("Paragraphs", paragraphs)
            .row_or_placeholder("Tables", tables)
            .row_or_placeholder("Sections", sections),
        TypeSpecific::Excel {
            sheets,
            sheet_names,
            active_sheet,
        } => {
            let names = (!sheet_names.is_empty()).then(|| sheet_names.join(", "));
            ReportSection::new("Excel Workbook Details")
                .row_or_placeholder("Sheets", sheets)
                .row_or_placeholder("Sheet names", names)
                .row_or_placeholder("Active sheet", active_sheet)
        }
        TypeSpecific::Text {
            lines,
            words,
            characters,
            encoding,
        } => ReportSection::new("Text Details")
            .row_or_placeholder("Lines", lines)
            .row_or_placeholder("Words", words)
            .row_or_placeholder("Characters", characters)
            .row_or_placeholder("Encoding", encoding),
        TypeSpecific::Unknown => return None,
    };
    Some(section)
}

fn is_informative(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && !SENTINEL_VALUES.contains(&value)
}

fn exif_section(metadata: &MetadataReport) -> ReportSection {
    let mut section = ReportSection::new(EXIF);
    let fields = metadata.exif().unwrap_or_default();

    let prioritized: Vec<_> = EXIF_PRIORITY
        .iter()
        .filter_map(|tag| fields.iter().find(|(key, _)| key.as_str() == *tag))
        .collect();

    if !prioritized.is_empty() {
        for (key, value) in prioritized {
            section.push(ReportLine::row(key, value).with_level(EntryLevel::Warning));
        }
    } else {
        for (key, value) in fields.iter().take(EXIF_FALLBACK_COUNT) {
            section.push(ReportLine::row(key, value));
        }
        if fields.len() > EXIF_FALLBACK_COUNT {
            section.push(ReportLine::text(format!(
                "... and {} more",
                fields.len() - EXIF_FALLBACK_COUNT
            )));
        }
    }

    if let Some(note) = metadata.exif_note() {
        section.push(ReportLine::text(note));
    }
    section
}

fn warning_level(warning: &str) -> EntryLevel {
    let lower = warning.to_lowercase();
    if lower.contains("crítico") || lower.contains("critical") || warning.contains('🚨') {
        EntryLevel::Critical
    } else if warning.contains('✅') {
        EntryLevel::Success
    } else {
        EntryLevel::Warning
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DataEnvelope, OpenPort};
    use crate::report::PLACEHOLDER;
    use crate::strength::StrengthLabel;
    use serde_json::json;

    fn metadata(value: serde_json::Value) -> MetadataReport {
        let envelope: DataEnvelope<MetadataReport> =
            serde_json::from_value(json!({ "data": value })).expect("valid metadata payload");
        envelope.data
    }

    fn row_value<'a>(report: &'a Report, section: &str, label: &str) -> Option<&'a str> {
        report.section(section)?.lines.iter().find_map(|line| match line {
            ReportLine::Row { label: l, value, .. } if l == label => Some(value.as_str()),
            _ => None,
        })
    }

    #[test]
    fn test_scan_without_open_ports_has_explicit_line() {
        let scan = ScanResult {
            target: Some("example.com".into()),
            ip: Some("93.184.216.34".into()),
            scan_time: Some("2.01s".into()),
            scanned_ports: Some("11".into()),
            ..ScanResult::default()
        };
        let report = format_scan(&scan);
        let ports = report.section(OPEN_PORTS).expect("open ports section");
        assert_eq!(ports.lines, vec![ReportLine::text(NO_OPEN_PORTS)]);

        let text = report.render_text();
        assert!(text.contains(NO_OPEN_PORTS));
        assert!(!text.contains("/tcp"));
    }

    #[test]
    fn test_scan_lists_ports_with_defaults() {
        let scan = ScanResult {
            open_ports: vec![
                OpenPort {
                    port: 443,
                    service: Some("https".into()),
                    response_time: Some("12.40ms".into()),
                },
                OpenPort {
                    port: 8443,
                    service: None,
                    response_time: None,
                },
            ],
            ..ScanResult::default()
        };
        let text = format_scan(&scan).render_text();
        assert!(text.contains("443/tcp  https (12.40ms)"));
        assert!(text.contains("8443/tcp  unknown (?)"));
        assert!(!text.contains(NO_OPEN_PORTS));
    }

    #[test]
    fn test_scan_summary_uses_placeholders() {
        let report = format_scan(&ScanResult::default());
        assert_eq!(row_value(&report, SUMMARY, "Target"), Some(PLACEHOLDER));
        assert_eq!(row_value(&report, SUMMARY, "Resolved IP"), Some(PLACEHOLDER));
        assert_eq!(row_value(&report, SUMMARY, "Scan duration"), Some(PLACEHOLDER));
        assert_eq!(row_value(&report, SUMMARY, "Ports scanned"), Some(PLACEHOLDER));
        assert_eq!(row_value(&report, SUMMARY, "Timestamp"), None);
    }

    #[test]
    fn test_null_metadata_fields_render_placeholders() {
        let report = format_metadata(&metadata(json!({
            "file_info": null,
            "file_type": null,
            "metadata": null,
            "warnings": null
        })));
        assert_eq!(row_value(&report, FILE_INFO, "Filename"), Some(PLACEHOLDER));
        assert_eq!(row_value(&report, FILE_INFO, "File type"), Some("unknown"));
        assert!(!report.has_section(WARNINGS));
    }

    #[test]
    fn test_password_report_recomputes_strength() {
        let generated = GeneratedPassword::new("aB3!aB3!", false);
        let report = format_password(&generated, StrengthStrategy::Entropy);
        assert_eq!(row_value(&report, PASSWORD, "Password"), Some("aB3!aB3!"));
        assert_eq!(row_value(&report, PASSWORD, "Entropy"), Some("52.44 bits"));
        assert_eq!(
            row_value(&report, PASSWORD, "Strength"),
            Some(StrengthLabel::Moderate.as_str())
        );
        assert_eq!(row_value(&report, PASSWORD, "Legacy score"), Some("60/100 (Moderate)"));
        assert_eq!(row_value(&report, PASSWORD, "Symbols"), Some("Yes"));
        assert!(report.render_text().contains("Randomly generated"));
    }

    #[test]
    fn test_password_report_marks_phrase_origin() {
        let generated = GeneratedPassword::new("abcd1234", true);
        let report = format_password(&generated, StrengthStrategy::Legacy);
        assert_eq!(row_value(&report, PASSWORD, "Strength"), Some("Moderate"));
        assert_eq!(row_value(&report, PASSWORD, "Legacy score"), Some("30/100 (Moderate)"));
        assert_eq!(row_value(&report, PASSWORD, "Uppercase"), Some("No"));
        assert!(report.render_text().contains("Derived from your passphrase"));
    }

    #[test]
    fn test_sentinel_only_properties_are_omitted() {
        let report = format_metadata(&metadata(json!({
            "file_info": {"filename": "memo.docx"},
            "file_type": "word",
            "metadata": {
                "paragraphs": 4, "tables": 0, "sections": 1,
                "document_properties": {
                    "author": "Unknown", "title": "Untitled", "subject": "None",
                    "keywords": "", "revision": "Unknown"
                }
            },
            "warnings": []
        })));
        assert!(!report.has_section(DOCUMENT_PROPERTIES));
        assert!(!report.has_section(WARNINGS));
        assert_eq!(row_value(&report, "Word Document Details", "Tables"), Some("0"));
    }

    #[test]
    fn test_informative_properties_are_kept() {
        let report = format_metadata(&metadata(json!({
            "file_type": "excel",
            "metadata": {
                "sheets": 2, "sheet_names": ["Budget", "Notes"],
                "document_properties": {"creator": "j.doe", "title": "Untitled"},
                "sensitive_data": {"creator": "j.doe"}
            },
            "warnings": ["Contains author information"]
        })));
        let props = report.section(DOCUMENT_PROPERTIES).expect("properties");
        assert_eq!(props.lines, vec![ReportLine::row("creator", "j.doe")]);
        assert!(report.has_section(SENSITIVE_DATA));
        assert_eq!(
            row_value(&report, "Excel Workbook Details", "Sheet names"),
            Some("Budget, Notes")
        );
        assert_eq!(
            row_value(&report, "Excel Workbook Details", "Active sheet"),
            Some(PLACEHOLDER)
        );
        assert!(report.has_section(WARNINGS));
    }

    #[test]
    fn test_exif_prefers_priority_tags() {
        let report = format_metadata(&metadata(json!({
            "file_type": "image",
            "metadata": {
                "dimensions": "4032x3024", "format": "JPEG", "mode": "RGB",
                "exif": {
                    "ExifVersion": "0232", "Model": "Pixel 7", "Make": "Google",
                    "GPSInfo": "{1: 'N'}", "Orientation": "1"
                }
            }
        })));
        let exif = report.section(EXIF).expect("exif section");
        let labels: Vec<&str> = exif
            .lines
            .iter()
            .filter_map(|l| match l {
                ReportLine::Row { label, .. } => Some(label.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["GPSInfo", "Make", "Model"]);
    }

    #[test]
    fn test_exif_falls_back_to_first_five_fields() {
        let report = format_metadata(&metadata(json!({
            "file_type": "image",
            "metadata": {
                "exif": {
                    "a": "1", "b": "2", "c": "3", "d": "4", "e": "5", "f": "6", "g": "7"
                }
            }
        })));
        let exif = report.section(EXIF).expect("exif section");
        assert_eq!(exif.lines.len(), 6);
        assert_eq!(exif.lines[0], ReportLine::row("a", "1"));
        assert_eq!(exif.lines[5], ReportLine::text("... and 2 more"));
    }

    #[test]
    fn test_missing_exif_and_sensitive_sections_are_omitted() {
        let report = format_metadata(&metadata(json!({
            "file_type": "pdf",
            "metadata": {"pages": 12, "encrypted": true}
        })));
        assert!(!report.has_section(EXIF));
        assert!(!report.has_section(SENSITIVE_DATA));
        assert!(!report.has_section(DOCUMENT_PROPERTIES));
        assert_eq!(row_value(&report, "PDF Details", "Encrypted"), Some("Yes"));
    }

    #[test]
    fn test_extractor_error_replaces_type_section() {
        let report = format_metadata(&metadata(json!({
            "file_info": {"filename": "broken.pdf"},
            "file_type": "pdf",
            "metadata": {"error": "EOF marker not found"}
        })));
        assert!(report.has_section(ANALYSIS_ERROR));
        assert!(!report.has_section("PDF Details"));
        assert_eq!(row_value(&report, FILE_INFO, "Filename"), Some("broken.pdf"));
        assert_eq!(row_value(&report, FILE_INFO, "Size"), Some(PLACEHOLDER));
    }

    #[test]
    fn test_warnings_get_levels() {
        assert_eq!(warning_level("🚨 CRÍTICO: geolocation"), EntryLevel::Critical);
        assert_eq!(warning_level("✅ No obvious risks"), EntryLevel::Success);
        assert_eq!(warning_level("Reveals software"), EntryLevel::Warning);
    }
}
