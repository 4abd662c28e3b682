//! Task kinds and the payloads exchanged with the assessment service.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::staging::StagedFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    PortScan,
    PasswordGeneration,
    MetadataAnalysis,
}

impl TaskKind {
    pub const ALL: [TaskKind; 3] = [
        TaskKind::PortScan,
        TaskKind::PasswordGeneration,
        TaskKind::MetadataAnalysis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::PortScan => "port scan",
            TaskKind::PasswordGeneration => "password generation",
            TaskKind::MetadataAnalysis => "metadata analysis",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Password generation options, serialized as the request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordRequest {
    /// Kept signed so out-of-range input reaches validation intact.
    pub length: i64,
    pub phrase: Option<String>,
    pub use_uppercase: bool,
    pub use_numbers: bool,
    pub use_symbols: bool,
}

impl PasswordRequest {
    pub fn with_length(length: i64) -> Self {
        Self {
            length,
            ..Self::default()
        }
    }

    pub fn phrase(mut self, phrase: impl Into<String>) -> Self {
        self.phrase = Some(phrase.into());
        self
    }
}

impl Default for PasswordRequest {
    fn default() -> Self {
        Self {
            length: 16,
            phrase: None,
            use_uppercase: true,
            use_numbers: true,
            use_symbols: true,
        }
    }
}

/// Input accepted by a task runner.
#[derive(Debug, Clone)]
pub enum TaskInput {
    PortScan { target: String },
    PasswordGeneration(PasswordRequest),
    MetadataAnalysis(Option<StagedFile>),
}

impl TaskInput {
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskInput::PortScan { .. } => TaskKind::PortScan,
            TaskInput::PasswordGeneration(_) => TaskKind::PasswordGeneration,
            TaskInput::MetadataAnalysis(_) => TaskKind::MetadataAnalysis,
        }
    }
}

/// Successful service payload, one variant per task kind.
#[derive(Debug, Clone)]
pub enum TaskOutput {
    PortScan(ScanResult),
    PasswordGeneration(GeneratedPassword),
    MetadataAnalysis(MetadataReport),
}

impl TaskOutput {
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskOutput::PortScan(_) => TaskKind::PortScan,
            TaskOutput::PasswordGeneration(_) => TaskKind::PasswordGeneration,
            TaskOutput::MetadataAnalysis(_) => TaskKind::MetadataAnalysis,
        }
    }
}

/// Accepts any JSON scalar as a display string; null becomes `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| display_value(&v)))
}

/// Treats an explicit null like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Display form of a JSON value, `None` for null.
pub fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(true) => Some("Yes".to_string()),
        Value::Bool(false) => Some("No".to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(display_value)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Port scan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OpenPort {
    pub port: u16,
    #[serde(default, deserialize_with = "lenient_string")]
    pub service: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub response_time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ScanResult {
    #[serde(default, deserialize_with = "lenient_string")]
    pub target: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ip: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub scan_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub scanned_ports: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub open_count: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub avg_time_per_port: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub open_ports: Vec<OpenPort>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: Option<String>,
}

/// `{"data": ...}` wrapper used by the scan and metadata endpoints.
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

// ---------------------------------------------------------------------------
// Password generation
// ---------------------------------------------------------------------------

/// Analysis as reported by the service. Informational only: the displayed
/// strength is always recomputed from the final password.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReportedAnalysis {
    #[serde(default)]
    pub length: Option<u64>,
    #[serde(default)]
    pub entropy_bits: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub strength: Option<String>,
    #[serde(default)]
    pub has_uppercase: Option<bool>,
    #[serde(default)]
    pub has_numbers: Option<bool>,
    #[serde(default)]
    pub has_symbols: Option<bool>,
}

#[derive(Deserialize)]
struct GeneratedPasswordWire {
    password: String,
    #[serde(default)]
    analysis: Option<ReportedAnalysis>,
    #[serde(default, deserialize_with = "null_as_default")]
    generated_from_phrase: bool,
}

#[derive(Deserialize)]
#[serde(from = "GeneratedPasswordWire")]
pub struct GeneratedPassword {
    pub password: SecretString,
    pub reported: Option<ReportedAnalysis>,
    pub generated_from_phrase: bool,
}

impl From<GeneratedPasswordWire> for GeneratedPassword {
    fn from(wire: GeneratedPasswordWire) -> Self {
        Self {
            password: SecretString::new(wire.password.into()),
            reported: wire.analysis,
            generated_from_phrase: wire.generated_from_phrase,
        }
    }
}

impl GeneratedPassword {
    pub fn new(password: &str, generated_from_phrase: bool) -> Self {
        Self {
            password: SecretString::new(password.into()),
            reported: None,
            generated_from_phrase,
        }
    }
}

impl Clone for GeneratedPassword {
    fn clone(&self) -> Self {
        Self {
            password: SecretString::new(self.password.expose_secret().into()),
            reported: self.reported.clone(),
            generated_from_phrase: self.generated_from_phrase,
        }
    }
}

impl fmt::Debug for GeneratedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedPassword")
            .field("password", &self.password)
            .field("reported", &self.reported)
            .field("generated_from_phrase", &self.generated_from_phrase)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Metadata analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Image,
    Pdf,
    Word,
    Excel,
    Text,
    #[default]
    #[serde(other)]
    Unknown,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Image => "image",
            FileType::Pdf => "pdf",
            FileType::Word => "word",
            FileType::Excel => "excel",
            FileType::Text => "text",
            FileType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FileInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub filename: Option<String>,
    /// Human-readable size, e.g. `"1.50 MB"`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub size: Option<String>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mime_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub extension: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub modified: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub accessed: Option<String>,
}

/// Fields specific to the analyzed file type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSpecific {
    Image {
        dimensions: Option<String>,
        format: Option<String>,
        mode: Option<String>,
    },
    Pdf {
        pages: Option<String>,
        encrypted: Option<String>,
    },
    Word {
        paragraphs: Option<String>,
        tables: Option<String>,
        sections: Option<String>,
    },
    Excel {
        sheets: Option<String>,
        sheet_names: Vec<String>,
        active_sheet: Option<String>,
    },
    Text {
        lines: Option<String>,
        words: Option<String>,
        characters: Option<String>,
        encoding: Option<String>,
    },
    Unknown,
}

/// Ordered `(key, value)` pairs taken from a JSON object.
pub type Fields = Vec<(String, String)>;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MetadataReport {
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_info: FileInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_type: FileType,
    /// Type-specific keys as sent by the service, or `{"error": ...}`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Map<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub warnings: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: Option<String>,
}

impl MetadataReport {
    fn field(&self, key: &str) -> Option<String> {
        self.metadata.get(key).and_then(display_value)
    }

    fn object(&self, key: &str) -> Option<Fields> {
        let map = self.metadata.get(key)?.as_object()?;
        Some(
            map.iter()
                .map(|(k, v)| (k.clone(), display_value(v).unwrap_or_default()))
                .collect(),
        )
    }

    /// Error reported by the service's extractor, if any.
    pub fn analysis_error(&self) -> Option<String> {
        self.field("error")
    }

    pub fn type_specific(&self) -> TypeSpecific {
        match self.file_type {
            FileType::Image => TypeSpecific::Image {
                dimensions: self.field("dimensions"),
                format: self.field("format"),
                mode: self.field("mode"),
            },
            FileType::Pdf => TypeSpecific::Pdf {
                pages: self.field("pages"),
                encrypted: self.field("encrypted"),
            },
            FileType::Word => TypeSpecific::Word {
                paragraphs: self.field("paragraphs"),
                tables: self.field("tables"),
                sections: self.field("sections"),
            },
            FileType::Excel => TypeSpecific::Excel {
                sheets: self.field("sheets"),
                sheet_names: self
                    .metadata
                    .get("sheet_names")
                    .and_then(Value::as_array)
                    .map(|names| names.iter().filter_map(display_value).collect())
                    .unwrap_or_default(),
                active_sheet: self.field("active_sheet"),
            },
            FileType::Text => TypeSpecific::Text {
                lines: self.field("lines"),
                words: self.field("words"),
                characters: self.field("characters"),
                encoding: self.field("encoding"),
            },
            FileType::Unknown => TypeSpecific::Unknown,
        }
    }

    /// Document properties: `document_properties` for office files,
    /// `document_info` for PDFs.
    pub fn document_properties(&self) -> Option<Fields> {
        self.object("document_properties")
            .or_else(|| self.object("document_info"))
    }

    pub fn sensitive_data(&self) -> Option<Fields> {
        self.object("sensitive_data")
    }

    pub fn exif(&self) -> Option<Fields> {
        self.object("exif")
    }

    pub fn exif_note(&self) -> Option<String> {
        self.field("exif_note")
    }

    pub fn additional_info(&self) -> Option<Fields> {
        self.object("additional_info")
    }
}
