//! Security assessment dashboard core
//!
//! This library drives three assessment tasks against a remote service
//! (port scan, password generation, file metadata analysis), scores
//! generated passwords locally and formats every result into a structured
//! report.
//!
//! # Features
//!
//! - `async` (default): Enables the task runners, the HTTP service client,
//!   notifications and the [`Dashboard`] facade
//! - `tracing`: Enables logging via tracing crate
//!
//! Without `async`, scoring, staging, configuration and formatting remain
//! available.
//!
//! # Environment Variables
//!
//! - `ASSESS_SERVICE_URL`: Service base URL (default: `http://127.0.0.1:5000/api`)
//! - `ASSESS_NOTIFY_TTL_MS`: Notification lifetime in milliseconds (default: `3000`)
//! - `ASSESS_REQUEST_TIMEOUT_SECS`: Per-request timeout (default: none)
//!
//! # Example
//!
//! ```rust,no_run
//! # #[cfg(feature = "async")]
//! # async fn run() {
//! use assessment_dashboard::{Dashboard, PasswordRequest, ServiceConfig};
//!
//! let config = ServiceConfig::from_env().expect("Invalid configuration");
//! let dashboard = Dashboard::from_config(config).expect("Failed to build HTTP client");
//!
//! let snapshot = dashboard
//!     .generate_password(PasswordRequest::with_length(20))
//!     .await;
//! if let Some(text) = snapshot.display_text() {
//!     println!("{}", text);
//! }
//! # }
//! ```

// Internal modules
mod sections;

pub mod config;
pub mod error;
pub mod formatter;
pub mod models;
pub mod report;
pub mod staging;
pub mod strength;

#[cfg(feature = "async")]
pub mod dashboard;
#[cfg(feature = "async")]
pub mod notify;
#[cfg(feature = "async")]
pub mod runner;
#[cfg(feature = "async")]
pub mod service;

// Public API
pub use config::{ConfigError, ServiceConfig};
pub use error::TaskError;
pub use formatter::{FormatOptions, format, format_text};
pub use models::{PasswordRequest, TaskInput, TaskKind, TaskOutput};
pub use report::{EntryLevel, Report, ReportLine, ReportSection};
pub use staging::{FileCandidate, FileStagingArea, StagedFile, StagingError};
pub use strength::{
    PasswordAnalysis, StrengthLabel, StrengthScore, StrengthStrategy, entropy_score,
    legacy_score,
};

#[cfg(feature = "async")]
pub use dashboard::Dashboard;
#[cfg(feature = "async")]
pub use notify::{Notification, NotificationCenter, NotificationLevel};
#[cfg(feature = "async")]
pub use runner::{TaskRunner, TaskSnapshot, TaskState};
#[cfg(feature = "async")]
pub use service::{AssessmentService, HttpService};
