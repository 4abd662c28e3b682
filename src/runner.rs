//! Per-kind task state machine.
//!
//! ```text
//! Idle -> Validating -> Failed
//!                    -> Pending -> Succeeded | Failed
//! ```
//!
//! Every `start` gets a new generation number. A completion is only applied
//! while its generation is still the current one, so a slow stale response
//! can never overwrite a newer task's state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;

use crate::error::TaskError;
use crate::formatter::{self, FormatOptions};
use crate::models::{PasswordRequest, TaskInput, TaskKind, TaskOutput};
use crate::notify::{NotificationCenter, NotificationLevel};
use crate::report::{PLACEHOLDER, Report};
use crate::service::AssessmentService;
use crate::staging::StagedFile;
use crate::strength::PasswordAnalysis;

pub const MIN_PASSWORD_LENGTH: i64 = 8;
pub const MAX_PASSWORD_LENGTH: i64 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Idle,
    Validating,
    Pending,
    Succeeded,
    Failed,
}

impl TaskState {
    /// Succeeded and Failed are terminal; the task is settled.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Succeeded | TaskState::Failed)
    }
}

/// What the display layer sees for one task kind.
#[derive(Debug, Clone)]
pub struct TaskSnapshot {
    pub kind: TaskKind,
    pub state: TaskState,
    pub generation: u64,
    pub result: Option<TaskOutput>,
    pub report: Option<Report>,
    pub error: Option<TaskError>,
}

impl TaskSnapshot {
    fn idle(kind: TaskKind, generation: u64) -> Self {
        Self {
            kind,
            state: TaskState::Idle,
            generation,
            result: None,
            report: None,
            error: None,
        }
    }

    /// Text for the output area: the rendered report, the error, or nothing.
    pub fn display_text(&self) -> Option<String> {
        match self.state {
            TaskState::Succeeded => self.report.as_ref().map(Report::render_text),
            TaskState::Failed => self.error.as_ref().map(ToString::to_string),
            _ => None,
        }
    }
}

type SettledCallback = Box<dyn Fn(&TaskSnapshot) + Send + Sync>;

/// Validated input, ready to send.
enum Request {
    PortScan(String),
    PasswordGeneration(PasswordRequest),
    MetadataAnalysis(StagedFile),
}

pub struct TaskRunner {
    kind: TaskKind,
    service: Arc<dyn AssessmentService>,
    notifications: NotificationCenter,
    options: FormatOptions,
    generation: AtomicU64,
    state: watch::Sender<TaskSnapshot>,
    callbacks: Mutex<Vec<SettledCallback>>,
}

impl TaskRunner {
    pub fn new(
        kind: TaskKind,
        service: Arc<dyn AssessmentService>,
        notifications: NotificationCenter,
    ) -> Self {
        let (state, _) = watch::channel(TaskSnapshot::idle(kind, 0));
        Self {
            kind,
            service,
            notifications,
            options: FormatOptions::default(),
            generation: AtomicU64::new(0),
            state,
            callbacks: Mutex::new(Vec::new()),
        }
    }

    pub fn with_format_options(mut self, options: FormatOptions) -> Self {
        self.options = options;
        self
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        self.state.borrow().clone()
    }

    /// Receives every applied state transition.
    pub fn subscribe(&self) -> watch::Receiver<TaskSnapshot> {
        self.state.subscribe()
    }

    /// Registers a callback run after each terminal transition. Callbacks must
    /// not register further callbacks on the same runner.
    pub fn on_settled<F>(&self, callback: F)
    where
        F: Fn(&TaskSnapshot) + Send + Sync + 'static,
    {
        self.callbacks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Box::new(callback));
    }

    /// Returns to Idle. Any request still in flight becomes stale.
    pub fn reset(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(TaskSnapshot::idle(self.kind, generation));
    }

    /// Runs one task to completion and returns the snapshot current afterwards.
    ///
    /// Validation happens before any service call. If a newer task was started
    /// while this one was pending, its outcome is discarded and the newer
    /// task's snapshot is returned.
    pub async fn start(&self, input: TaskInput) -> TaskSnapshot {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        #[cfg(feature = "tracing")]
        tracing::info!("{} task {} started", self.kind, generation);

        self.transition(generation, TaskState::Validating);
        let request = match self.validate(input) {
            Ok(request) => request,
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("{} task {} rejected: {}", self.kind, generation, e);
                return self.settle(generation, Err(e));
            }
        };

        self.transition(generation, TaskState::Pending);
        let outcome = self.dispatch(&request).await;
        self.settle(generation, outcome)
    }

    fn validate(&self, input: TaskInput) -> Result<Request, TaskError> {
        if input.kind() != self.kind {
            return Err(TaskError::Validation(format!(
                "A {} request cannot be run as {}",
                input.kind(),
                self.kind
            )));
        }

        match input {
            TaskInput::PortScan { target } => {
                let target = target.trim();
                if target.is_empty() {
                    return Err(TaskError::Validation(
                        "Please enter a valid IP address or domain".to_string(),
                    ));
                }
                Ok(Request::PortScan(target.to_string()))
            }
            TaskInput::PasswordGeneration(mut request) => {
                if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&request.length) {
                    return Err(TaskError::Validation(format!(
                        "Password length must be a number between {} and {}",
                        MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH
                    )));
                }
                request.phrase = request
                    .phrase
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty());
                Ok(Request::PasswordGeneration(request))
            }
            TaskInput::MetadataAnalysis(file) => file
                .map(Request::MetadataAnalysis)
                .ok_or_else(|| TaskError::Validation("Select a file to analyze first".to_string())),
        }
    }

    async fn dispatch(&self, request: &Request) -> Result<TaskOutput, TaskError> {
        match request {
            Request::PortScan(target) => self
                .service
                .scan_ports(target)
                .await
                .map(TaskOutput::PortScan),
            Request::PasswordGeneration(options) => self
                .service
                .generate_password(options)
                .await
                .map(TaskOutput::PasswordGeneration),
            Request::MetadataAnalysis(file) => self
                .service
                .analyze_metadata(file)
                .await
                .map(TaskOutput::MetadataAnalysis),
        }
    }

    /// Moves to a non-terminal state if `generation` is still current.
    fn transition(&self, generation: u64, state: TaskState) -> bool {
        self.state.send_if_modified(|snap| {
            if snap.generation > generation {
                return false;
            }
            *snap = TaskSnapshot {
                state,
                ..TaskSnapshot::idle(self.kind, generation)
            };
            true
        })
    }

    fn settle(&self, generation: u64, outcome: Result<TaskOutput, TaskError>) -> TaskSnapshot {
        let settled = match outcome {
            Ok(output) => {
                let report = formatter::format(&output, &self.options);
                TaskSnapshot {
                    kind: self.kind,
                    state: TaskState::Succeeded,
                    generation,
                    result: Some(output),
                    report: Some(report),
                    error: None,
                }
            }
            Err(error) => TaskSnapshot {
                kind: self.kind,
                state: TaskState::Failed,
                generation,
                result: None,
                report: None,
                error: Some(error),
            },
        };

        let mut pending = Some(settled);
        let applied = self.state.send_if_modified(|snap| {
            if snap.generation != generation {
                return false;
            }
            if let Some(settled) = pending.take() {
                *snap = settled;
            }
            true
        });

        let snapshot = self.snapshot();
        if !applied {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                "{} task {} finished after task {} started, result discarded",
                self.kind,
                generation,
                snapshot.generation
            );
            return snapshot;
        }

        #[cfg(feature = "tracing")]
        match &snapshot.error {
            Some(e) => tracing::error!(
                "{} task {} failed ({}): {}",
                self.kind,
                generation,
                e.category(),
                e
            ),
            None => tracing::info!("{} task {} succeeded", self.kind, generation),
        }

        self.announce(&snapshot);
        for callback in self
            .callbacks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
        {
            callback(&snapshot);
        }
        snapshot
    }

    /// Posts the one notification a terminal transition produces.
    fn announce(&self, snapshot: &TaskSnapshot) {
        if let Some(error) = &snapshot.error {
            let prefix = match self.kind {
                TaskKind::PortScan => "Port scan failed",
                TaskKind::PasswordGeneration => "Password generation failed",
                TaskKind::MetadataAnalysis => "Metadata analysis failed",
            };
            self.notifications
                .notify(NotificationLevel::Error, format!("{}: {}", prefix, error));
            return;
        }

        let message = match &snapshot.result {
            Some(TaskOutput::PortScan(scan)) => format!(
                "Port scan of {} finished: {} open port(s)",
                scan.target.as_deref().unwrap_or(PLACEHOLDER),
                scan.open_ports.len()
            ),
            Some(TaskOutput::PasswordGeneration(generated)) => {
                let analysis = PasswordAnalysis::new(
                    SecretString::new(generated.password.expose_secret().into()),
                    generated.generated_from_phrase,
                );
                format!(
                    "Password generated: {}",
                    analysis.label(self.options.strength)
                )
            }
            Some(TaskOutput::MetadataAnalysis(metadata)) => format!(
                "Metadata extracted from {} ({} warning(s))",
                metadata.file_info.filename.as_deref().unwrap_or(PLACEHOLDER),
                metadata.warnings.len()
            ),
            None => return,
        };
        self.notifications.notify(NotificationLevel::Success, message);
    }
}

impl std::fmt::Debug for TaskRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRunner")
            .field("kind", &self.kind)
            .field("state", &self.state.borrow().state)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
