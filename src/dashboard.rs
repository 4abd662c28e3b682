//! The dashboard: one runner per task kind, the staged file and the
//! notification center, behind a single handle.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::ServiceConfig;
use crate::formatter::FormatOptions;
use crate::models::{PasswordRequest, TaskInput, TaskKind};
use crate::notify::NotificationCenter;
use crate::runner::{TaskRunner, TaskSnapshot, TaskState};
use crate::service::{AssessmentService, HttpService};
use crate::staging::{FileCandidate, FileStagingArea, StagedFile, StagingError};

#[derive(Debug)]
pub struct Dashboard {
    port_scan: TaskRunner,
    password: TaskRunner,
    metadata: TaskRunner,
    staging: Mutex<FileStagingArea>,
    notifications: NotificationCenter,
}

impl Dashboard {
    pub fn new(service: Arc<dyn AssessmentService>, notifications: NotificationCenter) -> Self {
        Self::with_format_options(service, notifications, FormatOptions::default())
    }

    pub fn with_format_options(
        service: Arc<dyn AssessmentService>,
        notifications: NotificationCenter,
        options: FormatOptions,
    ) -> Self {
        let runner = |kind| {
            TaskRunner::new(kind, Arc::clone(&service), notifications.clone())
                .with_format_options(options)
        };
        Self {
            port_scan: runner(TaskKind::PortScan),
            password: runner(TaskKind::PasswordGeneration),
            metadata: runner(TaskKind::MetadataAnalysis),
            staging: Mutex::new(FileStagingArea::new()),
            notifications,
        }
    }

    /// Builds a dashboard talking HTTP to the configured service.
    pub fn from_config(config: ServiceConfig) -> reqwest::Result<Self> {
        let notifications = NotificationCenter::new(config.notification_ttl);
        let service = HttpService::new(config)?;
        Ok(Self::new(Arc::new(service), notifications))
    }

    pub fn runner(&self, kind: TaskKind) -> &TaskRunner {
        match kind {
            TaskKind::PortScan => &self.port_scan,
            TaskKind::PasswordGeneration => &self.password,
            TaskKind::MetadataAnalysis => &self.metadata,
        }
    }

    pub fn snapshot(&self, kind: TaskKind) -> TaskSnapshot {
        self.runner(kind).snapshot()
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub async fn run_port_scan(&self, target: impl Into<String>) -> TaskSnapshot {
        self.port_scan
            .start(TaskInput::PortScan {
                target: target.into(),
            })
            .await
    }

    pub async fn generate_password(&self, request: PasswordRequest) -> TaskSnapshot {
        self.password
            .start(TaskInput::PasswordGeneration(request))
            .await
    }

    /// Stages a file for analysis. A rejected file is reported through a
    /// notification and leaves the current selection in place.
    pub fn stage_file(&self, candidate: FileCandidate) -> Result<StagedFile, StagingError> {
        let result = self.staging().select(candidate).cloned();
        if let Err(e) = &result {
            self.notifications.error(e.to_string());
        }
        result
    }

    pub fn clear_staged_file(&self) {
        self.staging().clear();
    }

    pub fn staged_file(&self) -> Option<StagedFile> {
        self.staging().staged().cloned()
    }

    /// Submits the staged file. The slot is emptied for the submission and
    /// the file is put back if the analysis fails, unless another file was
    /// staged in the meantime.
    pub async fn analyze_staged_file(&self) -> TaskSnapshot {
        let file = self.staging().take();
        let snapshot = self
            .metadata
            .start(TaskInput::MetadataAnalysis(file.clone()))
            .await;

        if snapshot.state != TaskState::Succeeded {
            if let Some(file) = file {
                self.staging().restore(file);
            }
        }
        snapshot
    }

    /// Returns every runner to Idle and empties the staging slot.
    pub fn reset(&self) {
        for kind in TaskKind::ALL {
            self.runner(kind).reset();
        }
        self.clear_staged_file();

        #[cfg(feature = "tracing")]
        tracing::info!("Dashboard reset");
    }

    fn staging(&self) -> MutexGuard<'_, FileStagingArea> {
        self.staging.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(all(test, feature = "async"))]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::error::TaskError;
    use crate::models::TaskOutput;
    use crate::notify::NotificationLevel;
    use crate::runner::tests::FakeService;

    fn setup() -> (Arc<FakeService>, Dashboard) {
        let service = Arc::new(FakeService::default());
        let dashboard = Dashboard::new(service.clone(), NotificationCenter::new(Duration::from_secs(600)));
        (service, dashboard)
    }

    fn candidate(name: &str) -> FileCandidate {
        FileCandidate::from_bytes(name, b"%PDF-1.7".to_vec())
    }

    #[test]
    fn test_rejected_file_notifies_and_keeps_selection() {
        let (_service, dashboard) = setup();
        dashboard.stage_file(candidate("report.pdf")).unwrap();

        let err = dashboard.stage_file(candidate("setup.exe")).unwrap_err();
        assert!(matches!(err, StagingError::UnsupportedExtension(ext) if ext == "exe"));

        assert_eq!(dashboard.staged_file().unwrap().name(), "report.pdf");
        let active = dashboard.notifications().active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].level, NotificationLevel::Error);
    }

    #[test]
    fn test_stage_replaces_and_clear_empties() {
        let (_service, dashboard) = setup();
        dashboard.stage_file(candidate("a.pdf")).unwrap();
        dashboard.stage_file(candidate("b.docx")).unwrap();
        assert_eq!(dashboard.staged_file().unwrap().name(), "b.docx");

        dashboard.clear_staged_file();
        assert!(dashboard.staged_file().is_none());
    }

    #[tokio::test]
    async fn test_successful_analysis_clears_slot() {
        let (service, dashboard) = setup();
        dashboard.stage_file(candidate("report.pdf")).unwrap();

        let snapshot = dashboard.analyze_staged_file().await;

        assert_eq!(snapshot.state, TaskState::Succeeded);
        assert!(matches!(snapshot.result, Some(TaskOutput::MetadataAnalysis(_))));
        assert_eq!(service.calls(), 1);
        assert!(dashboard.staged_file().is_none());
        dashboard.notifications().shutdown();
    }

    #[tokio::test]
    async fn test_failed_analysis_keeps_slot() {
        let (service, dashboard) = setup();
        *service.metadata.lock().unwrap() = Some(Err(TaskError::Service("disk full".into())));
        dashboard.stage_file(candidate("report.pdf")).unwrap();

        let snapshot = dashboard.analyze_staged_file().await;

        assert_eq!(snapshot.state, TaskState::Failed);
        assert_eq!(dashboard.staged_file().unwrap().name(), "report.pdf");
        dashboard.notifications().shutdown();
    }

    #[tokio::test]
    async fn test_analysis_without_file_is_a_validation_failure() {
        let (service, dashboard) = setup();

        let snapshot = dashboard.analyze_staged_file().await;

        assert_eq!(snapshot.state, TaskState::Failed);
        assert!(snapshot.error.unwrap().is_validation());
        assert_eq!(service.calls(), 0);
        dashboard.notifications().shutdown();
    }

    #[tokio::test]
    async fn test_runners_are_independent() {
        let (_service, dashboard) = setup();

        dashboard.run_port_scan(" example.com ").await;
        dashboard
            .generate_password(PasswordRequest::with_length(5))
            .await;

        assert_eq!(dashboard.snapshot(TaskKind::PortScan).state, TaskState::Succeeded);
        assert_eq!(
            dashboard.snapshot(TaskKind::PasswordGeneration).state,
            TaskState::Failed
        );
        assert_eq!(
            dashboard.snapshot(TaskKind::MetadataAnalysis).state,
            TaskState::Idle
        );
        match dashboard.snapshot(TaskKind::PortScan).result {
            Some(TaskOutput::PortScan(scan)) => {
                assert_eq!(scan.target.as_deref(), Some("example.com"))
            }
            other => panic!("Expected scan result, got {:?}", other),
        }
        dashboard.notifications().shutdown();
    }

    #[tokio::test]
    async fn test_reset_returns_everything_to_idle() {
        let (_service, dashboard) = setup();
        dashboard.run_port_scan("10.0.0.1").await;
        dashboard
            .generate_password(PasswordRequest::default())
            .await;
        dashboard.stage_file(candidate("notes.txt")).unwrap();

        dashboard.reset();

        for kind in TaskKind::ALL {
            let snapshot = dashboard.snapshot(kind);
            assert_eq!(snapshot.state, TaskState::Idle);
            assert!(snapshot.display_text().is_none());
        }
        assert!(dashboard.staged_file().is_none());
        dashboard.notifications().shutdown();
    }
}
