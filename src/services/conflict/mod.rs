//! Boundary to the external conflict-check service.
//!
//! The engine never calls the checker itself. Intents and series expansions
//! are turned into [`ConflictCheckRequest`]s here, and the caller runs them
//! through [`check_with_fallback`] before persisting. Results with
//! `Severity::Error` block a commit; warnings do not. A failed or timed-out
//! check degrades to a single warning asking the user to verify manually.

use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::models::conflict::{ConflictCheckRequest, ConflictResult, ConflictType, Severity};
use crate::models::lesson::Lesson;
use crate::services::recurrence::SeriesExpansion;
use crate::ui::gesture::{RescheduleIntent, ResizeIntent};

pub const MANUAL_VERIFICATION_MESSAGE: &str =
    "Could not check for scheduling conflicts. Please verify teacher, room and student availability manually.";

#[derive(Error, Debug)]
pub enum ConflictCheckError {
    #[error("Conflict service unavailable: {0}")]
    Unavailable(String),

    #[error("Conflict check failed: {0}")]
    Failed(String),
}

/// The remote conflict-check call
#[allow(async_fn_in_trait)]
pub trait ConflictChecker {
    async fn check_conflicts(
        &self,
        request: &ConflictCheckRequest,
    ) -> Result<Vec<ConflictResult>, ConflictCheckError>;
}

impl ConflictCheckRequest {
    /// Request for moving an existing lesson to `[start_at, end_at)`
    pub fn for_lesson(lesson: &Lesson, start_at: DateTime<Utc>, end_at: DateTime<Utc>) -> Self {
        Self {
            start_at,
            end_at,
            teacher_id: lesson.teacher_id.clone(),
            teacher_user_id: None,
            room_id: lesson.room_id.clone(),
            location_id: lesson.location_id.clone(),
            student_ids: Vec::new(),
            exclude_lesson_id: Some(lesson.id.clone()),
        }
    }

    pub fn with_teacher_user(mut self, teacher_user_id: impl Into<String>) -> Self {
        self.teacher_user_id = Some(teacher_user_id.into());
        self
    }

    pub fn with_students<I, S>(mut self, student_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.student_ids = student_ids.into_iter().map(Into::into).collect();
        self
    }
}

impl From<&RescheduleIntent> for ConflictCheckRequest {
    fn from(intent: &RescheduleIntent) -> Self {
        ConflictCheckRequest::for_lesson(&intent.lesson, intent.new_start, intent.new_end)
    }
}

impl From<&ResizeIntent> for ConflictCheckRequest {
    fn from(intent: &ResizeIntent) -> Self {
        ConflictCheckRequest::for_lesson(&intent.lesson, intent.lesson.start_at, intent.new_end)
    }
}

/// One request per instant of a new series, using `template`'s duration and
/// resources. Nothing is excluded because none of the lessons exist yet.
pub fn series_requests(template: &Lesson, expansion: &SeriesExpansion) -> Vec<ConflictCheckRequest> {
    let duration = template.duration();
    expansion
        .instants
        .iter()
        .map(|&start_at| {
            let mut request = ConflictCheckRequest::for_lesson(template, start_at, start_at + duration);
            request.exclude_lesson_id = None;
            request
        })
        .collect()
}

/// Conflicts found for one proposed slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictReport {
    pub results: Vec<ConflictResult>,
}

impl ConflictReport {
    pub fn new(results: Vec<ConflictResult>) -> Self {
        Self { results }
    }

    /// The synthetic report used when the checker could not answer. Its one
    /// warning is typed [`ConflictType::Unverified`] so it is not shown as a
    /// teacher, room or student clash.
    pub fn unverified() -> Self {
        Self::new(vec![ConflictResult::warning(
            ConflictType::Unverified,
            MANUAL_VERIFICATION_MESSAGE,
        )])
    }

    pub fn errors(&self) -> impl Iterator<Item = &ConflictResult> {
        self.results.iter().filter(|r| r.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ConflictResult> {
        self.results.iter().filter(|r| r.severity == Severity::Warning)
    }

    pub fn has_blocking_errors(&self) -> bool {
        self.results.iter().any(ConflictResult::is_blocking)
    }

    /// Warnings never block a commit
    pub fn can_commit(&self) -> bool {
        !self.has_blocking_errors()
    }

    pub fn is_clear(&self) -> bool {
        self.results.is_empty()
    }
}

/// Run one conflict check with a timeout.
///
/// Returns `None` when `cancel` fires first (a newer request superseded this
/// one). Errors and timeouts yield [`ConflictReport::unverified`], never an
/// empty report.
pub async fn check_with_fallback<C: ConflictChecker>(
    checker: &C,
    request: &ConflictCheckRequest,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Option<ConflictReport> {
    tokio::select! {
        _ = cancel.cancelled() => {
            log::debug!("Conflict check cancelled");
            None
        }
        outcome = tokio::time::timeout(timeout, checker.check_conflicts(request)) => {
            Some(match outcome {
                Ok(Ok(results)) => ConflictReport::new(results),
                Ok(Err(err)) => {
                    log::warn!("Conflict check failed: {}", err);
                    ConflictReport::unverified()
                }
                Err(_) => {
                    log::warn!("Conflict check timed out after {:?}", timeout);
                    ConflictReport::unverified()
                }
            })
        }
    }
}

/// Check every instant of a series in order. `None` if cancelled part way.
pub async fn check_series<C: ConflictChecker>(
    checker: &C,
    requests: &[ConflictCheckRequest],
    timeout: Duration,
    cancel: &CancellationToken,
) -> Option<Vec<(DateTime<Utc>, ConflictReport)>> {
    let mut reports = Vec::with_capacity(requests.len());
    for request in requests {
        let report = check_with_fallback(checker, request, timeout, cancel).await?;
        reports.push((request.start_at, report));
    }
    Some(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::recurrence::RecurrenceRule;
    use crate::services::recurrence::{expand_series, RecurrenceLimits};
    use chrono::{NaiveDate, TimeZone};
    use chrono_tz::UTC;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedChecker {
        results: Vec<ConflictResult>,
        calls: AtomicUsize,
    }

    impl ConflictChecker for FixedChecker {
        async fn check_conflicts(
            &self,
            _request: &ConflictCheckRequest,
        ) -> Result<Vec<ConflictResult>, ConflictCheckError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.results.clone())
        }
    }

    struct FailingChecker;

    impl ConflictChecker for FailingChecker {
        async fn check_conflicts(
            &self,
            _request: &ConflictCheckRequest,
        ) -> Result<Vec<ConflictResult>, ConflictCheckError> {
            Err(ConflictCheckError::Unavailable("503".to_string()))
        }
    }

    struct SlowChecker;

    impl ConflictChecker for SlowChecker {
        async fn check_conflicts(
            &self,
            _request: &ConflictCheckRequest,
        ) -> Result<Vec<ConflictResult>, ConflictCheckError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Vec::new())
        }
    }

    fn lesson() -> Lesson {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 16, 0, 0).unwrap();
        Lesson::builder()
            .id("l-1")
            .teacher_id("t-1")
            .room_id("room-1")
            .location_id("north")
            .start_at(start)
            .end_at(start + chrono::Duration::minutes(30))
            .build()
            .unwrap()
    }

    fn request() -> ConflictCheckRequest {
        let lesson = lesson();
        ConflictCheckRequest::for_lesson(&lesson, lesson.start_at, lesson.end_at)
    }

    #[test]
    fn test_reschedule_request_excludes_lesson() {
        let lesson = lesson();
        let intent = RescheduleIntent {
            new_start: lesson.start_at + chrono::Duration::hours(1),
            new_end: lesson.end_at + chrono::Duration::hours(1),
            lesson,
        };
        let request = ConflictCheckRequest::from(&intent)
            .with_teacher_user("user-9")
            .with_students(["s-1", "s-2"]);

        assert_eq!(request.exclude_lesson_id.as_deref(), Some("l-1"));
        assert_eq!(request.start_at, intent.new_start);
        assert_eq!(request.room_id.as_deref(), Some("room-1"));
        assert_eq!(request.student_ids, vec!["s-1", "s-2"]);
        assert_eq!(request.teacher_user_id.as_deref(), Some("user-9"));
    }

    #[test]
    fn test_resize_request_keeps_start() {
        let lesson = lesson();
        let intent = ResizeIntent {
            new_end: lesson.end_at + chrono::Duration::minutes(15),
            lesson: lesson.clone(),
        };
        let request = ConflictCheckRequest::from(&intent);
        assert_eq!(request.start_at, lesson.start_at);
        assert_eq!(request.end_at, intent.new_end);
    }

    #[test]
    fn test_series_requests_follow_expansion() {
        let template = lesson();
        let rule = RecurrenceRule::new(template.start_at, [1], UTC)
            .unwrap()
            .with_end_date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        let expansion = expand_series(&rule, None, &[], &RecurrenceLimits::default());

        let requests = series_requests(&template, &expansion);
        assert_eq!(requests.len(), 3);
        assert!(requests.iter().all(|r| r.exclude_lesson_id.is_none()));
        assert!(requests
            .iter()
            .all(|r| r.end_at - r.start_at == chrono::Duration::minutes(30)));
    }

    #[test]
    fn test_report_severity_rules() {
        let warning_only = ConflictReport::new(vec![ConflictResult::warning(
            ConflictType::Student,
            "Student has another lesson nearby",
        )]);
        assert!(warning_only.can_commit());
        assert_eq!(warning_only.warnings().count(), 1);

        let blocked = ConflictReport::new(vec![
            ConflictResult::error(ConflictType::Room, "Room is booked").with_entity("Room 1"),
            ConflictResult::warning(ConflictType::TimeOff, "Teacher leaves early"),
        ]);
        assert!(blocked.has_blocking_errors());
        assert!(!blocked.can_commit());
        assert_eq!(blocked.errors().next().unwrap().to_string(), "Room is booked (Room 1)");
    }

    #[tokio::test]
    async fn test_successful_check_passes_results_through() {
        let checker = FixedChecker {
            results: vec![ConflictResult::error(ConflictType::Teacher, "Teacher busy")],
            calls: AtomicUsize::new(0),
        };
        let report = check_with_fallback(
            &checker,
            &request(),
            Duration::from_secs(1),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert!(report.has_blocking_errors());
        assert_eq!(checker.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_check_degrades_to_warning() {
        let report = check_with_fallback(
            &FailingChecker,
            &request(),
            Duration::from_secs(1),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(report, ConflictReport::unverified());
        assert!(report.can_commit());
        assert!(!report.is_clear());
    }

    #[test]
    fn test_unverified_warning_names_no_clash() {
        let report = ConflictReport::unverified();
        let warning = &report.results[0];
        assert_eq!(warning.conflict_type, ConflictType::Unverified);
        assert_eq!(warning.severity, Severity::Warning);
        assert_eq!(warning.message, MANUAL_VERIFICATION_MESSAGE);
        let json = serde_json::to_value(warning).unwrap();
        assert_eq!(json["type"], "unverified");
    }

    #[tokio::test]
    async fn test_timed_out_check_degrades_to_warning() {
        let report = check_with_fallback(
            &SlowChecker,
            &request(),
            Duration::from_millis(20),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(report.warnings().next().unwrap().message, MANUAL_VERIFICATION_MESSAGE);
    }

    #[tokio::test]
    async fn test_cancelled_check_returns_none() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let outcome = check_with_fallback(&SlowChecker, &request(), Duration::from_secs(5), &cancel).await;
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn test_check_series_checks_every_instant() {
        let checker = FixedChecker {
            results: Vec::new(),
            calls: AtomicUsize::new(0),
        };
        let requests = vec![request(), request()];
        let reports = check_series(&checker, &requests, Duration::from_secs(1), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|(_, report)| report.is_clear()));
        assert_eq!(checker.calls.load(Ordering::SeqCst), 2);
    }
}
