//! Post-write reconciliation
//!
//! The backend processes uploaded images asynchronously, so the record read
//! right after a write may still show the old photo set. After every write
//! the editor re-reads the record a bounded number of times, waiting a
//! linearly growing delay before each attempt, until the photo set has
//! visibly changed (or, for text-only writes, on the first good read).
//!
//! Reads are abandoned as soon as the caller's [`CancellationToken`] fires;
//! a result is never applied after cancellation.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use shared::models::BusinessRecord;
use tokio_util::sync::CancellationToken;

use crate::http::BusinessGateway;
use crate::normalize::photos::extract_photo_urls;

/// Injectable delay so tests do not wait on the wall clock
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Delay before attempt `attempt` (1-based): `(attempt - 1) * step`
pub fn delay_before(attempt: u32, step: Duration) -> Duration {
    step * attempt.saturating_sub(1)
}

/// Parameters of one reconciliation run
#[derive(Debug, Clone, Copy)]
pub struct ReconcileRequest {
    pub business_id: i64,
    /// Photo count of the record before the write
    pub previous_photo_count: usize,
    pub images_written: bool,
    pub attempts: u32,
    pub step: Duration,
}

/// Soft failure: the write itself succeeded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconcileWarning {
    /// Budget exhausted before the new photos showed up
    PhotosNotVisible { attempts: u32 },
    /// Every read failed, or one failed in a way retrying cannot fix
    FetchFailed { attempts: u32, message: String },
}

impl ReconcileWarning {
    pub fn message(&self) -> &'static str {
        match self {
            Self::PhotosNotVisible { .. } => {
                "Los cambios se guardaron. Las imágenes pueden tardar unos minutos en aparecer."
            }
            Self::FetchFailed { .. } => {
                "Los cambios se guardaron, pero no se pudo recargar el negocio."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    /// The loop ran to an end; `record` is the last good read, if any
    Finished {
        record: Option<BusinessRecord>,
        attempts: u32,
        converged: bool,
        warning: Option<ReconcileWarning>,
    },
    /// The caller went away; nothing may be applied
    Cancelled { attempts: u32 },
}

impl ReconcileOutcome {
    pub fn record(&self) -> Option<&BusinessRecord> {
        match self {
            Self::Finished { record, .. } => record.as_ref(),
            Self::Cancelled { .. } => None,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Finished { attempts, .. } | Self::Cancelled { attempts } => *attempts,
        }
    }

    pub fn converged(&self) -> bool {
        matches!(self, Self::Finished { converged: true, .. })
    }

    pub fn warning(&self) -> Option<&ReconcileWarning> {
        match self {
            Self::Finished { warning, .. } => warning.as_ref(),
            Self::Cancelled { .. } => None,
        }
    }
}

/// Whether a fresh read reflects the write
fn has_settled(images_written: bool, previous: usize, current: usize) -> bool {
    !images_written || (current != previous && current != 0)
}

/// Re-read the business until the write is visible or the budget runs out
pub async fn reconcile<G>(
    gateway: &G,
    sleeper: &dyn Sleeper,
    request: ReconcileRequest,
    cancel: &CancellationToken,
) -> ReconcileOutcome
where
    G: BusinessGateway + ?Sized,
{
    let ReconcileRequest {
        business_id,
        previous_photo_count,
        images_written,
        attempts: budget,
        step,
    } = request;

    let mut latest = None;
    let mut last_error = None;

    for attempt in 1..=budget {
        let delay = delay_before(attempt, step);
        if !delay.is_zero() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return ReconcileOutcome::Cancelled { attempts: attempt - 1 },
                _ = sleeper.sleep(delay) => {}
            }
        }

        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return ReconcileOutcome::Cancelled { attempts: attempt },
            result = gateway.fetch_business(business_id) => result,
        };

        // Liveness check before touching any state
        if cancel.is_cancelled() {
            return ReconcileOutcome::Cancelled { attempts: attempt };
        }

        match fetched {
            Ok(record) => {
                let count = extract_photo_urls(&record.photos).len();
                tracing::debug!(
                    business_id,
                    attempt,
                    previous = previous_photo_count,
                    current = count,
                    "Reconcile read"
                );
                latest = Some(record);
                last_error = None;
                if has_settled(images_written, previous_photo_count, count) {
                    tracing::info!(business_id, attempt, "Write visible after reconcile");
                    return ReconcileOutcome::Finished {
                        record: latest,
                        attempts: attempt,
                        converged: true,
                        warning: None,
                    };
                }
            }
            Err(e) if e.is_retryable() => {
                tracing::warn!(business_id, attempt, error = %e, "Reconcile read failed, retrying");
                last_error = Some(e.to_string());
            }
            Err(e) => {
                tracing::warn!(business_id, attempt, error = %e, "Reconcile read failed, giving up");
                return ReconcileOutcome::Finished {
                    record: latest,
                    attempts: attempt,
                    converged: false,
                    warning: Some(ReconcileWarning::FetchFailed {
                        attempts: attempt,
                        message: e.to_string(),
                    }),
                };
            }
        }
    }

    // `last_error` is cleared by every good read, so it is set only when
    // the final attempt failed
    let warning = match last_error {
        Some(message) => ReconcileWarning::FetchFailed {
            attempts: budget,
            message,
        },
        None => ReconcileWarning::PhotosNotVisible { attempts: budget },
    };
    tracing::warn!(business_id, attempts = budget, ?warning, "Reconcile budget exhausted");
    ReconcileOutcome::Finished {
        record: latest,
        attempts: budget,
        converged: false,
        warning: Some(warning),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::ImageBatch;
    use crate::planner::WriteTarget;
    use crate::{ClientError, ClientResult};
    use serde_json::{Value, json};
    use shared::models::BusinessUpdate;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Serves a scripted sequence of reads
    struct ScriptedGateway {
        reads: Mutex<VecDeque<ClientResult<usize>>>,
        calls: AtomicU32,
    }

    impl ScriptedGateway {
        fn new(reads: Vec<ClientResult<usize>>) -> Self {
            Self {
                reads: Mutex::new(reads.into()),
                calls: AtomicU32::new(0),
            }
        }

        fn counts(counts: &[usize]) -> Self {
            Self::new(counts.iter().map(|c| Ok(*c)).collect())
        }
    }

    fn record_with_photos(count: usize) -> BusinessRecord {
        let photos: Vec<Value> = (0..count)
            .map(|i| json!({ "url": format!("https://cdn.example.com/{i}.jpg") }))
            .collect();
        BusinessRecord {
            id: 1,
            photos: Value::Array(photos),
            ..Default::default()
        }
    }

    #[async_trait]
    impl BusinessGateway for ScriptedGateway {
        async fn fetch_business(&self, _business_id: i64) -> ClientResult<BusinessRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.reads.lock().unwrap().pop_front();
            next.unwrap_or(Ok(0)).map(record_with_photos)
        }

        async fn write_json(
            &self,
            _target: WriteTarget,
            _business_id: i64,
            _update: &BusinessUpdate,
        ) -> ClientResult<()> {
            unreachable!("reconcile never writes")
        }

        async fn write_multipart(
            &self,
            _target: WriteTarget,
            _business_id: i64,
            _update: &BusinessUpdate,
            _images: &ImageBatch,
        ) -> ClientResult<()> {
            unreachable!("reconcile never writes")
        }
    }

    /// Records requested delays and returns immediately
    #[derive(Default)]
    struct RecordingSleeper {
        delays: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.delays.lock().unwrap().push(duration);
        }
    }

    fn request(images_written: bool, attempts: u32) -> ReconcileRequest {
        ReconcileRequest {
            business_id: 1,
            previous_photo_count: 0,
            images_written,
            attempts,
            step: Duration::from_secs(2),
        }
    }

    #[test]
    fn test_linear_backoff() {
        let step = Duration::from_secs(2);
        let delays: Vec<u64> = (1..=6).map(|a| delay_before(a, step).as_secs()).collect();
        assert_eq!(delays, vec![0, 2, 4, 6, 8, 10]);
    }

    #[tokio::test]
    async fn test_stops_when_photos_appear() {
        let gateway = ScriptedGateway::counts(&[0, 0, 2]);
        let sleeper = RecordingSleeper::default();
        let outcome = reconcile(&gateway, &sleeper, request(true, 6), &CancellationToken::new()).await;

        assert!(outcome.converged());
        assert_eq!(outcome.attempts(), 3);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 3);
        assert_eq!(extract_photo_urls(&outcome.record().unwrap().photos).len(), 2);
        assert_eq!(
            *sleeper.delays.lock().unwrap(),
            vec![Duration::from_secs(2), Duration::from_secs(4)]
        );
    }

    #[tokio::test]
    async fn test_exhausts_budget_with_warning() {
        let gateway = ScriptedGateway::counts(&[0; 6]);
        let sleeper = RecordingSleeper::default();
        let outcome = reconcile(&gateway, &sleeper, request(true, 6), &CancellationToken::new()).await;

        assert!(!outcome.converged());
        assert_eq!(outcome.attempts(), 6);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 6);
        assert_eq!(
            outcome.warning(),
            Some(&ReconcileWarning::PhotosNotVisible { attempts: 6 })
        );
        // Latest read is still handed back
        assert!(outcome.record().is_some());
    }

    #[tokio::test]
    async fn test_text_only_write_settles_on_first_read() {
        let gateway = ScriptedGateway::counts(&[3]);
        let sleeper = RecordingSleeper::default();
        let outcome = reconcile(&gateway, &sleeper, request(false, 2), &CancellationToken::new()).await;

        assert!(outcome.converged());
        assert_eq!(outcome.attempts(), 1);
        assert!(sleeper.delays.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unchanged_count_is_not_convergence() {
        let gateway = ScriptedGateway::counts(&[3, 3, 4]);
        let sleeper = RecordingSleeper::default();
        let mut req = request(true, 6);
        req.previous_photo_count = 3;
        let outcome = reconcile(&gateway, &sleeper, req, &CancellationToken::new()).await;
        assert!(outcome.converged());
        assert_eq!(outcome.attempts(), 3);
    }

    #[tokio::test]
    async fn test_retryable_errors_continue() {
        let gateway = ScriptedGateway::new(vec![
            Err(ClientError::ServerRejected {
                status: 503,
                message: "busy".into(),
            }),
            Ok(1),
        ]);
        let sleeper = RecordingSleeper::default();
        let outcome = reconcile(&gateway, &sleeper, request(true, 6), &CancellationToken::new()).await;
        assert!(outcome.converged());
        assert_eq!(outcome.attempts(), 2);
    }

    #[tokio::test]
    async fn test_terminal_error_stops_early() {
        let gateway = ScriptedGateway::new(vec![Err(ClientError::Unauthorized), Ok(2)]);
        let sleeper = RecordingSleeper::default();
        let outcome = reconcile(&gateway, &sleeper, request(true, 6), &CancellationToken::new()).await;

        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            outcome.warning(),
            Some(ReconcileWarning::FetchFailed { attempts: 1, .. })
        ));
        assert!(outcome.record().is_none());
    }

    #[tokio::test]
    async fn test_all_reads_failing_reports_fetch_failure() {
        let busy = || {
            Err(ClientError::ServerRejected {
                status: 502,
                message: "bad gateway".into(),
            })
        };
        let gateway = ScriptedGateway::new(vec![busy(), busy()]);
        let sleeper = RecordingSleeper::default();
        let outcome = reconcile(&gateway, &sleeper, request(false, 2), &CancellationToken::new()).await;
        assert!(matches!(
            outcome.warning(),
            Some(ReconcileWarning::FetchFailed { attempts: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_failing_final_read_is_reported_after_a_good_one() {
        let busy = || {
            Err(ClientError::ServerRejected {
                status: 503,
                message: "busy".into(),
            })
        };
        let gateway = ScriptedGateway::new(vec![Ok(0), busy(), busy(), busy(), busy(), busy()]);
        let sleeper = RecordingSleeper::default();
        let outcome = reconcile(&gateway, &sleeper, request(true, 6), &CancellationToken::new()).await;

        assert_eq!(gateway.calls.load(Ordering::SeqCst), 6);
        assert!(!outcome.converged());
        assert!(matches!(
            outcome.warning(),
            Some(ReconcileWarning::FetchFailed { attempts: 6, message }) if message.contains("busy")
        ));
        // The earlier good read is still handed back
        assert!(outcome.record().is_some());
    }

    #[tokio::test]
    async fn test_good_final_read_after_errors_is_not_a_fetch_failure() {
        let busy = || {
            Err(ClientError::ServerRejected {
                status: 503,
                message: "busy".into(),
            })
        };
        let gateway = ScriptedGateway::new(vec![busy(), Ok(0)]);
        let sleeper = RecordingSleeper::default();
        let outcome = reconcile(&gateway, &sleeper, request(true, 2), &CancellationToken::new()).await;
        assert_eq!(
            outcome.warning(),
            Some(&ReconcileWarning::PhotosNotVisible { attempts: 2 })
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_start_applies_nothing() {
        let gateway = ScriptedGateway::counts(&[2]);
        let sleeper = RecordingSleeper::default();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = reconcile(&gateway, &sleeper, request(true, 6), &cancel).await;
        assert!(matches!(outcome, ReconcileOutcome::Cancelled { .. }));
        assert!(outcome.record().is_none());
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    /// Cancels the token while "sleeping"
    struct CancellingSleeper(CancellationToken);

    #[async_trait]
    impl Sleeper for CancellingSleeper {
        async fn sleep(&self, _duration: Duration) {
            self.0.cancel();
            std::future::pending::<()>().await;
        }
    }

    #[tokio::test]
    async fn test_cancelled_mid_loop_stops_reads() {
        let gateway = ScriptedGateway::counts(&[0, 2]);
        let cancel = CancellationToken::new();
        let sleeper = CancellingSleeper(cancel.clone());

        let outcome = reconcile(&gateway, &sleeper, request(true, 6), &cancel).await;
        assert_eq!(outcome, ReconcileOutcome::Cancelled { attempts: 1 });
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    }
}
