// vitrina-client/src/service.rs
// Owner-side editor: load, plan, write once, reconcile

use std::sync::Arc;

use shared::models::{BusinessRecord, ModerationStatus};
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::http::{BusinessGateway, HttpGateway};
use crate::images::validate_batch;
use crate::normalize::{BusinessView, extract_photo_urls, normalize};
use crate::planner::{Advisory, PendingEdit, WriteRequest, WriteStrategy, WriteTarget, plan_update};
use crate::reconcile::{ReconcileOutcome, ReconcileRequest, Sleeper, TokioSleeper, reconcile};
use crate::session::Session;
use crate::{ClientError, ClientResult};

/// A business as loaded for editing
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedBusiness {
    pub record: BusinessRecord,
    pub view: BusinessView,
}

/// What a submit did
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    /// Whether a write reached the backend
    pub written: bool,
    pub strategy: Option<WriteStrategy>,
    pub target: Option<WriteTarget>,
    pub advisories: Vec<Advisory>,
    /// `None` when nothing was written
    pub reconciliation: Option<ReconcileOutcome>,
    /// View of the record after the submit; `None` if the caller cancelled
    pub view: Option<BusinessView>,
}

impl SubmitOutcome {
    fn unwritten(advisories: Vec<Advisory>) -> Self {
        Self {
            written: false,
            strategy: None,
            target: None,
            advisories,
            reconciliation: None,
            view: None,
        }
    }

    /// User-facing notices, advisories first
    pub fn messages(&self) -> Vec<&'static str> {
        let mut messages: Vec<_> = self.advisories.iter().map(Advisory::message).collect();
        if let Some(warning) = self.reconciliation.as_ref().and_then(|r| r.warning()) {
            messages.push(warning.message());
        }
        messages
    }
}

/// Edits one owner's businesses
pub struct BusinessEditor<G> {
    gateway: G,
    session: Arc<dyn Session>,
    config: ClientConfig,
    sleeper: Arc<dyn Sleeper>,
}

impl BusinessEditor<HttpGateway> {
    /// Editor talking to the configured backend over HTTP
    pub fn connect(config: ClientConfig, session: Arc<dyn Session>) -> ClientResult<Self> {
        let gateway = HttpGateway::new(&config, session.clone())?;
        Ok(Self::new(gateway, session, config))
    }
}

impl<G: BusinessGateway> BusinessEditor<G> {
    pub fn new(gateway: G, session: Arc<dyn Session>, config: ClientConfig) -> Self {
        Self {
            gateway,
            session,
            config,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replace the back-off clock
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Whether the edit form should be offered for this record
    pub fn can_edit(&self, record: &BusinessRecord) -> bool {
        self.session.token().is_some() && record.validation_status.is_editable()
    }

    /// Fetch a business and its display view
    pub async fn load(&self, business_id: i64) -> ClientResult<LoadedBusiness> {
        let record = self.gateway.fetch_business(business_id).await?;
        let view = normalize(&record);
        tracing::debug!(
            business_id,
            status = %record.validation_status,
            photos = view.photo_count(),
            "Business loaded"
        );
        Ok(LoadedBusiness { record, view })
    }

    /// Submit an edit: validate, issue exactly one write, then reconcile
    ///
    /// On success `record` holds the accepted fields, replaced by the
    /// freshest read when reconciliation got one. Validation failures
    /// return before any network call.
    pub async fn submit(
        &self,
        record: &mut BusinessRecord,
        edit: PendingEdit,
        cancel: &CancellationToken,
    ) -> ClientResult<SubmitOutcome> {
        let business_id = record.id;
        let status = record.validation_status;
        if !status.is_editable() {
            return Err(ClientError::Forbidden(format!(
                "business {business_id} has status {status} and cannot be edited"
            )));
        }

        if status.allows_image_replacement() && edit.has_images() {
            validate_batch(&edit.images).await?;
        }

        let plan = plan_update(status, edit)?;
        for advisory in &plan.advisories {
            tracing::warn!(
                business_id,
                ?advisory,
                code = ?advisory.code(),
                "{}",
                advisory.message()
            );
        }
        let Some(write) = plan.write else {
            return Ok(SubmitOutcome::unwritten(plan.advisories));
        };

        let previous_photo_count = extract_photo_urls(&record.photos).len();
        let images_written = write.carries_images();
        self.write(business_id, &write).await?;
        tracing::info!(
            business_id,
            strategy = ?write.strategy(),
            target = ?write.target(),
            "Business updated"
        );

        record.apply(write.update());
        if write.target() == WriteTarget::Rejected {
            record.validation_status = ModerationStatus::Pending;
        }

        let request = ReconcileRequest {
            business_id,
            previous_photo_count,
            images_written,
            attempts: self.config.attempt_budget(images_written),
            step: self.config.backoff_step,
        };
        let reconciliation = reconcile(&self.gateway, self.sleeper.as_ref(), request, cancel).await;

        let view = match &reconciliation {
            ReconcileOutcome::Cancelled { .. } => {
                tracing::debug!(business_id, "Submit abandoned by caller during reconcile");
                None
            }
            ReconcileOutcome::Finished { record: fresh, .. } => {
                if let Some(fresh) = fresh {
                    *record = fresh.clone();
                }
                Some(normalize(record))
            }
        };

        Ok(SubmitOutcome {
            written: true,
            strategy: Some(write.strategy()),
            target: Some(write.target()),
            advisories: plan.advisories,
            reconciliation: Some(reconciliation),
            view,
        })
    }

    async fn write(&self, business_id: i64, write: &WriteRequest) -> ClientResult<()> {
        let result = match write {
            WriteRequest::Json { target, update } => {
                self.gateway.write_json(*target, business_id, update).await
            }
            WriteRequest::Multipart {
                target,
                update,
                images,
            } => {
                self.gateway
                    .write_multipart(*target, business_id, update, images)
                    .await
            }
        };
        if let Err(e) = &result {
            tracing::error!(business_id, error = %e, code = %e.code(), "Business update failed");
        }
        result
    }
}
