// vitrina-client/src/http.rs
// Backend gateway: owner reads and business writes over HTTP

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use shared::models::{BusinessRecord, BusinessUpdate};
use shared::response::{ApiResponse, Page};

use crate::config::ClientConfig;
use crate::images::{ImageBatch, ImageFile};
use crate::planner::WriteTarget;
use crate::session::Session;
use crate::{ClientError, ClientResult};

/// Multipart part carrying the JSON field payload
pub const BUSINESS_PART: &str = "business";
/// Multipart part carrying the new logo
pub const LOGO_PART: &str = "logoFile";
/// Multipart part, repeated once per carousel image
pub const CAROUSEL_PART: &str = "carouselFiles";

/// Owner list page size used when looking a business up by id
const OWNER_LIST_SIZE: u32 = 100;

/// Error body returned by the backend on failures
#[derive(serde::Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Either shape the backend uses for a single business
///
/// A bare record always carries `id`, the envelope never does, so the
/// bare form is tried first.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum RecordBody {
    Bare(BusinessRecord),
    Wrapped(ApiResponse<BusinessRecord>),
}

impl RecordBody {
    fn into_record(self) -> ClientResult<BusinessRecord> {
        match self {
            Self::Bare(record) => Ok(record),
            Self::Wrapped(envelope) => envelope.into_data().map_err(ClientError::InvalidResponse),
        }
    }
}

/// Remote operations the editor depends on
#[async_trait]
pub trait BusinessGateway: Send + Sync {
    /// Read one business as its owner sees it
    async fn fetch_business(&self, business_id: i64) -> ClientResult<BusinessRecord>;

    /// Partial update with a JSON body
    async fn write_json(
        &self,
        target: WriteTarget,
        business_id: i64,
        update: &BusinessUpdate,
    ) -> ClientResult<()>;

    /// Partial update with replacement images
    async fn write_multipart(
        &self,
        target: WriteTarget,
        business_id: i64,
        update: &BusinessUpdate,
        images: &ImageBatch,
    ) -> ClientResult<()>;
}

/// reqwest-backed gateway
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    session: Arc<dyn Session>,
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpGateway {
    pub fn new(config: &ClientConfig, session: Arc<dyn Session>) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn write_path(target: WriteTarget, business_id: i64) -> String {
        match target {
            WriteTarget::Standard => format!("business/{business_id}"),
            WriteTarget::Rejected => format!("business/{business_id}/update-rejected"),
        }
    }

    /// Attach the bearer token; no token means the call is not attempted
    fn authorize(&self, req: RequestBuilder) -> ClientResult<RequestBuilder> {
        let token = self.session.token().ok_or(ClientError::Unauthorized)?;
        Ok(req.bearer_auth(token))
    }

    async fn send(&self, req: RequestBuilder) -> ClientResult<reqwest::Response> {
        let response = self.authorize(req)?.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorResponse>(&text)
            .ok()
            .and_then(|e| e.message.or(e.error))
            .unwrap_or(text);

        match status {
            StatusCode::UNAUTHORIZED => {
                tracing::warn!("Backend answered 401, dropping session");
                self.session.invalidate();
                Err(ClientError::Unauthorized)
            }
            StatusCode::FORBIDDEN => Err(ClientError::Forbidden(message)),
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(message)),
            _ => Err(ClientError::ServerRejected {
                status: status.as_u16(),
                message,
            }),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        let req = self.client.get(self.url(path)).query(query);
        let response = self.send(req).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Look the business up in the owner's own list
    async fn fetch_from_owner_list(&self, business_id: i64) -> ClientResult<BusinessRecord> {
        let envelope: ApiResponse<Page<BusinessRecord>> = self
            .get_json(
                "business/private-list-by-category",
                &[("page", "0".into()), ("size", OWNER_LIST_SIZE.to_string())],
            )
            .await?;
        let page = envelope.into_data().map_err(ClientError::InvalidResponse)?;
        page.content
            .into_iter()
            .find(|b| b.id == business_id)
            .ok_or_else(|| ClientError::NotFound(format!("business {business_id} not in owner list")))
    }

    async fn fetch_details(&self, business_id: i64) -> ClientResult<BusinessRecord> {
        let body: RecordBody = self
            .get_json(
                "business/public-details",
                &[("id", business_id.to_string())],
            )
            .await?;
        body.into_record()
    }
}

fn file_part(file: &ImageFile) -> ClientResult<Part> {
    Ok(Part::bytes(file.bytes.clone())
        .file_name(file.file_name.clone())
        .mime_str(&file.mime())?)
}

/// Build the multipart body: one JSON part plus the image parts
pub fn multipart_form(update: &BusinessUpdate, images: &ImageBatch) -> ClientResult<Form> {
    let json = serde_json::to_vec(update)?;
    let mut form = Form::new().part(
        BUSINESS_PART,
        Part::bytes(json)
            .file_name("business.json")
            .mime_str("application/json")?,
    );
    if let Some(logo) = &images.logo {
        form = form.part(LOGO_PART, file_part(logo)?);
    }
    for file in &images.carousel {
        form = form.part(CAROUSEL_PART, file_part(file)?);
    }
    Ok(form)
}

#[async_trait]
impl BusinessGateway for HttpGateway {
    async fn fetch_business(&self, business_id: i64) -> ClientResult<BusinessRecord> {
        match self.fetch_from_owner_list(business_id).await {
            Ok(record) => Ok(record),
            // Absent from the owner's own list: do not look elsewhere
            Err(ClientError::NotFound(msg)) => Err(ClientError::NotFound(msg)),
            Err(ClientError::Unauthorized) => Err(ClientError::Unauthorized),
            Err(e) => {
                tracing::debug!(business_id, error = %e, "Owner list failed, trying details");
                self.fetch_details(business_id).await
            }
        }
    }

    async fn write_json(
        &self,
        target: WriteTarget,
        business_id: i64,
        update: &BusinessUpdate,
    ) -> ClientResult<()> {
        let path = Self::write_path(target, business_id);
        tracing::debug!(business_id, ?target, "PUT {} (json)", path);
        let req = self.client.put(self.url(&path)).json(update);
        self.send(req).await?;
        Ok(())
    }

    async fn write_multipart(
        &self,
        target: WriteTarget,
        business_id: i64,
        update: &BusinessUpdate,
        images: &ImageBatch,
    ) -> ClientResult<()> {
        let path = Self::write_path(target, business_id);
        tracing::debug!(
            business_id,
            ?target,
            files = images.len(),
            "PUT {} (multipart)",
            path
        );
        let req = self
            .client
            .put(self.url(&path))
            .multipart(multipart_form(update, images)?);
        self.send(req).await?;
        Ok(())
    }
}
