use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::{
    Gateway, ACTIVE_GROUPS_PATH, ASSIGNED_LOCATIONS_PATH, BULK_SAVE_PATH, COMPANY_HEADER,
    LOCATIONS_PATH, SUMMARY_PATH, USERS_PATH, WAREHOUSES_PATH,
};
use crate::config::ClientConfig;
use crate::error::{ConteoError, Result};
use crate::model::{
    BulkAssignmentRequest, CompanyId, CountGroup, GroupId, Location, UserRecord, Warehouse,
    WarehouseId, WorkerId, WorkloadSummaryEntry,
};

/// Gateway backed by the real REST API.
///
/// Every request carries `Authorization: Bearer <token>` and, when a company
/// is selected, `x-empresa-id`. A 401 expires the session: the token is dropped
/// and later calls fail with [`ConteoError::Unauthorized`] without touching the
/// network until [`HttpGateway::set_token`] is called again.
#[derive(Debug)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    token: RwLock<Option<String>>,
    company_id: Option<CompanyId>,
    expired: AtomicBool,
}

impl HttpGateway {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(config.token.clone()),
            company_id: config.company_id,
            expired: AtomicBool::new(false),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn company_id(&self) -> Option<CompanyId> {
        self.company_id
    }

    /// Install a fresh token and clear any previous expiry.
    pub fn set_token(&self, token: impl Into<String>) {
        if let Ok(mut slot) = self.token.write() {
            *slot = Some(token.into());
        }
        self.expired.store(false, Ordering::Release);
    }

    pub fn is_expired(&self) -> bool {
        self.expired.load(Ordering::Acquire)
    }

    fn expire(&self) {
        if let Ok(mut slot) = self.token.write() {
            *slot = None;
        }
        self.expired.store(true, Ordering::Release);
        tracing::warn!(base_url = %self.base_url, "Session rejected by server, token dropped");
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        if self.is_expired() {
            return Err(ConteoError::Unauthorized);
        }

        let token = self
            .token
            .read()
            .map_err(|_| ConteoError::Internal("token lock poisoned".to_string()))?
            .clone();

        let mut builder = builder;
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(company) = self.company_id {
            builder = builder.header(COMPANY_HEADER, company.to_string());
        }
        Ok(builder)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = self.authorize(builder)?.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.expire();
            return Err(ConteoError::Unauthorized);
        }
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::debug!(
                        status = status.as_u16(),
                        error = %e,
                        "Failed to read error response body"
                    );
                    String::new()
                }
            };
            tracing::debug!(status = status.as_u16(), body = %body, "Request failed");
            return Err(ConteoError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// GET a JSON list. A `null` body is treated as an empty list.
    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, u64)],
    ) -> Result<Vec<T>> {
        let builder = self.client.get(self.url(path)).query(query);
        let response = self.send(builder).await?;
        let bytes = response.bytes().await?;
        let items: Option<Vec<T>> = serde_json::from_slice(&bytes)?;
        Ok(items.unwrap_or_default())
    }
}

impl Gateway for HttpGateway {
    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        self.get_list(USERS_PATH, &[]).await
    }

    async fn list_active_groups(&self) -> Result<Vec<CountGroup>> {
        self.get_list(ACTIVE_GROUPS_PATH, &[]).await
    }

    async fn list_warehouses(&self) -> Result<Vec<Warehouse>> {
        self.get_list(WAREHOUSES_PATH, &[]).await
    }

    async fn list_locations(&self, warehouse: WarehouseId) -> Result<Vec<Location>> {
        self.get_list(LOCATIONS_PATH, &[("bodegaId", warehouse.0)])
            .await
    }

    async fn assigned_locations(
        &self,
        worker: WorkerId,
        warehouse: WarehouseId,
    ) -> Result<Vec<Location>> {
        self.get_list(
            ASSIGNED_LOCATIONS_PATH,
            &[("usuarioId", worker.0), ("bodegaId", warehouse.0)],
        )
        .await
    }

    async fn workload_summary(
        &self,
        worker: WorkerId,
        group: GroupId,
    ) -> Result<Vec<WorkloadSummaryEntry>> {
        self.get_list(SUMMARY_PATH, &[("usuarioId", worker.0), ("grupoId", group.0)])
            .await
    }

    async fn save_assignment(&self, request: &BulkAssignmentRequest) -> Result<()> {
        let builder = self.client.post(self.url(BULK_SAVE_PATH)).json(request);
        self.send(builder).await?;
        Ok(())
    }
}
