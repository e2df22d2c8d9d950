//! HTTP client for the query and mutation operations.
//!
//! # Responsibility
//! - POST GraphQL envelopes to the configured endpoint with API-key auth.
//! - Map transport failures, non-2xx statuses, and GraphQL error envelopes
//!   into `RemoteError`.
//!
//! # Invariants
//! - One attempt per call; retry/backoff is the embedding client's policy.
//! - Log lines carry ids and counts only, never user-entered field text.

use crate::form::CreateRequest;
use crate::model::entry::Entry;
use crate::remote::config::ApiConfig;
use crate::remote::wire::{
    CreateAppData, CreateAppVariables, GraphqlRequest, GraphqlResponse, ListAppsData,
    CREATE_APP_MUTATION, LIST_APPS_QUERY,
};
use crate::remote::{RemoteError, RemoteResult};
use log::{error, info, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Thin client over the configured GraphQL endpoint.
pub struct GraphqlClient {
    http: Client,
    endpoint: String,
    api_key: String,
}

impl GraphqlClient {
    pub fn new(config: &ApiConfig) -> RemoteResult<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(RemoteError::Transport)?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key().to_string(),
        })
    }

    /// Fetches the authoritative list, dropping field-invalid records.
    pub async fn list_apps(&self) -> RemoteResult<Vec<Entry>> {
        info!("event=list_fetch module=remote_client status=start");
        let data: ListAppsData = match self.execute(LIST_APPS_QUERY, None::<()>).await {
            Ok(data) => data,
            Err(err) => {
                error!("event=list_fetch module=remote_client status=error error={err}");
                return Err(err);
            }
        };

        let page = data.list_apps.unwrap_or_default();
        let mut entries = Vec::with_capacity(page.items.len());
        for record in page.items {
            match record.into_entry() {
                Ok(entry) => entries.push(entry),
                Err(err) => {
                    warn!(
                        "event=list_fetch module=remote_client status=error error_code=invalid_record error={err}"
                    );
                }
            }
        }
        info!(
            "event=list_fetch module=remote_client status=ok count={}",
            entries.len()
        );
        Ok(entries)
    }

    /// Sends the create mutation and returns the confirmed echo.
    pub async fn create_app(&self, request: &CreateRequest) -> RemoteResult<Entry> {
        let id = request.id.canonical();
        info!("event=create_app module=remote_client status=start id={id}");
        let variables = CreateAppVariables {
            id: &id,
            name: &request.name,
            link: &request.link,
        };
        let outcome = self
            .execute::<_, CreateAppData>(CREATE_APP_MUTATION, Some(variables))
            .await
            .and_then(|data| {
                data.create_app
                    .ok_or_else(|| RemoteError::Wire("create ack carried no record".to_string()))
            })
            .and_then(|record| {
                record
                    .into_entry()
                    .map_err(|err| RemoteError::Wire(format!("create ack invalid: {err}")))
            });
        match outcome {
            Ok(entry) => {
                info!(
                    "event=create_app module=remote_client status=ok id={}",
                    entry.id
                );
                Ok(entry)
            }
            Err(err) => {
                error!("event=create_app module=remote_client status=error id={id} error={err}");
                Err(err)
            }
        }
    }

    async fn execute<V: Serialize, T: DeserializeOwned>(
        &self,
        query: &'static str,
        variables: Option<V>,
    ) -> RemoteResult<T> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&GraphqlRequest { query, variables })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(RemoteError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: GraphqlResponse<T> = response
            .json()
            .await
            .map_err(|err| RemoteError::Wire(format!("failed to decode response: {err}")))?;
        envelope.into_data()
    }
}
