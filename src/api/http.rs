//! HTTP implementation of the application API

use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use super::{decode_records, ApiError, ApplicationApi, Credentials, Envelope, Registration, User, UserId};
use crate::board::{ApplicationDraft, ApplicationId, ApplicationRecord};

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Client for the remote REST API rooted at `base_url`.
///
/// Only the login call carries credentials; other requests are sent without
/// any session token.
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    http: Client,
}

#[derive(Serialize)]
struct NewApplication<'a> {
    #[serde(flatten)]
    draft: &'a ApplicationDraft,
    user_id: &'a UserId,
}

#[derive(Deserialize)]
struct CreatedId {
    id: ApplicationId,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(concat!("jobtrack/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and unwrap the envelope's payload.
    async fn send(&self, request: RequestBuilder) -> Result<Value, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<Envelope>(&body)
                .ok()
                .and_then(|envelope| envelope.message);
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        if body.is_empty() {
            return Ok(Value::Null);
        }

        let envelope: Envelope =
            serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(envelope.payload.unwrap_or(Value::Null))
    }
}

impl ApplicationApi for HttpClient {
    #[instrument(skip_all, fields(email = %credentials.email))]
    async fn login(&self, credentials: &Credentials) -> Result<User, ApiError> {
        let request = self
            .http
            .post(self.url("/user/login"))
            .query(&[("email", &credentials.email), ("password", &credentials.password)]);

        let payload = self.send(request).await?;
        serde_json::from_value(payload).map_err(|e| ApiError::Decode(format!("login payload: {}", e)))
    }

    #[instrument(skip_all, fields(email = %registration.email))]
    async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        let request = self.http.post(self.url("/user/register")).query(&[
            ("email", &registration.email),
            ("password", &registration.password),
            ("name", &registration.name),
        ]);

        self.send(request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_applications(&self, user_id: &UserId) -> Result<Vec<ApplicationRecord>, ApiError> {
        let request = self
            .http
            .get(self.url("/job"))
            .query(&[("user_id", user_id.as_str())]);

        let records = decode_records(self.send(request).await?);
        debug!(count = records.len(), "Fetched applications");
        Ok(records)
    }

    #[instrument(skip(self, draft), fields(company = %draft.company))]
    async fn create_application(
        &self,
        user_id: &UserId,
        draft: &ApplicationDraft,
    ) -> Result<ApplicationRecord, ApiError> {
        let body = NewApplication { draft, user_id };
        let payload = self.send(self.http.post(self.url("/job")).json(&body)).await?;

        // Some deployments echo the full record, others only `{ id }`.
        if let Ok(record) = serde_json::from_value::<ApplicationRecord>(payload.clone()) {
            return Ok(record);
        }
        let created: CreatedId = serde_json::from_value(payload)
            .map_err(|e| ApiError::Decode(format!("created application: {}", e)))?;
        Ok(draft.clone().into_record(created.id))
    }

    #[instrument(skip(self, record), fields(status = %record.status))]
    async fn update_application(
        &self,
        id: &ApplicationId,
        record: &ApplicationRecord,
    ) -> Result<ApplicationRecord, ApiError> {
        let url = self.url(&format!("/job/{}", id));
        let payload = self.send(self.http.patch(url).json(record)).await?;

        Ok(serde_json::from_value(payload).unwrap_or_else(|_| record.clone()))
    }

    #[instrument(skip(self))]
    async fn delete_application(&self, id: &ApplicationId) -> Result<(), ApiError> {
        let url = self.url(&format!("/job/{}", id));
        self.send(self.http.delete(url)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = HttpClient::new("http://localhost:3000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(client.url("/job"), "http://localhost:3000/job");
    }
}
