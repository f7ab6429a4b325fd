//! REST client for room/conversation creation.

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::create::{complete_creation, CreateRequest, Navigator};
use crate::error::{ChatError, ChatResult};
use crate::protocol::Endpoints;
use crate::route::PageRoute;
use crate::store::ClientStore;

/// HTTP side of the chat backend
pub struct ApiClient {
    client: Client,
    endpoints: Endpoints,
}

impl ApiClient {
    /// Create a client with the given request timeout
    pub fn new(endpoints: Endpoints, timeout: Duration) -> ChatResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChatError::Network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, endpoints })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// POST with an empty body and decode the JSON answer
    pub async fn post_create(&self, request: CreateRequest) -> ChatResult<Value> {
        let url = request.url(&self.endpoints);

        let response = self.client.post(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                ChatError::Network(format!("request to {} timed out", url))
            } else if e.is_connect() {
                ChatError::Network(format!("could not connect to {}", url))
            } else {
                ChatError::from(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ChatError::InvalidPayload(e.to_string()))
    }

    /// Create, persist the descriptor and navigate to the new page
    pub async fn create<St, N>(
        &self,
        request: CreateRequest,
        store: &mut St,
        navigator: &mut N,
    ) -> ChatResult<PageRoute>
    where
        St: ClientStore + ?Sized,
        N: Navigator + ?Sized,
    {
        let response = self.post_create(request).await;
        complete_creation(request, response, store, navigator)
    }
}
