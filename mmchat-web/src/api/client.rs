//! HTTP API Client
//!
//! Room and conversation creation against the chat backend.

use gloo_net::http::Request;
use serde_json::Value;

use mmchat::create::{complete_creation, CreateRequest};
use mmchat::error::{ChatError, ChatResult};
use mmchat::protocol::Endpoints;
use mmchat::route::PageRoute;

use crate::state::{endpoints, LocationNavigator, LocalStorageStore};

/// POST with an empty body and decode the JSON answer
pub async fn post_create(request: CreateRequest, endpoints: &Endpoints) -> ChatResult<Value> {
    let url = request.url(endpoints);

    let response = Request::post(&url)
        .send()
        .await
        .map_err(|e| ChatError::Network(e.to_string()))?;

    if !response.ok() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(ChatError::Status { status, body });
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| ChatError::InvalidPayload(e.to_string()))
}

/// Create, store the descriptor in `localStorage` and move the page to it
pub async fn create(request: CreateRequest) -> ChatResult<PageRoute> {
    let endpoints = endpoints();
    let response = post_create(request, &endpoints).await;
    complete_creation(request, response, &mut LocalStorageStore, &mut LocationNavigator)
}
