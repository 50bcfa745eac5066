//! Control surface under `/_holdover`.
//!
//! Delivers the trigger signals a browser runtime would own — deferred
//! replay, push, notification clicks — and exposes cache introspection
//! and maintenance.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use holdover_core::policy::CACHE_VERSION;
use holdover_core::{Error, HostDirective, PushPayload};

use crate::error::error_response;
use crate::gateway::GatewayState;

/// One namespace in the status report.
#[derive(Debug, Serialize)]
pub struct NamespaceStatus {
    pub name: String,
    pub entries: u64,
}

/// Output of the status endpoint.
#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub version: String,
    pub namespaces: Vec<NamespaceStatus>,
}

pub async fn status(State(state): State<GatewayState>) -> Response {
    let names = match state.agent.db().list_namespaces().await {
        Ok(names) => names,
        Err(err) => return error_response(&err),
    };

    let mut namespaces = Vec::with_capacity(names.len());
    for name in names {
        match state.agent.db().count_entries(&name).await {
            Ok(entries) => namespaces.push(NamespaceStatus { name, entries }),
            Err(err) => return error_response(&err),
        }
    }

    Json(StatusOutput { version: CACHE_VERSION.to_string(), namespaces }).into_response()
}

/// Parameters for the sync trigger.
#[derive(Debug, Deserialize)]
pub struct SyncParams {
    pub tag: String,
}

/// Output of the sync trigger.
#[derive(Debug, Serialize)]
pub struct SyncOutput {
    /// False when the tag didn't match and the replay hook was skipped.
    pub handled: bool,
}

pub async fn sync(State(state): State<GatewayState>, Json(params): Json<SyncParams>) -> Response {
    match state.agent.handle_sync(&params.tag).await {
        Ok(handled) => Json(SyncOutput { handled }).into_response(),
        Err(err) => error_response(&err),
    }
}

pub async fn push(State(state): State<GatewayState>, Json(payload): Json<PushPayload>) -> Json<HostDirective> {
    Json(state.agent.handle_push(payload))
}

pub async fn notification_click(State(state): State<GatewayState>) -> Json<HostDirective> {
    Json(state.agent.handle_notification_click())
}

/// Parameters for the LRU trim endpoint.
#[derive(Debug, Deserialize)]
pub struct PurgeParams {
    pub namespace: String,
    pub max_entries: usize,
}

/// Output of the LRU trim endpoint.
#[derive(Debug, Serialize)]
pub struct PurgeOutput {
    pub deleted: u64,
}

pub async fn purge(State(state): State<GatewayState>, Json(params): Json<PurgeParams>) -> Response {
    if !state.agent.names().contains(&params.namespace) {
        return error_response(&Error::InvalidInput(format!(
            "unknown namespace: {}",
            params.namespace
        )));
    }

    match state.agent.db().trim_namespace(&params.namespace, params.max_entries).await {
        Ok(deleted) => Json(PurgeOutput { deleted }).into_response(),
        Err(err) => error_response(&err),
    }
}
