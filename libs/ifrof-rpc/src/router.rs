//! HTTP binding of the procedure registry.
//!
//! - `GET  /rpc`          catalog of registered procedures
//! - `POST /rpc/{name}`   JSON body is the input, any mode
//! - `GET  /rpc/{name}`   `?input=<json>` query parameter, queries only

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::{Value, json};

use crate::context::CallContext;
use crate::error::RpcError;
use crate::registry::{Invocation, ProcedureRegistry};

/// Routes serving `registry`. The [`CallContext`] is expected from
/// [`crate::context::resolve_context`]; without it calls run anonymously.
pub fn rpc_routes<S>(registry: Arc<ProcedureRegistry>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/rpc", get(catalog))
        .route("/rpc/{name}", get(call_query).post(call_any))
        .layer(Extension(registry))
}

async fn catalog(Extension(registry): Extension<Arc<ProcedureRegistry>>) -> Json<Value> {
    Json(json!({ "procedures": registry.catalog() }))
}

fn parse_input(raw: &[u8]) -> Result<Value, RpcError> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(raw)
        .map_err(|e| RpcError::bad_request(format!("Malformed JSON input: {e}")))
}

async fn dispatch(
    registry: &ProcedureRegistry,
    ctx: Option<Extension<CallContext>>,
    name: &str,
    input: Result<Value, RpcError>,
    how: Invocation,
) -> Response {
    let ctx = ctx.map_or_else(CallContext::anonymous, |Extension(c)| c);
    match registry.call(ctx, name, input, how).await {
        Ok(value) => Json(value).into_response(),
        Err(problem) => problem.into_response(),
    }
}

async fn call_any(
    Extension(registry): Extension<Arc<ProcedureRegistry>>,
    ctx: Option<Extension<CallContext>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Response {
    dispatch(&registry, ctx, &name, parse_input(&body), Invocation::Any).await
}

async fn call_query(
    Extension(registry): Extension<Arc<ProcedureRegistry>>,
    ctx: Option<Extension<CallContext>>,
    Path(name): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let input = params
        .get("input")
        .map_or(Ok(Value::Null), |raw| parse_input(raw.as_bytes()));
    dispatch(&registry, ctx, &name, input, Invocation::QueryOnly).await
}
