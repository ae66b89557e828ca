use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::Instrument;

use crate::context::CallContext;
use crate::error::{ErrorCode, RpcError};
use crate::problem::Problem;
use crate::procedure::Mode;

/// Transport-parsed input. A parse failure is raised only after the
/// caller predicates have passed.
pub(crate) type RawInput = Result<Value, RpcError>;

pub(crate) type ErasedInvoke = Arc<
    dyn Fn(CallContext, RawInput) -> BoxFuture<'static, Result<Value, RpcError>> + Send + Sync,
>;

pub(crate) struct Procedure {
    pub(crate) name: &'static str,
    pub(crate) mode: Mode,
    pub(crate) summary: Option<String>,
    pub(crate) access: Vec<String>,
    pub(crate) input_schema: Value,
    pub(crate) invoke: ErasedInvoke,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("procedure '{name}' is already registered")]
    Duplicate { name: String },
    #[error("procedure name '{name}' must look like 'domain.action'")]
    InvalidName { name: String },
}

/// How the transport reached the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation {
    /// Any mode may run (POST).
    Any,
    /// Only queries may run (GET).
    QueryOnly,
}

/// Catalog entry describing one registered procedure.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureInfo {
    pub name: String,
    pub mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub access: Vec<String>,
    pub input_schema: Value,
}

/// All procedures of the surface, keyed by `domain.action`.
#[derive(Default)]
pub struct ProcedureRegistry {
    procedures: BTreeMap<&'static str, Procedure>,
}

impl std::fmt::Debug for ProcedureRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcedureRegistry")
            .field("procedures", &self.procedures.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn valid_segment(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_lowercase())
        && s.chars().all(|c| c.is_ascii_alphanumeric())
}

fn valid_name(name: &str) -> bool {
    match name.split_once('.') {
        Some((domain, action)) => valid_segment(domain) && valid_segment(action),
        None => false,
    }
}

impl ProcedureRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, procedure: Procedure) -> Result<(), RegistryError> {
        if !valid_name(procedure.name) {
            return Err(RegistryError::InvalidName {
                name: procedure.name.to_owned(),
            });
        }
        if self.procedures.contains_key(procedure.name) {
            return Err(RegistryError::Duplicate {
                name: procedure.name.to_owned(),
            });
        }
        tracing::debug!(procedure = procedure.name, mode = ?procedure.mode, "Registered procedure");
        self.procedures.insert(procedure.name, procedure);
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.procedures.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }

    #[must_use]
    pub fn mode(&self, name: &str) -> Option<Mode> {
        self.procedures.get(name).map(|p| p.mode)
    }

    /// Describe every registered procedure, sorted by name.
    #[must_use]
    pub fn catalog(&self) -> Vec<ProcedureInfo> {
        self.procedures
            .values()
            .map(|p| ProcedureInfo {
                name: p.name.to_owned(),
                mode: p.mode,
                summary: p.summary.clone(),
                access: p.access.clone(),
                input_schema: p.input_schema.clone(),
            })
            .collect()
    }

    /// Run procedure `name` with the raw JSON `input`.
    ///
    /// # Errors
    /// `NOT_FOUND` for unknown names, `METHOD_NOT_SUPPORTED` for mutations
    /// reached through a query-only transport, otherwise whatever the
    /// procedure's policy, validation or body yields.
    pub async fn invoke(
        &self,
        ctx: CallContext,
        name: &str,
        input: Value,
        how: Invocation,
    ) -> Result<Value, RpcError> {
        self.run(ctx, name, Ok(input), how).await.0
    }

    /// Transport entry point. `input` is the outcome of parsing the request;
    /// a parse error surfaces only once the caller predicates have passed.
    /// Failures are rendered as problems inside the `procedure` span.
    ///
    /// # Errors
    /// The problem document of whatever [`Self::invoke`] would have failed with.
    #[allow(clippy::result_large_err)]
    pub async fn call(
        &self,
        ctx: CallContext,
        name: &str,
        input: Result<Value, RpcError>,
        how: Invocation,
    ) -> Result<Value, Problem> {
        let (result, span) = self.run(ctx, name, input, how).await;
        result.map_err(|e| match span {
            Some(span) => span.in_scope(|| e.to_problem(name)),
            None => e.to_problem(name),
        })
    }

    async fn run(
        &self,
        ctx: CallContext,
        name: &str,
        input: RawInput,
        how: Invocation,
    ) -> (Result<Value, RpcError>, Option<tracing::Span>) {
        let Some(procedure) = self.procedures.get(name) else {
            let err = RpcError::not_found(format!("No procedure named '{name}'"));
            return (Err(err), None);
        };
        if how == Invocation::QueryOnly && procedure.mode == Mode::Mutation {
            let err = RpcError::new(
                ErrorCode::MethodNotSupported,
                format!("'{name}' is a mutation and must be called with POST"),
            );
            return (Err(err), None);
        }

        let caller_id = ctx
            .caller()
            .map_or_else(|| "anonymous".to_owned(), |c| c.id().to_string());
        let span = tracing::info_span!(
            "procedure",
            name = procedure.name,
            mode = ?procedure.mode,
            caller_id = %caller_id,
        );

        let result = (procedure.invoke)(ctx, input).instrument(span.clone()).await;
        span.in_scope(|| match &result {
            Ok(_) => tracing::debug!("Procedure completed"),
            Err(e) if e.code == ErrorCode::InternalServerError => {
                tracing::error!(code = %e.code, error = %e.message, "Procedure failed");
            }
            Err(e) => tracing::debug!(code = %e.code, error = %e.message, "Procedure rejected"),
        });
        (result, Some(span))
    }
}
