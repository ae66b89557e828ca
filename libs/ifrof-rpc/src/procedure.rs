//! Type-safe procedure builder with compile-time guarantees.
//!
//! This module implements a type-state builder that ensures:
//! - `register()` cannot be called unless a handler is set
//! - `register()` cannot be called unless an access policy is declared,
//!   either explicitly public or a conjunction of predicates
//! - descriptive methods remain available at any stage

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use futures::future::BoxFuture;
use ifrof_security::{AccessPolicy, Predicate};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::CallContext;
use crate::error::RpcError;
use crate::registry::{ErasedInvoke, Procedure, ProcedureRegistry, RawInput, RegistryError};
use crate::validate::Validate;

/// Declared mode of a procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// No persisted side effect; safe to retry and reachable over GET.
    Query,
    /// Persisted side effect.
    Mutation,
}

/// Input of procedures that take no payload. Accepts `null` and `{}`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema)]
pub struct NoInput {}

impl Validate for NoInput {}

/// `{ "success": true }` acknowledgement returned by several mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub const OK: Self = Self { success: true };
}

/// Type-state markers for compile-time enforcement
pub mod state {
    /// Marker for missing handler
    #[derive(Debug, Clone, Copy)]
    pub struct Missing;

    /// Marker for present handler
    #[derive(Debug, Clone, Copy)]
    pub struct Present;

    /// Marker for access policy not yet declared
    #[derive(Debug, Clone, Copy)]
    pub struct AuthNotSet;

    /// Marker for access policy declared (public or predicates)
    #[derive(Debug, Clone, Copy)]
    pub struct AuthSet;
}

pub use state::{AuthNotSet, AuthSet, Missing, Present};

mod sealed {
    pub trait Sealed {}
    pub trait SealedAuth {}
}

impl sealed::Sealed for Missing {}
impl sealed::Sealed for Present {}
impl sealed::SealedAuth for AuthNotSet {}
impl sealed::SealedAuth for AuthSet {}

pub(crate) type BoxedBody<I, O> =
    Arc<dyn Fn(CallContext, I) -> BoxFuture<'static, Result<O, RpcError>> + Send + Sync>;

/// Maps handler state to the builder's handler slot.
pub trait HandlerSlot<I, O>: sealed::Sealed {
    type Slot;
}

impl<I, O> HandlerSlot<I, O> for Missing {
    type Slot = ();
}

impl<I: 'static, O: 'static> HandlerSlot<I, O> for Present {
    type Slot = BoxedBody<I, O>;
}

/// Maps policy state to the builder's policy slot.
pub trait AuthSlot<I>: sealed::SealedAuth {
    type Slot;
}

impl<I> AuthSlot<I> for AuthNotSet {
    type Slot = ();
}

impl<I> AuthSlot<I> for AuthSet {
    type Slot = AccessPolicy<I>;
}

/// Builder for one procedure.
#[must_use]
pub struct ProcedureBuilder<I, O, H = Missing, A = AuthNotSet>
where
    H: HandlerSlot<I, O>,
    A: AuthSlot<I>,
{
    name: &'static str,
    mode: Mode,
    summary: Option<String>,
    handler: H::Slot,
    policy: A::Slot,
    _types: PhantomData<fn(I) -> O>,
}

impl<I, O> ProcedureBuilder<I, O, Missing, AuthNotSet> {
    fn new(name: &'static str, mode: Mode) -> Self {
        Self {
            name,
            mode,
            summary: None,
            handler: (),
            policy: (),
            _types: PhantomData,
        }
    }

    pub fn query(name: &'static str) -> Self {
        Self::new(name, Mode::Query)
    }

    pub fn mutation(name: &'static str) -> Self {
        Self::new(name, Mode::Mutation)
    }
}

impl<I, O, H, A> ProcedureBuilder<I, O, H, A>
where
    H: HandlerSlot<I, O>,
    A: AuthSlot<I>,
{
    pub fn summary(mut self, text: impl Into<String>) -> Self {
        self.summary = Some(text.into());
        self
    }
}

impl<I, O, H> ProcedureBuilder<I, O, H, AuthNotSet>
where
    H: HandlerSlot<I, O>,
{
    fn with_policy(self, policy: AccessPolicy<I>) -> ProcedureBuilder<I, O, H, AuthSet> {
        ProcedureBuilder {
            name: self.name,
            mode: self.mode,
            summary: self.summary,
            handler: self.handler,
            policy,
            _types: PhantomData,
        }
    }

    /// Explicitly mark the procedure as callable without identity.
    pub fn public(self) -> ProcedureBuilder<I, O, H, AuthSet> {
        self.with_policy(AccessPolicy::Public)
    }

    /// Require every predicate to hold. An empty list means `Authenticated`.
    pub fn require(self, predicates: Vec<Predicate<I>>) -> ProcedureBuilder<I, O, H, AuthSet> {
        let predicates = if predicates.is_empty() {
            vec![Predicate::Authenticated]
        } else {
            predicates
        };
        self.with_policy(AccessPolicy::Require(predicates))
    }

    pub fn authenticated(self) -> ProcedureBuilder<I, O, H, AuthSet> {
        self.require(vec![Predicate::Authenticated])
    }
}

impl<I, O, A> ProcedureBuilder<I, O, Missing, A>
where
    I: 'static,
    O: 'static,
    A: AuthSlot<I>,
{
    /// Attach the procedure body. It runs only after authorization and
    /// validation have passed.
    pub fn handler<F, Fut>(self, f: F) -> ProcedureBuilder<I, O, Present, A>
    where
        F: Fn(CallContext, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, RpcError>> + Send + 'static,
    {
        let body: BoxedBody<I, O> = Arc::new(move |ctx, input| Box::pin(f(ctx, input)));
        ProcedureBuilder {
            name: self.name,
            mode: self.mode,
            summary: self.summary,
            handler: body,
            policy: self.policy,
            _types: PhantomData,
        }
    }
}

fn decode<I: DeserializeOwned>(raw: Value) -> Result<I, RpcError> {
    let raw = if raw.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        raw
    };
    serde_json::from_value(raw).map_err(|e| RpcError::bad_request(format!("Invalid input: {e}")))
}

impl<I, O> ProcedureBuilder<I, O, Present, AuthSet>
where
    I: DeserializeOwned + Validate + JsonSchema + Send + 'static,
    O: Serialize + Send + 'static,
{
    /// Register the procedure. Evaluation order at call time:
    /// context predicates, parse, decode, validate, input predicates, body.
    ///
    /// # Errors
    /// Fails on malformed or duplicate procedure names.
    pub fn register(self, registry: &mut ProcedureRegistry) -> Result<(), RegistryError> {
        let access = self.policy.labels();
        let input_schema = serde_json::to_value(schemars::schema_for!(I)).unwrap_or_default();

        let policy = Arc::new(self.policy);
        let body = self.handler;
        let invoke: ErasedInvoke = Arc::new(move |ctx: CallContext, raw: RawInput| {
            let policy = Arc::clone(&policy);
            let body = Arc::clone(&body);
            let fut: BoxFuture<'static, Result<Value, RpcError>> = Box::pin(async move {
                policy.check_caller(ctx.caller())?;
                let input: I = decode(raw?)?;
                input.validate().map_err(RpcError::invalid_input)?;
                policy.check_input(ctx.caller(), &input)?;
                let output = body(ctx, input).await?;
                serde_json::to_value(output)
                    .map_err(|e| RpcError::internal(format!("Failed to encode result: {e}")))
            });
            fut
        });

        registry.insert(Procedure {
            name: self.name,
            mode: self.mode,
            summary: self.summary,
            access,
            input_schema,
            invoke,
        })
    }
}
