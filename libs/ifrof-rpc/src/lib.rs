//! Procedure layer for the IFROF backend.
//!
//! Every backend capability is a named procedure (`<domain>.<action>`) with a
//! declared mode, a typed input contract and an access policy. Procedures are
//! registered through [`ProcedureBuilder`], which refuses to register anything
//! that lacks either a handler or an access policy.
//!
//! ## Request flow
//!
//! 1. [`context::resolve_context`] turns the inbound HTTP request into a
//!    [`CallContext`] (caller identity plus request/response handles).
//! 2. [`ProcedureRegistry::call`] looks the procedure up, evaluates the
//!    context-only predicates, decodes and validates the payload, evaluates the
//!    ownership predicates and finally runs the body.
//! 3. The result is returned as JSON; failures become RFC 9457 problems with a
//!    machine-readable `code`.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod context;
pub mod error;
pub mod problem;
pub mod procedure;
pub mod registry;
pub mod router;
pub mod validate;

pub use context::{
    CallContext, IdentityResolver, NoIdentity, RequestHandle, ResponseHandle, resolve_context,
};
pub use error::{ErrorCode, RpcError};
pub use problem::{Problem, ValidationViolation};
pub use procedure::{Mode, NoInput, ProcedureBuilder, Success};
pub use registry::{Invocation, ProcedureInfo, ProcedureRegistry, RegistryError};
pub use router::rpc_routes;
pub use validate::{Validate, Violations};
