//! Security primitives shared by the procedure layer and the marketplace module.
//!
//! - [`Caller`] and [`Role`]: the resolved identity of whoever invokes a procedure
//! - [`Predicate`] and [`AccessPolicy`]: declarative authorization attached to procedures
//! - [`SessionSigner`]: issues and verifies the signed session tokens the context
//!   resolver reads from requests
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod caller;
pub mod errors;
pub mod policy;
pub mod session;

pub use caller::{Caller, CallerBuilder, Role};
pub use errors::AuthError;
pub use policy::{AccessPolicy, Predicate};
pub use session::{SessionClaims, SessionError, SessionSigner};
