//! Marketplace Module
//!
//! Implements the IFROF procedure surface (factories, products, forum,
//! inquiries, payments, notifications, chatbot and buyer/factory messaging)
//! on top of `ifrof-rpc`, with `SeaORM` storage and external payment and AI
//! adapters.
//!
//! ## Public API
//!
//! The public contract is defined in the `marketplace-sdk` crate and
//! re-exported here. The composition root is [`Marketplace`]; the server
//! binary builds it from [`MarketplaceConfig`] and mounts its router.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
// === PUBLIC API (from SDK) ===
pub use marketplace_sdk::{MarketplaceError, NewUser, Role, User};

// === MODULE DEFINITION ===
pub mod config;
pub mod module;
pub use config::MarketplaceConfig;
pub use module::{Marketplace, ModuleError};

// === INTERNAL MODULES ===
// Exposed only for comprehensive testing; use the SDK types for stable APIs.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
