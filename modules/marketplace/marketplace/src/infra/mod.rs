//! Infrastructure: storage, external adapters, the realtime feed and
//! session-based context resolution.

pub mod ai;
pub mod payments;
pub mod realtime;
pub mod session;
pub mod storage;
