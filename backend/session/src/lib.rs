//! Per-user session state for LlamaOCR.
//!
//! A [`SessionContext`] holds one user's OCR history, current result and chat
//! turns. The [`SessionRegistry`] owns every live session, creates them on
//! first contact and tears them down explicitly or when idle.

pub mod context;
pub mod registry;

pub use context::{SessionContext, SessionLimits, SessionSnapshot};
pub use registry::{Session, SessionId, SessionRegistry};
