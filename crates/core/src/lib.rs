//! Pure domain logic for the client-onboarding engine.
//!
//! Everything in this crate is synchronous, deterministic, and free of I/O:
//! the template/field model, the session status state machine, completion
//! calculation, risk scoring, and upload validation. The orchestration
//! services in `intake-engine` and the HTTP layer in `intake-api` build on
//! these primitives.

pub mod completion;
pub mod error;
pub mod risk;
pub mod session;
pub mod template;
pub mod types;
pub mod upload;
pub mod value;

pub use error::CoreError;
