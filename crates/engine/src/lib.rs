//! Orchestration services for the onboarding engine.
//!
//! Each service is constructed with the persistence ports ([`store`]) and
//! collaborators it needs; there is no ambient database handle. The
//! [`pg`] module adapts the ports onto `intake-db`; the [`memory`] module
//! provides in-memory ports for tests and local development.

pub mod authorize;
pub mod config;
pub mod files;
pub mod memory;
pub mod pg;
pub mod registry;
pub mod responses;
pub mod session;
pub mod storage;
pub mod store;

pub use authorize::{ActorContext, AllowAll, Authorizer, Permission};
pub use config::EngineConfig;
pub use files::FileGateway;
pub use registry::TemplateRegistry;
pub use responses::ResponseService;
pub use session::{ResolvedSession, SessionManager};
pub use storage::{ObjectStorage, StoredObject};
