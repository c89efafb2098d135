//! In-process event bus for the onboarding engine.
//!
//! Building blocks for the decoupled automation boundary:
//!
//! - [`EventName`]: the enumerated lifecycle events.
//! - [`DomainEvent`]: the canonical event envelope.
//! - [`EventHandler`]: the subscriber trait.
//! - [`EventBus`]: registration-order, failure-isolated dispatch hub,
//!   owned by the composition root and shared via `Arc`.

pub mod bus;

pub use bus::{DomainEvent, EventBus, EventHandler, EventName};
