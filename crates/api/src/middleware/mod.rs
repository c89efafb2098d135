//! Request extractors for the admin surface.

pub mod admin;

pub use admin::AdminActor;
