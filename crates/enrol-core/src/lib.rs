//! enrol-core library.
//!
//! Local-first record keeping for an education consultancy: a typed
//! [`store::CollectionStore`] over a key-value medium, and the catalog,
//! intake, contact and session logic layered on top of it.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums per module, each mapped to an [`error::ErrorCode`].
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod catalog;
pub mod config;
pub mod contact;
pub mod error;
pub mod form;
pub mod intake;
pub mod model;
pub mod seed;
pub mod session;
pub mod store;
pub mod uri;
