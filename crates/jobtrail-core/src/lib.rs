//! jobtrail-core - Core library for Jobtrail
//!
//! This crate contains the shared models, document store, collection sync
//! binding, and business logic used by all Jobtrail interfaces.

pub mod analytics;
pub mod error;
pub mod gamification;
pub mod models;
pub mod service;
pub mod store;
pub mod sync;
pub mod transfer;

pub use error::{Error, Result};
pub use models::{Payload, Record, RecordId};
pub use service::StoreService;
pub use sync::{BindingView, CollectionBinding};
