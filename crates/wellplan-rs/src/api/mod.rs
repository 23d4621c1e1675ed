//! External generation service seam: the service trait, its errors, and
//! backend selection.
//!
//! - [`service`]: [`GenerationService`] trait implemented by
//!   [`GeminiClient`](crate::GeminiClient) and by in-memory fakes in tests,
//!   plus the [`ServiceError`] taxonomy.
//! - [`router`]: [`BackendPriority`] and the total function
//!   [`choose_backend`] that picks the first available model without
//!   touching the network.

pub mod router;
pub mod service;

pub use router::{BackendEntry, BackendPriority, choose_backend, normalize_model_name};
pub use service::{GenerationService, ServiceError, ServiceFuture};
