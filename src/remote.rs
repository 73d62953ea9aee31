//! Blocking HTTP clients for the catalog and classifier services.
//!
//! Both clients share one error type and the same retry policy. Each client
//! sits behind a small trait so the scanning pipeline can be exercised with
//! mock services in tests.

mod catalog;
mod classifier;
mod error;

pub use catalog::{CatalogClient, CatalogClientBuilder, CatalogLookup, CatalogRecord};
pub use classifier::{
    ClassificationRequest, ClassifierClient, ClassifierClientBuilder, ClassifierClientTrait,
};
pub use error::{RemoteError, retry_with_backoff};
