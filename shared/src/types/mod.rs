//! Type definitions module
//!
//! - `pagination` - Filters and metadata for list endpoints
//! - `response` - JSON envelopes shared by every endpoint

pub mod pagination;
pub mod response;

pub use pagination::{Filters, PageMetadata, SortDirection};
pub use response::{DataEnvelope, ErrorEnvelope, HealthResponse, ResultEnvelope};
