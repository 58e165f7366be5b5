//! Repurpose long-form content into platform-tailored social posts.
//!
//! A request (JSON or multipart with attachments) is normalized, sent to a
//! chat-completion provider through a model cascade, validated per
//! platform, and completed with deterministic templates for anything the
//! provider could not deliver.

pub mod builder;
pub mod config;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod providers;
pub mod request;

pub use builder::RepurposeBuilder;
pub use config::{load_config, ChopConfig, ExtractionConfig, ProviderConfig};
pub use error::ChopError;
pub use extract::{Attachment, AttachmentKind, TextExtractor};
pub use fallback::fallback_generate;
pub use model::{
    parse_platforms, ErrorBody, GenerateRequest, GenerateResponse, GenerateResult, Platform,
};
pub use normalize::normalize_results;
pub use pipeline::{fill_gaps, ApiResponse, Repurposer, ResponseBody};
pub use providers::{GenerationClient, LlmProvider, ProviderFactory};
pub use request::{normalize_request, InboundRequest};
