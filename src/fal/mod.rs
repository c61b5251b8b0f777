//! fal.ai image generation backend.
//!
//! Dish images are generated from text prompts through fal.ai's queue API,
//! downloaded into the output directory and handed to the renderer as files.

mod client;
mod generator;
mod retry;

pub use client::{
    validate_prompt, FalClient, FalError, GeneratedImage, GenerationParams, GenerationStatus,
    ImageSize, QueueResponse, DEFAULT_GENERATION_TIMEOUT, DEFAULT_MODEL, FAL_API_BASE_URL,
    FAL_API_KEY_ENV,
};
pub use generator::FalGenerator;
pub use retry::{calculate_backoff, RetryPolicy};
