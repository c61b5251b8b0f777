//! Image generation capability.
//!
//! The renderer only knows about [`RasterGenerator`]. A concrete backend
//! (such as [`crate::fal::FalGenerator`]) is injected by the caller; having
//! no backend at all is just another [`GenerationError`].

use std::path::{Path, PathBuf};

use crate::fal::FalError;
use crate::menu::Dish;
use crate::raster::Raster;

/// Output of a successful generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedRaster {
    /// Pixels held in memory; the renderer persists them.
    InMemory(Raster),
    /// An image file the backend already wrote.
    File(PathBuf),
}

/// Something that can produce a raster image for a dish.
///
/// Calls block until the image is ready or generation fails.
pub trait RasterGenerator {
    fn generate_raster(
        &self,
        dish: &Dish,
        output_dir: &Path,
    ) -> Result<GeneratedRaster, GenerationError>;
}

/// Why no raster was produced.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("no image generation backend available")]
    Unavailable,

    #[error("image backend failed: {0}")]
    Backend(#[from] FalError),

    #[error("image backend returned no output")]
    NoOutput,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

const PROMPT_STYLE: &str =
    "beautifully plated, restaurant quality, soft lighting, appetizing";

/// Build the text prompt sent to the image model for a dish.
///
/// An explicit, non-blank `image_prompt` is used as-is. Otherwise the prompt
/// describes a food photograph of the dish, using `"food"` when the dish has
/// no name.
pub fn build_prompt(dish: &Dish) -> String {
    if let Some(prompt) = dish.image_prompt.as_deref() {
        if !prompt.trim().is_empty() {
            return prompt.to_string();
        }
    }

    let name = if dish.name.trim().is_empty() {
        "food"
    } else {
        dish.name.as_str()
    };
    let description = dish.short.as_deref().unwrap_or("");

    format!(
        "high-resolution professional food photography of {}, {}, {}",
        name, description, PROMPT_STYLE
    )
}
