//! menu-ascii: ASCII art for menu dishes.
//!
//! Each dish is drawn either from a generated image, converted to characters
//! by [`ascii`], or from a hand-authored block in [`templates`]. The
//! [`render`] module decides which, and always produces text.

pub mod ascii;
pub mod cli;
pub mod config;
pub mod fal;
pub mod generator;
pub mod menu;
pub mod printer;
pub mod raster;
pub mod render;
pub mod templates;

pub use generator::{GeneratedRaster, GenerationError, RasterGenerator};
pub use menu::Dish;
pub use raster::{load_raster_from_path, ConversionError, Raster};
pub use render::{RenderMode, RenderOutcome, Renderer};
pub use templates::TemplateRegistry;
