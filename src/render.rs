//! Per-dish rendering with a fallback chain.
//!
//! In [`RenderMode::Ai`] a dish is first generated and converted; if either
//! step fails the dish falls back to its template. [`RenderMode::Template`]
//! goes straight to the template. Either way [`Renderer::render_dish`]
//! returns non-empty text and never fails.

use std::path::{Path, PathBuf};

use crate::ascii::{describe_conversion_error, raster_to_ascii};
use crate::generator::{GeneratedRaster, GenerationError, RasterGenerator};
use crate::menu::Dish;
use crate::raster::{load_raster_from_path, ConversionError, Raster};
use crate::templates::TemplateRegistry;

/// Extension used when persisting in-memory rasters.
const PERSIST_EXTENSION: &str = "png";

/// How the caller wants a dish rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Generate an image and convert it, falling back to the template.
    Ai,
    /// Use the template directly.
    #[default]
    Template,
}

/// Where the art for a dish came from.
#[derive(Debug)]
pub enum RenderOutcome {
    /// Converted from a generated image.
    Generated { art: String, source: PathBuf },
    /// Template requested directly.
    Template,
    /// Generation failed; template used.
    GenerationFailed(GenerationError),
    /// Conversion failed; template used.
    ConversionFailed(ConversionError),
}

/// Renders dishes against a template registry and an optional generator.
pub struct Renderer<'a> {
    registry: &'a TemplateRegistry,
    generator: Option<&'a dyn RasterGenerator>,
}

impl<'a> Renderer<'a> {
    /// A renderer with no image backend; AI mode always falls back.
    pub fn new(registry: &'a TemplateRegistry) -> Self {
        Self {
            registry,
            generator: None,
        }
    }

    pub fn with_generator(mut self, generator: &'a dyn RasterGenerator) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn registry(&self) -> &TemplateRegistry {
        self.registry
    }

    /// Render a dish to text.
    ///
    /// Generated art is wrapped in a blank line on each side; template text
    /// is returned as stored. A conversion failure puts a line starting with
    /// [`crate::ascii::CONVERSION_ERROR_PREFIX`] above the template.
    pub fn render_dish(
        &self,
        dish: &Dish,
        mode: RenderMode,
        output_dir: &Path,
        width: u32,
        height: u32,
    ) -> String {
        let outcome = self.attempt(dish, mode, output_dir, width, height);
        self.finish(dish, outcome)
    }

    /// Run the generate/convert steps without turning failures into text.
    pub fn attempt(
        &self,
        dish: &Dish,
        mode: RenderMode,
        output_dir: &Path,
        width: u32,
        height: u32,
    ) -> RenderOutcome {
        if mode == RenderMode::Template {
            return RenderOutcome::Template;
        }

        let source = match self.generate(dish, output_dir) {
            Ok(source) => source,
            Err(e) => return RenderOutcome::GenerationFailed(e),
        };

        match convert(&source, width, height) {
            Ok(art) => RenderOutcome::Generated {
                art,
                source: source.path,
            },
            Err(e) => RenderOutcome::ConversionFailed(e),
        }
    }

    /// Turn an outcome into the text shown for the dish.
    pub fn finish(&self, dish: &Dish, outcome: RenderOutcome) -> String {
        let template = || self.registry.lookup(dish.template_key.as_deref());

        match outcome {
            RenderOutcome::Generated { art, .. } => format!("\n{}\n", art),
            RenderOutcome::Template => template().to_string(),
            RenderOutcome::GenerationFailed(e) => {
                log::warn!("Image generation for {} failed: {}", dish.name, e);
                template().to_string()
            }
            RenderOutcome::ConversionFailed(e) => {
                log::warn!("Image conversion for {} failed: {}", dish.name, e);
                format!("{}\n{}", describe_conversion_error(&e), template())
            }
        }
    }

    fn generate(&self, dish: &Dish, output_dir: &Path) -> Result<Source, GenerationError> {
        let generator = self.generator.ok_or(GenerationError::Unavailable)?;
        std::fs::create_dir_all(output_dir)?;

        match generator.generate_raster(dish, output_dir)? {
            GeneratedRaster::File(path) if !path.exists() => {
                log::warn!("Generator reported {} but nothing was written", path.display());
                Err(GenerationError::NoOutput)
            }
            GeneratedRaster::File(path) => Ok(Source {
                path,
                raster: None,
            }),
            GeneratedRaster::InMemory(raster) => {
                let path = output_dir.join(format!("{}.{}", dish.file_stem(), PERSIST_EXTENSION));
                if let Err(e) = raster.save(&path) {
                    log::warn!("Could not save image to {}: {}", path.display(), e);
                }
                Ok(Source {
                    path,
                    raster: Some(raster),
                })
            }
        }
    }
}

/// A generated image, possibly already decoded.
struct Source {
    path: PathBuf,
    raster: Option<Raster>,
}

fn convert(source: &Source, width: u32, height: u32) -> Result<String, ConversionError> {
    match &source.raster {
        Some(raster) => raster_to_ascii(raster, width, height),
        None => {
            let raster = load_raster_from_path(&source.path)?;
            raster_to_ascii(&raster, width, height)
        }
    }
}
