//! [`RasterGenerator`] backed by fal.ai.

use std::path::Path;

use super::client::{FalClient, FalError};
use crate::generator::{build_prompt, GeneratedRaster, GenerationError, RasterGenerator};
use crate::menu::Dish;

/// Generates dish images through fal.ai, blocking on the async client.
pub struct FalGenerator {
    client: FalClient,
    runtime: tokio::runtime::Runtime,
}

impl FalGenerator {
    pub fn new(client: FalClient) -> Result<Self, FalError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self { client, runtime })
    }

    pub fn client(&self) -> &FalClient {
        &self.client
    }
}

impl RasterGenerator for FalGenerator {
    fn generate_raster(
        &self,
        dish: &Dish,
        output_dir: &Path,
    ) -> Result<GeneratedRaster, GenerationError> {
        let prompt = build_prompt(dish);
        log::info!("Generating image for {}", dish.name);

        let result = self.runtime.block_on(self.client.generate_and_download(
            &prompt,
            output_dir,
            &dish.file_stem(),
        ));

        match result {
            Ok(path) => Ok(GeneratedRaster::File(path)),
            Err(FalError::NoImages) => Err(GenerationError::NoOutput),
            Err(e) => Err(e.into()),
        }
    }
}
