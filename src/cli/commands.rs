//! Subcommand handlers.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::args::{Args, Command};
use crate::ascii::image_to_ascii;
use crate::config::{Config, ConfigError};
use crate::fal::{FalClient, FalError, FalGenerator, DEFAULT_MODEL, FAL_API_BASE_URL};
use crate::menu::{load_menu, MenuError};
use crate::printer::{load_description, print_menu};
use crate::render::{RenderMode, Renderer};
use crate::templates::{TemplateError, TemplateRegistry};

/// Effective settings after merging CLI flags over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub mode: RenderMode,
    pub width: u32,
    pub height: u32,
    pub output_dir: PathBuf,
}

impl Settings {
    pub fn resolve(args: &Args, config: &Config) -> Self {
        let ai = !args.no_ai_images && (args.with_ai_images || config.render.ai_images);
        Self {
            mode: if ai { RenderMode::Ai } else { RenderMode::Template },
            width: args.ascii_width.unwrap_or(config.render.width),
            height: args.ascii_height.unwrap_or(config.render.height),
            output_dir: args
                .output_dir
                .clone()
                .unwrap_or_else(|| config.render.output_dir.clone()),
        }
    }
}

/// Errors that end the program.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Menu(#[from] MenuError),

    #[error(transparent)]
    Templates(#[from] TemplateError),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Run the command selected by `args`, writing to stdout.
pub fn run(args: Args) -> Result<(), CliError> {
    let config = Config::load(args.config.as_deref())?;

    let custom_registry = match &config.templates.catalog {
        Some(path) => Some(TemplateRegistry::load(path)?),
        None => None,
    };
    let registry = custom_registry
        .as_ref()
        .unwrap_or_else(|| TemplateRegistry::builtin());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let settings = Settings::resolve(&args, &config);

    match &args.command {
        Some(Command::Dish { key }) => print_template(&mut out, registry, key)?,
        Some(Command::Templates) => list_templates(&mut out, registry)?,
        Some(Command::Convert {
            image,
            width,
            height,
        }) => {
            let width = width.unwrap_or(settings.width);
            let height = height.unwrap_or(settings.height);
            writeln!(out, "{}", image_to_ascii(image, width, height))?;
        }
        None => {
            let generator = match settings.mode {
                RenderMode::Ai => build_generator(&config),
                RenderMode::Template => None,
            };
            let mut renderer = Renderer::new(registry);
            if let Some(generator) = &generator {
                renderer = renderer.with_generator(generator);
            }
            print_full_menu(&mut out, &args.menu, &args.menu_md, &renderer, &settings)?;
        }
    }

    out.flush()?;
    Ok(())
}

/// Print the description, then every section and dish with its art.
pub fn print_full_menu<W: Write>(
    out: &mut W,
    menu_path: &Path,
    description_path: &Path,
    renderer: &Renderer<'_>,
    settings: &Settings,
) -> Result<(), CliError> {
    let menu = load_menu(menu_path)?;

    writeln!(out, "{}", load_description(description_path))?;
    writeln!(out)?;

    print_menu(out, &menu, |dish| {
        Some(renderer.render_dish(
            dish,
            settings.mode,
            &settings.output_dir,
            settings.width,
            settings.height,
        ))
    })?;

    if settings.mode == RenderMode::Ai {
        writeln!(out, "Images saved in {}", settings.output_dir.display())?;
    }
    Ok(())
}

pub fn print_template<W: Write>(out: &mut W, registry: &TemplateRegistry, key: &str) -> std::io::Result<()> {
    if registry.get(key).is_none() {
        log::info!("No template for '{}', showing fallback", key.trim());
    }
    writeln!(out, "{}", registry.lookup(Some(key)))
}

pub fn list_templates<W: Write>(out: &mut W, registry: &TemplateRegistry) -> std::io::Result<()> {
    for key in registry.keys() {
        writeln!(out, "{}", key)?;
    }
    Ok(())
}

/// Build the fal.ai generator, or `None` if it cannot be set up.
///
/// A missing backend is not fatal: every dish then falls back to its
/// template.
fn build_generator(config: &Config) -> Option<FalGenerator> {
    match fal_generator(config) {
        Ok(generator) => Some(generator),
        Err(e) => {
            log::warn!("AI images unavailable ({}); using templates", e);
            None
        }
    }
}

fn fal_generator(config: &Config) -> Result<FalGenerator, FalError> {
    let api_key = std::env::var(crate::fal::FAL_API_KEY_ENV).map_err(|_| FalError::MissingApiKey)?;
    let base_url = config
        .fal
        .base_url
        .clone()
        .unwrap_or_else(|| FAL_API_BASE_URL.to_string());
    let model = config
        .fal
        .model
        .clone()
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let mut client = FalClient::with_settings(api_key, base_url, model)?;
    if let Some(secs) = config.fal.timeout_secs {
        client = client.generation_timeout(Duration::from_secs(secs));
    }
    FalGenerator::new(client)
}
