//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Print a menu with ASCII art for every dish
#[derive(Parser, Debug)]
#[command(name = "menu-ascii")]
#[command(version, about = "Print a menu with ASCII art for every dish", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Menu file (YAML)
    #[arg(short, long, default_value = "menu/dishes.yaml")]
    pub menu: PathBuf,

    /// Free-form menu description printed before the dishes
    #[arg(long, default_value = "menu/menu.md")]
    pub menu_md: PathBuf,

    /// Generate AI images and convert them to ASCII art
    #[arg(long)]
    pub with_ai_images: bool,

    /// Use templates only, even if the config enables AI images
    #[arg(long, conflicts_with = "with_ai_images")]
    pub no_ai_images: bool,

    /// Width of generated ASCII art
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub ascii_width: Option<u32>,

    /// Height of generated ASCII art
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub ascii_height: Option<u32>,

    /// Directory for generated images
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Print the template for one category key
    Dish {
        /// Template key, e.g. KEBAB
        key: String,
    },
    /// Convert an image file to ASCII art
    Convert {
        image: PathBuf,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        width: Option<u32>,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        height: Option<u32>,
    },
    /// List template keys
    Templates,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["menu-ascii"]);
        assert!(args.command.is_none());
        assert_eq!(args.menu, PathBuf::from("menu/dishes.yaml"));
        assert_eq!(args.menu_md, PathBuf::from("menu/menu.md"));
        assert!(!args.with_ai_images);
        assert!(!args.no_ai_images);
        assert!(args.ascii_width.is_none());
        assert!(args.ascii_height.is_none());
        assert!(args.output_dir.is_none());
        assert!(args.config.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn test_args_ai_flags() {
        let args = Args::parse_from([
            "menu-ascii",
            "--with-ai-images",
            "--ascii-width",
            "80",
            "--ascii-height",
            "40",
            "--output-dir",
            "out",
        ]);
        assert!(args.with_ai_images);
        assert_eq!(args.ascii_width, Some(80));
        assert_eq!(args.ascii_height, Some(40));
        assert_eq!(args.output_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn test_args_reject_zero_width() {
        assert!(Args::try_parse_from(["menu-ascii", "--ascii-width", "0"]).is_err());
        assert!(Args::try_parse_from(["menu-ascii", "--ascii-height", "-3"]).is_err());
    }

    #[test]
    fn test_ai_flags_conflict() {
        let args = Args::parse_from(["menu-ascii", "--no-ai-images"]);
        assert!(args.no_ai_images);
        assert!(Args::try_parse_from(["menu-ascii", "--with-ai-images", "--no-ai-images"]).is_err());
    }

    #[test]
    fn test_dish_subcommand() {
        let args = Args::parse_from(["menu-ascii", "dish", "kebab"]);
        assert_eq!(
            args.command,
            Some(Command::Dish {
                key: "kebab".to_string()
            })
        );
    }

    #[test]
    fn test_convert_subcommand() {
        let args = Args::parse_from(["menu-ascii", "convert", "photo.png", "--width", "20"]);
        assert_eq!(
            args.command,
            Some(Command::Convert {
                image: PathBuf::from("photo.png"),
                width: Some(20),
                height: None,
            })
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::parse_from(["menu-ascii", "templates", "-v", "--config", "c.toml"]);
        assert_eq!(args.command, Some(Command::Templates));
        assert!(args.verbose);
        assert_eq!(args.config, Some(PathBuf::from("c.toml")));
    }
}
