//! Menu data: dishes grouped into sections, loaded from YAML.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// A single dish on the menu.
///
/// Only `name` is required. Optional fields stay `None` when absent from the
/// source file, which keeps "missing" apart from "empty string".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Dish {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub short: Option<String>,
    #[serde(default)]
    pub image_prompt: Option<String>,
    /// Category key into the template registry.
    #[serde(default, rename = "ascii_template", alias = "template_key")]
    pub template_key: Option<String>,
}

impl Dish {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_short(mut self, short: impl Into<String>) -> Self {
        self.short = Some(short.into());
        self
    }

    pub fn with_image_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.image_prompt = Some(prompt.into());
        self
    }

    pub fn with_template_key(mut self, key: impl Into<String>) -> Self {
        self.template_key = Some(key.into());
        self
    }

    /// File name stem for artifacts generated for this dish.
    ///
    /// Lowercased, with spaces and slashes replaced by underscores. Two
    /// dishes whose names normalize the same share a stem.
    pub fn file_stem(&self) -> String {
        self.name.to_lowercase().replace([' ', '/'], "_")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub items: Vec<Dish>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Menu {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl Menu {
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// All dishes in section order.
    pub fn dishes(&self) -> impl Iterator<Item = &Dish> {
        self.sections.iter().flat_map(|s| s.items.iter())
    }
}

/// Load a menu from a YAML file.
pub fn load_menu(path: &Path) -> Result<Menu, MenuError> {
    let content = std::fs::read_to_string(path).map_err(|e| MenuError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Menu::from_yaml_str(&content).map_err(|e| MenuError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Errors that can occur when loading a menu file.
#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    #[error("Failed to read menu file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse menu file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
title: Dinner
subtitle: Friday
notes:
  - Vegetarian options available
sections:
  - title: Mezze
    items:
      - name: Hummus Bowl
        short: tahini, olive oil
        ascii_template: hummus
      - name: Mtabbal
        image_prompt: smoky eggplant dip
  - title: Grill
    subtitle: from the fire
    items:
      - name: Mixed Kebab
        template_key: KEBAB
"#;

    #[test]
    fn test_parse_menu() {
        let menu = Menu::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(menu.title, "Dinner");
        assert_eq!(menu.subtitle.as_deref(), Some("Friday"));
        assert_eq!(menu.notes.len(), 1);
        assert_eq!(menu.sections.len(), 2);
        assert_eq!(menu.dishes().count(), 3);

        let hummus = &menu.sections[0].items[0];
        assert_eq!(hummus.template_key.as_deref(), Some("hummus"));
        assert_eq!(hummus.short.as_deref(), Some("tahini, olive oil"));
        assert!(hummus.image_prompt.is_none());
    }

    #[test]
    fn test_template_key_alias() {
        let menu = Menu::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(
            menu.sections[1].items[0].template_key.as_deref(),
            Some("KEBAB")
        );
    }

    #[test]
    fn test_empty_document_fields_default() {
        let menu = Menu::from_yaml_str("title: Empty\n").unwrap();
        assert!(menu.sections.is_empty());
        assert!(menu.notes.is_empty());
        assert!(menu.subtitle.is_none());
    }

    #[test]
    fn test_empty_string_is_kept_apart_from_missing() {
        let dish: Dish = serde_yaml::from_str("name: Soup\nshort: \"\"\n").unwrap();
        assert_eq!(dish.short.as_deref(), Some(""));
        assert!(dish.image_prompt.is_none());
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(Dish::new("Hummus Bowl").file_stem(), "hummus_bowl");
        assert_eq!(Dish::new("Salt/Pepper Wings").file_stem(), "salt_pepper_wings");
    }

    #[test]
    fn test_load_menu_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = load_menu(&dir.path().join("dishes.yaml"));
        assert!(matches!(result, Err(MenuError::Io { .. })));
    }

    #[test]
    fn test_load_menu_invalid_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dishes.yaml");
        std::fs::write(&path, "sections: [\n").unwrap();
        assert!(matches!(load_menu(&path), Err(MenuError::Parse { .. })));
    }
}
