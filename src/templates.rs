//! Hand-authored ASCII templates keyed by dish category.
//!
//! The registry is built once and only ever read. The built-in catalog lives
//! for the whole process behind [`TemplateRegistry::builtin`]; a replacement
//! catalog can be parsed from TOML at start-up with [`TemplateRegistry::load`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Deserialize;

/// Block returned for a missing or unknown template key.
pub const FALLBACK: &str = r"
  [no template]
  This item has no dedicated ASCII template.
  Add one to the template catalog using the key listed in the menu file.
";

const HUMMUS: &str = r"
        .-~~~~~~~~~~~~~~~~~~~~~~~~-.
      .'   _   _   _   _   _   _    '.
     /    (_) (_) (_) (_) (_) (_)      \
    |   .--------------------------.    |
    |   |      HUMMUS  BOWL        |    |
    |   |  ~~ tahini  ~~  olive ~~ |    |
    |   |  .. beef ..  pine  ...   |    |
    |   '--------------------------'    |
     \        (pomegranate *)           /
      '.     _   _   _   _   _        .'
        '-~~~~~~~~~~~~~~~~~~~~~~~~~~-'
";

const EGGPLANT: &str = r#"
             ___
         .-"`   `"-.
        /  .-'''-.  \
       /  /        \  \
      |  |  MTABBAL | |
      |  |  ~~~~~~~ | |
      |  | tahini   | |
       \  \  cumin /  /
        \  '.___.'  /
         '-._____.-'
"#;

const BREAD: &str = r"
      _______________________________
     /                               \
    |     MANAKISH — ZA'ATAR         |
    |  [====  flatbread  ====]       |
    |   blistered • chewy • warm     |
     \_______________________________/
";

const KEBAB: &str = r"
    grill >>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>
     |\  |\  |\  |\  |\  |\  |\  |\  |\
     ||\ ||\ ||\ ||\ ||\ ||\ ||\ ||\ ||\
     || \|| \|| \|| \|| \|| \|| \|| \|| \
     ||--(lamb)--(chicken)--(beef)--(kofta)--||
     ||  skewers • parallel • hot cluster    ||
     ||______________________________________||
";

const MEZZE: &str = r"
     .--------------------------------------.
     |   SURPRISE  MEZZE  (streaming)       |
     |  small bowls • dips • pickles • fun  |
     |  checkpoints to avoid skew & hunger  |
     '--------------------------------------'
";

const SHARE: &str = r"
     ________   ________   ________
    /  ____  \ /  ____  \ /  ____  \
   |  |____|  |  herbs  | |  olive |  -> replicated across nodes
    \________/  ________/  \___oil_/
";

/// Normalize a template key: surrounding whitespace removed, uppercased.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_uppercase()
}

/// Immutable catalog of ASCII templates.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: HashMap<String, String>,
    fallback: String,
}

/// On-disk catalog layout.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    fallback: Option<String>,
    #[serde(default)]
    templates: HashMap<String, String>,
}

impl TemplateRegistry {
    /// The built-in catalog, initialized on first use.
    pub fn builtin() -> &'static TemplateRegistry {
        static BUILTIN: OnceLock<TemplateRegistry> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let templates = [
                ("HUMMUS", HUMMUS),
                ("EGGPLANT", EGGPLANT),
                ("BREAD", BREAD),
                ("KEBAB", KEBAB),
                ("MEZZE", MEZZE),
                ("SHARE", SHARE),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

            TemplateRegistry {
                templates,
                fallback: FALLBACK.to_string(),
            }
        })
    }

    /// Parse a catalog from TOML.
    ///
    /// ```toml
    /// fallback = "..."   # optional, defaults to FALLBACK
    ///
    /// [templates]
    /// KEBAB = """..."""
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, TemplateError> {
        let file: CatalogFile = toml::from_str(content)?;

        let fallback = file.fallback.unwrap_or_else(|| FALLBACK.to_string());
        if fallback.trim().is_empty() {
            return Err(TemplateError::EmptyFallback);
        }

        let mut templates = HashMap::with_capacity(file.templates.len());
        for (raw_key, block) in file.templates {
            let key = normalize_key(&raw_key);
            if key.is_empty() {
                return Err(TemplateError::EmptyKey);
            }
            if block.trim().is_empty() {
                return Err(TemplateError::EmptyTemplate { key });
            }
            if templates.insert(key.clone(), block).is_some() {
                return Err(TemplateError::DuplicateKey { key });
            }
        }

        Ok(Self {
            templates,
            fallback,
        })
    }

    /// Read and parse a catalog file.
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let content = std::fs::read_to_string(path).map_err(|e| TemplateError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&content)
    }

    /// Look up the block for `key`, falling back to the generic block.
    ///
    /// Never returns an empty string.
    pub fn lookup(&self, key: Option<&str>) -> &str {
        let key = key.map(normalize_key).unwrap_or_default();
        if key.is_empty() {
            return &self.fallback;
        }
        self.templates
            .get(&key)
            .map(String::as_str)
            .unwrap_or(self.fallback.as_str())
    }

    /// Exact lookup without falling back.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.templates.get(&normalize_key(key)).map(String::as_str)
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Registered keys in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Errors from loading a template catalog.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Failed to read template catalog '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse template catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Template catalog contains an empty key")]
    EmptyKey,

    #[error("Template '{key}' is empty")]
    EmptyTemplate { key: String },

    #[error("Template '{key}' is defined more than once")]
    DuplicateKey { key: String },

    #[error("Fallback template is empty")]
    EmptyFallback,
}
