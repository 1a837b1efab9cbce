use chrono::Datelike;
use serde::Deserialize;

/// Output conventions of the externs target.
///
/// Every field has a default matching the Chrome extension API docs, so an
/// empty JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorConfig {
    /// Global object the namespaces hang off.
    pub root: String,
    /// Prefix of every `@see` link.
    pub doc_base_url: String,
    pub copyright_holder: String,
    /// Column at which descriptions are wrapped.
    pub comment_width: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            root: "chrome".to_string(),
            doc_base_url: "https://developer.chrome.com/extensions".to_string(),
            copyright_holder: "The Chromium Authors".to_string(),
            comment_width: 80,
        }
    }
}

impl GeneratorConfig {
    /// Reads a configuration from JSON; missing fields keep their defaults.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if the text is not a valid configuration object.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// The two inputs that are not derived from the schema: the copyright year
/// and the command line reported in the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub year: i32,
    pub command: String,
}

impl Provenance {
    pub fn new(year: i32, command: impl Into<String>) -> Self {
        Provenance {
            year,
            command: command.into(),
        }
    }

    /// The local calendar year and the running program's `argv[0]`.
    pub fn current() -> Self {
        let command = std::env::args().next().unwrap_or_default();
        Provenance::new(chrono::Local::now().year(), command)
    }

    /// The command as it appears in the header, with Windows separators normalized.
    pub fn display_command(&self) -> String {
        self.command.replace('\\', "/")
    }
}
