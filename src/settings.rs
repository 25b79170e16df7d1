use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

pub const OPTIONS_FILE_NAME: &str = "memgraph.options";

/// What to do with a field or entry matched by a `discard` rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiscardRule {
    Keep,
    /// Leave the field out entirely.
    Drop,
    /// Keep the row but hide the value.
    Mask,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub max_string_length: usize,
    pub max_slice_length: usize,
    pub max_map_entries: usize,
    pub max_depth: usize,

    /// `"<struct|slice|map>:<declared type>.<field or key>"` to 0 (keep), 1 (drop)
    /// or 2 (mask).
    pub discard: HashMap<String, i64>,
    /// Declared type name, then computed text, to replacement text.
    pub substitute: HashMap<String, HashMap<String, String>>,

    pub show_zero_fields: bool,
    pub show_nil_fields: bool,
    pub show_hex_for_large_ints: bool,
    pub show_type_for_numbers: bool,
    pub discard_nil_entries: bool,
    pub collapse_pointer_nodes: bool,
    pub collapse_single_slice_nodes: bool,

    #[serde(alias = "suppresHeader")]
    pub suppress_header: bool,
    #[serde(alias = "suppresInfo")]
    pub suppress_info: bool,
    pub color_background: String,
    pub color_default: String,
    pub font_name: String,
    pub font_size: String,
    /// Node tooltip or name to header background color. The options file may give
    /// the map inline or name one or more JSON files holding it.
    #[serde(deserialize_with = "colors_from_source")]
    pub colors: HashMap<String, String>,
    /// Cell category label to DOT attribute overrides; inline or from files, like
    /// `colors`.
    #[serde(deserialize_with = "properties_from_source")]
    pub properties: HashMap<String, HashMap<String, String>>,
    /// Edge style label to DOT attribute overrides.
    pub connectors: HashMap<String, HashMap<String, String>>,

    #[serde(skip)]
    pub loaded_from: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_string_length: 64,
            max_slice_length: 100,
            max_map_entries: 32,
            max_depth: 512,
            discard: HashMap::new(),
            substitute: HashMap::new(),
            show_zero_fields: true,
            show_nil_fields: true,
            show_hex_for_large_ints: true,
            show_type_for_numbers: true,
            discard_nil_entries: true,
            collapse_pointer_nodes: false,
            collapse_single_slice_nodes: false,
            suppress_header: false,
            suppress_info: false,
            color_background: "transparent".to_string(),
            color_default: "whitesmoke".to_string(),
            font_name: "Cascadia Code".to_string(),
            font_size: "10".to_string(),
            colors: HashMap::new(),
            properties: HashMap::new(),
            connectors: HashMap::new(),
            loaded_from: None,
        }
    }
}

impl Settings {
    /// Process-wide settings, loaded from the options file on first use.
    pub fn global() -> &'static Settings {
        static GLOBAL: OnceLock<Settings> = OnceLock::new();
        GLOBAL.get_or_init(Settings::discover)
    }

    /// Looks for the options file in the working directory, then in the home
    /// directory. A missing file is silent; a malformed one is reported and ignored.
    pub fn discover() -> Settings {
        let mut candidates = vec![PathBuf::from(".").join(OPTIONS_FILE_NAME)];
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(OPTIONS_FILE_NAME));
        }

        for path in candidates {
            match Settings::load_from(&path) {
                Ok(settings) => {
                    tracing::debug!(path = %path.display(), "loaded settings");
                    return settings;
                }
                Err(err) if err.is_missing_file() => {
                    tracing::trace!(path = %path.display(), "no settings file");
                }
                Err(err) => tracing::warn!("{err}; using built-in defaults"),
            }
        }

        Settings::default()
    }

    pub fn load_from(path: &Path) -> Result<Settings, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut settings = Self::parse(&raw, &path.display().to_string())?;
        settings.loaded_from = Some(path.to_path_buf());
        Ok(settings)
    }

    pub fn from_json_str(raw: &str) -> Result<Settings, ConfigError> {
        Self::parse(raw, "inline")
    }

    fn parse(raw: &str, origin: &str) -> Result<Settings, ConfigError> {
        let mut settings: Settings =
            serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
                origin: origin.to_string(),
                source,
            })?;
        settings.color_background = correct_color(&settings.color_background);
        settings.color_default = correct_color(&settings.color_default);
        for color in settings.colors.values_mut() {
            *color = correct_color(color);
        }
        Ok(settings)
    }

    pub fn collapse_enabled(&self) -> bool {
        self.collapse_pointer_nodes || self.collapse_single_slice_nodes
    }

    pub fn discard_rule(
        &self,
        kind: &str,
        collection: &str,
        field: &str,
    ) -> Result<DiscardRule, ConfigError> {
        if self.discard.is_empty() {
            return Ok(DiscardRule::Keep);
        }

        let collection = collection.trim_matches(|ch: char| matches!(ch, ' ' | '"' | '\\'));
        let field = field.trim_matches('"');
        let key = format!("{kind}:{collection}.{field}");

        match self.discard.get(&key) {
            None | Some(0) => Ok(DiscardRule::Keep),
            Some(1) => Ok(DiscardRule::Drop),
            Some(2) => Ok(DiscardRule::Mask),
            Some(&value) => Err(ConfigError::UnknownDiscardRule { key, value }),
        }
    }

    pub fn substitution(&self, declared_type: &str, text: &str) -> Option<&str> {
        self.substitute
            .get(declared_type)?
            .get(text)
            .map(String::as_str)
    }
}

pub fn correct_color(original: &str) -> String {
    match original {
        "none" | "clear" | "empty" | "" => "transparent".to_string(),
        _ => original.to_string(),
    }
}

/// A style section: the map itself, or the JSON file(s) to merge it from.
#[derive(Deserialize)]
#[serde(untagged)]
enum Source<T> {
    Inline(T),
    File(String),
    Files(Vec<String>),
    Unrecognized(serde_json::Value),
}

impl<V: DeserializeOwned> Source<HashMap<String, V>> {
    /// Unreadable or malformed files are reported and skipped; later files win.
    fn load(self, section: &str) -> HashMap<String, V> {
        let files = match self {
            Source::Inline(map) => return map,
            Source::File(file) => vec![file],
            Source::Files(files) => files,
            Source::Unrecognized(serde_json::Value::Null) => return HashMap::new(),
            Source::Unrecognized(value) => {
                tracing::warn!(section, %value, "unrecognized format of settings section");
                return HashMap::new();
            }
        };

        let mut merged = HashMap::new();
        for file in files {
            tracing::trace!(section, file = %file, "loading settings section file");
            match load_section_file(Path::new(&file)) {
                Ok(entries) => merged.extend(entries),
                Err(err) => tracing::warn!(section, "{err}"),
            }
        }
        merged
    }
}

fn load_section_file<V>(path: &Path) -> Result<HashMap<String, V>, ConfigError>
where
    V: DeserializeOwned,
{
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        origin: path.display().to_string(),
        source,
    })
}

fn colors_from_source<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Source::<HashMap<String, String>>::deserialize(deserializer)?.load("colors"))
}

fn properties_from_source<'de, D>(
    deserializer: D,
) -> Result<HashMap<String, HashMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Source::<HashMap<String, HashMap<String, String>>>::deserialize(deserializer)?
        .load("properties"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{ "maxSliceLength": 3, "showNilFields": false, "colorBackground": "none",
                 "suppresHeader": true }}"#
        )
        .expect("write settings");

        let settings = Settings::load_from(file.path()).expect("settings load");
        assert_eq!(settings.max_slice_length, 3);
        assert!(!settings.show_nil_fields);
        assert!(settings.suppress_header);
        assert_eq!(settings.color_background, "transparent");
        assert_eq!(settings.max_map_entries, 32);
        assert_eq!(settings.loaded_from.as_deref(), Some(file.path()));
    }

    #[test]
    fn missing_and_malformed_files_are_distinguished() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = Settings::load_from(&dir.path().join(OPTIONS_FILE_NAME))
            .expect_err("missing file");
        assert!(missing.is_missing_file());

        let broken = dir.path().join("broken.options");
        fs::write(&broken, "{ not json").expect("write broken file");
        let malformed = Settings::load_from(&broken).expect_err("malformed file");
        assert!(!malformed.is_missing_file());
        assert!(matches!(malformed, ConfigError::Parse { .. }));
    }

    #[test]
    fn discard_rules_match_qualified_keys() {
        let settings = Settings::from_json_str(
            r#"{ "discard": { "struct:demo.User.Password": 2, "map:map[string]int.debug": 1,
                              "struct:demo.User.Odd": 7 } }"#,
        )
        .expect("settings parse");

        assert_eq!(
            settings.discard_rule("struct", "demo.User", "Password").ok(),
            Some(DiscardRule::Mask)
        );
        assert_eq!(
            settings.discard_rule("map", "map[string]int", "\"debug\"").ok(),
            Some(DiscardRule::Drop)
        );
        assert_eq!(
            settings.discard_rule("struct", "demo.User", "Name").ok(),
            Some(DiscardRule::Keep)
        );
        assert!(matches!(
            settings.discard_rule("struct", "demo.User", "Odd"),
            Err(ConfigError::UnknownDiscardRule { value: 7, .. })
        ));
    }

    #[test]
    fn substitutions_are_keyed_by_type_then_text() {
        let settings =
            Settings::from_json_str(r#"{ "substitute": { "int": { "7": "SEVEN" } } }"#)
                .expect("settings parse");
        assert_eq!(settings.substitution("int", "7"), Some("SEVEN"));
        assert_eq!(settings.substitution("int", "8"), None);
        assert_eq!(settings.substitution("uint", "7"), None);
    }

    #[test]
    fn style_sections_merge_from_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        let base = dir.path().join("base.colors");
        let extra = dir.path().join("extra.colors");
        let props = dir.path().join("cells.props");
        fs::write(&base, r#"{ "Node": "none", "Leaf": "gold" }"#).expect("write colors");
        fs::write(&extra, r#"{ "Leaf": "khaki" }"#).expect("write colors");
        fs::write(&props, r#"{ "value": { "color": "blue" } }"#).expect("write props");

        let raw = serde_json::json!({
            "maxSliceLength": 3,
            "colors": [base, extra],
            "properties": props,
        });
        let settings = Settings::from_json_str(&raw.to_string()).expect("settings parse");

        assert_eq!(settings.max_slice_length, 3);
        assert_eq!(settings.colors.get("Node").map(String::as_str), Some("transparent"));
        assert_eq!(settings.colors.get("Leaf").map(String::as_str), Some("khaki"));
        assert_eq!(settings.properties["value"]["color"], "blue");
    }

    #[test]
    fn bad_style_files_keep_the_rest_of_the_settings() {
        let dir = tempfile::tempdir().expect("temp dir");
        let broken = dir.path().join("broken.colors");
        fs::write(&broken, "{ not json").expect("write colors");

        let raw = serde_json::json!({
            "maxSliceLength": 3,
            "colors": broken,
            "properties": dir.path().join("missing.props"),
            "connectors": {},
        });
        let settings = Settings::from_json_str(&raw.to_string()).expect("settings parse");

        assert_eq!(settings.max_slice_length, 3);
        assert!(settings.colors.is_empty());
        assert!(settings.properties.is_empty());

        let odd = Settings::from_json_str(r#"{ "colors": 7, "showNilFields": false }"#)
            .expect("settings parse");
        assert!(odd.colors.is_empty());
        assert!(!odd.show_nil_fields);
    }

    #[test]
    fn global_settings_load_once() {
        let first = Settings::global();
        let second = Settings::global();
        assert!(std::ptr::eq(first, second));
    }
}
