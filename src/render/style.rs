use std::collections::{BTreeMap, HashMap};

use crate::graph::{CellCategory, EdgeStyle};
use crate::settings::{Settings, correct_color};

pub type Attributes = BTreeMap<String, String>;

pub const BACKGROUND: &str = "bgcolor";
pub const ALIGNMENT: &str = "align";
pub const TEXT: &str = "text";

/// Tables that are not cells of a value node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Surface {
    Frame,
    InfoFrame,
    InfoHeader,
    InfoKey,
    InfoValue,
}

impl Surface {
    const ALL: [Self; 5] = [
        Self::Frame,
        Self::InfoFrame,
        Self::InfoHeader,
        Self::InfoKey,
        Self::InfoValue,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Frame => "frame",
            Self::InfoFrame => "info.frame",
            Self::InfoHeader => "info.header",
            Self::InfoKey => "info.key",
            Self::InfoValue => "info.value",
        }
    }
}

fn attributes<const N: usize>(pairs: [(&str, &str); N]) -> Attributes {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Resolved presentation attributes: built-in defaults with the option file's
/// `properties`, `connectors` and `colors` applied on top.
#[derive(Clone, Debug)]
pub struct StyleSheet {
    cells: HashMap<CellCategory, Attributes>,
    surfaces: HashMap<Surface, Attributes>,
    connectors: HashMap<EdgeStyle, Attributes>,
    header_colors: HashMap<String, String>,
}

impl Default for StyleSheet {
    fn default() -> Self {
        let cells = CellCategory::ALL
            .into_iter()
            .map(|category| (category, default_cell(category)))
            .collect();
        let surfaces = Surface::ALL
            .into_iter()
            .map(|surface| (surface, default_surface(surface)))
            .collect();
        let connectors = EdgeStyle::ALL
            .into_iter()
            .map(|style| (style, default_connector(style)))
            .collect();

        Self {
            cells,
            surfaces,
            connectors,
            header_colors: HashMap::new(),
        }
    }
}

fn default_cell(category: CellCategory) -> Attributes {
    match category {
        CellCategory::Header => attributes([(BACKGROUND, "cornsilk"), (ALIGNMENT, "right")]),
        CellCategory::Footer => attributes([(BACKGROUND, "#cecece"), (ALIGNMENT, "left")]),
        CellCategory::Key | CellCategory::Default => {
            attributes([(BACKGROUND, "#a6cee3"), (ALIGNMENT, "right")])
        }
        CellCategory::Value => attributes([(BACKGROUND, "#e3a6ce"), (ALIGNMENT, "left")]),
        CellCategory::Blank => attributes([(BACKGROUND, "#ffffff"), (ALIGNMENT, "right")]),
        CellCategory::Info => attributes([(BACKGROUND, "#cccccc"), (ALIGNMENT, "left")]),
        CellCategory::Type => attributes([(BACKGROUND, "bisque"), (ALIGNMENT, "right")]),
        CellCategory::ExternalResolver => {
            attributes([(BACKGROUND, "burlywood"), (ALIGNMENT, "left")])
        }
        CellCategory::StringResolver => {
            attributes([(BACKGROUND, "darkseagreen"), (ALIGNMENT, "left")])
        }
    }
}

fn default_surface(surface: Surface) -> Attributes {
    match surface {
        Surface::Frame => attributes([
            (BACKGROUND, "#fffaf0"),
            (ALIGNMENT, "left"),
            ("border", "1"),
            ("cellborder", "0"),
            ("cellspacing", "0"),
        ]),
        Surface::InfoFrame => attributes([
            (BACKGROUND, "transparent"),
            ("border", "0"),
            ("cellborder", "0"),
            ("cellspacing", "0"),
            ("fontsize", "7"),
        ]),
        Surface::InfoHeader => attributes([(BACKGROUND, "gray100"), (ALIGNMENT, "left")]),
        Surface::InfoKey => attributes([(BACKGROUND, "ghostwhite"), (ALIGNMENT, "right")]),
        Surface::InfoValue => attributes([(BACKGROUND, "floralwhite"), (ALIGNMENT, "left")]),
    }
}

fn default_connector(style: EdgeStyle) -> Attributes {
    match style {
        EdgeStyle::Default => attributes([("color", "black"), ("port", "w")]),
        EdgeStyle::Pointer => attributes([("color", "red"), ("port", "w")]),
        EdgeStyle::Aggregate => attributes([("color", "blue")]),
        EdgeStyle::Nested => attributes([
            ("color", "green"),
            ("port", "w"),
            ("weight", "3"),
            ("penwidth", "3"),
        ]),
    }
}

/// Accepts compass spellings for an edge's landing side; `None` rejects the value.
fn normalize_port(raw: &str) -> Option<&'static str> {
    match raw.to_ascii_lowercase().as_str() {
        "w" | "west" | "left" => Some("w"),
        "n" | "north" | "up" => Some("n"),
        "e" | "east" | "right" => Some("e"),
        "" => Some(""),
        _ => None,
    }
}

impl StyleSheet {
    pub fn from_settings(settings: &Settings) -> Self {
        let mut sheet = Self::default();

        for (label, overrides) in &settings.properties {
            let label = label.to_ascii_lowercase();
            let target = match CellCategory::from_label(&label) {
                Some(category) => sheet.cells.get_mut(&category),
                None => Surface::ALL
                    .into_iter()
                    .find(|surface| surface.label() == label)
                    .and_then(|surface| sheet.surfaces.get_mut(&surface)),
            };
            let Some(target) = target else {
                tracing::warn!(label, "unknown cell category in properties");
                continue;
            };

            for (attribute, value) in overrides {
                target.insert(attribute.clone(), correct_color(value));
            }
        }

        for (label, overrides) in &settings.connectors {
            let Some(style) = EdgeStyle::from_label(label) else {
                tracing::warn!(label, "unknown connector style");
                continue;
            };
            let target = sheet.connectors.entry(style).or_default();

            for (attribute, value) in overrides {
                if attribute == "port" {
                    let Some(port) = normalize_port(value) else {
                        tracing::warn!(value = value.as_str(), "ignoring unknown connector port");
                        continue;
                    };
                    target.insert(attribute.clone(), port.to_string());
                } else {
                    target.insert(attribute.clone(), value.clone());
                }
            }
        }

        sheet.header_colors = settings.colors.clone();
        sheet
    }

    pub fn cell(&self, category: CellCategory) -> &Attributes {
        &self.cells[&category]
    }

    pub fn surface(&self, surface: Surface) -> &Attributes {
        &self.surfaces[&surface]
    }

    pub fn connector(&self, style: EdgeStyle) -> &Attributes {
        &self.connectors[&style]
    }

    /// Header background for a node, honoring per-node colors keyed by tooltip or name.
    pub fn header_background(&self, tooltip: &str, name: &str) -> &str {
        [tooltip, name]
            .into_iter()
            .filter(|key| !key.is_empty())
            .find_map(|key| self.header_colors.get(key))
            .map(String::as_str)
            .unwrap_or_else(|| attribute(self.cell(CellCategory::Header), BACKGROUND))
    }
}

pub fn attribute<'a>(attributes: &'a Attributes, key: &str) -> &'a str {
    attributes.get(key).map(String::as_str).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_category() {
        let sheet = StyleSheet::default();
        for category in CellCategory::ALL {
            assert!(!attribute(sheet.cell(category), BACKGROUND).is_empty());
        }
        assert_eq!(attribute(sheet.connector(EdgeStyle::Pointer), "color"), "red");
        assert_eq!(attribute(sheet.surface(Surface::InfoFrame), "fontsize"), "7");
    }

    #[test]
    fn settings_override_defaults() {
        let settings = Settings::from_json_str(
            r#"{
                "properties": { "Key": { "bgcolor": "none", "text": "bold" }, "info.key": { "align": "left" } },
                "connectors": { "inner": { "color": "purple", "port": "north" }, "array": { "port": "sideways" } },
                "colors": { "struct: demo.Node": "gold" }
            }"#,
        )
        .expect("settings parse");
        let sheet = StyleSheet::from_settings(&settings);

        let key = sheet.cell(CellCategory::Key);
        assert_eq!(attribute(key, BACKGROUND), "transparent");
        assert_eq!(attribute(key, TEXT), "bold");
        assert_eq!(attribute(sheet.surface(Surface::InfoKey), ALIGNMENT), "left");

        let nested = sheet.connector(EdgeStyle::Nested);
        assert_eq!(attribute(nested, "color"), "purple");
        assert_eq!(attribute(nested, "port"), "n");
        assert_eq!(attribute(sheet.connector(EdgeStyle::Aggregate), "port"), "");

        assert_eq!(sheet.header_background("struct: demo.Node", "Node"), "gold");
        assert_eq!(sheet.header_background("[]", "[]int"), "cornsilk");
    }
}
