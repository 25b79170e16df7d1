use std::io::{self, Write};

use super::info::ProcessInfo;
use super::style::{ALIGNMENT, Attributes, BACKGROUND, StyleSheet, Surface, TEXT, attribute};
use crate::graph::{Cell, CellCategory, Edge, Graph, Node, TITLE_PORT};
use crate::settings::Settings;

const GRAPH_NAME: &str = "memgraph";
const INFO_NODE: &str = "Info";

/// Writes graphs as Graphviz DOT with HTML-like table labels.
pub struct DotWriter<'a> {
    settings: &'a Settings,
    style: StyleSheet,
    info: Option<ProcessInfo>,
}

impl<'a> DotWriter<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            style: StyleSheet::from_settings(settings),
            info: None,
        }
    }

    /// Attaches the process table. Ignored when `suppressInfo` is set.
    pub fn with_info(mut self, info: ProcessInfo) -> Self {
        self.info = Some(info);
        self
    }

    pub fn write<W: Write>(&self, out: &mut W, graph: &Graph) -> io::Result<()> {
        if !self.settings.suppress_header {
            self.write_banner(out)?;
        }

        writeln!(out, "digraph \"{GRAPH_NAME}\" {{")?;
        writeln!(out, "\trankdir=LR;")?;
        if let Some(caption) = graph.caption.as_deref().filter(|caption| !caption.is_empty()) {
            let caption = escape_attribute(caption);
            writeln!(out, "\tlabel=\"{caption}\"")?;
            writeln!(out, "\ttooltip=\"{caption}\"")?;
        }
        writeln!(out, "\tbgcolor=\"{}\"", self.settings.color_background)?;

        writeln!(out)?;
        writeln!(out, "\tnode [")?;
        writeln!(out, "\t\tfontname=\"{}\"", self.settings.font_name)?;
        writeln!(out, "\t\tfontsize={}", self.settings.font_size)?;
        writeln!(out, "\t\tfillcolor={}", self.settings.color_default)?;
        writeln!(out, "\t\tstyle=\"filled\"")?;
        writeln!(out, "\t];")?;

        writeln!(out)?;
        writeln!(out, "\t/* ------ nodes ------ */")?;
        for node in &graph.nodes {
            self.write_node(out, node)?;
        }

        writeln!(out)?;
        writeln!(out, "\t/* ------ connections ------ */")?;
        for edge in &graph.edges {
            self.write_edge(out, edge)?;
        }

        if !self.settings.suppress_info
            && let Some(info) = self.info.as_ref().filter(|info| !info.is_empty())
        {
            writeln!(out)?;
            writeln!(out, "\t/* ------ info ------ */")?;
            self.write_info(out, info)?;
        }

        writeln!(out, "}}")
    }

    pub fn render(&self, graph: &Graph) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write(&mut buffer, graph);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    fn write_banner<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let config = self
            .settings
            .loaded_from
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "<built-in defaults>".to_string());

        writeln!(out, "/*\tgenerated by {} {}", GRAPH_NAME, env!("CARGO_PKG_VERSION"))?;
        writeln!(
            out,
            "\tbased on config file settings, some of the values/connections might be omitted"
        )?;
        writeln!(out, "\tconfig file used: {config} */")
    }

    fn write_node<W: Write>(&self, out: &mut W, node: &Node) -> io::Result<()> {
        write!(
            out,
            "\t{}\t[shape=plaintext tooltip=\"{}\" label=<",
            node.id,
            escape_attribute(&node.tooltip)
        )?;
        write_table_open(out, self.style.surface(Surface::Frame))?;

        let header = self.style.cell(CellCategory::Header);
        write!(
            out,
            "<TR><TD COLSPAN=\"{}\" PORT=\"{TITLE_PORT}\" BGCOLOR=\"{}\" ALIGN=\"{}\">{}</TD></TR>",
            node.colspan(),
            self.style.header_background(&node.tooltip, &node.name),
            attribute(header, ALIGNMENT),
            formatted(header, &htmlize(&node.name)),
        )?;

        for row in &node.rows {
            write!(out, "<TR>")?;
            for cell in &row.cells {
                self.write_cell(out, cell)?;
            }
            write!(out, "</TR>")?;
        }

        writeln!(out, "</TABLE>>];")
    }

    fn write_cell<W: Write>(&self, out: &mut W, cell: &Cell) -> io::Result<()> {
        write_td(
            out,
            self.style.cell(cell.category),
            &cell.text,
            cell.port.as_deref(),
        )
    }

    fn write_edge<W: Write>(&self, out: &mut W, edge: &Edge) -> io::Result<()> {
        let mut to_port = edge.to_port.clone();
        let mut styles = Vec::new();

        for (name, value) in self.style.connector(edge.style) {
            match name.as_str() {
                "port" if value.is_empty() => {}
                "port" => {
                    to_port.push(':');
                    to_port.push_str(value);
                }
                "color" => styles.push(format!("{name}=\"{value}\"")),
                _ => styles.push(format!("{name}={value}")),
            }
        }

        let tooltip = edge.tooltip.trim_matches(|ch: char| ch.is_whitespace() || ch == '"');
        if !tooltip.is_empty() {
            styles.push(format!("tooltip=\"{}\"", escape_attribute(tooltip)));
        }

        let style = if styles.is_empty() {
            String::new()
        } else {
            format!(" [{}]", styles.join(" "))
        };

        writeln!(
            out,
            "\t{}:{}:e\t-> {}:{to_port}{style};",
            edge.from, edge.from_port, edge.to
        )
    }

    fn write_info<W: Write>(&self, out: &mut W, info: &ProcessInfo) -> io::Result<()> {
        let frame = self.style.surface(Surface::InfoFrame);
        write!(
            out,
            "\t{INFO_NODE}\t[shape=plaintext fontsize=\"{}\" fillcolor=\"{}\" tooltip=\"\" label=<",
            attribute(frame, "fontsize"),
            attribute(frame, BACKGROUND),
        )?;
        write_table_open(out, frame)?;

        let header = self.style.surface(Surface::InfoHeader);
        write!(
            out,
            "<TR><TD COLSPAN=\"2\" PORT=\"{TITLE_PORT}\" BGCOLOR=\"{}\" ALIGN=\"{}\">{}</TD></TR>",
            attribute(header, BACKGROUND),
            attribute(header, ALIGNMENT),
            formatted(self.style.cell(CellCategory::Header), "Information"),
        )?;

        let key_style = self.style.surface(Surface::InfoKey);
        let value_style = self.style.surface(Surface::InfoValue);
        for (key, value) in info.sorted() {
            write!(out, "<TR>")?;
            write_td(out, key_style, key, None)?;
            write_td(out, value_style, value, None)?;
            write!(out, "</TR>")?;
        }

        writeln!(out, "</TABLE>>];")
    }
}

fn write_table_open<W: Write>(out: &mut W, table: &Attributes) -> io::Result<()> {
    write!(
        out,
        "<TABLE BORDER=\"{}\" CELLBORDER=\"{}\" CELLSPACING=\"{}\" BGCOLOR=\"{}\">",
        attribute(table, "border"),
        attribute(table, "cellborder"),
        attribute(table, "cellspacing"),
        attribute(table, BACKGROUND),
    )
}

fn write_td<W: Write>(
    out: &mut W,
    props: &Attributes,
    text: &str,
    port: Option<&str>,
) -> io::Result<()> {
    let port = port
        .filter(|port| !port.is_empty())
        .map(|port| format!("PORT=\"{port}\" "))
        .unwrap_or_default();

    write!(
        out,
        "<TD BGCOLOR=\"{}\" {port}ALIGN=\"{}\" TITLE=\"{}\">{}</TD>",
        attribute(props, BACKGROUND),
        attribute(props, ALIGNMENT),
        title_text(text),
        formatted(props, &htmlize(text)),
    )
}

fn formatted(props: &Attributes, text: &str) -> String {
    match attribute(props, TEXT) {
        "bold" => format!("<b>{text}</b>"),
        "italic" => format!("<i>{text}</i>"),
        "underline" => format!("<u>{text}</u>"),
        _ => text.to_string(),
    }
}

/// Escapes text placed inside an HTML-like label.
pub fn htmlize(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escapes text for a cell's `TITLE` attribute; surrounding quotes are dropped.
pub fn title_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.trim_matches('"').chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '¢' => escaped.push_str("&cent;"),
            '©' => escaped.push_str("&copy;"),
            '®' => escaped.push_str("&reg;"),
            '£' => escaped.push_str("&#163;"),
            '¥' => escaped.push_str("&#165;"),
            '€' => escaped.push_str("&euro;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn escape_attribute(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Renders `graph` with the settings' styling, adding the process table unless
/// `suppressInfo` is set.
pub fn write_dot<W: Write>(out: &mut W, graph: &Graph, settings: &Settings) -> io::Result<()> {
    let mut writer = DotWriter::new(settings);
    if !settings.suppress_info {
        writer = writer.with_info(ProcessInfo::collect(graph.caption.as_deref()));
    }
    writer.write(out, graph)
}

pub fn to_dot(graph: &Graph, settings: &Settings) -> String {
    let mut writer = DotWriter::new(settings);
    if !settings.suppress_info {
        writer = writer.with_info(ProcessInfo::collect(graph.caption.as_deref()));
    }
    writer.render(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeStyle, NodeId};

    fn sample() -> Graph {
        let mut graph = Graph::default();
        let mut node = Node::new(NodeId(1), "Node", "struct: demo.Node");
        node.add_inlined("f0", "Name", "\"ada\"", CellCategory::Value);
        node.add_cells(vec![
            Cell::new(Some("f1".to_string()), "Next", CellCategory::Key),
            Cell::new(Some("o1".to_string()), "*demo.Node", CellCategory::Type),
        ]);
        graph.add_node(node);
        graph.add_edge(NodeId(1), "o1", NodeId(1), "Next", EdgeStyle::Pointer);
        graph.caption = Some("loop \"one\"".to_string());
        graph
    }

    fn quiet() -> Settings {
        Settings {
            suppress_header: true,
            suppress_info: true,
            ..Settings::default()
        }
    }

    #[test]
    fn node_is_an_html_table() {
        let dot = DotWriter::new(&quiet()).render(&sample());

        assert!(dot.starts_with("digraph \"memgraph\" {\n\trankdir=LR;\n"));
        assert!(dot.contains("\tlabel=\"loop \\\"one\\\"\""));
        assert!(dot.contains("\tNode_1\t[shape=plaintext tooltip=\"struct: demo.Node\" label=<<TABLE BORDER=\"1\""));
        assert!(dot.contains("<TD COLSPAN=\"2\" PORT=\"name\" BGCOLOR=\"cornsilk\" ALIGN=\"right\">Node</TD>"));
        assert!(dot.contains("<TD BGCOLOR=\"#e3a6ce\" ALIGN=\"left\" TITLE=\"ada\">\"ada\"</TD>"));
        assert!(dot.contains("PORT=\"o1\" ALIGN=\"right\" TITLE=\"*demo.Node\">*demo.Node</TD>"));
        assert!(dot.trim_end().ends_with('}'));
        assert!(!dot.contains("/* ------ info ------ */"));
    }

    #[test]
    fn edges_carry_connector_style() {
        let dot = DotWriter::new(&quiet()).render(&sample());
        assert!(dot.contains("\tNode_1:o1:e\t-> Node_1:name:w [color=\"red\" tooltip=\"Next\"];"));
    }

    #[test]
    fn banner_and_info_are_optional() {
        let settings = Settings::default();
        let mut info = ProcessInfo::default();
        info.add("PID", "42");
        let dot = DotWriter::new(&settings).with_info(info).render(&sample());

        assert!(dot.starts_with("/*\tgenerated by memgraph"));
        assert!(dot.contains("config file used: <built-in defaults> */"));
        assert!(dot.contains("\tInfo\t[shape=plaintext fontsize=\"7\""));
        assert!(dot.contains("TITLE=\"PID\">PID</TD>"));
    }

    #[test]
    fn escaping() {
        assert_eq!(htmlize("map[string]<nil> & co"), "map[string]&lt;nil&gt; &amp; co");
        assert_eq!(title_text("\"a<b\"\""), "a&lt;b");
        assert_eq!(title_text("say \"hi\" €"), "say &quot;hi&quot; &euro;");
    }
}
