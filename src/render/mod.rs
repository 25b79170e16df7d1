//! Graphviz output.

mod dot;
mod info;
mod style;

pub use dot::{DotWriter, htmlize, title_text, to_dot, write_dot};
pub use info::ProcessInfo;
pub use style::{Attributes, StyleSheet, Surface};
