//! Scene graph nodes and their typed fields.

use std::fmt::{self, Write};

/// A field value, tagged with its scene graph type.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    SFString(String),
    MFString(Vec<String>),
    SFBool(bool),
    SFInt32(i32),
    SFFloat(f64),
    MFFloat(Vec<f64>),
    SFVec2f([f64; 2]),
    SFVec3f([f64; 3]),
    SFRotation([f64; 4]),
    SFColor([f64; 3]),
    /// A nested node, or `NULL`.
    SFNode(Option<Box<Node>>),
    MFNode(Vec<Node>),
}

impl Field {
    /// Shorthand for an [`Field::SFString`].
    pub fn string(value: impl Into<String>) -> Self {
        Self::SFString(value.into())
    }

    /// Shorthand for an [`Field::MFString`].
    pub fn strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MFString(values.into_iter().map(Into::into).collect())
    }

    /// Shorthand for a non-null [`Field::SFNode`].
    #[must_use]
    pub fn node(node: Node) -> Self {
        Self::SFNode(Some(Box::new(node)))
    }
}

/// A node such as `WorldInfo { ... }`, optionally named with `DEF`.
///
/// Fields keep their insertion order, which is the order they are
/// written in.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    def_name: Option<String>,
    type_name: String,
    fields: Vec<(String, Field)>,
}

impl Node {
    /// A node of `type_name` without fields.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            def_name: None,
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Name the node with a `DEF` prefix.
    #[must_use]
    pub fn with_def_name(mut self, name: impl Into<String>) -> Self {
        self.def_name = Some(name.into());
        self
    }

    /// Builder form of [`Node::set`].
    #[must_use]
    pub fn with(mut self, name: &str, value: Field) -> Self {
        self.set(name, value);
        self
    }

    /// The node type, e.g. `"WorldInfo"`.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The `DEF` name, if any.
    #[must_use]
    pub fn def_name(&self) -> Option<&str> {
        self.def_name.as_deref()
    }

    /// Replace the value of field `name`, or append the field if the node
    /// does not have it yet.
    pub fn set(&mut self, name: &str, value: Field) {
        match self.field_mut(name) {
            Some(slot) => *slot = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    /// Value of field `name`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|(field_name, _)| field_name == name)
            .map(|(_, value)| value)
    }

    /// Mutable value of field `name`.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields
            .iter_mut()
            .find(|(field_name, _)| field_name == name)
            .map(|(_, value)| value)
    }

    /// Nested node held by `SFNode` field `name`.
    pub fn child_mut(&mut self, name: &str) -> Option<&mut Self> {
        match self.field_mut(name) {
            Some(Field::SFNode(Some(node))) => Some(node),
            _ => None,
        }
    }

    /// Fields in write order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Indentation and line ending used when writing a world file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeFormat {
    /// Spaces per nesting level.
    pub indent_width: usize,
    /// Line terminator.
    pub line_ending: String,
}

impl Default for CodeFormat {
    fn default() -> Self {
        Self {
            indent_width: 2,
            line_ending: "\n".to_string(),
        }
    }
}

/// Write `node` at nesting `level`. The opening line is not indented;
/// callers position it.
pub(crate) fn write_node(
    out: &mut String,
    node: &Node,
    format: &CodeFormat,
    level: usize,
) -> fmt::Result {
    let nl = &format.line_ending;
    if let Some(def) = &node.def_name {
        write!(out, "DEF {def} ")?;
    }
    write!(out, "{} {{{nl}", node.type_name)?;

    let inner = " ".repeat(format.indent_width * (level + 1));
    for (name, value) in &node.fields {
        write!(out, "{inner}{name} ")?;
        write_field(out, value, format, level + 1)?;
        out.push_str(nl);
    }

    let outer = " ".repeat(format.indent_width * level);
    write!(out, "{outer}}}")
}

fn write_field(out: &mut String, field: &Field, format: &CodeFormat, level: usize) -> fmt::Result {
    match field {
        Field::SFString(value) => write_quoted(out, value),
        Field::MFString(values) => {
            write_list(out, values, |out, value| write_quoted(out, value))
        }
        Field::SFBool(value) => out.write_str(if *value { "TRUE" } else { "FALSE" }),
        Field::SFInt32(value) => write!(out, "{value}"),
        Field::SFFloat(value) => write!(out, "{value}"),
        Field::MFFloat(values) => write_list(out, values, |out, value| write!(out, "{value}")),
        Field::SFVec2f(values) => write_numbers(out, values),
        Field::SFVec3f(values) | Field::SFColor(values) => write_numbers(out, values),
        Field::SFRotation(values) => write_numbers(out, values),
        Field::SFNode(None) => out.write_str("NULL"),
        Field::SFNode(Some(node)) => write_node(out, node, format, level),
        Field::MFNode(nodes) if nodes.is_empty() => out.write_str("[]"),
        Field::MFNode(nodes) => {
            let nl = &format.line_ending;
            let inner = " ".repeat(format.indent_width * (level + 1));
            let outer = " ".repeat(format.indent_width * level);
            write!(out, "[{nl}")?;
            for node in nodes {
                out.push_str(&inner);
                write_node(out, node, format, level + 1)?;
                out.push_str(nl);
            }
            write!(out, "{outer}]")
        }
    }
}

fn write_quoted(out: &mut String, value: &str) -> fmt::Result {
    out.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    Ok(())
}

fn write_numbers(out: &mut String, values: &[f64]) -> fmt::Result {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        write!(out, "{value}")?;
    }
    Ok(())
}

fn write_list<T>(
    out: &mut String,
    values: &[T],
    mut item: impl FnMut(&mut String, &T) -> fmt::Result,
) -> fmt::Result {
    if values.is_empty() {
        return out.write_str("[]");
    }
    out.write_str("[ ")?;
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.write_str(", ")?;
        }
        item(out, value)?;
    }
    out.write_str(" ]")
}
