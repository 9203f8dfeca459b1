//! World file serializer.
//!
//! A world file starts with the version header, lists the external
//! prototypes it instantiates and then its top-level nodes, separated by
//! blank lines. This is a pure function with no I/O: it returns a
//! `String`.

use std::fmt::Write;

use crate::node::{CodeFormat, Node, write_node};

/// Version header written at the top of every world file.
pub const HEADER: &str = "#VRML_SIM R2023b utf8";

/// An external prototype declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proto {
    pub url: String,
}

impl Proto {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// A complete world: prototype declarations and top-level nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldFile {
    pub protos: Vec<Proto>,
    pub nodes: Vec<Node>,
}

/// Serialize a world file.
#[must_use]
pub fn to_wbt(world: &WorldFile, format: &CodeFormat) -> String {
    let nl = &format.line_ending;
    let mut out = String::new();
    out.push_str(HEADER);
    out.push_str(nl);
    out.push_str(nl);

    for proto in &world.protos {
        let _ = write!(out, "EXTERNPROTO \"{}\"{nl}", proto.url);
    }
    if !world.protos.is_empty() {
        out.push_str(nl);
    }

    for (i, node) in world.nodes.iter().enumerate() {
        if i > 0 {
            out.push_str(nl);
        }
        let _ = write_node(&mut out, node, format, 0);
        out.push_str(nl);
    }
    out
}
