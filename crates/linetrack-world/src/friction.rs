//! Friction coefficients between pairs of materials.
//!
//! The database is a JSON document:
//!
//! ```json
//! {"friction": [
//!     {"material1": "rubber", "material2": "wood",
//!      "static": {"dry": {"min": 0.6, "max": 0.8}},
//!      "sliding": {"dry": 0.5}}
//! ]}
//! ```
//!
//! Each coefficient is either a fixed number or a `{min, max}` range that
//! is sampled uniformly on lookup.

use std::collections::BTreeMap;
use std::fmt::Write;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default database location, relative to the working directory.
pub const DEFAULT_DATABASE_PATH: &str = "./database/friction.json";

/// The material name the simulator uses when none is configured.
pub const DEFAULT_MATERIAL: &str = "default";

const INDENT: &str = "    ";

/// Errors loading a friction database.
#[derive(Debug, thiserror::Error)]
pub enum FrictionError {
    /// The document is not valid JSON or misses a required key.
    #[error("invalid friction database: {0}")]
    Format(#[from] serde_json::Error),
}

/// A friction coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coefficient {
    Fixed(f64),
    Range { min: f64, max: f64 },
}

impl Coefficient {
    /// The fixed value, or a uniform sample from the range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            Self::Fixed(value) => value,
            Self::Range { min, max } if min < max => rng.gen_range(min..=max),
            Self::Range { min, .. } => min,
        }
    }
}

/// Coefficients of one material pair, keyed by surface property such as
/// `dry` or `wet`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialPair {
    pub material1: String,
    pub material2: String,
    #[serde(default, rename = "static", skip_serializing_if = "Option::is_none")]
    pub static_friction: Option<BTreeMap<String, Coefficient>>,
    #[serde(default, rename = "sliding", skip_serializing_if = "Option::is_none")]
    pub sliding_friction: Option<BTreeMap<String, Coefficient>>,
}

impl MaterialPair {
    /// Whether this pair joins `a` and `b`, in either order.
    #[must_use]
    pub fn joins(&self, a: &str, b: &str) -> bool {
        (self.material1 == a && self.material2 == b) || (self.material1 == b && self.material2 == a)
    }

    /// Whether either material is `material`.
    #[must_use]
    pub fn involves(&self, material: &str) -> bool {
        self.material1 == material || self.material2 == material
    }
}

/// Looked-up friction of a material pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Friction {
    /// Static (Coulomb) friction.
    pub static_friction: Option<f64>,
    /// Sliding friction.
    pub sliding_friction: Option<f64>,
}

impl Friction {
    /// Returns `true` if neither coefficient is known.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.static_friction.is_none() && self.sliding_friction.is_none()
    }
}

/// All known material pairs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrictionDatabase {
    pub friction: Vec<MaterialPair>,
}

impl FrictionDatabase {
    /// Parse a database document.
    ///
    /// # Errors
    ///
    /// Returns [`FrictionError::Format`] if the document is malformed, has
    /// no `friction` list, or an entry lacks either material.
    pub fn from_json(json: &str) -> Result<Self, FrictionError> {
        let database: Self = serde_json::from_str(json)?;
        tracing::debug!(pairs = database.friction.len(), "loaded friction database");
        Ok(database)
    }

    /// Friction between `ground` and `robot` for surface `property`.
    ///
    /// Ranges are sampled with `rng`. If several entries join the same
    /// materials the last one wins. Unknown pairs or properties yield
    /// `None` coefficients.
    pub fn lookup<R: Rng + ?Sized>(
        &self,
        ground: &str,
        robot: &str,
        property: &str,
        rng: &mut R,
    ) -> Friction {
        let Some(pair) = self
            .friction
            .iter()
            .rev()
            .find(|pair| pair.joins(ground, robot))
        else {
            tracing::debug!(ground, robot, "no friction data for material pair");
            return Friction::default();
        };
        let pick = |table: &Option<BTreeMap<String, Coefficient>>, rng: &mut R| {
            table
                .as_ref()
                .and_then(|table| table.get(property))
                .map(|coefficient| coefficient.sample(rng))
        };
        Friction {
            static_friction: pick(&pair.static_friction, &mut *rng),
            sliding_friction: pick(&pair.sliding_friction, &mut *rng),
        }
    }

    /// Human-readable listing of every pair, or only the pairs involving
    /// `material`. Pairs are separated by a blank line.
    #[must_use]
    pub fn describe(&self, material: Option<&str>) -> String {
        self.friction
            .iter()
            .filter(|pair| material.is_none_or(|m| pair.involves(m)))
            .map(describe_pair)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Human-readable listing of one material pair.
#[must_use]
pub fn describe_pair(pair: &MaterialPair) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\"{}\" - \"{}\"", pair.material1, pair.material2);
    for (title, table) in [
        ("static friction", &pair.static_friction),
        ("sliding friction", &pair.sliding_friction),
    ] {
        let _ = writeln!(out, "{INDENT}{title}:");
        match table {
            Some(table) => {
                for (property, coefficient) in table {
                    let _ = match coefficient {
                        Coefficient::Fixed(value) => {
                            writeln!(out, "{INDENT}{INDENT}{property}: {value}")
                        }
                        Coefficient::Range { min, max } => {
                            writeln!(out, "{INDENT}{INDENT}{property}: {min} - {max}")
                        }
                    };
                }
            }
            None => {
                let _ = writeln!(out, "{INDENT}{INDENT}no data");
            }
        }
    }
    out
}
