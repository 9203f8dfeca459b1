//! A square line follower arena with the track image as floor texture.

use std::f64::consts::FRAC_PI_4;
use std::path::Path;

use chrono::NaiveDate;

use crate::friction::Friction;
use crate::node::{Field, Node};
use crate::nodes::{self, DEFAULT_RELEASE, proto_url};
use crate::wbt::{Proto, WorldFile};

/// Simulation step of generated worlds, in milliseconds.
pub const BASIC_TIME_STEP: f64 = 8.0;

/// Contact between the ground material and the robot material.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactMaterial {
    pub ground: String,
    pub robot: String,
    pub friction: Friction,
}

/// Builder for a world holding one textured rectangle arena.
#[derive(Debug, Clone, PartialEq)]
pub struct ArenaWorld {
    pub title: String,
    pub description: String,
    pub author: String,
    pub email: String,
    pub date: NaiveDate,
    /// Command line arguments recorded in the world info.
    pub parameters: Vec<String>,
    /// Arena extent along x, in meters.
    pub width: f64,
    /// Arena extent along y, in meters.
    pub length: f64,
    /// Floor texture, relative to the world file.
    pub image_url: String,
    /// Simulator release the prototype URLs point at.
    pub release: String,
    pub contact: Option<ContactMaterial>,
}

impl ArenaWorld {
    pub const DEFAULT_TITLE: &'static str = "my world";
    pub const DEFAULT_AUTHOR: &'static str = "anonymous";
    pub const DEFAULT_DESCRIPTION: &'static str =
        "Line follower track generated by linetrack.";

    /// A square arena of `size` meters textured with `image_url`, dated
    /// today.
    pub fn new(size: f64, image_url: impl Into<String>) -> Self {
        Self {
            title: Self::DEFAULT_TITLE.to_string(),
            description: Self::DEFAULT_DESCRIPTION.to_string(),
            author: Self::DEFAULT_AUTHOR.to_string(),
            email: String::new(),
            date: chrono::Local::now().date_naive(),
            parameters: Vec::new(),
            width: size,
            length: size,
            image_url: image_url.into(),
            release: DEFAULT_RELEASE.to_string(),
            contact: None,
        }
    }

    /// Attach a contact material. Ignored when `friction` has neither
    /// coefficient.
    #[must_use]
    pub fn with_contact(
        mut self,
        ground: impl Into<String>,
        robot: impl Into<String>,
        friction: Friction,
    ) -> Self {
        if friction.is_empty() {
            return self;
        }
        self.contact = Some(ContactMaterial {
            ground: ground.into(),
            robot: robot.into(),
            friction,
        });
        self
    }

    /// Assemble the world.
    #[must_use]
    pub fn build(&self) -> WorldFile {
        let protos = [
            ("backgrounds", "TexturedBackground"),
            ("backgrounds", "TexturedBackgroundLight"),
            ("floors", "RectangleArena"),
        ]
        .into_iter()
        .map(|(category, name)| Proto::new(proto_url(&self.release, category, name)))
        .collect();

        WorldFile {
            protos,
            nodes: vec![
                self.world_info(),
                self.viewpoint(),
                Node::new("TexturedBackground"),
                Node::new("TexturedBackgroundLight"),
                self.rectangle_arena(),
            ],
        }
    }

    fn world_info(&self) -> Node {
        let mut parameters = String::from("Parameters:");
        for arg in &self.parameters {
            parameters.push(' ');
            parameters.push_str(arg);
        }
        let mut info = nodes::world_info()
            .with("title", Field::string(&self.title))
            .with(
                "info",
                Field::strings([
                    self.description.clone(),
                    format!("{} <{}>", self.author, self.email),
                    self.date.format("%Y-%m-%d").to_string(),
                    parameters,
                ]),
            )
            .with("basicTimeStep", Field::SFFloat(BASIC_TIME_STEP));

        if let Some(contact) = &self.contact {
            let mut properties = nodes::contact_properties()
                .with("material1", Field::string(&contact.ground))
                .with("material2", Field::string(&contact.robot));
            if let Some(value) = contact.friction.static_friction {
                properties.set("coulombFriction", Field::MFFloat(vec![value]));
            }
            if let Some(value) = contact.friction.sliding_friction {
                properties.set("forceDependentSlip", Field::MFFloat(vec![value]));
            }
            info.set("contactProperties", Field::MFNode(vec![properties]));
        }
        info
    }

    fn viewpoint(&self) -> Node {
        nodes::viewpoint()
            .with("orientation", Field::SFRotation([0.0, 1.0, 0.0, FRAC_PI_4]))
            .with(
                "position",
                Field::SFVec3f([-2.0 * self.width, 0.0, 2.0 * self.length]),
            )
    }

    fn rectangle_arena(&self) -> Node {
        let texture = nodes::image_texture().with("url", Field::strings([self.image_url.as_str()]));
        let appearance = nodes::pbr_appearance()
            .with("baseColorMap", Field::node(texture))
            .with("metalness", Field::SFFloat(0.0));

        let mut arena = Node::new("RectangleArena")
            .with("floorSize", Field::SFVec2f([self.width, self.length]))
            .with("floorTileSize", Field::SFVec2f([self.width, self.length]))
            .with("floorAppearance", Field::node(appearance));
        if let Some(contact) = &self.contact {
            arena.set("contactMaterial", Field::string(&contact.ground));
        }
        arena
    }
}

/// World and image file names for the user supplied `name`.
///
/// A `.wbt` suffix is swapped for `.png`; any other name gets both
/// suffixes appended.
#[must_use]
pub fn world_and_image_file_names(name: &str) -> (String, String) {
    match name.strip_suffix(".wbt") {
        Some(stem) => (name.to_string(), format!("{stem}.png")),
        None => (format!("{name}.wbt"), format!("{name}.png")),
    }
}

/// The image reference written into the world file: the image's file
/// name, resolved by the simulator next to the world file.
#[must_use]
pub fn image_url(image_path: &str) -> String {
    Path::new(image_path)
        .file_name()
        .map_or_else(|| image_path.to_string(), |name| name.to_string_lossy().into_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn arena() -> ArenaWorld {
        ArenaWorld {
            date: NaiveDate::from_ymd_opt(2024, 5, 17).unwrap(),
            parameters: vec!["simple".to_string(), "out.wbt".to_string()],
            email: "me@example.com".to_string(),
            ..ArenaWorld::new(2.0, "out.png")
        }
    }

    #[test]
    fn file_names() {
        assert_eq!(
            world_and_image_file_names("tracks/oval.wbt"),
            ("tracks/oval.wbt".to_string(), "tracks/oval.png".to_string())
        );
        assert_eq!(
            world_and_image_file_names("oval"),
            ("oval.wbt".to_string(), "oval.png".to_string())
        );
    }

    #[test]
    fn image_url_is_file_name() {
        assert_eq!(image_url("tracks/oval.png"), "oval.png");
        assert_eq!(image_url("oval.png"), "oval.png");
    }

    #[test]
    fn world_info_lines() {
        let world = arena().build();
        let info = &world.nodes[0];
        assert_eq!(info.type_name(), "WorldInfo");
        assert_eq!(
            info.field("info"),
            Some(&Field::strings([
                ArenaWorld::DEFAULT_DESCRIPTION,
                "anonymous <me@example.com>",
                "2024-05-17",
                "Parameters: simple out.wbt",
            ]))
        );
        assert_eq!(info.field("basicTimeStep"), Some(&Field::SFFloat(8.0)));
        assert_eq!(info.field("contactProperties"), Some(&Field::MFNode(Vec::new())));
    }

    #[test]
    fn viewpoint_looks_at_arena() {
        let world = arena().build();
        let viewpoint = &world.nodes[1];
        assert_eq!(viewpoint.field("position"), Some(&Field::SFVec3f([-4.0, 0.0, 4.0])));
        assert_eq!(
            viewpoint.field("orientation"),
            Some(&Field::SFRotation([0.0, 1.0, 0.0, FRAC_PI_4]))
        );
    }

    #[test]
    fn arena_is_textured() {
        let mut world = arena().build();
        assert_eq!(world.protos.len(), 3);
        assert!(world.protos[2].url.ends_with("/R2025a/projects/objects/floors/protos/RectangleArena.proto"));

        let arena = world.nodes.last_mut().unwrap();
        assert_eq!(arena.field("floorSize"), Some(&Field::SFVec2f([2.0, 2.0])));
        assert!(arena.field("contactMaterial").is_none());
        let appearance = arena.child_mut("floorAppearance").unwrap();
        assert_eq!(appearance.field("metalness"), Some(&Field::SFFloat(0.0)));
        let texture = appearance.child_mut("baseColorMap").unwrap();
        assert_eq!(texture.field("url"), Some(&Field::strings(["out.png"])));
    }

    #[test]
    fn contact_material_adds_properties() {
        let friction = Friction {
            static_friction: Some(0.7),
            sliding_friction: None,
        };
        let world = arena().with_contact("wood", "rubber", friction).build();

        let Some(Field::MFNode(properties)) = world.nodes[0].field("contactProperties") else {
            unreachable!();
        };
        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0].field("material1"), Some(&Field::string("wood")));
        assert_eq!(properties[0].field("material2"), Some(&Field::string("rubber")));
        assert_eq!(properties[0].field("coulombFriction"), Some(&Field::MFFloat(vec![0.7])));
        assert_eq!(properties[0].field("forceDependentSlip"), Some(&Field::MFFloat(vec![0.0])));
        assert_eq!(
            world.nodes[4].field("contactMaterial"),
            Some(&Field::string("wood"))
        );
    }

    #[test]
    fn empty_friction_is_ignored() {
        let world = arena().with_contact("wood", "rubber", Friction::default());
        assert!(world.contact.is_none());
    }
}
