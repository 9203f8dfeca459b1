//! Constructors for the node types a generated arena uses, pre-filled
//! with the simulator's default field values.

use crate::node::{Field, Node};

/// Simulator release the emitted prototype and asset URLs point at.
pub const DEFAULT_RELEASE: &str = "R2025a";

const WEBOTS_URL: &str = "https://raw.githubusercontent.com/cyberbotics/webots";

/// URL of a prototype shipped with the simulator release `release`,
/// e.g. `proto_url("R2023b", "floors", "RectangleArena")`.
#[must_use]
pub fn proto_url(release: &str, category: &str, name: &str) -> String {
    format!("{WEBOTS_URL}/{release}/projects/objects/{category}/protos/{name}.proto")
}

#[must_use]
pub fn world_info() -> Node {
    Node::new("WorldInfo")
        .with("title", Field::string(""))
        .with("info", Field::MFString(Vec::new()))
        .with("window", Field::string("<none>"))
        .with("gravity", Field::SFFloat(9.81))
        .with("CFM", Field::SFFloat(0.00001))
        .with("ERP", Field::SFFloat(0.2))
        .with("physics", Field::string("<none>"))
        .with("basicTimeStep", Field::SFFloat(32.0))
        .with("FPS", Field::SFFloat(60.0))
        .with("optimalThreadCount", Field::SFInt32(1))
        .with("physicsDisableTime", Field::SFFloat(1.0))
        .with("physicsDisableLinearThreshold", Field::SFFloat(0.01))
        .with("physicsDisableAngularThreshold", Field::SFFloat(0.01))
        .with("defaultDamping", Field::SFNode(None))
        .with("inkEvaporation", Field::SFFloat(0.0))
        .with("coordinateSystem", Field::string("ENU"))
        .with("gpsCoordinateSystem", Field::string("local"))
        .with("gpsReference", Field::SFVec3f([0.0, 0.0, 0.0]))
        .with("lineScale", Field::SFFloat(0.1))
        .with("dragForceScale", Field::SFFloat(30.0))
        .with("dragTorqueScale", Field::SFFloat(5.0))
        .with("randomSeed", Field::SFInt32(0))
        .with("contactProperties", Field::MFNode(Vec::new()))
}

#[must_use]
pub fn viewpoint() -> Node {
    Node::new("Viewpoint")
        .with("fieldOfView", Field::SFFloat(0.785_398))
        .with("orientation", Field::SFRotation([0.0, 0.0, 1.0, 0.0]))
        .with("position", Field::SFVec3f([-10.0, 0.0, 0.0]))
        .with("description", Field::string(""))
        .with("near", Field::SFFloat(0.05))
        .with("far", Field::SFFloat(0.0))
        .with("exposure", Field::SFFloat(1.0))
        .with("follow", Field::string(""))
        .with("followType", Field::string("Tracking Shot"))
        .with("followSmoothness", Field::SFFloat(0.5))
        .with("lensFlare", Field::SFNode(None))
        .with("ambientOcclusionRadius", Field::SFFloat(2.0))
        .with("bloomThreshold", Field::SFFloat(21.0))
}

#[must_use]
pub fn image_texture() -> Node {
    Node::new("ImageTexture")
        .with("url", Field::MFString(Vec::new()))
        .with("repeatS", Field::SFBool(true))
        .with("repeatT", Field::SFBool(true))
        .with("filtering", Field::SFInt32(4))
}

#[must_use]
pub fn pbr_appearance() -> Node {
    Node::new("PBRAppearance")
        .with("baseColor", Field::SFColor([1.0, 1.0, 1.0]))
        .with("baseColorMap", Field::SFNode(None))
        .with("transparency", Field::SFFloat(0.0))
        .with("roughness", Field::SFFloat(0.0))
        .with("roughnessMap", Field::SFNode(None))
        .with("metalness", Field::SFFloat(1.0))
        .with("metalnessMap", Field::SFNode(None))
        .with("IBLStrength", Field::SFFloat(1.0))
        .with("normalMap", Field::SFNode(None))
        .with("normalMapFactor", Field::SFFloat(1.0))
        .with("occlusionMap", Field::SFNode(None))
        .with("occlusionMapStrength", Field::SFFloat(1.0))
        .with("emissiveColor", Field::SFColor([0.0, 0.0, 0.0]))
        .with("emissiveColorMap", Field::SFNode(None))
        .with("emissiveIntensity", Field::SFFloat(1.0))
        .with("textureTransform", Field::SFNode(None))
        .with("name", Field::string("PBRAppearance"))
}

#[must_use]
pub fn contact_properties() -> Node {
    let sound = |name: &str| {
        Field::string(format!(
            "{WEBOTS_URL}/{DEFAULT_RELEASE}/projects/default/worlds/sounds/{name}.wav"
        ))
    };
    Node::new("ContactProperties")
        .with("material1", Field::string("default"))
        .with("material2", Field::string("default"))
        .with("coulombFriction", Field::MFFloat(vec![1.0]))
        .with("frictionRotation", Field::SFVec2f([0.0, 0.0]))
        .with("rollingFriction", Field::SFVec3f([0.0, 0.0, 0.0]))
        .with("bounce", Field::SFFloat(0.5))
        .with("bounceVelocity", Field::SFFloat(0.01))
        .with("forceDependentSlip", Field::MFFloat(vec![0.0]))
        .with("softERP", Field::SFFloat(0.2))
        .with("softCFM", Field::SFFloat(0.001))
        .with("bumpSound", sound("bump"))
        .with("rollSound", sound("roll"))
        .with("slideSound", sound("slide"))
        .with("maxContactJoints", Field::SFInt32(10))
}
