//! Complete world files as the CLI writes them.

#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use linetrack_world::{ArenaWorld, CodeFormat, FrictionDatabase, to_wbt};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn arena() -> ArenaWorld {
    ArenaWorld {
        title: "oval".to_string(),
        date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
        parameters: vec!["simple".to_string(), "oval".to_string()],
        ..ArenaWorld::new(1.0, "oval.png")
    }
}

#[test]
fn world_file_layout() {
    let text = to_wbt(&arena().build(), &CodeFormat::default());
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "#VRML_SIM R2023b utf8");
    assert_eq!(lines[1], "");
    assert!(lines[2].starts_with("EXTERNPROTO \"https://"));
    assert!(lines[2].ends_with("/backgrounds/protos/TexturedBackground.proto\""));
    assert!(lines[4].ends_with("/floors/protos/RectangleArena.proto\""));
    assert_eq!(lines[5], "");
    assert_eq!(lines[6], "WorldInfo {");

    for expected in [
        "  title \"oval\"",
        "  info [ \"Line follower track generated by linetrack.\", \"anonymous <>\", \"2025-01-02\", \"Parameters: simple oval\" ]",
        "  basicTimeStep 8",
        "  contactProperties []",
        "  orientation 0 1 0 0.7853981633974483",
        "  position -2 0 2",
        "TexturedBackground {",
        "TexturedBackgroundLight {",
        "RectangleArena {",
        "  floorSize 1 1",
        "  floorTileSize 1 1",
        "  floorAppearance PBRAppearance {",
        "    baseColorMap ImageTexture {",
        "      url [ \"oval.png\" ]",
        "    metalness 0",
    ] {
        assert!(lines.contains(&expected), "missing {expected:?} in\n{text}");
    }
    assert!(text.ends_with("}\n"));
}

#[test]
fn friction_from_database_reaches_world_file() {
    let db = FrictionDatabase::from_json(
        r#"{"friction": [{"material1": "rubber", "material2": "paper",
            "static": {"dry": 0.9}, "sliding": {"dry": {"min": 0.4, "max": 0.6}}}]}"#,
    )
    .unwrap();
    let friction = db.lookup("paper", "rubber", "dry", &mut StdRng::seed_from_u64(1));
    let text = to_wbt(
        &arena().with_contact("paper", "rubber", friction).build(),
        &CodeFormat::default(),
    );

    assert!(text.contains("  contactProperties [\n    ContactProperties {\n      material1 \"paper\"\n"));
    assert!(text.contains("      coulombFriction [ 0.9 ]\n"));
    assert!(text.contains("  contactMaterial \"paper\"\n"));
    let slip = text
        .lines()
        .find_map(|line| line.trim().strip_prefix("forceDependentSlip [ "))
        .and_then(|rest| rest.strip_suffix(" ]"))
        .unwrap();
    let slip: f64 = slip.parse().unwrap();
    assert!((0.4..=0.6).contains(&slip));
}
