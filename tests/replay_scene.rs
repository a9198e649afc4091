//! Tests for replaying recorded scenes from JSON.

use std::path::PathBuf;

use rstest::rstest;
use ship_overlay::{replay, ConfigError, FrameSummary, IconSet, NameTable, OverlayConfig, Scene};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn handover_scene_replays_without_leaks() {
    let scene = Scene::load(fixture("handover.json")).expect("scene should load");
    let report = replay(
        &scene,
        &OverlayConfig::default(),
        &NameTable::builtin(),
        IconSet::default(),
    );

    assert_eq!(
        report.frames,
        vec![
            FrameSummary {
                visible: 2,
                hidden: 1,
                removed: 0
            },
            FrameSummary {
                visible: 2,
                hidden: 1,
                removed: 0
            },
            FrameSummary {
                visible: 1,
                hidden: 0,
                removed: 2
            },
        ]
    );
    assert_eq!(report.ships_remaining, 1);
    assert_eq!(report.primitives_leaked, 0);
}

#[test]
fn lower_threshold_moves_the_handover() {
    let scene = Scene::load(fixture("handover.json")).expect("scene should load");
    let config = OverlayConfig {
        near_far_threshold: 500.0,
        ..OverlayConfig::default()
    };
    let report = replay(&scene, &config, &NameTable::builtin(), IconSet::default());

    let first = report.frames.first().expect("scene has frames");
    assert_eq!(first.visible, 2);
    assert_eq!(first.hidden, 1);
}

#[test]
fn empty_name_table_tracks_nothing() {
    let scene = Scene::load(fixture("handover.json")).expect("scene should load");
    let report = replay(
        &scene,
        &OverlayConfig::default(),
        &NameTable::default(),
        IconSet::default(),
    );

    assert!(report.frames.iter().all(|f| *f == FrameSummary::default()));
    assert_eq!(report.ships_remaining, 0);
}

#[test]
fn missing_scene_is_an_io_error() {
    let err = Scene::load(fixture("does_not_exist.json")).expect_err("load should fail");
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[rstest]
#[case::not_json("frames:")]
#[case::missing_frames(r#"{ "screen": [800.0, 600.0] }"#)]
#[case::negative_address(
    r#"{ "screen": [1.0, 1.0], "frames": [{
        "viewer": { "location": [0.0, 0.0, 0.0] },
        "actors": [{ "address": -1, "actor_id": 1, "raw_kind": "x", "position": [0.0, 0.0, 0.0] }]
    }] }"#
)]
fn malformed_scene_is_a_json_error(#[case] json: &str) {
    assert!(matches!(
        Scene::from_json_str(json),
        Err(ConfigError::Json(_))
    ));
}

#[test]
fn scene_defaults_fov_and_crews() {
    let scene = Scene::from_json_str(r#"{ "screen": [800.0, 600.0], "frames": [] }"#)
        .expect("minimal scene should parse");
    assert!((scene.fov - 90.0).abs() < f32::EPSILON);
    assert!(scene.crews.is_empty());
}
