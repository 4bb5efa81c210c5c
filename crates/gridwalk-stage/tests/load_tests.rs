//! Loading stages from disk.
//!
//! Each test writes a stage directory into a temporary folder and loads it
//! through `Stage::load`, checking both the happy path and that every kind
//! of broken input aborts the load with the matching error.

use std::path::Path;

use gridwalk_stage::prelude::*;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

/// Writes a complete, valid stage. Individual tests overwrite files to
/// break it.
fn write_stage(dir: &Path) {
    write(
        dir,
        "stage.json",
        r#"{
            "width": 4,
            "height": 3,
            "layers": [{"data": [1, 1, 1, 1,
                                 1, 2, 1, 9,
                                 1, 1, 1, 1]}],
            "tilesets": [
                {"firstgid": 1, "source": "ground.json"},
                {"firstgid": 9, "source": "props.json"}
            ]
        }"#,
    );
    write(
        dir,
        "ground.json",
        r#"{"tiles": [{"id": 1, "properties": [{"name": "block", "type": "int", "value": 1}]}]}"#,
    );
    write(
        dir,
        "props.json",
        r#"{"tiles": [{"id": 0, "properties": [
            {"name": "block", "type": "int", "value": 1},
            {"name": "action", "type": "int", "value": 44}
        ]}]}"#,
    );
    write(dir, "actions.json", r#"{"actions": [{"x": 2, "y": 2, "action": 5}]}"#);
    write(
        dir,
        "objects.json",
        r#"{"objects": [
            {"id": 20, "start": [0, 1], "territory": [[0, 1], [0, 2]],
             "direction": "down", "type": "npc", "text": ["Nice day."]},
            {"id": 890, "start": [2, 1], "direction": "Left", "type": "trainer"}
        ]}"#,
    );
    write(
        dir,
        "warp.json",
        r#"{"warps": [{"x": 4, "y": 1, "destination": "route2", "arrival": [0, 5]}]}"#,
    );
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn load(dir: &Path) -> Result<Stage, StageError> {
    Stage::load(dir, &mut PlaceholderSprites::new())
}

#[test]
fn loads_complete_stage() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    write_stage(tmp.path());
    let stage = load(tmp.path()).unwrap();

    assert_eq!((stage.width(), stage.height()), (4, 3));
    assert_eq!(stage.grid().ids().len(), 12);

    // Tile id 2 is ground-local 1: blocked.
    assert!(stage.tile_property(Point::new(16, 16)).is_blocked());
    // Tile id 1 has no entry: open.
    assert_eq!(stage.tile_property(Point::new(0, 0)), TileProperty::OPEN);
    // Tile id 9 is props-local 0.
    assert_eq!(
        stage.tile_property(Point::new(48, 16)),
        TileProperty { block: 1, action: 44 }
    );

    assert_eq!(stage.actions().len(), 1);
    assert_eq!(stage.warps()[0].arrival_tile(), Some(Tile::new(0, 5)));

    assert_eq!(stage.object_count(), 2);
    let npc = stage.object(ObjectIndex(0)).unwrap();
    assert_eq!(npc.position(), Point::new(0, 16));
    assert_eq!(npc.direction(), Some(Direction::Down));
    assert_eq!(npc.dialogue(), ["Nice day.".to_owned()]);
    assert_eq!(npc.frames().len(), FRAME_COUNT);

    let trainer = stage.object(ObjectIndex(1)).unwrap();
    assert_eq!(trainer.kind(), &EntityKind::Trainer);
    assert_eq!(trainer.direction(), Some(Direction::Left));
    assert_eq!(
        trainer.sprite_key(),
        Some(SpriteKey { group: AssetGroup::User, index: 0 })
    );
}

#[test]
fn warp_past_the_east_edge_is_walkable() {
    let tmp = TempDir::new().unwrap();
    write_stage(tmp.path());
    let stage = load(tmp.path()).unwrap();
    assert_eq!(stage.tile_property(Point::new(64, 16)), TileProperty::OPEN);
    assert!(stage.tile_property(Point::new(64, 32)).is_blocked());
}

#[test]
fn two_tile_round_trip() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    write(
        dir,
        "stage.json",
        r#"{"width": 2, "height": 1, "layers": [{"data": [5, 5]}],
            "tilesets": [{"firstgid": 0, "source": "t.json"}]}"#,
    );
    write(
        dir,
        "t.json",
        r#"{"tiles": [{"id": 5, "properties": [{"name": "block", "value": 1}]}]}"#,
    );
    write(dir, "actions.json", r#"{"actions": []}"#);
    write(dir, "objects.json", r#"{"objects": []}"#);
    write(dir, "warp.json", r#"{"warps": []}"#);

    let stage = load(dir).unwrap();
    assert_eq!(stage.tile_property(Point::new(0, 0)).block, 1);
    assert_eq!(stage.tile_property(Point::new(16, 0)).block, 1);
}

#[test]
fn custom_file_names() {
    let tmp = TempDir::new().unwrap();
    write_stage(tmp.path());
    std::fs::rename(tmp.path().join("warp.json"), tmp.path().join("warps.json")).unwrap();

    let files = StageFiles {
        warps: "warps.json".into(),
        ..StageFiles::default()
    };
    let stage = Stage::load_with(tmp.path(), &files, &mut PlaceholderSprites::new()).unwrap();
    assert_eq!(stage.warps().len(), 1);
}

#[test]
fn missing_file_is_an_io_error() {
    let tmp = TempDir::new().unwrap();
    write_stage(tmp.path());
    std::fs::remove_file(tmp.path().join("objects.json")).unwrap();

    match load(tmp.path()) {
        Err(StageError::Io { path, .. }) => assert!(path.ends_with("objects.json")),
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn missing_tileset_is_an_io_error() {
    let tmp = TempDir::new().unwrap();
    write_stage(tmp.path());
    std::fs::remove_file(tmp.path().join("props.json")).unwrap();

    match load(tmp.path()) {
        Err(StageError::Io { path, .. }) => assert!(path.ends_with("props.json")),
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn malformed_json_is_a_parse_error() {
    let tmp = TempDir::new().unwrap();
    write_stage(tmp.path());
    write(tmp.path(), "actions.json", r#"{"actions": [{"x": 1}]}"#);

    match load(tmp.path()) {
        Err(StageError::Parse { path, .. }) => assert!(path.ends_with("actions.json")),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn non_integer_block_flag_is_rejected() {
    let tmp = TempDir::new().unwrap();
    write_stage(tmp.path());
    write(
        tmp.path(),
        "props.json",
        r#"{"tiles": [{"id": 0, "properties": [{"name": "block", "value": "yes"}]}]}"#,
    );

    match load(tmp.path()) {
        Err(StageError::InvalidProperty { path, local_id, name, .. }) => {
            assert!(path.ends_with("props.json"));
            assert_eq!(local_id, 0);
            assert_eq!(name, "block");
        }
        other => panic!("expected invalid property, got {other:?}"),
    }
}

#[test]
fn tileset_ids_past_i32_max_are_rejected() {
    let tmp = TempDir::new().unwrap();
    write_stage(tmp.path());
    write(
        tmp.path(),
        "stage.json",
        r#"{"width": 1, "height": 1, "layers": [{"data": [0]}],
            "tilesets": [{"firstgid": 2147483647, "source": "ground.json"}]}"#,
    );
    write(tmp.path(), "ground.json", r#"{"tiles": [{"id": 5}]}"#);

    match load(tmp.path()) {
        Err(StageError::TileIdOverflow { path, first_gid, local_id }) => {
            assert!(path.ends_with("ground.json"));
            assert_eq!((first_gid, local_id), (i32::MAX, 5));
        }
        other => panic!("expected id overflow, got {other:?}"),
    }
}

#[test]
fn zero_width_stage_is_rejected() {
    let tmp = TempDir::new().unwrap();
    write_stage(tmp.path());
    write(
        tmp.path(),
        "stage.json",
        r#"{"width": 0, "height": 3, "layers": [{"data": []}]}"#,
    );
    assert!(matches!(
        load(tmp.path()),
        Err(StageError::InvalidDimensions { width: 0, height: 3 })
    ));
}

#[test]
fn stage_without_layers_is_rejected() {
    let tmp = TempDir::new().unwrap();
    write_stage(tmp.path());
    write(tmp.path(), "stage.json", r#"{"width": 1, "height": 1, "layers": []}"#);
    assert!(matches!(load(tmp.path()), Err(StageError::MissingLayer { .. })));
}

#[test]
fn short_tile_layer_is_rejected() {
    let tmp = TempDir::new().unwrap();
    write_stage(tmp.path());
    write(
        tmp.path(),
        "stage.json",
        r#"{"width": 3, "height": 3, "layers": [{"data": [0, 0, 0]}]}"#,
    );
    assert!(matches!(
        load(tmp.path()),
        Err(StageError::TileCountMismatch { expected: 9, actual: 3, .. })
    ));
}

#[test]
fn unresolvable_sprites_abort_the_load() {
    let tmp = TempDir::new().unwrap();
    write_stage(tmp.path());
    let mut sprites = DirectorySprites::new(tmp.path().join("object"));

    match Stage::load(tmp.path(), &mut sprites) {
        Err(StageError::Sprite { object_id, source }) => {
            assert_eq!(object_id, 20);
            assert!(matches!(source, SpriteError::MissingDirectory { .. }));
        }
        other => panic!("expected sprite error, got {other:?}"),
    }
}

#[test]
fn directory_sprites_are_attached() {
    let tmp = TempDir::new().unwrap();
    write_stage(tmp.path());
    let root = tmp.path().join("object");
    for key in ["blue/2", "user/0"] {
        let dir = root.join(key);
        std::fs::create_dir_all(&dir).unwrap();
        for i in 0..10 {
            std::fs::write(dir.join(format!("{i}.png")), b"").unwrap();
        }
    }

    let mut sprites = DirectorySprites::new(&root);
    let stage = Stage::load(tmp.path(), &mut sprites).unwrap();
    let npc = stage.object(ObjectIndex(0)).unwrap();
    let frame = npc.current_frame().unwrap();
    assert_eq!(sprites.path(frame), Some(root.join("blue/2/0.png").as_path()));
    assert_eq!(sprites.frame_count(), 20);
}
