//! Property-based tests for stage lookups.

use gridwalk_stage::prelude::*;
use proptest::prelude::*;

fn arb_direction() -> impl Strategy<Value = Direction> {
    prop::sample::select(Direction::ALL.to_vec())
}

fn arb_tile() -> impl Strategy<Value = Tile> {
    (1i32..30, 1i32..30).prop_map(|(x, y)| Tile::new(x, y))
}

/// Open 32x32 stage with random blocked tiles.
fn arb_stage() -> impl Strategy<Value = Stage> {
    prop::collection::vec(prop::bool::weighted(0.3), 32 * 32).prop_map(|blocked| {
        let ids = blocked.into_iter().map(i32::from).collect();
        let grid = TileGrid::new(32, 32, ids).unwrap();
        let mut properties = PropertyTable::new();
        properties.insert(1, TileProperty::BLOCKED);
        Stage::new(grid, properties, vec![], vec![], vec![])
    })
}

proptest! {
    #[test]
    fn aligned_entity_covers_only_its_tile(
        tile in arb_tile(),
        facing in arb_direction(),
        dx in -2i32..=2,
        dy in -2i32..=2,
    ) {
        let entity = Entity::new(1, tile).with_direction(facing);
        let query = Tile::new(tile.x + dx, tile.y + dy).origin();
        prop_assert_eq!(hitbox_covers(&entity, query), dx == 0 && dy == 0);
    }

    #[test]
    fn moving_entity_covers_its_destination(
        tile in arb_tile(),
        heading in arb_direction(),
        pixels in 1i32..16,
    ) {
        let mut entity = Entity::new(1, tile).with_direction(heading);
        for _ in 0..pixels {
            entity.step_forward();
        }
        let (dx, dy) = heading.delta();
        let destination = Tile::new(tile.x + dx, tile.y + dy).origin();
        prop_assert!(hitbox_covers(&entity, destination));
        prop_assert!(!hitbox_covers(&entity, tile.origin()));
    }

    #[test]
    fn off_map_is_blocked_without_warps(
        x in -64i32..600,
        y in -64i32..600,
    ) {
        let grid = TileGrid::new(32, 32, vec![0; 32 * 32]).unwrap();
        let stage = Stage::new(grid, PropertyTable::new(), vec![], vec![], vec![]);
        let inside = (0..512).contains(&x) && (0..512).contains(&y);
        prop_assert_eq!(stage.tile_property(Point::new(x, y)).is_blocked(), !inside);
    }

    #[test]
    fn clear_steps_never_enter_blocked_tiles(
        mut stage in arb_stage(),
        tile in arb_tile(),
        heading in arb_direction(),
    ) {
        let index = stage.spawn(Entity::new(900, tile).with_kind(EntityKind::Player));
        let target = stage.object(index).unwrap().ahead_toward(heading);
        let check = stage.check_step(index, heading);
        prop_assert_eq!(check.is_clear(), !stage.tile_property(target).is_blocked());
    }
}
