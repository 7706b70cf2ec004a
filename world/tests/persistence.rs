use grid_crawl_core::{
    Grid, ItemRecord, MonsterRecord, PlayerRecord, SaveGame, Tile, VisitedRecord,
};
use grid_crawl_world::{query, restore, snapshot, DungeonConfig, World};

#[test]
fn mismatched_visited_dimensions_rebuild_the_grid() {
    let mut world = World::new(DungeonConfig::new(13, 13, 21));
    let mut save = snapshot(&world);
    save.visited = Some(VisitedRecord {
        width: 4,
        height: 4,
        cells: vec![true; 16],
    });

    restore(&mut world, &save);

    let player = query::player(&world);
    let visited = query::visited(&world);
    assert_eq!(
        visited.dimensions(),
        (query::grid(&world).width(), query::grid(&world).height())
    );
    // Rebuilt all-false except the player's current cell.
    assert!(visited.contains(player.position));
    let other_floor = query::grid(&world)
        .floor_cells()
        .find(|cell| *cell != player.position)
        .expect("maze has more than one floor cell");
    assert!(!visited.contains(other_floor));
}

#[test]
fn missing_fields_fall_back_to_current_values() {
    let mut world = World::new(DungeonConfig::new(13, 13, 21));
    let before = query::player(&world);
    let items_before = query::items(&world);

    restore(&mut world, &SaveGame::default());

    let after = query::player(&world);
    assert_eq!(after.position, before.position);
    assert_eq!(after.hp, before.hp);
    assert_eq!(after.gold, before.gold);
    // Entity lists untouched when absent from the record.
    assert_eq!(query::items(&world), items_before);
}

#[test]
fn player_position_on_a_wall_is_rejected() {
    let mut world = World::new(DungeonConfig::new(13, 13, 21));
    let before = query::player(&world).position;
    let save = SaveGame {
        player: Some(PlayerRecord {
            x: Some(0),
            y: Some(0),
            ..PlayerRecord::default()
        }),
        ..SaveGame::default()
    };

    restore(&mut world, &save);

    assert_eq!(query::player(&world).position, before);
}

#[test]
fn malformed_grid_is_ignored() {
    let mut world = World::new(DungeonConfig::new(13, 13, 21));
    let before = query::grid(&world).clone();
    let save = SaveGame {
        grid: Some(Grid::from_tiles(3, 3, vec![Tile::Wall; 9]).expect("grid builds")),
        ..SaveGame::default()
    };

    // An all-wall grid is not a plausible dungeon and must not replace the
    // current map.
    restore(&mut world, &save);
    assert_eq!(query::grid(&world), &before);
}

#[test]
fn entity_records_on_walls_or_with_unknown_kinds_are_dropped() {
    let mut world = World::new(DungeonConfig::new(13, 13, 21));
    let floor = query::grid(&world)
        .floor_cells()
        .find(|cell| *cell != query::player(&world).position)
        .expect("floor cell exists");
    let save = SaveGame {
        items: Some(vec![
            ItemRecord {
                x: Some(0),
                y: Some(0),
                kind: Some("gold".to_owned()),
                amount: Some(5),
                ..ItemRecord::default()
            },
            ItemRecord {
                x: Some(floor.x()),
                y: Some(floor.y()),
                kind: Some("artifact".to_owned()),
                ..ItemRecord::default()
            },
            ItemRecord {
                x: Some(floor.x()),
                y: Some(floor.y()),
                kind: Some("gold".to_owned()),
                amount: None,
                ..ItemRecord::default()
            },
        ]),
        monsters: Some(vec![MonsterRecord {
            x: Some(floor.x()),
            y: Some(floor.y()),
            name: None,
            hp: None,
            attack: None,
        }]),
        ..SaveGame::default()
    };

    restore(&mut world, &save);

    // Only the defaulted gold pile survives; wall and unknown kinds vanish.
    let items = query::items(&world);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].position, floor);
    // The monster record is rebuilt entirely from defaults.
    let monsters = query::monsters(&world);
    assert_eq!(monsters.len(), 1);
    assert!(monsters[0].hp > 0);
    assert!(!monsters[0].name.is_empty());
}

#[test]
fn weapon_fields_restore_independently() {
    let mut world = World::new(DungeonConfig::new(13, 13, 21));
    let save = SaveGame {
        player: Some(PlayerRecord {
            weapon_name: Some("Iron Mace".to_owned()),
            weapon_attack: Some(5),
            ..PlayerRecord::default()
        }),
        ..SaveGame::default()
    };

    restore(&mut world, &save);

    let player = query::player(&world);
    let weapon = player.weapon.expect("weapon restored");
    assert_eq!(weapon.name(), "Iron Mace");
    assert_eq!(weapon.attack(), 5);
    assert_eq!(player.effective_attack, player.base_attack + 5);
}
