use grid_crawl_core::{Command, Event, Facing, Grid, GridPos, ItemKind, Tile, WeaponSpec};
use grid_crawl_world::{apply, fixture, query, World};

fn open_room(side: u32) -> Grid {
    let mut tiles = vec![Tile::Wall; (side * side) as usize];
    for y in 1..side - 1 {
        for x in 1..side - 1 {
            tiles[(y * side + x) as usize] = Tile::Floor;
        }
    }
    Grid::from_tiles(side, side, tiles).expect("room grid builds")
}

fn room_world(facing: Facing) -> World {
    fixture::empty_world(open_room(7), GridPos::new(3, 3), facing)
}

#[test]
fn stepping_into_a_wall_leaves_player_in_place() {
    let mut world = fixture::empty_world(open_room(5), GridPos::new(1, 1), Facing::West);
    let mut events = Vec::new();

    apply(&mut world, Command::StepForward, &mut events);

    assert_eq!(query::player(&world).position, GridPos::new(1, 1));
    assert_eq!(
        events,
        vec![Event::StepBlocked {
            at: GridPos::new(0, 1)
        }]
    );
    assert!(world.drain_messages().is_empty());
}

#[test]
fn stepping_back_moves_against_the_facing() {
    let mut world = room_world(Facing::East);
    let mut events = Vec::new();

    apply(&mut world, Command::StepBack, &mut events);

    assert_eq!(query::player(&world).position, GridPos::new(2, 3));
}

#[test]
fn moving_marks_cells_visited_monotonically() {
    let mut world = room_world(Facing::East);
    let mut events = Vec::new();

    apply(&mut world, Command::StepForward, &mut events);
    apply(&mut world, Command::StepBack, &mut events);

    let visited = query::visited(&world);
    assert!(visited.contains(GridPos::new(3, 3)));
    assert!(visited.contains(GridPos::new(4, 3)));
}

#[test]
fn gold_pickup_adds_exact_amount_and_removes_item() {
    let mut world = room_world(Facing::East);
    fixture::place_item(&mut world, GridPos::new(4, 3), ItemKind::Gold { amount: 10 });
    let mut events = Vec::new();

    apply(&mut world, Command::StepForward, &mut events);

    let player = query::player(&world);
    assert_eq!(player.gold, 10);
    assert!(query::item_at(&world, GridPos::new(4, 3)).is_none());
    assert_eq!(world.drain_messages().len(), 1);
}

#[test]
fn stronger_weapon_replaces_the_equipped_one() {
    let mut world = room_world(Facing::East);
    fixture::place_item(
        &mut world,
        GridPos::new(4, 3),
        ItemKind::Weapon(WeaponSpec::new("Iron Mace", 5)),
    );
    let mut events = Vec::new();

    apply(&mut world, Command::StepForward, &mut events);

    let player = query::player(&world);
    assert_eq!(player.weapon, Some(WeaponSpec::new("Iron Mace", 5)));
    assert_eq!(player.effective_attack, player.base_attack + 5);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::WeaponEquipped { .. })));
}

#[test]
fn weaker_weapon_is_left_behind_but_still_removed() {
    let mut world = room_world(Facing::East);
    fixture::place_item(
        &mut world,
        GridPos::new(4, 3),
        ItemKind::Weapon(WeaponSpec::new("Iron Mace", 5)),
    );
    fixture::place_item(
        &mut world,
        GridPos::new(5, 3),
        ItemKind::Weapon(WeaponSpec::new("Rusty Sword", 3)),
    );
    let mut events = Vec::new();

    apply(&mut world, Command::StepForward, &mut events);
    apply(&mut world, Command::StepForward, &mut events);

    let player = query::player(&world);
    assert_eq!(player.weapon, Some(WeaponSpec::new("Iron Mace", 5)));
    assert!(query::item_at(&world, GridPos::new(5, 3)).is_none());
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::WeaponDiscarded { .. })));
    let messages = world.drain_messages();
    assert_eq!(messages.len(), 2);
    assert!(messages[1].contains("leave"));
}

#[test]
fn lethal_strike_removes_monster_and_completes_the_move() {
    let mut world = room_world(Facing::East);
    fixture::place_monster(&mut world, GridPos::new(4, 3), "Giant Rat", 3, 1);
    // Base attack 2 plus this weapon reaches effective attack 5.
    fixture::place_item(
        &mut world,
        GridPos::new(2, 3),
        ItemKind::Weapon(WeaponSpec::new("Iron Mace", 3)),
    );
    let mut events = Vec::new();
    apply(&mut world, Command::StepBack, &mut events);
    apply(&mut world, Command::StepForward, &mut events);
    let _ = world.drain_messages();
    events.clear();

    apply(&mut world, Command::StepForward, &mut events);

    assert!(query::monster_at(&world, GridPos::new(4, 3)).is_none());
    assert_eq!(query::player(&world).position, GridPos::new(4, 3));
    assert_eq!(query::player(&world).hp, 10);
    let messages = world.drain_messages();
    assert_eq!(messages.len(), 1, "exactly one victory message expected");
    assert!(matches!(
        events.as_slice(),
        [Event::MonsterSlain { .. }, Event::PlayerMoved { .. }]
    ));
}

#[test]
fn surviving_monster_retaliates_and_blocks_the_move() {
    let mut world = room_world(Facing::East);
    fixture::place_monster(&mut world, GridPos::new(4, 3), "Skeleton", 5, 2);
    let mut events = Vec::new();

    apply(&mut world, Command::StepForward, &mut events);

    let monster = query::monster_at(&world, GridPos::new(4, 3)).expect("monster survives");
    assert_eq!(monster.hp, 3);
    let player = query::player(&world);
    assert_eq!(player.position, GridPos::new(3, 3));
    assert_eq!(player.hp, 8);
    assert_eq!(world.drain_messages().len(), 1);
    assert_eq!(
        events,
        vec![Event::MonsterStruck {
            name: "Skeleton".to_owned(),
            damage: 2,
            remaining_hp: 3,
            retaliation: 2,
        }]
    );
}

#[test]
fn fatal_retaliation_queues_a_defeat_message() {
    let mut world = room_world(Facing::East);
    fixture::place_monster(&mut world, GridPos::new(4, 3), "Cave Troll", 12, 4);
    fixture::set_player_hp(&mut world, 3);
    let mut events = Vec::new();

    apply(&mut world, Command::StepForward, &mut events);

    assert!(query::player(&world).hp <= 0);
    let messages = world.drain_messages();
    assert_eq!(messages.len(), 2, "combat report plus defeat notice");
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::PlayerDefeated { .. })));
}

#[test]
fn repeated_attacks_wear_a_monster_down() {
    let mut world = room_world(Facing::East);
    fixture::place_monster(&mut world, GridPos::new(4, 3), "Skeleton", 5, 2);
    let mut events = Vec::new();

    apply(&mut world, Command::StepForward, &mut events);
    apply(&mut world, Command::StepForward, &mut events);
    apply(&mut world, Command::StepForward, &mut events);

    // Three strikes of 2 damage clear 5 hp on the third blow.
    assert!(query::monster_at(&world, GridPos::new(4, 3)).is_none());
    assert_eq!(query::player(&world).position, GridPos::new(4, 3));
    assert_eq!(query::player(&world).hp, 10 - 2 - 2);
}

#[test]
fn drained_messages_are_not_delivered_twice() {
    let mut world = room_world(Facing::East);
    fixture::place_item(&mut world, GridPos::new(4, 3), ItemKind::Gold { amount: 7 });
    let mut events = Vec::new();

    apply(&mut world, Command::StepForward, &mut events);

    assert_eq!(world.drain_messages().len(), 1);
    assert!(world.drain_messages().is_empty());
}

#[test]
fn transform_local_rotates_by_facing() {
    let cases = [
        (Facing::North, GridPos::new(3, 2)),
        (Facing::East, GridPos::new(4, 3)),
        (Facing::South, GridPos::new(3, 4)),
        (Facing::West, GridPos::new(2, 3)),
    ];
    for (facing, expected) in cases {
        let world = room_world(facing);
        assert_eq!(world.transform_local(1, 0), expected, "facing {facing:?}");
    }

    // One step ahead, one to the right, while facing North.
    let world = room_world(Facing::North);
    assert_eq!(world.transform_local(1, 1), GridPos::new(4, 2));
}
