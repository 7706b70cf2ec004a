#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Grid Crawl.
//!
//! The world exclusively owns the grid, the player, the entity lists, the
//! visited set and the message queue. Adapters mutate it only through
//! [`apply`] and read it only through the [`query`] module; rendering never
//! touches state directly.

use grid_crawl_core::{
    Command, Event, Facing, Grid, GridPos, ItemKind, ItemRecord, MonsterRecord, PlayerRecord,
    SaveGame, Tile, VisitedRecord, WeaponSpec,
};
use grid_crawl_system_mazegen as mazegen;

const DEFAULT_WIDTH: u32 = 21;
const DEFAULT_HEIGHT: u32 = 21;
const DEFAULT_SEED: u64 = 0x6d61_7a65_6372_6177;

const PLAYER_START: GridPos = GridPos::new(1, 1);
const PLAYER_START_HP: i32 = 10;
const PLAYER_BASE_ATTACK: i32 = 2;

const GOLD_PILE_COUNT: usize = 6;
const GOLD_PILE_MIN: i32 = 5;
const GOLD_PILE_SPREAD: u64 = 16;

const SCATTER_RNG_MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const SCATTER_RNG_INCREMENT: u64 = 1;

const WEAPON_TABLE: [(&str, i32); 2] = [("Rusty Sword", 3), ("Iron Mace", 5)];
const MONSTER_TABLE: [(&str, i32, i32); 4] = [
    ("Giant Rat", 3, 1),
    ("Skeleton", 5, 2),
    ("Orc", 8, 3),
    ("Cave Troll", 12, 4),
];

const FALLBACK_MONSTER_NAME: &str = "Skeleton";
const FALLBACK_MONSTER_HP: i32 = 5;
const FALLBACK_MONSTER_ATTACK: i32 = 1;
const FALLBACK_GOLD_AMOUNT: i32 = 10;
const FALLBACK_WEAPON_NAME: &str = "Worn Blade";
const FALLBACK_WEAPON_ATTACK: i32 = 1;

/// Parameters used to carve and populate a fresh dungeon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DungeonConfig {
    width: u32,
    height: u32,
    seed: u64,
}

impl DungeonConfig {
    /// Creates a new dungeon configuration.
    #[must_use]
    pub const fn new(width: u32, height: u32, seed: u64) -> Self {
        Self {
            width,
            height,
            seed,
        }
    }

    /// Requested column count before odd-normalization.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Requested row count before odd-normalization.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Seed driving both maze carving and entity placement.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT, DEFAULT_SEED)
    }
}

#[derive(Clone, Debug)]
struct Player {
    position: GridPos,
    facing: Facing,
    hp: i32,
    gold: i32,
    base_attack: i32,
    weapon: Option<WeaponSpec>,
}

impl Player {
    fn at_start() -> Self {
        Self {
            position: PLAYER_START,
            facing: Facing::East,
            hp: PLAYER_START_HP,
            gold: 0,
            base_attack: PLAYER_BASE_ATTACK,
            weapon: None,
        }
    }

    fn effective_attack(&self) -> i32 {
        self.base_attack
            + self
                .weapon
                .as_ref()
                .map_or(0, grid_crawl_core::WeaponSpec::attack)
    }

    fn weapon_attack(&self) -> i32 {
        self.weapon
            .as_ref()
            .map_or(0, grid_crawl_core::WeaponSpec::attack)
    }
}

#[derive(Clone, Debug)]
struct Item {
    position: GridPos,
    kind: ItemKind,
}

#[derive(Clone, Debug)]
struct Monster {
    position: GridPos,
    name: String,
    hp: i32,
    attack: i32,
}

/// Monotonic boolean grid tracking every cell the player has occupied.
#[derive(Clone, Debug)]
struct VisitedGrid {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl VisitedGrid {
    fn sized_to(grid: &Grid) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            cells: vec![false; (grid.width() * grid.height()) as usize],
        }
    }

    fn mark(&mut self, pos: GridPos) {
        if let Some(index) = self.index(pos) {
            self.cells[index] = true;
        }
    }

    fn contains(&self, pos: GridPos) -> bool {
        self.index(pos).map_or(false, |index| self.cells[index])
    }

    fn index(&self, pos: GridPos) -> Option<usize> {
        if pos.x() < 0 || pos.y() < 0 {
            return None;
        }
        let (x, y) = (pos.x() as u32, pos.y() as u32);
        if x < self.width && y < self.height {
            Some((y * self.width + x) as usize)
        } else {
            None
        }
    }

    fn matches(&self, grid: &Grid) -> bool {
        self.width == grid.width()
            && self.height == grid.height()
            && self.cells.len() == (self.width * self.height) as usize
    }
}

/// Represents the authoritative Grid Crawl world state.
#[derive(Clone, Debug)]
pub struct World {
    grid: Grid,
    player: Player,
    items: Vec<Item>,
    monsters: Vec<Monster>,
    visited: VisitedGrid,
    messages: Vec<String>,
}

impl World {
    /// Carves and populates a new dungeon from the provided configuration.
    #[must_use]
    pub fn new(config: DungeonConfig) -> Self {
        let grid = mazegen::generate(config.width(), config.height(), config.seed());
        let mut visited = VisitedGrid::sized_to(&grid);
        visited.mark(PLAYER_START);
        let (items, monsters) = scatter_entities(&grid, config.seed());
        Self {
            grid,
            player: Player::at_start(),
            items,
            monsters,
            visited,
            messages: Vec::new(),
        }
    }

    /// Rotates a camera-space `(forward, right)` offset into world
    /// coordinates relative to the player.
    ///
    /// This is the single shared primitive between gameplay and the
    /// renderer; it is exact integer arithmetic, never trigonometry.
    #[must_use]
    pub fn transform_local(&self, forward: i32, right: i32) -> GridPos {
        let (dx, dy) = self.player.facing.rotate_local(forward, right);
        self.player.position.offset(dx, dy)
    }

    /// Removes and returns every pending event message in order.
    ///
    /// Messages are delivered at most once; draining clears the queue.
    #[must_use]
    pub fn drain_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }

    fn monster_index_at(&self, pos: GridPos) -> Option<usize> {
        self.monsters
            .iter()
            .position(|monster| monster.position == pos)
    }

    fn item_index_at(&self, pos: GridPos) -> Option<usize> {
        self.items.iter().position(|item| item.position == pos)
    }

    fn push_message(&mut self, message: String) {
        self.messages.push(message);
    }

    fn step(&mut self, towards_back: bool, out_events: &mut Vec<Event>) {
        let (dx, dy) = self.player.facing.forward_vector();
        let (dx, dy) = if towards_back { (-dx, -dy) } else { (dx, dy) };
        let candidate = self.player.position.offset(dx, dy);

        if let Some(index) = self.monster_index_at(candidate) {
            self.resolve_combat(index, candidate, out_events);
        } else if self.grid.is_wall(candidate.x(), candidate.y()) {
            // Walking into a wall is a valid, silent outcome.
            out_events.push(Event::StepBlocked { at: candidate });
        } else {
            self.enter_cell(candidate, out_events);
        }
    }

    fn resolve_combat(&mut self, index: usize, cell: GridPos, out_events: &mut Vec<Event>) {
        let damage = self.player.effective_attack().max(0);
        self.monsters[index].hp -= damage;

        if self.monsters[index].hp <= 0 {
            let slain = self.monsters.remove(index);
            self.push_message(format!(
                "You strike the {} for {damage} damage, slaying it!",
                slain.name
            ));
            out_events.push(Event::MonsterSlain {
                name: slain.name,
                at: cell,
                damage,
            });
            // The vacated cell is claimed in the same turn.
            self.enter_cell(cell, out_events);
            return;
        }

        let monster_name = self.monsters[index].name.clone();
        let remaining_hp = self.monsters[index].hp;
        let retaliation = self.monsters[index].attack.max(0);
        self.player.hp -= retaliation;
        self.push_message(format!(
            "You strike the {monster_name} for {damage} damage; it hits back for {retaliation}."
        ));
        out_events.push(Event::MonsterStruck {
            name: monster_name.clone(),
            damage,
            remaining_hp,
            retaliation,
        });

        if self.player.hp <= 0 {
            self.push_message(format!(
                "The {monster_name} brings you down. Your delve ends here."
            ));
            out_events.push(Event::PlayerDefeated { by: monster_name });
        }
    }

    fn enter_cell(&mut self, cell: GridPos, out_events: &mut Vec<Event>) {
        let from = self.player.position;
        self.player.position = cell;
        self.visited.mark(cell);
        out_events.push(Event::PlayerMoved { from, to: cell });
        self.pick_up_at(cell, out_events);
    }

    fn pick_up_at(&mut self, cell: GridPos, out_events: &mut Vec<Event>) {
        let Some(index) = self.item_index_at(cell) else {
            return;
        };
        let item = self.items.remove(index);
        match item.kind {
            ItemKind::Gold { amount } => {
                self.player.gold += amount;
                let total = self.player.gold;
                self.push_message(format!("You pocket {amount} gold ({total} total)."));
                out_events.push(Event::GoldCollected {
                    at: cell,
                    amount,
                    total,
                });
            }
            ItemKind::Weapon(weapon) => {
                if weapon.attack() > self.player.weapon_attack() {
                    self.push_message(format!(
                        "You equip the {} (+{} attack).",
                        weapon.name(),
                        weapon.attack()
                    ));
                    self.player.weapon = Some(weapon.clone());
                    out_events.push(Event::WeaponEquipped { weapon });
                } else {
                    // Ties keep the current weapon; the find is still removed.
                    self.push_message(format!(
                        "You leave the {} behind; your current weapon serves better.",
                        weapon.name()
                    ));
                    out_events.push(Event::WeaponDiscarded { weapon });
                }
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(DungeonConfig::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::TurnLeft => {
            world.player.facing = world.player.facing.turned_left();
            out_events.push(Event::PlayerTurned {
                facing: world.player.facing,
            });
        }
        Command::TurnRight => {
            world.player.facing = world.player.facing.turned_right();
            out_events.push(Event::PlayerTurned {
                facing: world.player.facing,
            });
        }
        Command::StepForward => world.step(false, out_events),
        Command::StepBack => world.step(true, out_events),
    }
}

/// Captures the complete world state as a persistable record.
#[must_use]
pub fn snapshot(world: &World) -> SaveGame {
    SaveGame {
        grid: Some(world.grid.clone()),
        player: Some(PlayerRecord {
            x: Some(world.player.position.x()),
            y: Some(world.player.position.y()),
            facing: Some(world.player.facing.index()),
            hp: Some(world.player.hp),
            gold: Some(world.player.gold),
            base_attack: Some(world.player.base_attack),
            weapon_name: world
                .player
                .weapon
                .as_ref()
                .map(|weapon| weapon.name().to_owned()),
            weapon_attack: world.player.weapon.as_ref().map(WeaponSpec::attack),
        }),
        visited: Some(VisitedRecord {
            width: world.visited.width,
            height: world.visited.height,
            cells: world.visited.cells.clone(),
        }),
        items: Some(
            world
                .items
                .iter()
                .map(|item| match &item.kind {
                    ItemKind::Gold { amount } => ItemRecord {
                        x: Some(item.position.x()),
                        y: Some(item.position.y()),
                        kind: Some("gold".to_owned()),
                        amount: Some(*amount),
                        name: None,
                        attack: None,
                    },
                    ItemKind::Weapon(weapon) => ItemRecord {
                        x: Some(item.position.x()),
                        y: Some(item.position.y()),
                        kind: Some("weapon".to_owned()),
                        amount: None,
                        name: Some(weapon.name().to_owned()),
                        attack: Some(weapon.attack()),
                    },
                })
                .collect(),
        ),
        monsters: Some(
            world
                .monsters
                .iter()
                .map(|monster| MonsterRecord {
                    x: Some(monster.position.x()),
                    y: Some(monster.position.y()),
                    name: Some(monster.name.clone()),
                    hp: Some(monster.hp),
                    attack: Some(monster.attack),
                })
                .collect(),
        ),
    }
}

/// Restores world state from a persisted record, field by field.
///
/// Missing or malformed fields fall back to the current value or a sensible
/// default; the restore never fails and never leaves the world partially
/// corrupt. A visited record with mismatched dimensions is discarded and
/// rebuilt all-false with the player's cell re-marked.
pub fn restore(world: &mut World, save: &SaveGame) {
    if let Some(grid) = save.grid.as_ref().filter(|grid| grid.is_well_formed()) {
        world.grid = grid.clone();
    }

    restore_player(world, save.player.as_ref());

    let rebuilt = match save.visited.as_ref() {
        Some(record) => {
            let candidate = VisitedGrid {
                width: record.width,
                height: record.height,
                cells: record.cells.clone(),
            };
            if candidate.matches(&world.grid) {
                candidate
            } else {
                VisitedGrid::sized_to(&world.grid)
            }
        }
        None => VisitedGrid::sized_to(&world.grid),
    };
    world.visited = rebuilt;
    world.visited.mark(world.player.position);

    if let Some(records) = save.items.as_ref() {
        world.items = records
            .iter()
            .filter_map(|record| restore_item(&world.grid, record))
            .collect();
    }
    if let Some(records) = save.monsters.as_ref() {
        let player_cell = world.player.position;
        world.monsters = records
            .iter()
            .filter_map(|record| restore_monster(&world.grid, record))
            .filter(|monster| monster.position != player_cell)
            .collect();
    }
}

fn restore_player(world: &mut World, record: Option<&PlayerRecord>) {
    let Some(record) = record else {
        return;
    };

    let candidate = GridPos::new(
        record.x.unwrap_or_else(|| world.player.position.x()),
        record.y.unwrap_or_else(|| world.player.position.y()),
    );
    world.player.position = if !world.grid.is_wall(candidate.x(), candidate.y()) {
        candidate
    } else if !world
        .grid
        .is_wall(world.player.position.x(), world.player.position.y())
    {
        world.player.position
    } else {
        // The grid changed under the player; fall back to the first floor
        // cell, which generation guarantees to exist at (1, 1).
        world.grid.floor_cells().next().unwrap_or(PLAYER_START)
    };

    if let Some(facing) = record.facing {
        world.player.facing = Facing::from_index(facing);
    }
    if let Some(hp) = record.hp {
        world.player.hp = hp;
    }
    if let Some(gold) = record.gold {
        world.player.gold = gold;
    }
    if let Some(base_attack) = record.base_attack {
        world.player.base_attack = base_attack;
    }
    world.player.weapon = match (&record.weapon_name, record.weapon_attack) {
        (Some(name), attack) => Some(WeaponSpec::new(
            name.clone(),
            attack.unwrap_or(FALLBACK_WEAPON_ATTACK),
        )),
        (None, Some(attack)) => Some(WeaponSpec::new(FALLBACK_WEAPON_NAME, attack)),
        (None, None) => None,
    };
}

fn restore_item(grid: &Grid, record: &ItemRecord) -> Option<Item> {
    let position = GridPos::new(record.x?, record.y?);
    if grid.is_wall(position.x(), position.y()) {
        return None;
    }
    let kind = match record.kind.as_deref() {
        Some("gold") => ItemKind::Gold {
            amount: record.amount.unwrap_or(FALLBACK_GOLD_AMOUNT),
        },
        Some("weapon") => ItemKind::Weapon(WeaponSpec::new(
            record.name.clone().unwrap_or_else(|| {
                FALLBACK_WEAPON_NAME.to_owned()
            }),
            record.attack.unwrap_or(FALLBACK_WEAPON_ATTACK),
        )),
        _ => return None,
    };
    Some(Item { position, kind })
}

fn restore_monster(grid: &Grid, record: &MonsterRecord) -> Option<Monster> {
    let position = GridPos::new(record.x?, record.y?);
    if grid.is_wall(position.x(), position.y()) {
        return None;
    }
    Some(Monster {
        position,
        name: record
            .name
            .clone()
            .unwrap_or_else(|| FALLBACK_MONSTER_NAME.to_owned()),
        hp: record.hp.unwrap_or(FALLBACK_MONSTER_HP),
        attack: record.attack.unwrap_or(FALLBACK_MONSTER_ATTACK),
    })
}

fn scatter_entities(grid: &Grid, seed: u64) -> (Vec<Item>, Vec<Monster>) {
    let mut cells: Vec<GridPos> = grid
        .floor_cells()
        .filter(|cell| *cell != PLAYER_START)
        .collect();

    // Fisher-Yates over the floor cells so placement never collides and
    // never lands on a wall.
    let mut rng_state = seed ^ SCATTER_RNG_MULTIPLIER;
    for index in (1..cells.len()).rev() {
        rng_state = next_random(rng_state);
        let swap_index = (rng_state % (index as u64 + 1)) as usize;
        cells.swap(index, swap_index);
    }

    let mut slots = cells.into_iter();
    let mut items = Vec::new();
    let mut monsters = Vec::new();

    for _ in 0..GOLD_PILE_COUNT {
        let Some(position) = slots.next() else { break };
        rng_state = next_random(rng_state);
        let amount = GOLD_PILE_MIN + (rng_state % GOLD_PILE_SPREAD) as i32;
        items.push(Item {
            position,
            kind: ItemKind::Gold { amount },
        });
    }

    for (name, attack) in WEAPON_TABLE {
        let Some(position) = slots.next() else { break };
        items.push(Item {
            position,
            kind: ItemKind::Weapon(WeaponSpec::new(name, attack)),
        });
    }

    for (name, hp, attack) in MONSTER_TABLE {
        let Some(position) = slots.next() else { break };
        monsters.push(Monster {
            position,
            name: name.to_owned(),
            hp,
            attack,
        });
    }

    (items, monsters)
}

fn next_random(state: u64) -> u64 {
    state
        .wrapping_mul(SCATTER_RNG_MULTIPLIER)
        .wrapping_add(SCATTER_RNG_INCREMENT)
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Monster, VisitedGrid, World};
    use grid_crawl_core::{Facing, Grid, GridPos, ItemKind, WeaponSpec};

    /// Provides read-only access to the dungeon tile map.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Reports whether a coordinate blocks movement; out-of-bounds counts
    /// as wall.
    #[must_use]
    pub fn is_wall(world: &World, x: i32, y: i32) -> bool {
        world.grid.is_wall(x, y)
    }

    /// Captures an immutable snapshot of the player.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            position: world.player.position,
            facing: world.player.facing,
            hp: world.player.hp,
            gold: world.player.gold,
            base_attack: world.player.base_attack,
            weapon: world.player.weapon.clone(),
            effective_attack: world.player.effective_attack(),
        }
    }

    /// Captures the items currently lying on the floor.
    #[must_use]
    pub fn items(world: &World) -> Vec<ItemSnapshot> {
        world
            .items
            .iter()
            .map(|item| ItemSnapshot {
                position: item.position,
                kind: item.kind.clone(),
            })
            .collect()
    }

    /// Captures the monsters still standing.
    #[must_use]
    pub fn monsters(world: &World) -> Vec<MonsterSnapshot> {
        world.monsters.iter().map(MonsterSnapshot::from).collect()
    }

    /// Returns the monster occupying the provided cell, if any.
    #[must_use]
    pub fn monster_at(world: &World, pos: GridPos) -> Option<MonsterSnapshot> {
        world
            .monsters
            .iter()
            .find(|monster| monster.position == pos)
            .map(MonsterSnapshot::from)
    }

    /// Returns the item occupying the provided cell, if any.
    #[must_use]
    pub fn item_at(world: &World, pos: GridPos) -> Option<ItemSnapshot> {
        world
            .items
            .iter()
            .find(|item| item.position == pos)
            .map(|item| ItemSnapshot {
                position: item.position,
                kind: item.kind.clone(),
            })
    }

    /// Exposes a read-only view of the visited set.
    #[must_use]
    pub fn visited(world: &World) -> VisitedView<'_> {
        VisitedView {
            grid: &world.visited,
        }
    }

    /// Immutable representation of the player used for presentation.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct PlayerSnapshot {
        /// Cell currently occupied; always a floor tile.
        pub position: GridPos,
        /// Direction the camera faces.
        pub facing: Facing,
        /// Remaining hit points.
        pub hp: i32,
        /// Coins carried.
        pub gold: i32,
        /// Attack value before weapon bonuses.
        pub base_attack: i32,
        /// Equipped weapon, if any.
        pub weapon: Option<WeaponSpec>,
        /// Base attack plus weapon bonus.
        pub effective_attack: i32,
    }

    /// Immutable representation of a floor item.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct ItemSnapshot {
        /// Cell the item occupies.
        pub position: GridPos,
        /// Payload granted on pickup.
        pub kind: ItemKind,
    }

    /// Immutable representation of a monster.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct MonsterSnapshot {
        /// Cell the monster occupies.
        pub position: GridPos,
        /// Display name.
        pub name: String,
        /// Remaining hit points.
        pub hp: i32,
        /// Damage dealt when retaliating.
        pub attack: i32,
    }

    impl From<&Monster> for MonsterSnapshot {
        fn from(monster: &Monster) -> Self {
            Self {
                position: monster.position,
                name: monster.name.clone(),
                hp: monster.hp,
                attack: monster.attack,
            }
        }
    }

    /// Read-only view into the visited set.
    #[derive(Clone, Copy, Debug)]
    pub struct VisitedView<'a> {
        grid: &'a VisitedGrid,
    }

    impl VisitedView<'_> {
        /// Reports whether the player has ever occupied the cell.
        #[must_use]
        pub fn contains(&self, pos: GridPos) -> bool {
            self.grid.contains(pos)
        }

        /// Dimensions of the underlying boolean grid.
        #[must_use]
        pub const fn dimensions(&self) -> (u32, u32) {
            (self.grid.width, self.grid.height)
        }
    }
}

// Test-only constructors used by integration tests to build deterministic
// fixtures without relying on generation internals.
#[doc(hidden)]
pub mod fixture {
    use super::{Item, Monster, Player, VisitedGrid, World};
    use grid_crawl_core::{Facing, Grid, GridPos, ItemKind};

    /// Builds a world around a prepared grid with no scattered entities.
    #[must_use]
    pub fn empty_world(grid: Grid, player_at: GridPos, facing: Facing) -> World {
        let mut visited = VisitedGrid::sized_to(&grid);
        visited.mark(player_at);
        World {
            grid,
            player: Player {
                position: player_at,
                facing,
                ..Player::at_start()
            },
            items: Vec::new(),
            monsters: Vec::new(),
            visited,
            messages: Vec::new(),
        }
    }

    /// Places an item on the provided cell.
    pub fn place_item(world: &mut World, pos: GridPos, kind: ItemKind) {
        world.items.push(Item {
            position: pos,
            kind,
        });
    }

    /// Places a monster on the provided cell.
    pub fn place_monster(world: &mut World, pos: GridPos, name: &str, hp: i32, attack: i32) {
        world.monsters.push(Monster {
            position: pos,
            name: name.to_owned(),
            hp,
            attack,
        });
    }

    /// Overrides the player's hit points.
    pub fn set_player_hp(world: &mut World, hp: i32) {
        world.player.hp = hp;
    }
}
