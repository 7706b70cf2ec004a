#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Grid Crawl engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! actually happened. View types such as [`DepthScan`] live here so rendering
//! adapters can consume system output without depending on system crates.

use serde::{Deserialize, Serialize};

/// State of a single dungeon cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Walkable ground.
    Floor,
    /// Solid rock that blocks movement and line of sight.
    Wall,
}

impl Tile {
    /// Reports whether the tile blocks movement and sight.
    #[must_use]
    pub const fn is_wall(self) -> bool {
        matches!(self, Self::Wall)
    }
}

/// Location of a single grid cell.
///
/// Coordinates are signed so that probe positions may leave the map; every
/// out-of-bounds coordinate behaves like a wall when queried through
/// [`Grid::is_wall`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    x: i32,
    y: i32,
}

impl GridPos {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate, growing eastward.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical coordinate, growing southward.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the position displaced by the provided deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Dense rectangular tile map produced by the maze generator.
///
/// The grid is immutable once generated; gameplay never carves or fills
/// cells at runtime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Builds a grid from row-major tiles.
    ///
    /// Returns an error when the tile count does not match the dimensions.
    pub fn from_tiles(width: u32, height: u32, tiles: Vec<Tile>) -> Result<Self, GridError> {
        let expected = u64::from(width) * u64::from(height);
        if expected != tiles.len() as u64 {
            return Err(GridError::DimensionMismatch {
                width,
                height,
                tiles: tiles.len(),
            });
        }
        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Returns the tile at the provided coordinate, if it is in bounds.
    #[must_use]
    pub fn tile_at(&self, x: i32, y: i32) -> Option<Tile> {
        self.index(x, y).map(|index| self.tiles[index])
    }

    /// Reports whether the coordinate blocks movement.
    ///
    /// Any coordinate outside `[0, width) x [0, height)` counts as wall;
    /// there is no wraparound.
    #[must_use]
    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        self.tile_at(x, y).map_or(true, Tile::is_wall)
    }

    /// Enumerates every floor cell in row-major order.
    pub fn floor_cells(&self) -> impl Iterator<Item = GridPos> + '_ {
        let width = self.width as i32;
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| !tile.is_wall())
            .map(move |(index, _)| GridPos::new(index as i32 % width, index as i32 / width))
    }

    /// Reports whether the grid holds a plausible dungeon.
    ///
    /// Used by the tolerant restore path to decide whether a persisted grid
    /// may replace the current one.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.width >= 3
            && self.height >= 3
            && u64::from(self.width) * u64::from(self.height) == self.tiles.len() as u64
            && self.tiles.iter().any(|tile| !tile.is_wall())
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as u32, y as u32);
        if x < self.width && y < self.height {
            Some((y * self.width + x) as usize)
        } else {
            None
        }
    }
}

/// Errors produced when assembling a [`Grid`].
#[derive(Debug, PartialEq, Eq)]
pub enum GridError {
    /// The tile buffer does not match the declared dimensions.
    DimensionMismatch {
        /// Declared column count.
        width: u32,
        /// Declared row count.
        height: u32,
        /// Number of tiles actually supplied.
        tiles: usize,
    },
}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DimensionMismatch {
                width,
                height,
                tiles,
            } => write!(
                f,
                "grid of {width}x{height} cells cannot be built from {tiles} tiles"
            ),
        }
    }
}

impl std::error::Error for GridError {}

/// Cardinal orientation of the player camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// Toward decreasing y.
    North,
    /// Toward increasing x.
    East,
    /// Toward increasing y.
    South,
    /// Toward decreasing x.
    West,
}

/// All facings in rotation order, indexed by [`Facing::index`].
const FACING_RING: [Facing; 4] = [Facing::North, Facing::East, Facing::South, Facing::West];

/// Forward unit vectors indexed by facing.
const FORWARD_VECTORS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

impl Facing {
    /// Numeric encoding in `0..4` (N=0, E=1, S=2, W=3).
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }

    /// Decodes a facing from its numeric encoding, wrapping modulo 4.
    #[must_use]
    pub const fn from_index(index: u8) -> Self {
        FACING_RING[(index % 4) as usize]
    }

    /// Facing after a 90-degree counter-clockwise turn.
    #[must_use]
    pub const fn turned_left(self) -> Self {
        Self::from_index(self.index().wrapping_add(3))
    }

    /// Facing after a 90-degree clockwise turn.
    #[must_use]
    pub const fn turned_right(self) -> Self {
        Self::from_index(self.index().wrapping_add(1))
    }

    /// Unit vector pointing one step ahead.
    #[must_use]
    pub const fn forward_vector(self) -> (i32, i32) {
        FORWARD_VECTORS[self.index() as usize]
    }

    /// Rotates a camera-space offset into a world-space delta.
    ///
    /// `forward` counts steps ahead of the camera and `right` counts steps to
    /// its right. This is a 90-degree-step rotation in exact integer
    /// arithmetic, the single primitive shared by movement and rendering.
    #[must_use]
    pub const fn rotate_local(self, forward: i32, right: i32) -> (i32, i32) {
        match self {
            Self::North => (right, -forward),
            Self::East => (forward, right),
            Self::South => (-right, forward),
            Self::West => (-forward, -right),
        }
    }

    /// Single-letter compass label used by HUD overlays.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::North => "N",
            Self::East => "E",
            Self::South => "S",
            Self::West => "W",
        }
    }
}

/// Named weapon that can occupy the player's single equipment slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponSpec {
    name: String,
    attack: i32,
}

impl WeaponSpec {
    /// Creates a new weapon description.
    #[must_use]
    pub fn new<T>(name: T, attack: i32) -> Self
    where
        T: Into<String>,
    {
        Self {
            name: name.into(),
            attack,
        }
    }

    /// Display name of the weapon.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attack bonus granted while equipped.
    #[must_use]
    pub const fn attack(&self) -> i32 {
        self.attack
    }
}

/// Payload of an item lying on a floor cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// A pile of coins added to the player's purse on pickup.
    Gold {
        /// Number of coins in the pile.
        amount: i32,
    },
    /// A weapon that may replace the equipped one.
    Weapon(WeaponSpec),
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Rotates the player 90 degrees counter-clockwise.
    TurnLeft,
    /// Rotates the player 90 degrees clockwise.
    TurnRight,
    /// Attempts one step toward the current facing.
    StepForward,
    /// Attempts one step away from the current facing.
    StepBack,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the player rotated in place.
    PlayerTurned {
        /// Facing active after the turn.
        facing: Facing,
    },
    /// Confirms that the player moved between two floor cells.
    PlayerMoved {
        /// Cell occupied before the move.
        from: GridPos,
        /// Cell occupied after the move.
        to: GridPos,
    },
    /// Reports that a step ran into a wall and was ignored.
    StepBlocked {
        /// Wall cell that blocked the step.
        at: GridPos,
    },
    /// Confirms that a gold pile was collected.
    GoldCollected {
        /// Cell the pile occupied.
        at: GridPos,
        /// Coins contained in the pile.
        amount: i32,
        /// Player's purse after the pickup.
        total: i32,
    },
    /// Confirms that a found weapon replaced the equipped one.
    WeaponEquipped {
        /// Weapon now occupying the equipment slot.
        weapon: WeaponSpec,
    },
    /// Reports that a found weapon was discarded in favor of the current one.
    WeaponDiscarded {
        /// Weapon left behind.
        weapon: WeaponSpec,
    },
    /// Reports a strike that left the monster standing and provoked
    /// retaliation.
    MonsterStruck {
        /// Name of the monster that was hit.
        name: String,
        /// Damage dealt by the player.
        damage: i32,
        /// Monster hit points remaining after the strike.
        remaining_hp: i32,
        /// Damage dealt back to the player.
        retaliation: i32,
    },
    /// Confirms that a strike removed the monster from the dungeon.
    MonsterSlain {
        /// Name of the slain monster.
        name: String,
        /// Cell the monster occupied, now vacated.
        at: GridPos,
        /// Damage dealt by the killing blow.
        damage: i32,
    },
    /// Reports that retaliation dropped the player to zero hit points.
    ///
    /// Game-over handling is a caller-level concern; the world keeps
    /// accepting commands.
    PlayerDefeated {
        /// Name of the monster that landed the final blow.
        by: String,
    },
}

/// Marker for a monster standing inside a visible depth band.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonsterMarker {
    /// Display name of the monster.
    pub name: String,
    /// Current hit points, used for presentation tinting.
    pub hp: i32,
}

/// Occlusion facts for a single forward depth band.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct DepthBand {
    /// Whether a wall flanks the corridor on the camera's left at this depth.
    pub left_wall: bool,
    /// Whether a wall flanks the corridor on the camera's right at this depth.
    pub right_wall: bool,
    /// Monster occupying the straight-ahead cell of this band, if any.
    pub monster: Option<MonsterMarker>,
}

/// Result of ray-marching the camera's forward corridor.
///
/// Band `d` describes the cell `d + 1` steps ahead of the player. When
/// [`DepthScan::nearest_front`] reports `Some(d)`, band `d` is the occluding
/// wall and no band beyond it is recorded.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct DepthScan {
    bands: Vec<DepthBand>,
    nearest_front: Option<u16>,
}

impl DepthScan {
    /// Assembles a scan from its parts.
    #[must_use]
    pub fn from_parts(bands: Vec<DepthBand>, nearest_front: Option<u16>) -> Self {
        Self {
            bands,
            nearest_front,
        }
    }

    /// Depth index of the nearest straight-ahead wall, if one was found
    /// within the march bound.
    #[must_use]
    pub const fn nearest_front(&self) -> Option<u16> {
        self.nearest_front
    }

    /// All recorded depth bands, nearest first.
    #[must_use]
    pub fn bands(&self) -> &[DepthBand] {
        &self.bands
    }

    /// Band at the provided depth index, if recorded.
    #[must_use]
    pub fn band(&self, depth: u16) -> Option<&DepthBand> {
        self.bands.get(usize::from(depth))
    }
}

/// Decodes a record field as `None` when it is missing, null, or carries a
/// value of the wrong type, so one damaged field never fails the whole
/// record.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer).unwrap_or(None))
}

/// Like [`lenient`], but for fields whose absence is expressed by the type's
/// default value rather than `None`.
fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(T::deserialize(deserializer).unwrap_or_default())
}

/// Persisted dungeon record exchanged with the save file.
///
/// Every field is optional so that a partially damaged save degrades
/// field-by-field instead of aborting the load; the world's restore path
/// substitutes current or default values for anything missing or damaged.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct SaveGame {
    /// Tile map, replaced only when well-formed.
    #[serde(default, deserialize_with = "lenient")]
    pub grid: Option<Grid>,
    /// Player record, merged field-by-field.
    #[serde(default, deserialize_with = "lenient")]
    pub player: Option<PlayerRecord>,
    /// Visited cells, rebuilt on dimension mismatch.
    #[serde(default, deserialize_with = "lenient")]
    pub visited: Option<VisitedRecord>,
    /// Items lying on the floor.
    #[serde(default, deserialize_with = "lenient")]
    pub items: Option<Vec<ItemRecord>>,
    /// Monsters still standing.
    #[serde(default, deserialize_with = "lenient")]
    pub monsters: Option<Vec<MonsterRecord>>,
}

/// Persisted player fields.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Horizontal cell coordinate.
    #[serde(default, deserialize_with = "lenient")]
    pub x: Option<i32>,
    /// Vertical cell coordinate.
    #[serde(default, deserialize_with = "lenient")]
    pub y: Option<i32>,
    /// Facing encoded as an integer in `0..4`.
    #[serde(default, deserialize_with = "lenient")]
    pub facing: Option<u8>,
    /// Remaining hit points.
    #[serde(default, deserialize_with = "lenient")]
    pub hp: Option<i32>,
    /// Coins carried.
    #[serde(default, deserialize_with = "lenient")]
    pub gold: Option<i32>,
    /// Attack value before weapon bonuses.
    #[serde(default, deserialize_with = "lenient")]
    pub base_attack: Option<i32>,
    /// Name of the equipped weapon, if any.
    #[serde(default, deserialize_with = "lenient")]
    pub weapon_name: Option<String>,
    /// Attack bonus of the equipped weapon.
    #[serde(default, deserialize_with = "lenient")]
    pub weapon_attack: Option<i32>,
}

/// Persisted visited-set record.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct VisitedRecord {
    /// Number of columns the record was captured against.
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub width: u32,
    /// Number of rows the record was captured against.
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub height: u32,
    /// Row-major visited flags.
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub cells: Vec<bool>,
}

/// Persisted floor item.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Horizontal cell coordinate.
    #[serde(default, deserialize_with = "lenient")]
    pub x: Option<i32>,
    /// Vertical cell coordinate.
    #[serde(default, deserialize_with = "lenient")]
    pub y: Option<i32>,
    /// Item discriminator: `"gold"` or `"weapon"`.
    #[serde(default, deserialize_with = "lenient")]
    pub kind: Option<String>,
    /// Coin count for gold piles.
    #[serde(default, deserialize_with = "lenient")]
    pub amount: Option<i32>,
    /// Weapon name for weapon items.
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    /// Weapon attack bonus for weapon items.
    #[serde(default, deserialize_with = "lenient")]
    pub attack: Option<i32>,
}

/// Persisted monster.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct MonsterRecord {
    /// Horizontal cell coordinate.
    #[serde(default, deserialize_with = "lenient")]
    pub x: Option<i32>,
    /// Vertical cell coordinate.
    #[serde(default, deserialize_with = "lenient")]
    pub y: Option<i32>,
    /// Display name.
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    /// Remaining hit points.
    #[serde(default, deserialize_with = "lenient")]
    pub hp: Option<i32>,
    /// Damage dealt when retaliating.
    #[serde(default, deserialize_with = "lenient")]
    pub attack: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facing_indices_round_trip_modulo_four() {
        for index in 0..8u8 {
            assert_eq!(Facing::from_index(index).index(), index % 4);
        }
    }

    #[test]
    fn turning_left_then_right_restores_facing() {
        for facing in FACING_RING {
            assert_eq!(facing.turned_left().turned_right(), facing);
            assert_eq!(facing.turned_right().turned_left(), facing);
        }
    }

    #[test]
    fn forward_rotation_matches_unit_vectors() {
        for facing in FACING_RING {
            assert_eq!(facing.rotate_local(1, 0), facing.forward_vector());
        }
    }

    #[test]
    fn local_rotation_matches_compass_table() {
        // One step forward and one to the right, from every facing.
        assert_eq!(Facing::North.rotate_local(1, 1), (1, -1));
        assert_eq!(Facing::East.rotate_local(1, 1), (1, 1));
        assert_eq!(Facing::South.rotate_local(1, 1), (-1, 1));
        assert_eq!(Facing::West.rotate_local(1, 1), (-1, -1));
    }

    #[test]
    fn grid_reports_out_of_bounds_as_wall() {
        let grid = Grid::from_tiles(3, 3, vec![Tile::Floor; 9]).expect("grid builds");
        assert!(!grid.is_wall(1, 1));
        assert!(grid.is_wall(-1, 0));
        assert!(grid.is_wall(0, -1));
        assert!(grid.is_wall(3, 0));
        assert!(grid.is_wall(0, 3));
    }

    #[test]
    fn grid_rejects_mismatched_tile_buffer() {
        let error = Grid::from_tiles(4, 4, vec![Tile::Wall; 15]).expect_err("mismatch rejected");
        assert_eq!(
            error,
            GridError::DimensionMismatch {
                width: 4,
                height: 4,
                tiles: 15,
            }
        );
    }

    #[test]
    fn floor_cells_enumerates_row_major() {
        let tiles = vec![
            Tile::Wall,
            Tile::Floor,
            Tile::Wall,
            Tile::Floor,
            Tile::Wall,
            Tile::Floor,
        ];
        let grid = Grid::from_tiles(3, 2, tiles).expect("grid builds");
        let cells: Vec<GridPos> = grid.floor_cells().collect();
        assert_eq!(
            cells,
            vec![GridPos::new(1, 0), GridPos::new(0, 1), GridPos::new(2, 1)]
        );
    }

    #[test]
    fn save_game_round_trips_through_bincode() {
        let save = SaveGame {
            grid: Some(Grid::from_tiles(3, 3, vec![Tile::Wall; 9]).expect("grid builds")),
            player: Some(PlayerRecord {
                x: Some(1),
                y: Some(1),
                facing: Some(1),
                hp: Some(10),
                gold: Some(25),
                base_attack: Some(2),
                weapon_name: Some("Iron Mace".to_owned()),
                weapon_attack: Some(5),
            }),
            visited: Some(VisitedRecord {
                width: 3,
                height: 3,
                cells: vec![false; 9],
            }),
            items: Some(vec![ItemRecord {
                x: Some(1),
                y: Some(2),
                kind: Some("gold".to_owned()),
                amount: Some(10),
                name: None,
                attack: None,
            }]),
            monsters: Some(vec![MonsterRecord {
                x: Some(2),
                y: Some(1),
                name: Some("Skeleton".to_owned()),
                hp: Some(5),
                attack: Some(2),
            }]),
        };

        let bytes = bincode::serialize(&save).expect("serialize");
        let restored: SaveGame = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, save);
    }
}
