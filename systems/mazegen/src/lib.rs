#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic maze generation for Grid Crawl.
//!
//! The generator carves a perfect maze (fully connected, no loops) with a
//! randomized depth-first backtracker. Cells live on odd coordinates and the
//! walls between them on even coordinates, which is why dimensions are
//! normalized to odd values before carving. The same `(width, height, seed)`
//! triple always produces an identical grid.

use grid_crawl_core::{Grid, Tile};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Smallest dimension the generator will carve. Anything below is clamped.
pub const MIN_DIMENSION: u32 = 5;

/// Two-step carving directions explored from each cell.
const CARVE_DIRECTIONS: [(i32, i32); 4] = [(0, -2), (2, 0), (0, 2), (-2, 0)];

/// Generates a fully enclosed perfect maze.
///
/// Dimensions are normalized to odd values of at least [`MIN_DIMENSION`]
/// (even inputs are decremented). Cell `(1, 1)` is always floor and the
/// outer ring is always wall.
#[must_use]
pub fn generate(width: u32, height: u32, seed: u64) -> Grid {
    let width = normalize_dimension(width);
    let height = normalize_dimension(height);
    let mut tiles = vec![Tile::Wall; (width * height) as usize];
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let start = random_odd_cell(width, height, &mut rng);
    carve(&mut tiles, width, start);

    let mut stack = vec![start];
    while let Some(&(x, y)) = stack.last() {
        let mut directions = CARVE_DIRECTIONS;
        directions.shuffle(&mut rng);

        let next = directions.iter().find_map(|&(dx, dy)| {
            let target = (x + dx, y + dy);
            if carvable(&tiles, width, height, target) {
                Some((target, (x + dx / 2, y + dy / 2)))
            } else {
                None
            }
        });

        match next {
            Some((target, passage)) => {
                carve(&mut tiles, width, passage);
                carve(&mut tiles, width, target);
                stack.push(target);
            }
            None => {
                let _ = stack.pop();
            }
        }
    }

    carve(&mut tiles, width, (1, 1));
    seal_outer_ring(&mut tiles, width, height);

    Grid::from_tiles(width, height, tiles).expect("carved buffer matches normalized dimensions")
}

/// Generates a straight horizontal corridor through the vertical middle.
///
/// Shares the grid representation with [`generate`] but involves no search;
/// it exists for rendering regression fixtures where a predictable corridor
/// of known length is required. Dimensions are normalized the same way.
#[must_use]
pub fn corridor(length: u32, height: u32) -> Grid {
    let width = normalize_dimension(length);
    let height = normalize_dimension(height);
    let mut tiles = vec![Tile::Wall; (width * height) as usize];

    let row = (height / 2) as i32;
    for x in 1..(width as i32 - 1) {
        carve(&mut tiles, width, (x, row));
    }

    Grid::from_tiles(width, height, tiles).expect("carved buffer matches normalized dimensions")
}

fn normalize_dimension(value: u32) -> u32 {
    let value = value.max(MIN_DIMENSION);
    if value % 2 == 0 {
        value - 1
    } else {
        value
    }
}

fn random_odd_cell(width: u32, height: u32, rng: &mut ChaCha8Rng) -> (i32, i32) {
    let odd_columns: Vec<i32> = (1..width as i32 - 1).step_by(2).collect();
    let odd_rows: Vec<i32> = (1..height as i32 - 1).step_by(2).collect();
    let x = *odd_columns
        .choose(rng)
        .expect("normalized width yields odd columns");
    let y = *odd_rows
        .choose(rng)
        .expect("normalized height yields odd rows");
    (x, y)
}

fn carvable(tiles: &[Tile], width: u32, height: u32, (x, y): (i32, i32)) -> bool {
    x > 0
        && y > 0
        && x < width as i32 - 1
        && y < height as i32 - 1
        && tiles[(y as u32 * width + x as u32) as usize].is_wall()
}

fn carve(tiles: &mut [Tile], width: u32, (x, y): (i32, i32)) {
    tiles[(y as u32 * width + x as u32) as usize] = Tile::Floor;
}

fn seal_outer_ring(tiles: &mut [Tile], width: u32, height: u32) {
    for x in 0..width {
        tiles[x as usize] = Tile::Wall;
        tiles[((height - 1) * width + x) as usize] = Tile::Wall;
    }
    for y in 0..height {
        tiles[(y * width) as usize] = Tile::Wall;
        tiles[(y * width + width - 1) as usize] = Tile::Wall;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_dimensions_are_decremented_to_odd() {
        let grid = generate(16, 12, 7);
        assert_eq!(grid.width(), 15);
        assert_eq!(grid.height(), 11);
    }

    #[test]
    fn degenerate_dimensions_are_clamped() {
        let grid = generate(0, 3, 7);
        assert_eq!(grid.width(), MIN_DIMENSION);
        assert_eq!(grid.height(), MIN_DIMENSION);
    }

    #[test]
    fn start_cell_is_always_floor() {
        for seed in 0..8 {
            let grid = generate(9, 9, seed);
            assert!(!grid.is_wall(1, 1), "seed {seed} walled the start cell");
        }
    }

    #[test]
    fn corridor_is_a_single_open_row() {
        let grid = corridor(9, 5);
        let row = (grid.height() / 2) as i32;
        for x in 1..(grid.width() as i32 - 1) {
            assert!(!grid.is_wall(x, row));
        }
        assert!(grid.is_wall(0, row));
        assert!(grid.is_wall(grid.width() as i32 - 1, row));
        assert_eq!(grid.floor_cells().count(), grid.width() as usize - 2);
    }
}
