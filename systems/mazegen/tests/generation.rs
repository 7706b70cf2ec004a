use std::collections::VecDeque;

use grid_crawl_core::{Grid, GridPos};
use grid_crawl_system_mazegen::{generate, MIN_DIMENSION};

#[test]
fn identical_inputs_produce_identical_grids() {
    for seed in [0, 1, 0xdead_beef, u64::MAX] {
        let first = generate(21, 15, seed);
        let second = generate(21, 15, seed);
        assert_eq!(first, second, "seed {seed} was not deterministic");
    }
}

#[test]
fn different_seeds_produce_different_mazes() {
    let first = generate(21, 21, 1);
    let second = generate(21, 21, 2);
    assert_ne!(first, second);
}

#[test]
fn every_floor_cell_is_reachable_from_the_start() {
    for seed in [3, 17, 4242] {
        let grid = generate(25, 19, seed);
        let floors: Vec<GridPos> = grid.floor_cells().collect();
        let reached = flood_fill(&grid, GridPos::new(1, 1));
        assert_eq!(
            reached.len(),
            floors.len(),
            "seed {seed} left unreachable floor cells"
        );
    }
}

#[test]
fn maze_is_a_tree_with_no_cycles() {
    // A connected graph is a tree exactly when edges == nodes - 1. Each
    // adjacent floor pair is one edge; counting east and south neighbors
    // visits every edge once.
    for seed in [5, 99, 1234] {
        let grid = generate(17, 17, seed);
        let nodes = grid.floor_cells().count();
        let mut edges = 0usize;
        for cell in grid.floor_cells() {
            if !grid.is_wall(cell.x() + 1, cell.y()) {
                edges += 1;
            }
            if !grid.is_wall(cell.x(), cell.y() + 1) {
                edges += 1;
            }
        }
        assert_eq!(edges, nodes - 1, "seed {seed} carved a cycle");
    }
}

#[test]
fn outer_ring_is_entirely_wall() {
    let grid = generate(13, 9, 8);
    let (w, h) = (grid.width() as i32, grid.height() as i32);
    for x in 0..w {
        assert!(grid.is_wall(x, 0));
        assert!(grid.is_wall(x, h - 1));
    }
    for y in 0..h {
        assert!(grid.is_wall(0, y));
        assert!(grid.is_wall(w - 1, y));
    }
}

#[test]
fn clamped_minimum_maze_is_still_connected() {
    let grid = generate(1, 1, 11);
    assert_eq!(grid.width(), MIN_DIMENSION);
    let floors = grid.floor_cells().count();
    assert_eq!(flood_fill(&grid, GridPos::new(1, 1)).len(), floors);
}

fn flood_fill(grid: &Grid, start: GridPos) -> Vec<GridPos> {
    let mut seen = vec![start];
    let mut queue = VecDeque::from([start]);
    while let Some(cell) = queue.pop_front() {
        for (dx, dy) in [(0, -1), (1, 0), (0, 1), (-1, 0)] {
            let next = cell.offset(dx, dy);
            if !grid.is_wall(next.x(), next.y()) && !seen.contains(&next) {
                seen.push(next);
                queue.push_back(next);
            }
        }
    }
    seen
}
