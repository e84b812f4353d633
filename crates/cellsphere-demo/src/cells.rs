//! Seeded cell layout for the demo: a jittered cubic grid.

use cellsphere_mesh::InstancePayload;
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

/// Fixed seed so every run draws the same colony.
pub const CELL_SEED: u64 = 42;

/// Center-to-center distance between grid cells, in sphere radii.
const SPACING: f32 = 2.5;

/// `count` cells on a cube-ish grid centered on the origin.
///
/// Positions are in model units (`radius` scales the grid, not the cells);
/// each cell gets a scale in `[0.6, 1.0)`.
pub fn cell_payloads(count: u32, radius: f32, seed: u64) -> Vec<InstancePayload> {
    let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
    let side = grid_side(count);
    let spacing = SPACING * radius;
    let half = (side as f32 - 1.0) * 0.5;

    (0..count)
        .map(|i| {
            let cell = Vec3::new(
                (i % side) as f32,
                ((i / side) % side) as f32,
                (i / (side * side)) as f32,
            );
            let jitter = Vec3::new(
                rng.gen_range(-0.2..0.2),
                rng.gen_range(-0.2..0.2),
                rng.gen_range(-0.2..0.2),
            );
            let position = (cell - Vec3::splat(half) + jitter) * spacing;
            InstancePayload::new(position, rng.gen_range(0.6..1.0))
        })
        .collect()
}

/// Distance from the grid center to its farthest corner cell.
pub fn grid_extent(count: u32, radius: f32) -> f32 {
    let half = (grid_side(count) as f32 - 1.0) * 0.5;
    (Vec3::splat(half) * SPACING * radius).length() + radius
}

fn grid_side(count: u32) -> u32 {
    let mut side = (count as f64).cbrt().ceil() as u32;
    // cbrt rounding can land one short of a perfect cube
    while side.saturating_mul(side).saturating_mul(side) < count {
        side += 1;
    }
    side.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_side_covers_count() {
        assert_eq!(grid_side(0), 1);
        assert_eq!(grid_side(1), 1);
        assert_eq!(grid_side(8), 2);
        assert_eq!(grid_side(9), 3);
        assert_eq!(grid_side(512), 8);
    }

    #[test]
    fn test_payload_count_and_scale_range() {
        let cells = cell_payloads(100, 1.0, CELL_SEED);
        assert_eq!(cells.len(), 100);
        assert!(cells.iter().all(|c| (0.6..1.0).contains(&c.scale)));
        assert!(cell_payloads(0, 1.0, CELL_SEED).is_empty());
    }

    #[test]
    fn test_same_seed_same_colony() {
        assert_eq!(cell_payloads(27, 1.0, 7), cell_payloads(27, 1.0, 7));
        assert_ne!(cell_payloads(27, 1.0, 7), cell_payloads(27, 1.0, 8));
    }

    #[test]
    fn test_cells_stay_within_extent() {
        let extent = grid_extent(64, 2.0);
        for cell in cell_payloads(64, 2.0, CELL_SEED) {
            assert!(Vec3::from_array(cell.position).length() < extent);
        }
    }
}
