//! Probabilistic building placement.
//!
//! Tiers are processed strictly largest footprint first so big buildings
//! are never crowded out by small ones; reordering the tiers changes the
//! output distribution. A footprint is eligible when all of its cells are
//! unassigned and at least one cell touches the road network; eligibility
//! is then gated by the tier's acceptance probability.

use cgmath::Vector3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::constants::{materials, object_kinds};
use crate::grid::{Direction, TileGrid, TileKind};
use crate::scene::{random_colour, SceneList, SceneObject};
use crate::weighted::choose_index;

/// One placement tier: a square footprint edge length and the probability
/// that an eligible corner tile actually receives a building.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildingTier {
    pub footprint: u8,
    pub chance: f32,
}

/// A committed placement, for callers that need the covered tiles.
#[derive(Debug, Clone)]
pub struct PlacedBuilding {
    /// Corner tile the footprint scan started from.
    pub corner: usize,
    pub footprint: u8,
    /// Tiles covered by the footprint.
    pub tiles: Vec<usize>,
    /// Index of the emitted scene object.
    pub object: u32,
}

/// Collect the footprint cells for a building cornered at `corner`, walking
/// up then right through neighbour links (so wrapped grids work), or `None`
/// if any cell is the edge sentinel, already claimed, or no cell is
/// adjacent to a road.
fn footprint_tiles(grid: &TileGrid, corner: usize, size: u8) -> Option<Vec<usize>> {
    let mut tiles = Vec::with_capacity(size as usize * size as usize);
    let mut road_adjacent = false;

    let mut row = corner;
    for i in 0..size {
        let mut cell = row;
        for j in 0..size {
            if grid.tile(cell).kind != TileKind::Unassigned {
                return None;
            }
            road_adjacent |= Direction::ALL.iter().any(|&dir| {
                grid.neighbour(cell, dir)
                    .is_some_and(|n| grid.tile(n).road_connections != 0)
            });
            tiles.push(cell);

            if j + 1 < size {
                cell = grid.neighbour(cell, Direction::Right)?;
            }
        }
        if i + 1 < size {
            row = grid.neighbour(row, Direction::Up)?;
        }
    }

    road_adjacent.then_some(tiles)
}

/// Emit one building object at `position` with a randomly drawn archetype.
///
/// Proportions are uniform within fixed bounds, scaled by the footprint
/// edge length; the mirror material is a rare accent.
fn building_object(position: Vector3<f32>, footprint: u8, rng: &mut impl Rng) -> SceneObject {
    const ARCHETYPES: [u8; 6] = [
        object_kinds::BUILDING_SPHERE,
        object_kinds::BUILDING_BOX,
        object_kinds::BUILDING_TORUS,
        object_kinds::BUILDING_CYLINDER,
        object_kinds::BUILDING_CONE,
        object_kinds::BUILDING_CAPSULE,
    ];
    const ARCHETYPE_WEIGHTS: [f32; 6] = [1.0; 6];
    const MATERIAL_WEIGHTS: [f32; 2] = [0.95, 0.05];

    let scale = footprint as f32;
    let kind = ARCHETYPES[choose_index(&ARCHETYPE_WEIGHTS, rng)];

    let size = match kind {
        object_kinds::BUILDING_BOX => Vector3::new(
            scale * rng.gen_range(0.35..0.45),
            scale * rng.gen_range(0.35..0.45),
            scale * rng.gen_range(0.35..0.45),
        ),
        object_kinds::BUILDING_TORUS => {
            let major = rng.gen_range(0.35..0.45);
            let minor = rng.gen_range(0.1..0.9) * major;
            Vector3::new(scale * major, scale * minor, 0.0)
        }
        object_kinds::BUILDING_CYLINDER => Vector3::new(
            scale * rng.gen_range(0.35..0.45),
            scale * rng.gen_range(0.7..0.9),
            0.0,
        ),
        // Sphere, cone and capsule are single-radius shapes.
        _ => Vector3::new(scale * rng.gen_range(0.35..0.45), 0.0, 0.0),
    };

    let material = match choose_index(&MATERIAL_WEIGHTS, rng) {
        0 => materials::MATTE,
        _ => materials::MIRROR,
    };

    SceneObject {
        kind,
        position: Vector3::new(position.x, position.y, scale * 0.75),
        rotation: Vector3::new(
            rng.gen_range(0.0..TAU),
            rng.gen_range(0.0..TAU),
            rng.gen_range(0.0..TAU),
        ),
        size,
        colour: random_colour(rng),
        material,
    }
}

/// Run the placement pass over every tier, largest first.
///
/// The tiers are assumed validated (descending footprints, chances in
/// [0, 1]); `CityConfig::validate` rejects anything else before the
/// pipeline gets here.
pub fn place_buildings(
    grid: &mut TileGrid,
    scene: &mut SceneList,
    tiers: &[BuildingTier],
    rng: &mut impl Rng,
) -> Vec<PlacedBuilding> {
    let mut placed = Vec::new();

    for tier in tiers {
        for corner in 0..grid.len() {
            let Some(tiles) = footprint_tiles(grid, corner, tier.footprint) else {
                continue;
            };
            if rng.gen::<f32>() >= tier.chance {
                continue;
            }

            for &tile in &tiles {
                grid.tile_mut(tile).kind = TileKind::Building(tier.footprint);
            }

            let corner_pos = grid.tile(corner).position;
            let half_span = (tier.footprint as f32 - 1.0) / 2.0;
            let centroid =
                Vector3::new(corner_pos.x + half_span, corner_pos.y + half_span, 0.0);

            let object = scene.push(building_object(centroid, tier.footprint, rng));
            placed.push(PlacedBuilding {
                corner,
                footprint: tier.footprint,
                tiles,
                object,
            });
        }
    }

    placed
}
