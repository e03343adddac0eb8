//! Road-piece classification.
//!
//! A tile's 4-bit connection mask (bit 0 up, bit 1 right, bit 2 down,
//! bit 3 left) picks a road-piece kind and rotation out of fixed lookup
//! tables. The classification pass is also where each road tile's two
//! decorative objects are emitted: the road surface and the footpath that
//! shares its position and rotation.

use std::f32::consts::FRAC_PI_2;

use cgmath::Vector3;

use crate::constants::{materials, object_kinds};
use crate::grid::{TileGrid, TileKind};
use crate::scene::{SceneList, SceneObject};

/// The renderable road-piece categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoadPiece {
    Straight,
    Curve,
    Tee,
    Cross,
    DeadEnd,
}

/// A classified road tile: the piece to place and its rotation in quarter
/// turns about z.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoadClass {
    pub piece: RoadPiece,
    pub quarter_turns: u8,
}

// Piece and rotation per connection mask. In mask order the combinations
// are: none, up dead end, right dead end, right-up curve, down dead end,
// vertical straight, right-down curve, vertical-right tee, left dead end,
// left-up curve, horizontal straight, horizontal-up tee, left-down curve,
// vertical-left tee, horizontal-down tee, cross.
const PIECES: [RoadPiece; 16] = [
    RoadPiece::Straight, // mask 0, never read
    RoadPiece::DeadEnd,
    RoadPiece::DeadEnd,
    RoadPiece::Curve,
    RoadPiece::DeadEnd,
    RoadPiece::Straight,
    RoadPiece::Curve,
    RoadPiece::Tee,
    RoadPiece::DeadEnd,
    RoadPiece::Curve,
    RoadPiece::Straight,
    RoadPiece::Tee,
    RoadPiece::Curve,
    RoadPiece::Tee,
    RoadPiece::Tee,
    RoadPiece::Cross,
];

const QUARTER_TURNS: [u8; 16] = [0, 0, 3, 3, 2, 1, 2, 3, 1, 0, 0, 0, 1, 1, 2, 0];

/// Classify a connection mask. The empty mask is not a road.
pub fn classify(mask: u8) -> Option<RoadClass> {
    if mask == 0 || mask > 0b1111 {
        return None;
    }
    Some(RoadClass {
        piece: PIECES[mask as usize],
        quarter_turns: QUARTER_TURNS[mask as usize],
    })
}

fn road_kind(piece: RoadPiece) -> u8 {
    match piece {
        RoadPiece::Straight => object_kinds::ROAD_STRAIGHT,
        RoadPiece::Curve => object_kinds::ROAD_CURVE,
        RoadPiece::Tee => object_kinds::ROAD_TEE,
        RoadPiece::Cross => object_kinds::ROAD_CROSS,
        RoadPiece::DeadEnd => object_kinds::ROAD_DEAD_END,
    }
}

fn footpath_kind(piece: RoadPiece) -> u8 {
    match piece {
        RoadPiece::Straight => object_kinds::FOOTPATH_STRAIGHT,
        RoadPiece::Curve => object_kinds::FOOTPATH_CURVE,
        RoadPiece::Tee => object_kinds::FOOTPATH_TEE,
        RoadPiece::Cross => object_kinds::FOOTPATH_CROSS,
        RoadPiece::DeadEnd => object_kinds::FOOTPATH_DEAD_END,
    }
}

/// Mark every connected tile as a road and emit its surface + footpath
/// objects. Returns the number of road tiles classified.
pub fn classify_tiles(
    grid: &mut TileGrid,
    scene: &mut SceneList,
    road_colour: [f32; 3],
    footpath_colour: [f32; 3],
) -> u32 {
    let mut road_tiles = 0;

    for id in 0..grid.len() {
        let mask = grid.tile(id).road_connections;
        let Some(class) = classify(mask) else {
            continue;
        };

        grid.tile_mut(id).kind = TileKind::Road;
        road_tiles += 1;

        let position = grid.tile(id).position;
        let rotation = Vector3::new(0.0, 0.0, class.quarter_turns as f32 * FRAC_PI_2);
        let size = Vector3::new(0.5, 0.0, 0.0);

        scene.push(SceneObject {
            kind: road_kind(class.piece),
            position,
            rotation,
            size,
            colour: road_colour,
            material: materials::MATTE,
        });
        scene.push(SceneObject {
            kind: footpath_kind(class.piece),
            position,
            rotation,
            size,
            colour: footpath_colour,
            material: materials::MATTE,
        });
    }

    road_tiles
}
