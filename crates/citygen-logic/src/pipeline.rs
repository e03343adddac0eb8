//! The full generation pass.
//!
//! Strictly sequenced and single-threaded: grid construction, road growth,
//! classification, building placement, BVH construction and traversal
//! resolution run in that order with no overlapping mutation. The pass is
//! atomic from the caller's side: it either yields a consistent
//! `CityScene` or an error with no partial state exposed.

use rand::Rng;
use std::error::Error;
use std::fmt;

use crate::buildings::{place_buildings, PlacedBuilding};
use crate::bvh::Bvh;
use crate::classify::classify_tiles;
use crate::config::{CityConfig, ConfigError};
use crate::constants::{materials, object_kinds};
use crate::grid::TileGrid;
use crate::roads::{grow_roads, RoadBuilder};
use crate::scene::{random_colour, SceneList, SceneObject};
use crate::traversal::resolve_paths;
use cgmath::Vector3;

/// A generation pass that could not produce a consistent scene.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateError {
    Config(ConfigError),
    /// The growth process carved no road tiles, so the city centre is
    /// undefined. Reported explicitly rather than dividing by zero.
    NoRoadTiles,
    /// No indexable objects to build a hierarchy over.
    EmptyScene,
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::Config(err) => write!(f, "invalid configuration: {}", err),
            GenerateError::NoRoadTiles => write!(f, "no road tiles generated"),
            GenerateError::EmptyScene => write!(f, "no objects to index"),
        }
    }
}

impl Error for GenerateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GenerateError::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for GenerateError {
    fn from(err: ConfigError) -> Self {
        GenerateError::Config(err)
    }
}

/// Everything one generation pass produces.
#[derive(Debug, Clone)]
pub struct CityScene {
    pub grid: TileGrid,
    pub objects: SceneList,
    pub buildings: Vec<PlacedBuilding>,
    pub bvh: Bvh,
    /// Mean road-tile position, the natural camera target.
    pub centre: (f32, f32),
}

/// Generate a complete city scene.
///
/// Deterministic for a given configuration and random source. The first
/// road builder is seeded at the grid's centre tile with a random heading;
/// the ground plane is always object 0 and is excluded from the BVH.
pub fn generate_city(
    config: &CityConfig,
    rng: &mut impl Rng,
) -> Result<CityScene, GenerateError> {
    config.validate()?;
    let rules = config.rule_table()?;

    let mut grid = TileGrid::new(config.width, config.height, config.edge_mode)?;
    let mut scene = SceneList::new();

    scene.push(SceneObject {
        kind: object_kinds::GROUND,
        position: Vector3::new(0.0, 0.0, 0.0),
        rotation: Vector3::new(0.0, 0.0, 0.0),
        size: Vector3::new(0.0, 0.0, 0.0),
        colour: random_colour(rng),
        material: materials::MATTE,
    });

    let seed = RoadBuilder::new(
        grid.centre_tile(),
        crate::grid::Direction::ALL[rng.gen_range(0..4)],
    );
    grow_roads(&mut grid, vec![seed], &rules, config.growth_rounds, rng);

    let road_tiles = classify_tiles(
        &mut grid,
        &mut scene,
        config.road_colour,
        config.footpath_colour,
    );
    log::info!(
        "grew {} road tiles over {} rounds on a {}x{} grid",
        road_tiles,
        config.growth_rounds,
        config.width,
        config.height
    );

    let buildings = place_buildings(&mut grid, &mut scene, &config.building_tiers, rng);
    log::info!(
        "placed {} buildings across {} tiers",
        buildings.len(),
        config.building_tiers.len()
    );

    let centre = grid.road_centroid().ok_or(GenerateError::NoRoadTiles)?;

    // The unbounded ground plane is not spatially indexed.
    let mut bvh = Bvh::build(&scene.objects()[1..], 1, config.leaf_inflation)?;
    resolve_paths(&mut bvh);
    log::info!(
        "scene holds {} objects, bvh {} nodes, centre ({:.1}, {:.1})",
        scene.len(),
        bvh.len(),
        centre.0,
        centre.1
    );

    Ok(CityScene { grid, objects: scene, buildings, bvh, centre })
}
