//! The city tile grid.
//!
//! Tiles live in a flat arena addressed by `usize` id. Each tile knows its
//! four neighbours (up, right, down, left), carries a 4-bit road-connection
//! mask and a classification, and sits at a world position chosen so the
//! whole grid is centred on the origin. Tiles are created once at grid
//! construction and mutated in place; none are ever removed mid-run.

use cgmath::Vector3;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// How neighbour lookups behave at the grid boundary.
///
/// `Bounded` surrounds the grid with a non-buildable edge sentinel (roads
/// truncate there, buildings cannot straddle it). `Wrapped` tiles the grid
/// toroidally with itself. There is no mixed mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeMode {
    Bounded,
    Wrapped,
}

/// One of the four cardinal directions, in neighbour-slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Neighbour-slot index; also the bit position in a connection mask.
    pub fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }

    pub fn bit(self) -> u8 {
        1 << self.index()
    }

    /// Rotate 90 degrees clockwise (up becomes right).
    pub fn rotate_cw(self) -> Direction {
        Direction::ALL[(self.index() + 1) % 4]
    }

    /// Rotate 90 degrees counter-clockwise (up becomes left).
    pub fn rotate_ccw(self) -> Direction {
        Direction::ALL[(self.index() + 3) % 4]
    }

    pub fn opposite(self) -> Direction {
        Direction::ALL[(self.index() + 2) % 4]
    }

    /// Grid-space step for this direction; up is +y.
    fn offset(self) -> (i64, i64) {
        match self {
            Direction::Up => (0, 1),
            Direction::Right => (1, 0),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
        }
    }
}

/// What a tile has been claimed for, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileKind {
    #[default]
    Unassigned,
    Road,
    /// Occupied by a building; the tag is the footprint edge length.
    Building(u8),
}

#[derive(Debug, Clone)]
pub struct Tile {
    pub position: Vector3<f32>,
    /// Neighbour tile ids; `None` is the non-buildable edge sentinel.
    neighbours: [Option<usize>; 4],
    /// Bit i set means a road joint is established toward direction i.
    pub road_connections: u8,
    pub kind: TileKind,
}

#[derive(Debug, Clone)]
pub struct TileGrid {
    tiles: Vec<Tile>,
    width: usize,
    height: usize,
    edge_mode: EdgeMode,
}

impl TileGrid {
    pub fn new(width: usize, height: usize, edge_mode: EdgeMode) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::ZeroGridDimension { width, height });
        }

        let mut tiles = Vec::with_capacity(width * height);
        let half_w = width as f32 / 2.0;
        let half_h = height as f32 / 2.0;

        for y in 0..height {
            for x in 0..width {
                let mut neighbours = [None; 4];
                for dir in Direction::ALL {
                    let (dx, dy) = dir.offset();
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    neighbours[dir.index()] = match edge_mode {
                        EdgeMode::Bounded => {
                            if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                                None
                            } else {
                                Some(ny as usize * width + nx as usize)
                            }
                        }
                        EdgeMode::Wrapped => {
                            let wx = nx.rem_euclid(width as i64) as usize;
                            let wy = ny.rem_euclid(height as i64) as usize;
                            Some(wy * width + wx)
                        }
                    };
                }

                tiles.push(Tile {
                    position: Vector3::new(
                        (x as f32 + 0.5) - half_w,
                        (y as f32 + 0.5) - half_h,
                        0.0,
                    ),
                    neighbours,
                    road_connections: 0,
                    kind: TileKind::Unassigned,
                });
            }
        }

        Ok(Self {
            tiles,
            width,
            height,
            edge_mode,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn edge_mode(&self) -> EdgeMode {
        self.edge_mode
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn index_of(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    /// The tile the first road builder is seeded on.
    pub fn centre_tile(&self) -> usize {
        self.index_of(self.width / 2, self.height / 2)
    }

    pub fn tile(&self, id: usize) -> &Tile {
        &self.tiles[id]
    }

    pub fn tile_mut(&mut self, id: usize) -> &mut Tile {
        &mut self.tiles[id]
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Neighbour of `id` toward `dir`; `None` is the edge sentinel.
    pub fn neighbour(&self, id: usize, dir: Direction) -> Option<usize> {
        self.tiles[id].neighbours[dir.index()]
    }

    /// Establish a symmetric road joint between `id` and its neighbour
    /// toward `dir`, returning the neighbour id. Connecting toward the edge
    /// sentinel is a programming error; callers check the neighbour first.
    pub fn connect(&mut self, id: usize, dir: Direction) -> usize {
        let other = self.tiles[id].neighbours[dir.index()]
            .unwrap_or_else(|| panic!("road joint toward the edge sentinel from tile {}", id));
        self.tiles[id].road_connections |= dir.bit();
        self.tiles[other].road_connections |= dir.opposite().bit();
        other
    }

    /// Mean position of all road tiles, or `None` when no roads exist.
    pub fn road_centroid(&self) -> Option<(f32, f32)> {
        let mut cx = 0.0;
        let mut cy = 0.0;
        let mut count = 0u32;
        for tile in &self.tiles {
            if tile.kind == TileKind::Road {
                cx += tile.position.x;
                cy += tile.position.y;
                count += 1;
            }
        }
        if count == 0 {
            return None;
        }
        Some((cx / count as f32, cy / count as f32))
    }
}
