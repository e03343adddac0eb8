//! Integration tests for the full city generation pipeline.
//!
//! Exercises: CityConfig → TileGrid → road growth → classification →
//! building placement → BVH → traversal resolution → texel encoding.
//! All tests are pure logic, no rendering and no I/O.

use cgmath::MetricSpace;
use citygen_logic::buildings::BuildingTier;
use citygen_logic::bvh::Bvh;
use citygen_logic::config::{CityConfig, RuleSpec};
use citygen_logic::constants::object_kinds;
use citygen_logic::encode::{DataTexture, TexelCodec, BVH_NODE_ROWS, OBJECT_ROWS};
use citygen_logic::grid::{Direction, EdgeMode, TileGrid, TileKind};
use citygen_logic::pipeline::{generate_city, CityScene};
use citygen_logic::roads::{grow_roads, RoadBuilder, Rule};
use citygen_logic::scene::SceneObject;
use citygen_logic::traversal::resolve_paths;
use citygen_logic::weighted::WeightedTable;
use rand::rngs::StdRng;
use rand::SeedableRng;

// ── Helpers ────────────────────────────────────────────────────────────

fn small_config() -> CityConfig {
    CityConfig {
        width: 24,
        height: 24,
        growth_rounds: 4,
        ..CityConfig::default()
    }
}

fn generate(config: &CityConfig, seed: u64) -> CityScene {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_city(config, &mut rng).expect("generation failed")
}

/// Assert the road-connection mask is symmetric across every joint.
fn assert_connection_symmetry(grid: &TileGrid) {
    for id in 0..grid.len() {
        for dir in Direction::ALL {
            if grid.tile(id).road_connections & dir.bit() == 0 {
                continue;
            }
            let neighbour = grid
                .neighbour(id, dir)
                .unwrap_or_else(|| panic!("tile {} connects toward the edge sentinel", id));
            assert!(
                grid.tile(neighbour).road_connections & dir.opposite().bit() != 0,
                "tile {} connects to {} but not back",
                id,
                neighbour
            );
        }
    }
}

fn assert_bvh_enclosure(bvh: &Bvh) {
    for node in bvh.nodes() {
        if let (Some(left), Some(right)) = (node.left, node.right) {
            for child in [left, right] {
                let child = bvh.node(child);
                let needed = node.centre.distance(child.centre) + child.radius;
                assert!(
                    needed <= node.radius + 1e-4,
                    "child sphere exceeds parent: {} > {}",
                    needed,
                    node.radius
                );
            }
        }
    }
}

// ── Pipeline coherence ─────────────────────────────────────────────────

#[test]
fn pipeline_runs_without_panic() {
    let scene = generate(&small_config(), 42);
    assert!(scene.objects.len() > 1, "only the ground was emitted");
    assert_eq!(scene.bvh.len(), 2 * (scene.objects.len() - 1) - 1);
}

#[test]
fn deterministic_output() {
    let config = small_config();
    let a = generate(&config, 42);
    let b = generate(&config, 42);

    assert_eq!(a.objects.objects(), b.objects.objects());
    assert_eq!(a.bvh.nodes(), b.bvh.nodes());
    assert_eq!(a.centre, b.centre);
}

#[test]
fn different_seeds_produce_variation() {
    let config = small_config();
    let mut distinct_object_counts = std::collections::HashSet::new();
    for seed in 0..12 {
        distinct_object_counts.insert(generate(&config, seed).objects.len());
    }
    assert!(
        distinct_object_counts.len() >= 2,
        "12 seeds produced only {} distinct scene sizes",
        distinct_object_counts.len()
    );
}

#[test]
fn wrapped_mode_generates() {
    let config = CityConfig {
        edge_mode: EdgeMode::Wrapped,
        ..small_config()
    };
    let scene = generate(&config, 7);
    assert!(scene.objects.len() > 1);
    assert_connection_symmetry(&scene.grid);
}

// ── Grid and road properties ───────────────────────────────────────────

#[test]
fn road_connections_are_symmetric() {
    for seed in 0..5 {
        let scene = generate(&small_config(), seed);
        assert_connection_symmetry(&scene.grid);
    }
}

#[test]
fn every_connected_tile_is_classified_road() {
    let scene = generate(&small_config(), 42);
    for tile in scene.grid.tiles() {
        if tile.road_connections != 0 {
            assert_eq!(tile.kind, TileKind::Road);
        } else {
            assert_ne!(tile.kind, TileKind::Road);
        }
    }
}

#[test]
fn city_centre_lies_within_the_grid() {
    let config = small_config();
    let scene = generate(&config, 42);
    let half_w = config.width as f32 / 2.0;
    let half_h = config.height as f32 / 2.0;
    assert!(scene.centre.0.abs() <= half_w);
    assert!(scene.centre.1.abs() <= half_h);
}

// ── Building properties ────────────────────────────────────────────────

#[test]
fn building_footprints_are_exclusive() {
    for seed in [1u64, 9, 23] {
        let scene = generate(&small_config(), seed);
        let mut covered = std::collections::HashSet::new();
        for building in &scene.buildings {
            assert_eq!(
                building.tiles.len(),
                (building.footprint as usize).pow(2),
                "footprint cell count"
            );
            for &tile in &building.tiles {
                assert!(covered.insert(tile), "seed {}: tile {} covered twice", seed, tile);
                assert!(
                    matches!(scene.grid.tile(tile).kind, TileKind::Building(_)),
                    "covered tile not marked as building"
                );
            }
        }
    }
}

#[test]
fn buildings_emit_one_object_each() {
    let scene = generate(&small_config(), 42);
    for building in &scene.buildings {
        let object = scene.objects.get(building.object).expect("dangling object index");
        assert!(
            (object_kinds::BUILDING_SPHERE..=object_kinds::BUILDING_CAPSULE)
                .contains(&object.kind)
        );
    }
}

// ── BVH and traversal properties ───────────────────────────────────────

#[test]
fn bvh_spheres_enclose_their_children() {
    for seed in 0..5 {
        assert_bvh_enclosure(&generate(&small_config(), seed).bvh);
    }
}

#[test]
fn descend_chain_visits_every_node_exactly_once() {
    let scene = generate(&small_config(), 42);
    let bvh = &scene.bvh;

    let mut visited = vec![false; bvh.len()];
    let mut cursor = Some(bvh.root());
    while let Some(index) = cursor {
        assert!(!visited[index as usize], "node {} visited twice", index);
        visited[index as usize] = true;
        cursor = bvh.node(index).descend_next;
    }
    assert!(visited.iter().all(|&v| v), "descend chain missed nodes");
}

#[test]
fn leaves_reference_every_indexed_object_once() {
    let scene = generate(&small_config(), 42);
    let mut seen = vec![false; scene.objects.len()];
    for node in scene.bvh.nodes() {
        if let Some(leaf) = node.leaf_object {
            assert!(!seen[leaf as usize], "object {} wrapped twice", leaf);
            seen[leaf as usize] = true;
        }
    }
    // Everything except the ground plane is indexed.
    assert!(!seen[0]);
    assert!(seen[1..].iter().all(|&v| v));
}

// ── Concrete scenarios ─────────────────────────────────────────────────

#[test]
fn straight_growth_scenario_on_wrapped_grid() {
    // One builder at (5,5) heading up, two rounds of the single rule
    // "ffo": a straight vertical road to (5,9), one active child per
    // round, zero branching.
    let mut grid = TileGrid::new(10, 10, EdgeMode::Wrapped).unwrap();
    let rules =
        WeightedTable::new(vec![1.0], vec![Rule::parse(&["ffo"]).unwrap()]).unwrap();
    let mut rng = StdRng::seed_from_u64(0);

    let seed = RoadBuilder::new(grid.index_of(5, 5), Direction::Up);
    let active = grow_roads(&mut grid, vec![seed], &rules, 2, &mut rng);

    assert_eq!(active.len(), 1, "exactly one builder stays active");
    assert_eq!(active[0].anchor, grid.index_of(5, 9));
    assert_eq!(active[0].heading, Direction::Up);

    let vertical = Direction::Up.bit() | Direction::Down.bit();
    assert_eq!(grid.tile(grid.index_of(5, 5)).road_connections, Direction::Up.bit());
    for y in 6..9 {
        assert_eq!(
            grid.tile(grid.index_of(5, y)).road_connections,
            vertical,
            "tile (5,{}) is not a straight segment",
            y
        );
    }
    assert_eq!(grid.tile(grid.index_of(5, 9)).road_connections, Direction::Down.bit());

    let carved: usize = grid
        .tiles()
        .iter()
        .filter(|t| t.road_connections != 0)
        .count();
    assert_eq!(carved, 5, "no branching beyond the straight segment");
}

#[test]
fn nearest_pair_clustering_scenario() {
    // Equal radii at x = 0, 1, 10, 11: round one merges the two close
    // pairs, round two merges the resulting parents into the root.
    let objects: Vec<SceneObject> = [0.0f32, 1.0, 10.0, 11.0]
        .iter()
        .map(|&x| SceneObject {
            kind: 0,
            position: cgmath::Vector3::new(x, 0.0, 0.0),
            rotation: cgmath::Vector3::new(0.0, 0.0, 0.0),
            size: cgmath::Vector3::new(1.0, 0.0, 0.0),
            colour: [1.0; 3],
            material: 0,
        })
        .collect();

    let mut bvh = Bvh::build(&objects, 0, 1.0).unwrap();
    resolve_paths(&mut bvh);

    let root = bvh.node(bvh.root());
    for cluster in [root.left.unwrap(), root.right.unwrap()] {
        let cluster = bvh.node(cluster);
        let a = bvh.node(cluster.left.unwrap()).leaf_object.unwrap();
        let b = bvh.node(cluster.right.unwrap()).leaf_object.unwrap();
        let mut pair = [a, b];
        pair.sort_unstable();
        assert!(
            pair == [0, 1] || pair == [2, 3],
            "cross pairing {:?} instead of the near pairs",
            pair
        );
    }
    assert_bvh_enclosure(&bvh);
}

// ── Encoding integration ───────────────────────────────────────────────

#[test]
fn full_scene_encodes_and_decodes() {
    let scene = generate(&small_config(), 42);
    let codec = TexelCodec::default();

    let mut object_texture = DataTexture::new(scene.objects.len(), OBJECT_ROWS);
    for (column, object) in scene.objects.objects().iter().enumerate() {
        object_texture.write_object(&codec, column, object);
    }
    let mut bvh_texture = DataTexture::new(scene.bvh.len(), BVH_NODE_ROWS);
    for (column, node) in scene.bvh.nodes().iter().enumerate() {
        bvh_texture.write_bvh_node(&codec, column, node);
    }

    let tolerance = codec.resolution();
    for (column, object) in scene.objects.objects().iter().enumerate() {
        assert_eq!(
            codec.decode_int(object_texture.texel(column, 0)),
            object.kind as i32
        );
        let x = codec.decode_float(object_texture.texel(column, 1));
        assert!((x - object.position.x).abs() <= tolerance);
    }
    for (column, node) in scene.bvh.nodes().iter().enumerate() {
        let radius = codec.decode_float(bvh_texture.texel(column, 3));
        assert!((radius - node.radius).abs() <= tolerance);
        let skip = codec.decode_int(bvh_texture.texel(column, 5));
        match node.skip_next {
            Some(index) => assert_eq!(skip, index as i32),
            None => assert_eq!(skip, -1),
        }
    }
}

// ── Multi-seed stress ──────────────────────────────────────────────────

#[test]
fn multi_seed_pipeline_stable() {
    let config = small_config();
    for seed in 0..20 {
        let scene = generate(&config, seed);
        assert!(scene.objects.len() > 1, "seed {}: empty scene", seed);
        assert_connection_symmetry(&scene.grid);
        assert_bvh_enclosure(&scene.bvh);
    }
}

#[test]
fn dense_rules_still_terminate() {
    // A branching-heavy rule set grows the builder population fast; the
    // round budget must still bound the pass.
    let config = CityConfig {
        width: 16,
        height: 16,
        growth_rounds: 5,
        rules: vec![RuleSpec {
            segments: vec!["flo".into(), "fro".into(), "ffo".into()],
            weight: 1.0,
        }],
        building_tiers: vec![BuildingTier { footprint: 1, chance: 0.4 }],
        ..CityConfig::default()
    };
    let scene = generate(&config, 3);
    assert_connection_symmetry(&scene.grid);
    assert_bvh_enclosure(&scene.bvh);
}
