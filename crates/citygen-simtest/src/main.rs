//! Citygen Headless Validation Harness
//!
//! Generates cities across a sweep of seeds and re-checks every structural
//! invariant without a renderer attached. Runs entirely in-process, no
//! windowing, no GPU, no files written.
//!
//! Usage:
//!   cargo run -p citygen-simtest
//!   cargo run -p citygen-simtest -- --verbose

use cgmath::MetricSpace;
use citygen_logic::classify::classify;
use citygen_logic::config::CityConfig;
use citygen_logic::encode::TexelCodec;
use citygen_logic::grid::{Direction, TileKind};
use citygen_logic::pipeline::{generate_city, CityScene};
use rand::rngs::StdRng;
use rand::SeedableRng;

// ── City configuration (the same JSON a host application would ship) ───
const CONFIG_JSON: &str = include_str!("../data/city_config.json");

const SEED_SWEEP: u64 = 16;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    env_logger::init();
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Citygen Validation Harness ===\n");

    let mut results = Vec::new();

    // 1. Configuration parsing and validation
    let config = match load_config(&mut results) {
        Some(c) => c,
        None => {
            report(&results, verbose);
            std::process::exit(1);
        }
    };

    // 2. Classifier table completeness
    results.extend(validate_classifier());

    // 3. Texel codec round trips
    results.extend(validate_codec());

    // 4. Generation sweep over seeds
    results.extend(validate_generation(&config, verbose));

    report(&results, verbose);

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }
}

fn report(results: &[TestResult], verbose: bool) {
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    for r in results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed,
        results.len(),
        failed
    );
}

// ── 1. Configuration ────────────────────────────────────────────────────

fn load_config(results: &mut Vec<TestResult>) -> Option<CityConfig> {
    println!("--- Configuration ---");

    let config: CityConfig = match serde_json::from_str(CONFIG_JSON) {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult {
                name: "config_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return None;
        }
    };
    results.push(TestResult {
        name: "config_parse".into(),
        passed: true,
        detail: format!(
            "{}x{} grid, {} rules, {} tiers",
            config.width,
            config.height,
            config.rules.len(),
            config.building_tiers.len()
        ),
    });

    match config.validate() {
        Ok(()) => {
            results.push(TestResult {
                name: "config_valid".into(),
                passed: true,
                detail: "all construction-time checks pass".into(),
            });
            Some(config)
        }
        Err(e) => {
            results.push(TestResult {
                name: "config_valid".into(),
                passed: false,
                detail: e.to_string(),
            });
            None
        }
    }
}

// ── 2. Classifier ───────────────────────────────────────────────────────

fn validate_classifier() -> Vec<TestResult> {
    println!("--- Classifier ---");
    let mut results = Vec::new();

    let defined = (1..=15u8).filter(|&m| classify(m).is_some()).count();
    results.push(TestResult {
        name: "classifier_complete".into(),
        passed: defined == 15 && classify(0).is_none(),
        detail: format!("{}/15 connection patterns classified, empty mask rejected", defined),
    });

    let rotations_valid = (1..=15u8).all(|m| classify(m).unwrap().quarter_turns < 4);
    results.push(TestResult {
        name: "classifier_rotations".into(),
        passed: rotations_valid,
        detail: "all rotations within four quarter turns".into(),
    });

    results
}

// ── 3. Texel codec ──────────────────────────────────────────────────────

fn validate_codec() -> Vec<TestResult> {
    println!("--- Texel Codec ---");
    let mut results = Vec::new();
    let codec = TexelCodec::default();
    let tolerance = codec.resolution();

    let mut worst = 0.0f32;
    let mut value = -1999.5f32;
    while value < 1999.5 {
        let error = (codec.decode_float(codec.encode_float(value)) - value).abs();
        worst = worst.max(error);
        value += 13.37;
    }
    results.push(TestResult {
        name: "codec_float_round_trip".into(),
        passed: worst <= tolerance,
        detail: format!("worst error {:.6}, tolerance {:.6}", worst, tolerance),
    });

    let ints_ok = (-4096i32..4096).all(|v| codec.decode_int(codec.encode_int(v)) == v);
    results.push(TestResult {
        name: "codec_int_lossless".into(),
        passed: ints_ok,
        detail: "integers in [-4096, 4096) recovered exactly".into(),
    });

    results
}

// ── 4. Generation sweep ─────────────────────────────────────────────────

fn validate_generation(config: &CityConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Generation ({} seeds) ---", SEED_SWEEP);
    let mut results = Vec::new();

    let mut total_objects = 0usize;
    let mut total_buildings = 0usize;
    let mut failures: Vec<String> = Vec::new();

    for seed in 0..SEED_SWEEP {
        let mut rng = StdRng::seed_from_u64(seed);
        let scene = match generate_city(config, &mut rng) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("seed {}: {}", seed, e));
                continue;
            }
        };

        total_objects += scene.objects.len();
        total_buildings += scene.buildings.len();

        if let Some(problem) = check_scene(&scene) {
            failures.push(format!("seed {}: {}", seed, problem));
        }
        if verbose {
            println!(
                "  seed {:2}: {} objects, {} buildings, {} bvh nodes",
                seed,
                scene.objects.len(),
                scene.buildings.len(),
                scene.bvh.len()
            );
        }
    }

    results.push(TestResult {
        name: "generation_sweep".into(),
        passed: failures.is_empty(),
        detail: if failures.is_empty() {
            format!(
                "{} seeds, avg {} objects / {} buildings per city",
                SEED_SWEEP,
                total_objects / SEED_SWEEP as usize,
                total_buildings / SEED_SWEEP as usize
            )
        } else {
            failures.join("; ")
        },
    });

    // Determinism: the same seed must reproduce the same scene.
    let mut rng_a = StdRng::seed_from_u64(17);
    let mut rng_b = StdRng::seed_from_u64(17);
    let same = match (generate_city(config, &mut rng_a), generate_city(config, &mut rng_b)) {
        (Ok(a), Ok(b)) => {
            a.objects.objects() == b.objects.objects() && a.bvh.nodes() == b.bvh.nodes()
        }
        _ => false,
    };
    results.push(TestResult {
        name: "generation_deterministic".into(),
        passed: same,
        detail: "same seed reproduces objects and bvh exactly".into(),
    });

    results
}

/// Re-check every structural invariant on one generated scene. Returns a
/// description of the first violation found.
fn check_scene(scene: &CityScene) -> Option<String> {
    let grid = &scene.grid;

    // Road joints are symmetric.
    for id in 0..grid.len() {
        for dir in Direction::ALL {
            if grid.tile(id).road_connections & dir.bit() == 0 {
                continue;
            }
            match grid.neighbour(id, dir) {
                None => return Some(format!("tile {} connects into the edge", id)),
                Some(n) => {
                    if grid.tile(n).road_connections & dir.opposite().bit() == 0 {
                        return Some(format!("asymmetric joint {} -> {}", id, n));
                    }
                }
            }
        }
    }

    // Building footprints are exclusive and never overlap roads.
    let mut covered = std::collections::HashSet::new();
    for building in &scene.buildings {
        for &tile in &building.tiles {
            if !covered.insert(tile) {
                return Some(format!("tile {} covered by two buildings", tile));
            }
            if grid.tile(tile).kind == TileKind::Road {
                return Some(format!("building covers road tile {}", tile));
            }
        }
    }

    // Every internal sphere encloses its children.
    for (index, node) in scene.bvh.nodes().iter().enumerate() {
        if let (Some(left), Some(right)) = (node.left, node.right) {
            for child in [left, right] {
                let child = scene.bvh.node(child);
                if node.centre.distance(child.centre) + child.radius > node.radius + 1e-4 {
                    return Some(format!("bvh node {} does not enclose a child", index));
                }
            }
        }
    }

    // The descend chain covers the whole tree exactly once.
    let mut visited = vec![false; scene.bvh.len()];
    let mut cursor = Some(scene.bvh.root());
    while let Some(index) = cursor {
        if visited[index as usize] {
            return Some(format!("descend chain revisits node {}", index));
        }
        visited[index as usize] = true;
        cursor = scene.bvh.node(index).descend_next;
    }
    if !visited.iter().all(|&v| v) {
        return Some("descend chain does not cover the tree".into());
    }

    None
}
