//! Procedural city generation for a ray-casting renderer.
//!
//! This crate contains the whole generation core and nothing of the
//! renderer: functions take plain data plus a `rand::Rng` and return
//! results, making them unit-testable and reproducible under a fixed seed.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`buildings`] | Largest-first probabilistic building placement |
//! | [`bvh`] | Greedy bottom-up bounding-sphere hierarchy |
//! | [`classify`] | Road-piece kind + rotation from connection masks |
//! | [`config`] | Construction-time configuration and validation |
//! | [`constants`] | Object-kind and material ids (u8) |
//! | [`encode`] | Fixed-point texel encoding and data textures |
//! | [`grid`] | Tile arena with bounded or toroidal neighbours |
//! | [`pipeline`] | The full, atomic generation pass |
//! | [`roads`] | L-system road growth via builder agents |
//! | [`scene`] | Scene objects and the append-only object sink |
//! | [`traversal`] | Stackless descend/skip path resolution |
//! | [`weighted`] | Weighted random choice |

pub mod buildings;
pub mod bvh;
pub mod classify;
pub mod config;
pub mod constants;
pub mod encode;
pub mod grid;
pub mod pipeline;
pub mod roads;
pub mod scene;
pub mod traversal;
pub mod weighted;
