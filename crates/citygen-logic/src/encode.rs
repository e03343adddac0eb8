//! Fixed-point texel encoding for GPU transfer.
//!
//! The renderer receives the scene and the BVH as RGBA byte textures, so
//! every float and index is packed into three base-256 digits per texel
//! (the alpha byte is opaque padding). Floats are biased and scaled into a
//! fixed range first; integers are biased by 2^23 so that -1, the "no such
//! node/object" marker, survives the trip. Both transforms are pure and
//! invert losslessly within their declared ranges.

use crate::bvh::BvhNode;
use crate::scene::SceneObject;

/// Rows per encoded scene object: kind, position, rotation, size, colour
/// as three rows each, then material.
pub const OBJECT_ROWS: usize = 14;

/// Rows per encoded BVH node: centre (3), radius, descend, skip, leaf.
pub const BVH_NODE_ROWS: usize = 7;

const INT_BIAS: i64 = 1 << 23;

/// Split a non-negative value into three base-256 digits, low first.
fn to_base256(value: f64) -> [u8; 4] {
    let mut x = value.max(0.0) as u64;
    let lo = (x % 256) as u8;
    x /= 256;
    let mid = (x % 256) as u8;
    x /= 256;
    let hi = (x % 256) as u8;
    [lo, mid, hi, 255]
}

fn from_base256(texel: [u8; 4]) -> f64 {
    texel[0] as f64 + texel[1] as f64 * 256.0 + texel[2] as f64 * 65_536.0
}

/// Bias/scale constants for the float transform. The defaults store
/// values in [-2000, 2000] with a quantization step of 1/4096.
#[derive(Debug, Clone, Copy)]
pub struct TexelCodec {
    pub bias: f32,
    pub scale: f32,
}

impl Default for TexelCodec {
    fn default() -> Self {
        Self { bias: 2000.0, scale: 4096.0 }
    }
}

impl TexelCodec {
    /// The quantization step: the worst-case round-trip error is half this.
    pub fn resolution(&self) -> f32 {
        1.0 / self.scale
    }

    pub fn encode_float(&self, value: f32) -> [u8; 4] {
        to_base256(((value as f64) + self.bias as f64) * self.scale as f64)
    }

    pub fn decode_float(&self, texel: [u8; 4]) -> f32 {
        (from_base256(texel) / self.scale as f64 - self.bias as f64) as f32
    }

    pub fn encode_int(&self, value: i32) -> [u8; 4] {
        to_base256((value as i64 + INT_BIAS) as f64)
    }

    pub fn decode_int(&self, texel: [u8; 4]) -> i32 {
        (from_base256(texel) as i64 - INT_BIAS) as i32
    }
}

fn index_or_none(value: Option<u32>) -> i32 {
    value.map_or(-1, |v| v as i32)
}

/// A column-per-entry RGBA byte buffer in the renderer's texture layout.
#[derive(Debug, Clone)]
pub struct DataTexture {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl DataTexture {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, data: vec![0; width * height * 4] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGBA bytes, row-major, ready for upload.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn set(&mut self, x: usize, y: usize, texel: [u8; 4]) {
        assert!(x < self.width && y < self.height, "texel ({}, {}) out of bounds", x, y);
        let offset = (y * self.width + x) * 4;
        self.data[offset..offset + 4].copy_from_slice(&texel);
    }

    pub fn texel(&self, x: usize, y: usize) -> [u8; 4] {
        assert!(x < self.width && y < self.height, "texel ({}, {}) out of bounds", x, y);
        let offset = (y * self.width + x) * 4;
        [
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
            self.data[offset + 3],
        ]
    }

    fn set_vec3(&mut self, x: usize, y: usize, codec: &TexelCodec, value: [f32; 3]) {
        for (i, component) in value.into_iter().enumerate() {
            self.set(x, y + i, codec.encode_float(component));
        }
    }

    /// Write one scene object into column `column` (rows 0..14).
    pub fn write_object(&mut self, codec: &TexelCodec, column: usize, object: &SceneObject) {
        self.set(column, 0, codec.encode_int(object.kind as i32));
        self.set_vec3(column, 1, codec, object.position.into());
        self.set_vec3(column, 4, codec, object.rotation.into());
        self.set_vec3(column, 7, codec, object.size.into());
        self.set_vec3(column, 10, codec, object.colour);
        self.set(column, 13, codec.encode_int(object.material as i32));
    }

    /// Write one resolved BVH node into column `column` (rows 0..7).
    pub fn write_bvh_node(&mut self, codec: &TexelCodec, column: usize, node: &BvhNode) {
        self.set_vec3(column, 0, codec, node.centre.into());
        self.set(column, 3, codec.encode_float(node.radius));
        self.set(column, 4, codec.encode_int(index_or_none(node.descend_next)));
        self.set(column, 5, codec.encode_int(index_or_none(node.skip_next)));
        self.set(column, 6, codec.encode_int(index_or_none(node.leaf_object)));
    }
}
