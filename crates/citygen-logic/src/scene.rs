//! Scene objects and the append-only object sink.
//!
//! The renderer reads objects by index; indices are assigned sequentially
//! at insertion and never reused or reassigned, so anything holding an
//! index (the BVH leaves, the encoded textures) stays valid for the life
//! of the scene.

use cgmath::Vector3;
use rand::Rng;

/// One renderable object: a shape kind plus its placement and appearance.
///
/// Zero size components are valid and denote collapsed dimensions (a
/// sphere only uses `size.x`, the ground plane uses none).
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub kind: u8,
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub size: Vector3<f32>,
    pub colour: [f32; 3],
    pub material: u8,
}

/// The append-only object sink handed to the renderer.
#[derive(Debug, Clone, Default)]
pub struct SceneList {
    objects: Vec<SceneObject>,
}

impl SceneList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an object, returning its stable index.
    pub fn push(&mut self, object: SceneObject) -> u32 {
        let index = self.objects.len() as u32;
        self.objects.push(object);
        index
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn get(&self, index: u32) -> Option<&SceneObject> {
        self.objects.get(index as usize)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// A random saturated colour: hue anywhere on the wheel, saturation in
/// [0.25, 1) and value in [0.5, 1) so buildings never come out grey or
/// near-black.
pub fn random_colour(rng: &mut impl Rng) -> [f32; 3] {
    let h = rng.gen::<f32>();
    let s = rng.gen_range(0.25..1.0);
    let v = rng.gen_range(0.5..1.0);
    hsv_to_rgb(h, s, v)
}

/// HSV to RGB, all channels in [0, 1].
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let h = h * 6.0;
    let c = v * s;
    let x = c * (1.0 - ((h % 2.0) - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match h as i32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    [r + m, g + m, b + m]
}
