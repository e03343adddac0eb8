//! Bounding-volume hierarchy construction.
//!
//! A greedy bottom-up build over bounding spheres: every round the two
//! closest unclaimed nodes are merged under a fresh parent until a single
//! root remains. Not globally optimal, but deterministic for a given
//! object order and cheap enough for scenes in the low thousands.
//!
//! Nodes live in an arena addressed by `u32` index; parent links are
//! back-references for lookup only. A node is immutable once created
//! except for the two traversal successors, which `traversal::resolve_paths`
//! fills in a single later pass.

use cgmath::{MetricSpace, Vector3};

use crate::pipeline::GenerateError;
use crate::scene::SceneObject;

#[derive(Debug, Clone, PartialEq)]
pub struct BvhNode {
    pub centre: Vector3<f32>,
    pub radius: f32,
    pub parent: Option<u32>,
    pub left: Option<u32>,
    pub right: Option<u32>,
    /// Scene-object index for leaves, `None` for internal nodes.
    pub leaf_object: Option<u32>,
    /// Next node when this sphere is hit; filled by path resolution.
    pub descend_next: Option<u32>,
    /// Next node when this sphere is missed; filled by path resolution.
    pub skip_next: Option<u32>,
}

impl BvhNode {
    pub fn is_leaf(&self) -> bool {
        self.leaf_object.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    root: u32,
}

impl Bvh {
    /// Build a hierarchy over `objects`, whose scene indices start at
    /// `base_index` (the pipeline passes 1 to skip the unindexed ground
    /// plane). `inflation` scales each leaf's largest size component into
    /// its bounding radius, compensating for non-spherical shapes.
    pub fn build(
        objects: &[SceneObject],
        base_index: u32,
        inflation: f32,
    ) -> Result<Bvh, GenerateError> {
        if objects.is_empty() {
            return Err(GenerateError::EmptyScene);
        }

        let mut nodes: Vec<BvhNode> = Vec::with_capacity(objects.len() * 2 - 1);
        let mut active: Vec<u32> = Vec::with_capacity(objects.len());

        for (i, object) in objects.iter().enumerate() {
            let largest = object.size.x.max(object.size.y).max(object.size.z);
            nodes.push(BvhNode {
                centre: object.position,
                radius: inflation * largest,
                parent: None,
                left: None,
                right: None,
                leaf_object: Some(base_index + i as u32),
                descend_next: None,
                skip_next: None,
            });
            active.push(i as u32);
        }

        while active.len() > 1 {
            // Distance for every unordered pair of active nodes, sorted
            // ascending. The sort is stable and total_cmp never panics, so
            // tie order follows input order and runs stay reproducible.
            let mut pairs = Vec::with_capacity(active.len() * (active.len() - 1) / 2);
            for i in 0..active.len() {
                for j in (i + 1)..active.len() {
                    let d = nodes[active[i] as usize]
                        .centre
                        .distance(nodes[active[j] as usize].centre);
                    pairs.push((d, i, j));
                }
            }
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut claimed = vec![false; active.len()];
            let mut next_active = Vec::with_capacity(active.len() / 2 + 1);

            for (_, i, j) in pairs {
                if claimed[i] || claimed[j] {
                    continue;
                }
                claimed[i] = true;
                claimed[j] = true;
                next_active.push(Self::merge(&mut nodes, active[i], active[j]));
            }

            let carried: Vec<u32> = active
                .iter()
                .zip(&claimed)
                .filter(|(_, &taken)| !taken)
                .map(|(&id, _)| id)
                .collect();
            assert!(
                carried.len() <= 1,
                "pairing pass left {} nodes unclaimed",
                carried.len()
            );
            next_active.extend(carried);

            active = next_active;
        }

        Ok(Bvh { nodes, root: active[0] })
    }

    /// Create the parent enclosing `left` and `right`.
    fn merge(nodes: &mut Vec<BvhNode>, left: u32, right: u32) -> u32 {
        let index = nodes.len() as u32;
        let (lc, lr) = (nodes[left as usize].centre, nodes[left as usize].radius);
        let (rc, rr) = (nodes[right as usize].centre, nodes[right as usize].radius);

        // Centred on the midpoint, radius of half the separation plus the
        // larger child radius: encloses both children by construction.
        let centre = (lc + rc) / 2.0;
        let radius = centre.distance(lc) + lr.max(rr);

        nodes[left as usize].parent = Some(index);
        nodes[right as usize].parent = Some(index);
        nodes.push(BvhNode {
            centre,
            radius,
            parent: None,
            left: Some(left),
            right: Some(right),
            leaf_object: None,
            descend_next: None,
            skip_next: None,
        });
        index
    }

    pub fn root(&self) -> u32 {
        self.root
    }

    pub fn node(&self, index: u32) -> &BvhNode {
        &self.nodes[index as usize]
    }

    pub(crate) fn node_mut(&mut self, index: u32) -> &mut BvhNode {
        &mut self.nodes[index as usize]
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
