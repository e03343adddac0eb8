//! Stackless-traversal path resolution.
//!
//! A renderer walking the BVH on limited-stack hardware follows two
//! precomputed successors per node instead of keeping an explicit stack:
//! `descend_next` when the node's sphere is hit (the left child, or for a
//! leaf whatever comes after it) and `skip_next` when it is missed (the
//! right sibling, or the nearest ancestor's right sibling). `None` means
//! the traversal is complete.

use crate::bvh::Bvh;

/// Fill `descend_next` and `skip_next` on every node.
///
/// One worklist pass from the root: each entry carries the skip target its
/// subtree inherits, so no parent-chain walking or recursion is needed.
pub fn resolve_paths(bvh: &mut Bvh) {
    let mut worklist: Vec<(u32, Option<u32>)> = vec![(bvh.root(), None)];

    while let Some((index, skip)) = worklist.pop() {
        let (left, right) = {
            let node = bvh.node(index);
            (node.left, node.right)
        };

        let node = bvh.node_mut(index);
        node.skip_next = skip;

        match (left, right) {
            (Some(left), Some(right)) => {
                node.descend_next = Some(left);
                // The left child skips to its sibling; the right child
                // inherits this node's own skip target.
                worklist.push((right, skip));
                worklist.push((left, Some(right)));
            }
            _ => {
                // A leaf is tested and then moves on either way.
                node.descend_next = skip;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneObject;
    use cgmath::Vector3;

    fn object_at(x: f32) -> SceneObject {
        SceneObject {
            kind: 0,
            position: Vector3::new(x, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            size: Vector3::new(1.0, 0.0, 0.0),
            colour: [1.0; 3],
            material: 0,
        }
    }

    fn resolved_bvh(count: usize) -> Bvh {
        let objects: Vec<SceneObject> = (0..count).map(|i| object_at(i as f32 * 2.0)).collect();
        let mut bvh = Bvh::build(&objects, 0, 1.0).unwrap();
        resolve_paths(&mut bvh);
        bvh
    }

    #[test]
    fn test_single_leaf_root_terminates_immediately() {
        let bvh = resolved_bvh(1);
        let root = bvh.node(bvh.root());
        assert_eq!(root.descend_next, None);
        assert_eq!(root.skip_next, None);
    }

    #[test]
    fn test_three_node_tree_paths() {
        let bvh = resolved_bvh(2);
        let root = bvh.node(bvh.root());
        let left = root.left.unwrap();
        let right = root.right.unwrap();

        assert_eq!(root.descend_next, Some(left));
        assert_eq!(root.skip_next, None);
        assert_eq!(bvh.node(left).descend_next, Some(right));
        assert_eq!(bvh.node(left).skip_next, Some(right));
        assert_eq!(bvh.node(right).descend_next, None);
        assert_eq!(bvh.node(right).skip_next, None);
    }

    #[test]
    fn test_descend_chain_visits_every_node_once() {
        for count in [1usize, 2, 3, 4, 5, 8, 13] {
            let bvh = resolved_bvh(count);
            let mut visited = vec![false; bvh.len()];
            let mut cursor = Some(bvh.root());
            let mut steps = 0;

            while let Some(index) = cursor {
                assert!(!visited[index as usize], "node {} visited twice", index);
                visited[index as usize] = true;
                cursor = bvh.node(index).descend_next;
                steps += 1;
                assert!(steps <= bvh.len(), "descend chain cycles");
            }

            assert!(
                visited.iter().all(|&v| v),
                "{}-leaf tree: descend chain missed nodes",
                count
            );
        }
    }

    #[test]
    fn test_skip_jumps_over_the_subtree() {
        // Skipping from any node must reach exactly the nodes that are not
        // in its subtree and come after it in depth-first order.
        let bvh = resolved_bvh(5);
        for start in 0..bvh.len() as u32 {
            let mut inside = std::collections::HashSet::new();
            let mut stack = vec![start];
            while let Some(index) = stack.pop() {
                inside.insert(index);
                let node = bvh.node(index);
                stack.extend(node.left.iter().copied().chain(node.right.iter().copied()));
            }

            let mut cursor = bvh.node(start).skip_next;
            while let Some(index) = cursor {
                assert!(
                    !inside.contains(&index),
                    "skip from {} re-entered its own subtree at {}",
                    start,
                    index
                );
                cursor = bvh.node(index).descend_next;
            }
        }
    }

    #[test]
    fn test_leaf_descend_equals_skip() {
        let bvh = resolved_bvh(6);
        for node in bvh.nodes() {
            if node.is_leaf() {
                assert_eq!(node.descend_next, node.skip_next);
            }
        }
    }
}
