use log::debug;

use super::tree::{RenderError, TreeNode};

/// Linear merge-height to vertical-pixel scale, inverted so height 0
/// sits at the bottom of the plotting extent.
#[derive(Debug, Clone, Copy)]
pub struct HeightScale {
    max_height: f32,
    extent: f32,
}

// 1/2/5/10 tick increment thresholds.
const E10: f32 = 7.071_068;
const E5: f32 = 3.162_277_7;
const E2: f32 = 1.414_213_6;

fn tick_increment(span: f32, count: usize) -> f32 {
    let step = span / count.max(1) as f32;
    let power = step.log10().floor();
    let error = step / 10f32.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };
    if power >= 0.0 {
        factor * 10f32.powf(power)
    } else {
        // Fractional steps are returned as a negative divisor so tick
        // values can be computed by division, avoiding drift.
        -10f32.powf(-power) / factor
    }
}

/// Decimal places needed to print ticks spaced by `step`.
pub fn tick_precision(step: f32) -> usize {
    if step >= 1.0 || step <= 0.0 {
        0
    } else {
        (-step.log10()).ceil() as usize
    }
}

impl HeightScale {
    pub fn new(max_height: f32, extent: f32) -> Self {
        Self { max_height, extent }
    }

    /// Pixel y for a merge height: `extent` at 0, 0 at `max_height`.
    /// The degenerate single-point tree (max height 0) collapses onto
    /// the bottom of the axis.
    pub fn y(&self, height: f32) -> f32 {
        if self.max_height <= 0.0 {
            return self.extent;
        }
        self.extent - (height / self.max_height) * self.extent
    }

    /// Round tick values over `[0, max_height]`, aiming for `count`
    /// ticks on 1/2/5/10 multiples.
    pub fn ticks(&self, count: usize) -> Vec<f32> {
        if self.max_height <= 0.0 {
            return vec![0.0];
        }
        let step = tick_increment(self.max_height, count);
        if step > 0.0 {
            let last = (self.max_height / step).floor() as i64;
            (0..=last).map(|i| i as f32 * step).collect()
        } else {
            let inv = -step;
            let last = (self.max_height * inv).floor() as i64;
            (0..=last).map(|i| i as f32 / inv).collect()
        }
    }
}

/// One laid-out node. `parent` and `children` are indices into the
/// owning `Layout` arena, so the parent back-reference carries no
/// ownership and the structure stays acyclic.
#[derive(Debug)]
pub struct LayoutNode<'a> {
    pub data: &'a TreeNode,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub depth: usize,
    /// Horizontal pixel position within the available width.
    pub x: f32,
    /// Palette slot assigned by the color-cut partitioner.
    pub color: Option<usize>,
}

impl LayoutNode<'_> {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Pre-order arena over the input tree: every child has a higher index
/// than its parent, so index order is a parent-before-child traversal.
#[derive(Debug)]
pub struct Layout<'a> {
    pub nodes: Vec<LayoutNode<'a>>,
    pub leaf_count: usize,
}

impl<'a> Layout<'a> {
    /// Parent-to-child pairs, one per child link, in traversal order of
    /// the child.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| node.parent.map(|p| (p, i)))
    }
}

fn push_subtree<'a>(
    node: &'a TreeNode,
    parent: Option<usize>,
    depth: usize,
    nodes: &mut Vec<LayoutNode<'a>>,
) -> usize {
    let index = nodes.len();
    nodes.push(LayoutNode {
        data: node,
        parent,
        children: Vec::with_capacity(node.children.len()),
        depth,
        x: 0.0,
        color: None,
    });
    for child in &node.children {
        let child_index = push_subtree(child, Some(index), depth + 1, nodes);
        nodes[index].children.push(child_index);
    }
    index
}

/// Cluster layout: leaves evenly spaced over `[0, available_width]` in
/// depth-first order, internal nodes at the mean x of their children.
/// Vertical placement is not decided here; it derives from `height`
/// through a `HeightScale`.
pub fn cluster<'a>(
    root: &'a TreeNode,
    available_width: f32,
) -> Result<Layout<'a>, RenderError> {
    let mut nodes: Vec<LayoutNode<'a>> = Vec::new();
    push_subtree(root, None, 0, &mut nodes);

    let leaves: Vec<usize> = nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| node.is_leaf())
        .map(|(i, _)| i)
        .collect();
    if leaves.is_empty() {
        return Err(RenderError::EmptyTree);
    }

    if leaves.len() == 1 {
        nodes[leaves[0]].x = available_width / 2.0;
    } else {
        let step = available_width / (leaves.len() - 1) as f32;
        for (slot, &leaf) in leaves.iter().enumerate() {
            nodes[leaf].x = slot as f32 * step;
        }
    }

    // Children always follow their parent in the arena, so a reverse
    // sweep sees every child before its parent.
    for i in (0..nodes.len()).rev() {
        if nodes[i].children.is_empty() {
            continue;
        }
        let (sum, count) = {
            let children = &nodes[i].children;
            (
                children.iter().map(|&c| nodes[c].x).sum::<f32>(),
                children.len() as f32,
            )
        };
        nodes[i].x = sum / count;
    }

    debug!(
        "cluster layout: {} nodes, {} leaves over {:.1}px",
        nodes.len(),
        leaves.len(),
        available_width
    );

    Ok(Layout {
        nodes,
        leaf_count: leaves.len(),
    })
}
