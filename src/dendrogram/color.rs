use log::{debug, warn};

use super::layout::Layout;

/// Tableau 10 categorical palette, the default for cut sub-trees.
pub const TABLEAU10: [&str; 10] = [
    "#4e79a7", "#f28e2c", "#e15759", "#76b7b2", "#59a14f", "#edc949", "#af7aa1", "#ff9da7",
    "#9c755f", "#bab0ab",
];

/// Partition the tree into colored sub-trees below `cut_height`.
///
/// Single pre-order pass (arena index order, parent before child). A node
/// anchors a new color iff its own height is at or below the cut, above
/// zero (leaves never anchor), and its parent is still uncolored;
/// otherwise it inherits the parent's color. Colors propagate down only.
/// Palette slots are consumed in traversal order and wrap around on
/// exhaustion, with a warning the first time.
pub fn assign_colors(layout: &mut Layout<'_>, cut_height: f32, palette_len: usize) {
    debug_assert!(palette_len > 0);
    let mut next_slot = 0usize;

    for i in 0..layout.nodes.len() {
        let Some(parent) = layout.nodes[i].parent else {
            continue;
        };
        let parent_color = layout.nodes[parent].color;
        let height = layout.nodes[i].data.height;

        if height <= cut_height && height > 0.0 && parent_color.is_none() {
            if next_slot == palette_len {
                warn!("palette exhausted after {palette_len} colors; reusing from the start");
            }
            layout.nodes[i].color = Some(next_slot % palette_len);
            next_slot += 1;
        } else if parent_color.is_some() {
            layout.nodes[i].color = parent_color;
        }
    }

    debug!("color cut at {cut_height}: {next_slot} cut roots");
}
