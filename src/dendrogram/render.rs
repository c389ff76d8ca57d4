use log::debug;

use crate::canvas::{Anchor, DrawCommand, PathCommand};

use super::color::{self, TABLEAU10};
use super::layout::{self, HeightScale};
use super::tree::{RenderError, TreeNode};

const DEFAULT_WIDTH: f32 = 420.0;
const DEFAULT_HEIGHT: f32 = 320.0;
const DEFAULT_PADDING_LEFT: f32 = 30.0;

/// Bottom margin reserved for rotated leaf labels.
const PADDING_BOTTOM_LABELS: f32 = 80.0;
/// Bottom margin when labels are hidden.
const PADDING_BOTTOM_HIDDEN: f32 = 20.0;

// With labels hidden the axis scale and the node transform shrink by
// different amounts; the 20px disagreement keeps the tree clear of the
// axis and is part of the visual contract, not rounding.
/// Inset applied to the axis scale extent when labels are hidden.
const AXIS_INSET_HIDDEN: f32 = 35.0;
/// Inset applied to the node transform extent when labels are hidden.
const NODE_INSET_HIDDEN: f32 = 15.0;
/// Downward shift of the axis and link layers when labels are hidden.
const TOP_OFFSET_HIDDEN: f32 = 20.0;

const TICK_COUNT: usize = 10;
const TICK_SIZE: f32 = 5.0;
const TICK_TEXT_OFFSET: f32 = -8.0;
const TICK_DY_EM: f32 = 0.32;
const AXIS_TITLE_OFFSET_Y: f32 = -20.0;

const LABEL_DX: f32 = -5.0;
const LABEL_DY: f32 = 3.0;
const LABEL_ROTATION: f32 = 270.0;

/// Rendering options.
///
/// Derived values resolve in a fixed order: `hide_labels` decides the
/// default `padding_bottom`, which decides `inner_height`, which decides
/// the two scale extents. Overriding `padding_bottom` short-circuits only
/// the first step.
#[derive(Debug, Clone)]
pub struct DendrogramConfig {
    pub width: f32,
    pub height: f32,
    /// Skip leaf labels and shrink the reserved bottom margin.
    pub hide_labels: bool,
    /// Defaults to 80, or 20 when labels are hidden.
    pub padding_bottom: Option<f32>,
    /// Left margin shared by the axis and the first leaf.
    pub padding_left: f32,
    /// Activates the color-cut partitioner.
    pub cut_height: Option<f32>,
    /// Axis title.
    pub y_label: String,
    /// Ordered palette for cut sub-trees; an empty list falls back to
    /// the built-in Tableau palette.
    pub colors: Vec<String>,
    pub font_family: String,
    pub font_size: f32,
    pub stroke_width: f32,
    /// Stroke for edges outside any colored sub-tree.
    pub link_color: String,
}

impl Default for DendrogramConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            hide_labels: false,
            padding_bottom: None,
            padding_left: DEFAULT_PADDING_LEFT,
            cut_height: None,
            y_label: "↑ Height".to_string(),
            colors: TABLEAU10.iter().map(|c| c.to_string()).collect(),
            font_family: "Inter, sans-serif".to_string(),
            font_size: 10.0,
            stroke_width: 1.0,
            link_color: "grey".to_string(),
        }
    }
}

struct ResolvedConfig {
    inner_height: f32,
    available_width: f32,
    top_offset: f32,
    axis_extent: f32,
    node_extent: f32,
}

fn resolve(config: &DendrogramConfig) -> ResolvedConfig {
    let padding_bottom = config.padding_bottom.unwrap_or(if config.hide_labels {
        PADDING_BOTTOM_HIDDEN
    } else {
        PADDING_BOTTOM_LABELS
    });
    let inner_height = config.height - padding_bottom;
    let available_width = config.width - config.padding_left * 2.0;
    let (top_offset, axis_extent, node_extent) = if config.hide_labels {
        (
            TOP_OFFSET_HIDDEN,
            inner_height - AXIS_INSET_HIDDEN,
            inner_height - NODE_INSET_HIDDEN,
        )
    } else {
        (0.0, inner_height, inner_height)
    };
    ResolvedConfig {
        inner_height,
        available_width,
        top_offset,
        axis_extent,
        node_extent,
    }
}

/// Render a clustering tree to draw commands: axis with ticks, one elbow
/// connector per parent-child edge, and leaf labels unless hidden.
///
/// Pure and synchronous; identical inputs yield an identical command
/// vector, and a failed pass yields `Err` with nothing drawn.
pub fn render(
    tree: &TreeNode,
    config: &DendrogramConfig,
) -> Result<Vec<DrawCommand>, RenderError> {
    tree.validate()?;

    let resolved = resolve(config);
    let mut layout = layout::cluster(tree, resolved.available_width)?;

    let max_height = tree.height;
    let axis_scale = HeightScale::new(max_height, resolved.axis_extent);
    let node_scale = HeightScale::new(max_height, resolved.node_extent);

    let palette: Vec<&str> = if config.colors.is_empty() {
        TABLEAU10.to_vec()
    } else {
        config.colors.iter().map(String::as_str).collect()
    };
    if let Some(cut_height) = config.cut_height {
        color::assign_colors(&mut layout, cut_height, palette.len());
    }

    let mut commands = Vec::new();
    commands.push(DrawCommand::Surface {
        width: config.width,
        height: config.height,
        view_height: resolved.inner_height,
    });

    draw_axis(&mut commands, config, &resolved, &axis_scale);
    draw_links(&mut commands, config, &resolved, &layout, &node_scale, &palette);
    if !config.hide_labels {
        draw_leaf_labels(&mut commands, config, &layout, &node_scale);
    }

    debug!(
        "rendered {} leaves into {} draw commands",
        layout.leaf_count,
        commands.len()
    );
    Ok(commands)
}

fn draw_axis(
    commands: &mut Vec<DrawCommand>,
    config: &DendrogramConfig,
    resolved: &ResolvedConfig,
    scale: &HeightScale,
) {
    commands.push(DrawCommand::GroupStart {
        dx: 0.0,
        dy: resolved.top_offset,
        class: None,
    });
    commands.push(DrawCommand::GroupStart {
        dx: config.padding_left,
        dy: resolved.top_offset,
        class: Some("axis".to_string()),
    });

    let ticks = scale.ticks(TICK_COUNT);
    let step = if ticks.len() > 1 {
        ticks[1] - ticks[0]
    } else {
        1.0
    };
    let precision = layout::tick_precision(step);

    for &value in &ticks {
        let class = if value == 0.0 { "tick baseline" } else { "tick" };
        commands.push(DrawCommand::GroupStart {
            dx: 0.0,
            dy: scale.y(value),
            class: Some(class.to_string()),
        });
        commands.push(DrawCommand::Path {
            commands: vec![
                PathCommand::MoveTo { x: 0.0, y: 0.0 },
                PathCommand::HorizontalTo { x: -TICK_SIZE },
            ],
            stroke: "currentColor".to_string(),
            stroke_width: 1.0,
            class: None,
        });
        commands.push(DrawCommand::Text {
            content: format!("{value:.precision$}"),
            x: TICK_TEXT_OFFSET,
            y: 0.0,
            dx: 0.0,
            dy: TICK_DY_EM * config.font_size,
            rotate: None,
            anchor: Anchor::End,
            fill: "currentColor".to_string(),
            font_family: config.font_family.clone(),
            font_size: config.font_size,
        });
        commands.push(DrawCommand::GroupEnd);
    }

    commands.push(DrawCommand::Text {
        content: config.y_label.clone(),
        x: -config.padding_left,
        y: AXIS_TITLE_OFFSET_Y,
        dx: 0.0,
        dy: 0.0,
        rotate: None,
        anchor: Anchor::Start,
        fill: "currentColor".to_string(),
        font_family: config.font_family.clone(),
        font_size: config.font_size,
    });

    commands.push(DrawCommand::GroupEnd);
    commands.push(DrawCommand::GroupEnd);
}

fn draw_links(
    commands: &mut Vec<DrawCommand>,
    config: &DendrogramConfig,
    resolved: &ResolvedConfig,
    layout: &layout::Layout<'_>,
    scale: &HeightScale,
    palette: &[&str],
) {
    commands.push(DrawCommand::GroupStart {
        dx: config.padding_left,
        dy: resolved.top_offset,
        class: None,
    });
    for (parent, child) in layout.edges() {
        let source = &layout.nodes[parent];
        let target = &layout.nodes[child];
        // Edge color follows the source: an edge into a colored sub-tree
        // from outside stays neutral.
        let stroke = source
            .color
            .map(|slot| palette[slot])
            .unwrap_or(config.link_color.as_str())
            .to_string();
        commands.push(DrawCommand::Path {
            commands: vec![
                PathCommand::MoveTo {
                    x: source.x,
                    y: scale.y(source.data.height),
                },
                PathCommand::HorizontalTo { x: target.x },
                PathCommand::VerticalTo {
                    y: scale.y(target.data.height),
                },
            ],
            stroke,
            stroke_width: config.stroke_width,
            class: Some("link".to_string()),
        });
    }
    commands.push(DrawCommand::GroupEnd);
}

fn draw_leaf_labels(
    commands: &mut Vec<DrawCommand>,
    config: &DendrogramConfig,
    layout: &layout::Layout<'_>,
    scale: &HeightScale,
) {
    for node in &layout.nodes {
        if !node.is_leaf() {
            continue;
        }
        let Some(label) = node.data.label() else {
            continue;
        };
        commands.push(DrawCommand::Text {
            content: label,
            x: node.x + config.padding_left,
            y: scale.y(node.data.height),
            dx: LABEL_DX,
            dy: LABEL_DY,
            rotate: Some(LABEL_ROTATION),
            anchor: Anchor::End,
            fill: "currentColor".to_string(),
            font_family: config.font_family.clone(),
            font_size: config.font_size,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str, index: u64) -> TreeNode {
        TreeNode {
            name: Some(name.to_string()),
            index: Some(index),
            height: 0.0,
            is_leaf: true,
            children: Vec::new(),
        }
    }

    fn branch(height: f32, children: Vec<TreeNode>) -> TreeNode {
        TreeNode {
            name: None,
            index: None,
            height,
            is_leaf: false,
            children,
        }
    }

    fn links(commands: &[DrawCommand]) -> Vec<&DrawCommand> {
        commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Path { class: Some(cl), .. } if cl == "link"))
            .collect()
    }

    fn leaf_labels(commands: &[DrawCommand]) -> Vec<&DrawCommand> {
        commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Text { rotate: Some(_), .. }))
            .collect()
    }

    fn link_strokes(commands: &[DrawCommand]) -> Vec<String> {
        links(commands)
            .iter()
            .map(|c| match c {
                DrawCommand::Path { stroke, .. } => stroke.clone(),
                _ => unreachable!(),
            })
            .collect()
    }

    #[test]
    fn two_leaf_tree_draws_two_elbows_and_two_labels() {
        let tree = branch(1.0, vec![leaf("a", 0), leaf("b", 1)]);
        let commands = render(&tree, &DendrogramConfig::default()).unwrap();

        // Defaults: available width 360, inner height 240.
        let elbows = links(&commands);
        assert_eq!(elbows.len(), 2);
        let DrawCommand::Path { commands: segments, stroke, .. } = elbows[0] else {
            unreachable!()
        };
        assert_eq!(stroke, "grey");
        assert_eq!(
            segments,
            &vec![
                PathCommand::MoveTo { x: 180.0, y: 0.0 },
                PathCommand::HorizontalTo { x: 0.0 },
                PathCommand::VerticalTo { y: 240.0 },
            ]
        );
        let DrawCommand::Path { commands: segments, .. } = elbows[1] else {
            unreachable!()
        };
        assert_eq!(
            segments,
            &vec![
                PathCommand::MoveTo { x: 180.0, y: 0.0 },
                PathCommand::HorizontalTo { x: 360.0 },
                PathCommand::VerticalTo { y: 240.0 },
            ]
        );

        assert_eq!(leaf_labels(&commands).len(), 2);
    }

    #[test]
    fn cut_between_merge_levels_colors_two_subtrees() {
        let tree = branch(
            4.0,
            vec![
                branch(2.0, vec![leaf("a", 0), leaf("b", 1)]),
                branch(2.5, vec![leaf("c", 2), leaf("d", 3)]),
            ],
        );
        let config = DendrogramConfig {
            cut_height: Some(3.0),
            ..DendrogramConfig::default()
        };
        let commands = render(&tree, &config).unwrap();
        let strokes = link_strokes(&commands);
        assert_eq!(strokes.len(), 6);

        // Root edges stay neutral; each sub-tree keeps one palette color.
        assert_eq!(strokes[0], "grey");
        assert_eq!(strokes[3], "grey");
        assert_eq!(strokes[1], TABLEAU10[0]);
        assert_eq!(strokes[2], TABLEAU10[0]);
        assert_eq!(strokes[4], TABLEAU10[1]);
        assert_eq!(strokes[5], TABLEAU10[1]);

        let mut colored: Vec<&String> =
            strokes.iter().filter(|s| s.as_str() != "grey").collect();
        colored.dedup();
        assert_eq!(colored.len(), 2);
    }

    #[test]
    fn hidden_labels_draw_no_leaf_text() {
        let tree = branch(
            2.0,
            vec![branch(1.0, vec![leaf("a", 0), leaf("b", 1)]), leaf("c", 2)],
        );
        let config = DendrogramConfig {
            hide_labels: true,
            ..DendrogramConfig::default()
        };
        let commands = render(&tree, &config).unwrap();
        assert!(leaf_labels(&commands).is_empty());
    }

    #[test]
    fn hidden_labels_shift_layers_and_shrink_both_extents() {
        let tree = branch(1.0, vec![leaf("a", 0), leaf("b", 1)]);
        let config = DendrogramConfig {
            hide_labels: true,
            ..DendrogramConfig::default()
        };
        let commands = render(&tree, &config).unwrap();

        // height 320 - hidden padding 20 = inner 300; the axis extent is
        // 265 and the node extent 285, with both layers pushed down 20.
        let group_offsets: Vec<(f32, f32, Option<String>)> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::GroupStart { dx, dy, class } => Some((*dx, *dy, class.clone())),
                _ => None,
            })
            .collect();
        assert!(group_offsets.contains(&(0.0, 20.0, None)));
        assert!(group_offsets.contains(&(30.0, 20.0, Some("axis".to_string()))));
        assert!(group_offsets.contains(&(0.0, 265.0, Some("tick baseline".to_string()))));

        let strokes = links(&commands);
        let DrawCommand::Path { commands: segments, .. } = strokes[0] else {
            unreachable!()
        };
        assert_eq!(segments[2], PathCommand::VerticalTo { y: 285.0 });
    }

    #[test]
    fn shown_labels_use_the_full_inner_height_for_both_scales() {
        let tree = branch(1.0, vec![leaf("a", 0), leaf("b", 1)]);
        let commands = render(&tree, &DendrogramConfig::default()).unwrap();

        let baseline = commands.iter().find_map(|c| match c {
            DrawCommand::GroupStart { dy, class: Some(cl), .. } if cl == "tick baseline" => {
                Some(*dy)
            }
            _ => None,
        });
        assert_eq!(baseline, Some(240.0));
    }

    #[test]
    fn padding_bottom_override_wins_over_hide_labels() {
        let tree = branch(1.0, vec![leaf("a", 0), leaf("b", 1)]);
        let config = DendrogramConfig {
            padding_bottom: Some(50.0),
            ..DendrogramConfig::default()
        };
        let commands = render(&tree, &config).unwrap();
        let baseline = commands.iter().find_map(|c| match c {
            DrawCommand::GroupStart { dy, class: Some(cl), .. } if cl == "tick baseline" => {
                Some(*dy)
            }
            _ => None,
        });
        assert_eq!(baseline, Some(270.0));
    }

    #[test]
    fn rendering_twice_is_bit_identical() {
        let tree = branch(
            4.0,
            vec![
                branch(2.0, vec![leaf("a", 0), leaf("b", 1)]),
                branch(2.5, vec![leaf("c", 2), leaf("d", 3)]),
            ],
        );
        let config = DendrogramConfig {
            cut_height: Some(3.0),
            ..DendrogramConfig::default()
        };
        let first = render(&tree, &config).unwrap();
        let second = render(&tree, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn single_leaf_tree_renders_as_a_point_at_the_bottom() {
        let tree = leaf("only", 0);
        let commands = render(&tree, &DendrogramConfig::default()).unwrap();

        assert!(links(&commands).is_empty());
        let labels = leaf_labels(&commands);
        assert_eq!(labels.len(), 1);
        let DrawCommand::Text { x, y, .. } = labels[0] else {
            unreachable!()
        };
        // Centered in the available width, sitting on the baseline.
        assert_eq!(*x, 180.0 + 30.0);
        assert_eq!(*y, 240.0);
    }

    #[test]
    fn malformed_tree_aborts_with_nothing_drawn() {
        let tree = branch(1.0, vec![branch(2.0, vec![leaf("a", 0), leaf("b", 1)])]);
        let err = render(&tree, &DendrogramConfig::default()).unwrap_err();
        assert!(matches!(err, RenderError::MalformedTree(_)));
    }

    #[test]
    fn empty_cluster_aborts() {
        let err = render(&branch(1.0, Vec::new()), &DendrogramConfig::default()).unwrap_err();
        assert!(matches!(err, RenderError::EmptyTree));
    }

    #[test]
    fn axis_marks_the_zero_tick_as_baseline() {
        let tree = branch(1.0, vec![leaf("a", 0), leaf("b", 1)]);
        let commands = render(&tree, &DendrogramConfig::default()).unwrap();
        let tick_classes: Vec<String> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::GroupStart { class: Some(cl), .. } if cl.starts_with("tick") => {
                    Some(cl.clone())
                }
                _ => None,
            })
            .collect();
        assert_eq!(tick_classes.iter().filter(|c| *c == "tick baseline").count(), 1);
        assert!(tick_classes.len() > 1);
    }

    #[test]
    fn tick_labels_carry_the_step_precision() {
        // Max height 4 ticks in 0.5 steps, so labels show one decimal.
        let tree = branch(
            4.0,
            vec![branch(2.0, vec![leaf("a", 0), leaf("b", 1)]), leaf("c", 2)],
        );
        let commands = render(&tree, &DendrogramConfig::default()).unwrap();
        let tick_texts: Vec<String> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { content, rotate: None, anchor: Anchor::End, .. } => {
                    Some(content.clone())
                }
                _ => None,
            })
            .collect();
        assert_eq!(tick_texts.first().map(String::as_str), Some("0.0"));
        assert!(tick_texts.contains(&"0.5".to_string()));
        assert_eq!(tick_texts.last().map(String::as_str), Some("4.0"));
    }

    #[test]
    fn empty_palette_falls_back_to_the_builtin_scheme() {
        let tree = branch(
            4.0,
            vec![
                branch(2.0, vec![leaf("a", 0), leaf("b", 1)]),
                branch(2.5, vec![leaf("c", 2), leaf("d", 3)]),
            ],
        );
        let config = DendrogramConfig {
            cut_height: Some(3.0),
            colors: Vec::new(),
            ..DendrogramConfig::default()
        };
        let strokes = link_strokes(&render(&tree, &config).unwrap());
        assert!(strokes.contains(&TABLEAU10[0].to_string()));
    }
}
