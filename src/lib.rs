//! Dendrogram layout and rendering.
//!
//! A hierarchical clustering result goes in as a [`TreeNode`] tree; a
//! deterministic list of vector draw commands comes out, ready for the
//! bundled SVG writer or any other sink. The pass is pure and
//! re-entrant: same tree and options, same commands.

pub mod canvas;
pub mod dendrogram;
pub mod theme;

pub use canvas::{write_svg, DrawCommand, SvgOptions};
pub use dendrogram::{render, DendrogramConfig, RenderError, TreeNode};
