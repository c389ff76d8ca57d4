mod color;
mod layout;
mod render;
mod tree;

pub use color::TABLEAU10;
pub use layout::{cluster, HeightScale, Layout, LayoutNode};
pub use render::{render, DendrogramConfig};
pub use tree::{RenderError, TreeNode};
