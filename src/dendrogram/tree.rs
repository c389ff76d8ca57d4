use serde::Deserialize;
use thiserror::Error;

/// Errors surfaced synchronously by a render pass. Both are fatal: the
/// pass aborts and nothing is drawn.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The supplied clustering result violates the tree contract.
    #[error("malformed tree: {0}")]
    MalformedTree(String),
    /// The tree contains a cluster with no leaves, so there is nothing
    /// to lay out.
    #[error("tree contains no leaf nodes")]
    EmptyTree,
}

/// One cluster or leaf of a hierarchical clustering result.
///
/// The tree is owned by the caller and treated as read-only: layout,
/// color and geometry live in separate arena-indexed structures.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeNode {
    /// Leaf label; internal nodes normally have none.
    #[serde(default)]
    pub name: Option<String>,
    /// Numeric identity, used as the fallback label.
    #[serde(default)]
    pub index: Option<u64>,
    /// Merge distance; 0 for leaves, and never below any child's height.
    pub height: f32,
    #[serde(default, rename = "isLeaf")]
    pub is_leaf: bool,
    /// Ordered children; empty iff leaf.
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Parse and validate a JSON clustering result.
    pub fn from_json(source: &str) -> Result<Self, RenderError> {
        let tree: TreeNode = serde_json::from_str(source)
            .map_err(|e| RenderError::MalformedTree(format!("invalid tree JSON: {e}")))?;
        tree.validate()?;
        Ok(tree)
    }

    /// Verify the invariants the layout and color passes rely on.
    ///
    /// A violated height ordering or a leaf/children mismatch is a defect
    /// in the supplied clustering result and is reported rather than
    /// clamped. A cluster with zero children contains no leaves and
    /// fails with `EmptyTree`.
    pub fn validate(&self) -> Result<(), RenderError> {
        if !self.height.is_finite() || self.height < 0.0 {
            return Err(RenderError::MalformedTree(format!(
                "node height {} is not a non-negative number",
                self.height
            )));
        }
        if self.is_leaf {
            if !self.children.is_empty() {
                return Err(RenderError::MalformedTree(format!(
                    "leaf node has {} children",
                    self.children.len()
                )));
            }
            if self.height != 0.0 {
                return Err(RenderError::MalformedTree(format!(
                    "leaf node has non-zero height {}",
                    self.height
                )));
            }
            return Ok(());
        }
        if self.children.is_empty() {
            return Err(RenderError::EmptyTree);
        }
        for child in &self.children {
            if child.height > self.height {
                return Err(RenderError::MalformedTree(format!(
                    "merge height {} is below child height {}",
                    self.height, child.height
                )));
            }
            child.validate()?;
        }
        Ok(())
    }

    /// Leaf label: `name`, falling back to the numeric index.
    pub fn label(&self) -> Option<String> {
        self.name
            .clone()
            .or_else(|| self.index.map(|i| i.to_string()))
    }

    pub fn leaf_count(&self) -> usize {
        if self.children.is_empty() {
            1
        } else {
            self.children.iter().map(TreeNode::leaf_count).sum()
        }
    }
}
