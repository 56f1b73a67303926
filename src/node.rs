//! Search tree node and arena addressing
//!
//! Parent back-links plus per-action child slots would form reference cycles
//! under direct ownership, so nodes live in an arena owned by the tree and
//! point at each other through [`NodeId`] indices.

use crate::rules::Player;

/// Index of a node in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel for an absent node (empty child slot, or no parent).
    pub const NONE: NodeId = NodeId(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self == NodeId::NONE
    }

    #[inline]
    pub fn is_some(self) -> bool {
        self != NodeId::NONE
    }
}

/// A single vertex of the search tree.
///
/// A node starts unexpanded, gains children when the selection pass first
/// needs them, and accumulates visit statistics as simulations pass through
/// it. Terminal nodes never expand.
#[derive(Debug, Clone)]
pub struct Node<S> {
    /// Canonical state this node represents.
    pub state: S,

    /// Prior probability per action, `action_size` entries.
    pub prior: Vec<f32>,

    /// Value estimate `V` delivered by the code path that created the node:
    /// the lookahead q-value for cached children, the evaluator's direct
    /// estimate for roots.
    pub value: f32,

    /// Visit count `N`.
    pub visit_count: u32,

    /// Accumulated backpropagated value `Q_sum`.
    pub value_sum: f32,

    /// Whether the game is over in this state.
    pub is_terminal: bool,

    /// Player to move.
    pub to_move: Player,

    /// Parent node, `NodeId::NONE` for a root.
    pub parent: NodeId,

    /// Action that led here from the parent. Meaningless for a root.
    pub action: u16,

    /// One slot per action, `NodeId::NONE` where no child is cached.
    pub children: Vec<NodeId>,

    /// Whether children have been cached for this node.
    pub expanded: bool,

    /// Plies below the node this tree was rooted at when created.
    pub height: u32,
}

impl<S> Node<S> {
    /// Create a detached node with zeroed statistics. The tree wires parent
    /// and child slots when it allocates the node into the arena.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        state: S,
        prior: Vec<f32>,
        value: f32,
        is_terminal: bool,
        to_move: Player,
        parent: NodeId,
        action: u16,
        height: u32,
        action_size: usize,
    ) -> Self {
        Node {
            state,
            prior,
            value,
            visit_count: 0,
            value_sum: 0.0,
            is_terminal,
            to_move,
            parent,
            action,
            children: vec![NodeId::NONE; action_size],
            expanded: false,
            height,
        }
    }

    /// Whether any simulation has passed through this node.
    #[inline]
    pub fn visited(&self) -> bool {
        self.visit_count > 0
    }

    /// Whether children have been cached (explicit tag, not a slot scan).
    #[inline]
    pub fn has_cached_children(&self) -> bool {
        self.expanded
    }

    /// Child slot for `action`.
    #[inline]
    pub fn child(&self, action: usize) -> NodeId {
        self.children[action]
    }
}
