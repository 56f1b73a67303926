//! Search tree: simulation loop, UCB selection, and root advancement
//!
//! The tree owns an arena of nodes and drives repeated simulations, each one
//! a descent from the root (select), a batched child expansion where needed
//! (cache), and an iterative walk back up (backpropagate). Between real
//! moves the root advances with [`SearchTree::step`] and the rest of the
//! tree is discarded.

use thiserror::Error;
use tracing::{debug, trace};

use crate::config::SearchConfig;
use crate::evaluator::{Evaluator, EvaluatorError};
use crate::lookahead::lookahead_children;
use crate::node::{Node, NodeId};
use crate::rules::GameRules;

/// Errors that can occur during search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Evaluator error: {0}")]
    Evaluator(#[from] EvaluatorError),

    /// A non-terminal node offered no legal action. The rules promise pass
    /// as a fallback, so this means a corrupted tree or faulty rules.
    #[error("No legal moves available in a non-terminal state")]
    NoLegalMoves,

    /// The evaluator returned a different number of results than expansions
    /// were requested. Contract violation, never retried.
    #[error("Evaluator returned {got} results for {expected} requested expansions")]
    EvaluatorBatchMismatch { expected: usize, got: usize },

    #[error("max_searches must be positive")]
    NoSearches,
}

/// Monte-Carlo search tree over a game described by `R`, guided by `E`.
///
/// Construction evaluates the starting state once and bootstraps the root
/// with its own estimate, so a fresh tree always has `N = 1` at the root.
/// [`action_probs`](SearchTree::action_probs) runs simulations and converts
/// root visit counts into action probabilities; [`step`](SearchTree::step)
/// advances the root when a real move is played; [`reset`](SearchTree::reset)
/// rebuilds at the initial board.
///
/// The tree is single-threaded: simulations run strictly one after another
/// and callers bound cost by the search count alone. Given deterministic
/// rules and evaluator the whole search is deterministic.
pub struct SearchTree<R, E>
where
    R: GameRules,
    E: Evaluator<R::State>,
{
    rules: R,
    evaluator: E,
    nodes: Vec<Node<R::State>>,
    root: NodeId,
    board_size: usize,
    action_size: usize,
    u_const: f32,
}

impl<R, E> SearchTree<R, E>
where
    R: GameRules,
    E: Evaluator<R::State>,
{
    /// Build a tree rooted at the rules' initial board.
    pub fn new(rules: R, evaluator: E, config: &SearchConfig) -> Result<Self, SearchError> {
        let state = rules.init_board();
        Self::from_state(rules, evaluator, config, state)
    }

    /// Build a tree rooted at an arbitrary starting state.
    pub fn from_state(
        rules: R,
        evaluator: E,
        config: &SearchConfig,
        state: R::State,
    ) -> Result<Self, SearchError> {
        let mut tree = SearchTree {
            board_size: rules.board_size(),
            action_size: rules.action_size(),
            rules,
            evaluator,
            nodes: Vec::new(),
            root: NodeId::NONE,
            u_const: config.u_const,
        };
        tree.rebuild(state)?;
        Ok(tree)
    }

    /// Discard all nodes and rebuild at the initial board, exactly as fresh
    /// construction would.
    pub fn reset(&mut self) -> Result<(), SearchError> {
        let state = self.rules.init_board();
        self.rebuild(state)
    }

    fn rebuild(&mut self, state: R::State) -> Result<(), SearchError> {
        let result = self.evaluator.evaluate(&state)?;
        let is_terminal = self.rules.game_ended(&state);
        let to_move = self.rules.turn(&state);
        let root = Node::new(
            state,
            result.policy,
            result.value,
            is_terminal,
            to_move,
            NodeId::NONE,
            0,
            0,
            self.action_size,
        );

        self.nodes.clear();
        self.nodes.push(root);
        self.root = NodeId(0);

        // A fresh root is necessarily unvisited; seed its statistics with
        // its own estimate so selection has something to work with.
        debug_assert!(!self.root_node().visited());
        let value = self.root_node().value;
        self.backpropagate(self.root, value);

        debug!(value, terminal = is_terminal, "tree rebuilt");
        Ok(())
    }

    /// Run exactly `max_searches` simulations, then convert root child visit
    /// counts into action probabilities.
    ///
    /// With `temperature > 0` the counts are raised to `1/temperature` and
    /// L1-normalized; at `temperature == 0` the probability mass is split
    /// equally over the set of most-visited actions. Returns the
    /// probabilities and the number of searches performed.
    pub fn action_probs(
        &mut self,
        max_searches: u32,
        temperature: f32,
    ) -> Result<(Vec<f32>, u32), SearchError> {
        if max_searches == 0 {
            return Err(SearchError::NoSearches);
        }

        let mut searches = 0;
        while searches < max_searches {
            let mut current = self.root;
            loop {
                let node = self.node(current);
                if !node.visited() || node.is_terminal {
                    break;
                }
                let (_, child) = self.select_best_child(current)?;
                current = child;
            }

            let value = self.node(current).value;
            self.backpropagate(current, value);
            searches += 1;

            trace!(
                leaf = current.0,
                value,
                searches,
                "simulation complete"
            );
        }

        let root = self.node(self.root);
        let counts: Vec<u32> = root
            .children
            .iter()
            .map(|&child| {
                if child.is_some() {
                    self.node(child).visit_count
                } else {
                    0
                }
            })
            .collect();

        Ok((visit_probs(&counts, temperature), searches))
    }

    /// Advance the root after a real move.
    ///
    /// A cached child is promoted in place, keeping its whole subtree and
    /// statistics. A move the search never cached gets a fresh root built
    /// from a direct evaluator call on the canonical successor. Either way
    /// everything outside the new root's subtree is freed, and an unvisited
    /// new root bootstraps exactly as at construction.
    pub fn step(&mut self, action: usize) -> Result<(), SearchError> {
        let cached = self.node(self.root).children[action];
        let new_root = if cached.is_some() {
            cached
        } else {
            let root_state = self.node(self.root).state.clone();
            let next = self.rules.next_state(&root_state, action);
            let next_turn = self.rules.turn(&next);
            let canonical = self.rules.canonical_form(&next, next_turn);

            // Direct path: the evaluator scores the successor itself, unlike
            // cached children whose values come from the lookahead.
            let result = self.evaluator.evaluate(&canonical)?;
            let is_terminal = self.rules.game_ended(&canonical);
            let to_move = self.rules.turn(&canonical);
            let node = Node::new(
                canonical,
                result.policy,
                result.value,
                is_terminal,
                to_move,
                NodeId::NONE,
                action as u16,
                0,
                self.action_size,
            );
            self.allocate(node)
        };

        self.node_mut(new_root).parent = NodeId::NONE;
        self.retain_subtree(new_root);

        if !self.root_node().visited() {
            let value = self.root_node().value;
            self.backpropagate(self.root, value);
        }

        debug!(action, nodes = self.nodes.len(), "root advanced");
        Ok(())
    }

    /// Mean value of the child at `action` from the perspective of `id`:
    /// `-(child.V + child.Q_sum) / (1 + parent.N)`. The parent-side visit
    /// count in the denominator keeps the result finite for unvisited
    /// children.
    pub fn avg_q(&self, id: NodeId, action: usize) -> f32 {
        let node = self.node(id);
        let child = self.node(node.children[action]);
        -(child.value + child.value_sum) / (1.0 + node.visit_count as f32)
    }

    /// Per-action mean values: [`avg_q`](SearchTree::avg_q) for legal
    /// actions, 0 elsewhere. Empty child slots also contribute 0, so the
    /// vector is meaningful before expansion too.
    pub fn action_values(&self, id: NodeId) -> Vec<f32> {
        let node = self.node(id);
        let valid = self.rules.valid_moves(&node.state);
        (0..self.action_size)
            .map(|action| {
                if valid[action] && node.children[action].is_some() {
                    self.avg_q(id, action)
                } else {
                    0.0
                }
            })
            .collect()
    }

    /// Whether `id` has never been visited, or none of its children have.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        let node = self.node(id);
        if !node.visited() {
            return true;
        }
        let child_visits: u32 = node
            .children
            .iter()
            .filter(|c| c.is_some())
            .map(|&c| self.node(c).visit_count)
            .sum();
        child_visits == 0
    }

    /// Descend one ply from `id`, expanding first if needed.
    ///
    /// Scans legal actions in ascending order and keeps the first strict
    /// UCB maximum, so ties resolve to the lowest action index.
    fn select_best_child(&mut self, id: NodeId) -> Result<(usize, NodeId), SearchError> {
        if !self.node(id).has_cached_children() {
            self.cache_children(id)?;
        }

        let node = self.node(id);
        let valid = self.rules.valid_moves(&node.state);
        let parent_visits_sqrt = (node.visit_count as f32).sqrt();

        let mut best_action = None;
        let mut max_ucb = f32::NEG_INFINITY;
        for (action, &ok) in valid.iter().enumerate() {
            if !ok {
                continue;
            }
            let child = self.node(node.children[action]);
            let q = self.avg_q(id, action);
            let u = self.u_const * node.prior[action] * parent_visits_sqrt
                / (1.0 + child.visit_count as f32);
            if q + u > max_ucb {
                max_ucb = q + u;
                best_action = Some(action);
            }
        }

        match best_action {
            Some(action) => Ok((action, self.node(id).children[action])),
            None => Err(SearchError::NoLegalMoves),
        }
    }

    /// Materialize every legal child of `id` in one evaluator call. No-op
    /// for terminal nodes. New children start with `N = 0` and are not
    /// backpropagated.
    fn cache_children(&mut self, id: NodeId) -> Result<(), SearchError> {
        if self.node(id).is_terminal {
            return Ok(());
        }

        let state = self.node(id).state.clone();
        let lookahead = lookahead_children(&self.rules, &self.evaluator, &state)?;
        let valid = self.rules.valid_moves(&state);
        let child_height = self.node(id).height + 1;

        let legal_actions: Vec<usize> = valid
            .iter()
            .enumerate()
            .filter_map(|(action, &ok)| ok.then_some(action))
            .collect();

        let created = legal_actions.len();
        for ((action, policy), child_state) in legal_actions
            .into_iter()
            .zip(lookahead.child_policies)
            .zip(lookahead.child_states)
        {
            let is_terminal = self.rules.game_ended(&child_state);
            let to_move = self.rules.turn(&child_state);
            let child = Node::new(
                child_state,
                policy,
                lookahead.q_values[action],
                is_terminal,
                to_move,
                id,
                action as u16,
                child_height,
                self.action_size,
            );
            let child_id = self.allocate(child);
            self.node_mut(id).children[action] = child_id;
        }

        self.node_mut(id).expanded = true;
        debug!(node = id.0, children = created, "cached children");
        Ok(())
    }

    /// Increment visit counts and value sums from `from` up to the root,
    /// negating the increment at every ply.
    fn backpropagate(&mut self, from: NodeId, value: f32) {
        let mut current = from;
        let mut increment = value;
        while current.is_some() {
            let node = self.node_mut(current);
            node.visit_count += 1;
            node.value_sum += increment;
            current = node.parent;
            increment = -increment;
        }
    }

    /// Compact the arena down to the subtree under `keep`, remapping ids.
    /// The kept node becomes `NodeId(0)`.
    fn retain_subtree(&mut self, keep: NodeId) {
        let mut order = vec![keep];
        let mut cursor = 0;
        while cursor < order.len() {
            let old = order[cursor];
            cursor += 1;
            for &child in &self.nodes[old.0 as usize].children {
                if child.is_some() {
                    order.push(child);
                }
            }
        }

        let mut remap = vec![NodeId::NONE; self.nodes.len()];
        for (new_index, &old) in order.iter().enumerate() {
            remap[old.0 as usize] = NodeId(new_index as u32);
        }

        let mut old_nodes: Vec<Option<Node<R::State>>> =
            std::mem::take(&mut self.nodes).into_iter().map(Some).collect();
        let mut new_nodes = Vec::with_capacity(order.len());
        for &old in &order {
            // Each reachable id appears exactly once in a well-formed tree.
            let mut node = match old_nodes[old.0 as usize].take() {
                Some(node) => node,
                None => continue,
            };
            if node.parent.is_some() {
                node.parent = remap[node.parent.0 as usize];
            }
            for slot in node.children.iter_mut() {
                if slot.is_some() {
                    *slot = remap[slot.0 as usize];
                }
            }
            new_nodes.push(node);
        }

        self.nodes = new_nodes;
        self.root = NodeId(0);
    }

    fn allocate(&mut self, node: Node<R::State>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Node by arena id.
    pub fn node(&self, id: NodeId) -> &Node<R::State> {
        &self.nodes[id.0 as usize]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<R::State> {
        &mut self.nodes[id.0 as usize]
    }

    /// Current root id.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Current root node.
    pub fn root_node(&self) -> &Node<R::State> {
        self.node(self.root)
    }

    /// Number of live nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn board_size(&self) -> usize {
        self.board_size
    }

    pub fn action_size(&self) -> usize {
        self.action_size
    }

    /// The rules capability this tree searches with.
    pub fn rules(&self) -> &R {
        &self.rules
    }
}

/// Convert visit counts into action probabilities.
///
/// Powers are taken in f64: small temperatures raise counts to large
/// exponents that overflow f32 long before they trouble f64.
fn visit_probs(counts: &[u32], temperature: f32) -> Vec<f32> {
    if temperature > 0.0 {
        let exponent = 1.0 / temperature as f64;
        let powered: Vec<f64> = counts.iter().map(|&n| (n as f64).powf(exponent)).collect();
        let total: f64 = powered.iter().sum();
        if total > 0.0 {
            powered.iter().map(|&p| (p / total) as f32).collect()
        } else {
            vec![0.0; counts.len()]
        }
    } else {
        let max = counts.iter().copied().max().unwrap_or(0);
        let ties = counts.iter().filter(|&&n| n == max).count();
        counts
            .iter()
            .map(|&n| if n == max { 1.0 / ties as f32 } else { 0.0 })
            .collect()
    }
}
