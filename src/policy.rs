//! Move-selection policies built on the rules, evaluators and search tree
//!
//! A policy turns a position into a probability distribution over actions.
//! [`RandomPolicy`] and [`GreedyPolicy`] are stateless baselines; the real
//! player is [`MctsPolicy`], which owns a search tree and must be kept in
//! sync with the game through [`Policy::step`] and [`Policy::reset`].

use rand::Rng;
use tracing::debug;

use crate::config::{SearchConfig, TemperatureSchedule};
use crate::evaluator::{AreaEvaluator, Evaluator};
use crate::lookahead::lookahead_children;
use crate::rules::GameRules;
use crate::tree::{SearchError, SearchTree};

/// A move-selection strategy for games described by `R`.
pub trait Policy<R: GameRules> {
    /// Probability distribution over actions for `state` at move number
    /// `step`.
    fn action_probs(&mut self, state: &R::State, step: u32) -> Result<Vec<f32>, SearchError>;

    /// Observe a move actually played, by either side.
    fn step(&mut self, _action: usize) -> Result<(), SearchError> {
        Ok(())
    }

    /// Forget all carried game state.
    fn reset(&mut self) -> Result<(), SearchError> {
        Ok(())
    }
}

/// Uniform distribution over the legal actions.
#[derive(Debug, Clone)]
pub struct RandomPolicy<R> {
    rules: R,
}

impl<R: GameRules> RandomPolicy<R> {
    pub fn new(rules: R) -> Self {
        RandomPolicy { rules }
    }
}

impl<R: GameRules> Policy<R> for RandomPolicy<R> {
    fn action_probs(&mut self, state: &R::State, _step: u32) -> Result<Vec<f32>, SearchError> {
        let valid = self.rules.valid_moves(state);
        let legal = valid.iter().filter(|&&ok| ok).count();
        if legal == 0 {
            return Err(SearchError::NoLegalMoves);
        }
        let p = 1.0 / legal as f32;
        Ok(valid.iter().map(|&ok| if ok { p } else { 0.0 }).collect())
    }
}

/// One-ply lookahead against the exact area heuristic, split uniformly over
/// the highest-valued legal actions.
pub struct GreedyPolicy<R: GameRules> {
    rules: R,
    evaluator: AreaEvaluator<R>,
}

impl<R: GameRules + Clone> GreedyPolicy<R> {
    pub fn new(rules: R) -> Self {
        let evaluator = AreaEvaluator::new(rules.clone());
        GreedyPolicy { rules, evaluator }
    }
}

impl<R: GameRules> Policy<R> for GreedyPolicy<R> {
    fn action_probs(&mut self, state: &R::State, _step: u32) -> Result<Vec<f32>, SearchError> {
        let lookahead = lookahead_children(&self.rules, &self.evaluator, state)?;
        let valid = self.rules.valid_moves(state);

        let mut best = f32::NEG_INFINITY;
        for (action, &ok) in valid.iter().enumerate() {
            if ok && lookahead.q_values[action] > best {
                best = lookahead.q_values[action];
            }
        }
        if best == f32::NEG_INFINITY {
            return Err(SearchError::NoLegalMoves);
        }

        let ties = valid
            .iter()
            .enumerate()
            .filter(|&(action, &ok)| ok && lookahead.q_values[action] == best)
            .count();
        let p = 1.0 / ties as f32;
        Ok(valid
            .iter()
            .enumerate()
            .map(|(action, &ok)| {
                if ok && lookahead.q_values[action] == best {
                    p
                } else {
                    0.0
                }
            })
            .collect())
    }
}

/// Tree-search player: runs a fixed number of simulations per decision and
/// converts root visit counts into probabilities at the scheduled
/// temperature.
///
/// The policy tracks the game through its tree, so every move played in the
/// real game must be reported via [`Policy::step`], including the
/// opponent's.
pub struct MctsPolicy<R, E>
where
    R: GameRules,
    E: Evaluator<R::State>,
{
    tree: SearchTree<R, E>,
    num_searches: u32,
    schedule: TemperatureSchedule,
}

impl<R, E> MctsPolicy<R, E>
where
    R: GameRules,
    E: Evaluator<R::State>,
{
    pub fn new(rules: R, evaluator: E, config: &SearchConfig) -> Result<Self, SearchError> {
        let tree = SearchTree::new(rules, evaluator, config)?;
        Ok(MctsPolicy {
            tree,
            num_searches: config.num_searches,
            schedule: config.temperature,
        })
    }

    /// The search tree backing this policy.
    pub fn tree(&self) -> &SearchTree<R, E> {
        &self.tree
    }
}

impl<R, E> Policy<R> for MctsPolicy<R, E>
where
    R: GameRules,
    E: Evaluator<R::State>,
{
    /// The position is taken from the internal tree, not from `state`; the
    /// caller keeps them in sync through `step` and `reset`.
    fn action_probs(&mut self, _state: &R::State, step: u32) -> Result<Vec<f32>, SearchError> {
        let temperature = self.schedule.temperature(step);
        let (pi, searches) = self.tree.action_probs(self.num_searches, temperature)?;
        debug!(step, temperature, searches, "mcts move distribution");
        Ok(pi)
    }

    fn step(&mut self, action: usize) -> Result<(), SearchError> {
        self.tree.step(action)
    }

    fn reset(&mut self) -> Result<(), SearchError> {
        self.tree.reset()
    }
}

/// Draw an action index from a probability vector.
///
/// Walks the cumulative distribution with a single uniform draw. A
/// degenerate vector with no positive mass falls back to the final action,
/// which by convention is pass.
pub fn sample_action<T: Rng>(probs: &[f32], rng: &mut T) -> usize {
    let total: f32 = probs.iter().sum();
    if total <= 0.0 {
        return probs.len().saturating_sub(1);
    }

    let mut remaining = rng.gen::<f32>() * total;
    for (action, &p) in probs.iter().enumerate() {
        remaining -= p;
        if remaining <= 0.0 {
            return action;
        }
    }
    probs.len() - 1
}
