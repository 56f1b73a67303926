//! Evaluator interface for guiding the search
//!
//! The evaluator estimates action priors and a state value for canonical
//! states. Batching is the primary interface: expanding a node evaluates all
//! of its children in a single call.

use std::cmp::Ordering;

use thiserror::Error;

use crate::rules::GameRules;

/// Errors that can occur during evaluation.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result of evaluating a single state.
#[derive(Debug, Clone)]
pub struct EvalResult {
    /// Prior probability for each action, `action_size` entries (last = pass).
    pub policy: Vec<f32>,

    /// Expected outcome in [-1, 1] from the perspective of the player to
    /// move in the evaluated state.
    pub value: f32,
}

/// A policy/value estimator over canonical states.
///
/// Implementations must accept any positive batch size, behave as pure
/// functions, and return one result per input state in input order.
/// Deterministic outputs keep searches reproducible; tests substitute fixed
/// lookup-table evaluators.
pub trait Evaluator<S>: Send + Sync {
    /// Evaluate a batch of canonical states.
    fn evaluate_batch(&self, states: &[S]) -> Result<Vec<EvalResult>, EvaluatorError>;

    /// Evaluate a single state.
    fn evaluate(&self, state: &S) -> Result<EvalResult, EvaluatorError> {
        let results = self.evaluate_batch(std::slice::from_ref(state))?;
        results.into_iter().next().ok_or_else(|| {
            EvaluatorError::EvaluationFailed("empty result for single-state batch".to_string())
        })
    }
}

/// Uniform evaluator (for testing).
///
/// Returns equal priors over all actions and a value of 0 for every state,
/// reducing the search to pure visit-count exploration.
#[derive(Debug, Clone)]
pub struct UniformEvaluator {
    action_size: usize,
}

impl UniformEvaluator {
    pub fn new(action_size: usize) -> Self {
        UniformEvaluator { action_size }
    }
}

impl<S> Evaluator<S> for UniformEvaluator {
    fn evaluate_batch(&self, states: &[S]) -> Result<Vec<EvalResult>, EvaluatorError> {
        let prior = 1.0 / self.action_size as f32;
        Ok(states
            .iter()
            .map(|_| EvalResult {
                policy: vec![prior; self.action_size],
                value: 0.0,
            })
            .collect())
    }
}

/// Heuristic evaluator scoring states by stone-area difference.
///
/// Priors are uniform; the value is the mover's normalized area lead, or the
/// exact ±1/0 outcome for finished games. Useful for greedy play and for
/// tests that should not depend on a learned model.
#[derive(Debug, Clone)]
pub struct AreaEvaluator<R: GameRules> {
    rules: R,
}

impl<R: GameRules> AreaEvaluator<R> {
    pub fn new(rules: R) -> Self {
        AreaEvaluator { rules }
    }
}

impl<R: GameRules> Evaluator<R::State> for AreaEvaluator<R> {
    fn evaluate_batch(&self, states: &[R::State]) -> Result<Vec<EvalResult>, EvaluatorError> {
        let action_size = self.rules.action_size();
        let board_area = (action_size - 1) as f32;
        let prior = 1.0 / action_size as f32;

        Ok(states
            .iter()
            .map(|state| {
                let (own, opp) = self.rules.areas(state);
                let value = if self.rules.game_ended(state) {
                    match own.cmp(&opp) {
                        Ordering::Greater => 1.0,
                        Ordering::Less => -1.0,
                        Ordering::Equal => 0.0,
                    }
                } else {
                    (own as f32 - opp as f32) / board_area
                };
                EvalResult {
                    policy: vec![prior; action_size],
                    value,
                }
            })
            .collect())
    }
}
