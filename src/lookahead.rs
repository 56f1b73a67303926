//! Batched one-call expansion of node children
//!
//! Expanding a node needs a prior and value for every legal-action child.
//! One evaluator call per child would waste the evaluator's batch
//! throughput, so the lookahead enumerates the children of every input
//! state, evaluates them all in a single call, and partitions the results
//! back per input in the same action order. Terminal children are scored
//! exactly from areas, bypassing the evaluator where its estimate matters
//! least.

use std::cmp::Ordering;

use tracing::trace;

use crate::evaluator::Evaluator;
use crate::rules::GameRules;
use crate::tree::SearchError;

/// Expansion data for one input state.
#[derive(Debug, Clone)]
pub struct Lookahead<S> {
    /// Policy of each legal action's child, in ascending action order.
    pub child_policies: Vec<Vec<f32>>,

    /// Canonical next-state per legal action, in ascending action order.
    pub child_states: Vec<S>,

    /// Q-value per action from the input state's perspective,
    /// `action_size` entries, 0 for illegal actions.
    pub q_values: Vec<f32>,
}

/// Evaluate every child of every input state with one evaluator call.
///
/// Each child value is taken from the evaluator, or replaced by the exact
/// area outcome (+1/-1/0 for the child's mover) when the child is terminal,
/// and then negated: the returned q-values speak for the node whose children
/// these are, not for the children themselves.
///
/// An evaluator returning a different number of results than children were
/// requested is a contract violation and fails the search.
pub fn immediate_lookahead<R, E>(
    rules: &R,
    evaluator: &E,
    states: &[R::State],
) -> Result<Vec<Lookahead<R::State>>, SearchError>
where
    R: GameRules,
    E: Evaluator<R::State>,
{
    let action_size = rules.action_size();

    // Enumerate all children across the batch, input order then ascending
    // action order.
    let mut child_states = Vec::new();
    let mut valid_masks = Vec::with_capacity(states.len());
    for state in states {
        let valid = rules.valid_moves(state);
        for (action, &ok) in valid.iter().enumerate() {
            if ok {
                let next = rules.next_state(state, action);
                let next_turn = rules.turn(&next);
                child_states.push(rules.canonical_form(&next, next_turn));
            }
        }
        valid_masks.push(valid);
    }

    let requested = child_states.len();
    let results = if requested == 0 {
        Vec::new()
    } else {
        evaluator.evaluate_batch(&child_states)?
    };
    if results.len() != requested {
        return Err(SearchError::EvaluatorBatchMismatch {
            expected: requested,
            got: results.len(),
        });
    }

    trace!(
        batch = states.len(),
        children = requested,
        "lookahead evaluated"
    );

    // Partition back per input state.
    let mut outputs = child_states.into_iter().zip(results);
    let mut lookaheads = Vec::with_capacity(states.len());
    for valid in &valid_masks {
        let mut child_policies = Vec::new();
        let mut child_states = Vec::new();
        let mut q_values = vec![0.0f32; action_size];

        for (action, &ok) in valid.iter().enumerate() {
            if !ok {
                continue;
            }
            // Exhaustion here is unreachable after the length check above;
            // report it as the same contract failure rather than panicking.
            let (child_state, result) =
                outputs
                    .next()
                    .ok_or(SearchError::EvaluatorBatchMismatch {
                        expected: requested,
                        got: 0,
                    })?;

            let value = if rules.game_ended(&child_state) {
                let (own, opp) = rules.areas(&child_state);
                match own.cmp(&opp) {
                    Ordering::Greater => 1.0,
                    Ordering::Less => -1.0,
                    Ordering::Equal => 0.0,
                }
            } else {
                result.value
            };

            q_values[action] = -value;
            child_policies.push(result.policy);
            child_states.push(child_state);
        }

        lookaheads.push(Lookahead {
            child_policies,
            child_states,
            q_values,
        });
    }

    Ok(lookaheads)
}

/// Expansion data for a single state.
///
/// Convenience wrapper over [`immediate_lookahead`] for callers expanding
/// one node at a time.
pub fn lookahead_children<R, E>(
    rules: &R,
    evaluator: &E,
    state: &R::State,
) -> Result<Lookahead<R::State>, SearchError>
where
    R: GameRules,
    E: Evaluator<R::State>,
{
    let mut lookaheads = immediate_lookahead(rules, evaluator, std::slice::from_ref(state))?;
    // One lookahead per input, always.
    debug_assert_eq!(lookaheads.len(), 1);
    Ok(lookaheads.swap_remove(0))
}
