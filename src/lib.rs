//! Monte Carlo Tree Search for AlphaZero-style game playing.
//!
//! This crate provides a game-agnostic MCTS implementation that works with
//! any two-player zero-sum game implementing the [`GameRules`] trait. Its
//! distinguishing feature is batched expansion: all children of a node are
//! scored in a single evaluator call, built for evaluators whose cost is
//! dominated by per-call overhead, such as neural networks.
//!
//! # Overview
//!
//! The search builds a tree by running simulations. Each simulation
//! consists of three phases:
//!
//! 1. **Selection**: Walk from the root choosing children by UCB (Upper
//!    Confidence Bound) until reaching a node that was never visited or is
//!    terminal
//! 2. **Expansion**: Materialize every legal child of the stopping node at
//!    once; one batched evaluator call on the lookahead states supplies
//!    each child's prior and value, with terminal children scored exactly
//!    from area counts
//! 3. **Backpropagation**: Push the stopping node's stored estimate back up
//!    to the root, negating it at every ply so each node accumulates values
//!    from its own mover's perspective
//!
//! All states inside the tree are kept in canonical form, meaning the
//! player to move always sees the board as if they were the leading player.
//!
//! # Usage
//!
//! ```rust,ignore
//! use go_mcts::{
//!     sample_action, MctsPolicy, PlacementGame, Policy, SearchConfig, UniformEvaluator,
//! };
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let game = PlacementGame::new(9);
//! let evaluator = UniformEvaluator::new(game.action_size());
//! let config = SearchConfig::for_evaluation();
//! let mut policy = MctsPolicy::new(game, evaluator, &config).unwrap();
//!
//! // Play one full game, sampling from the search distribution
//! let mut rng = ChaCha20Rng::seed_from_u64(42);
//! let mut state = game.init_board();
//! let mut step = 0;
//! while !game.game_ended(&state) {
//!     let pi = policy.action_probs(&state, step).unwrap();
//!     let action = sample_action(&pi, &mut rng);
//!     policy.step(action).unwrap();
//!     state = game.next_state(&state, action);
//!     step += 1;
//! }
//! ```
//!
//! # Configuration
//!
//! The [`SearchConfig`] struct controls search behavior:
//!
//! - `num_searches`: Number of simulations per move decision (default: 128)
//! - `u_const`: Exploration constant in the UCB term (default: 1.0)
//! - `temperature`: Schedule converting root visit counts into move
//!   probabilities (1.0 = proportional, 0.0 = most-visited set only)
//!
//! [`load_config`] resolves configuration from `GOMCTS_CONFIG`, well-known
//! `config.toml` locations and `GOMCTS_*` environment overrides.
//!
//! # Evaluators
//!
//! The search requires an [`Evaluator`] to estimate policy and value:
//!
//! - [`UniformEvaluator`]: Uniform priors and neutral values (for testing)
//! - [`AreaEvaluator`]: Exact heuristic from area counts, no learning
//! - Custom evaluators can wrap neural network inference; batching keeps
//!   them fed with full child sets
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                       MctsPolicy                        │
//! ├─────────────────────────────────────────────────────────┤
//! │  ┌────────────┐   ┌────────────┐   ┌─────────────────┐  │
//! │  │ SearchTree │   │ GameRules  │   │    Evaluator    │  │
//! │  │  (arena)   │   │ (game sim) │   │ (policy/value)  │  │
//! │  └─────┬──────┘   └─────┬──────┘   └────────┬────────┘  │
//! │        │                │                   │           │
//! │        ▼                ▼                   ▼           │
//! │  ┌───────────────────────────────────────────────────┐  │
//! │  │    select → batched lookahead → backpropagate     │  │
//! │  └───────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod evaluator;
pub mod lookahead;
pub mod node;
pub mod policy;
pub mod rules;
pub mod tree;

// Re-export main types
pub use config::{load_config, ConfigError, SearchConfig, TemperatureSchedule};
pub use evaluator::{AreaEvaluator, EvalResult, Evaluator, EvaluatorError, UniformEvaluator};
pub use lookahead::{immediate_lookahead, lookahead_children, Lookahead};
pub use node::{Node, NodeId};
pub use policy::{sample_action, GreedyPolicy, MctsPolicy, Policy, RandomPolicy};
pub use rules::{GameRules, PlacementGame, PlacementState, Player};
pub use tree::{SearchError, SearchTree};
