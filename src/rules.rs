//! Game-rules capability trait and a reference placement game
//!
//! The search never inspects board internals: every rules question goes
//! through [`GameRules`], which is passed into tree construction as an
//! explicit capability rather than living in a process-wide registry.

/// Player identifiers for a two-player game.
///
/// "Black" is the leading player of a state's orientation: in a canonical
/// state the mover always takes the black role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    Black,
    White,
}

impl Player {
    /// The other player.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    /// Stone sign in board encodings: Black = +1, White = -1.
    #[inline]
    pub fn sign(self) -> i8 {
        match self {
            Player::Black => 1,
            Player::White => -1,
        }
    }
}

/// Stateless rules oracle over an opaque state type.
///
/// All methods are pure functions of their arguments. Actions are flat
/// indices in `0..action_size()`, row-major over the board with the final
/// index reserved for "pass".
///
/// Implementations provide the game; the search only ever moves states
/// through this trait.
pub trait GameRules: Send + Sync {
    /// Opaque, immutable board state.
    type State: Clone + Send + Sync;

    /// Side length of the square board.
    fn board_size(&self) -> usize;

    /// Number of actions: one per intersection plus pass.
    fn action_size(&self) -> usize {
        let n = self.board_size();
        n * n + 1
    }

    /// The initial (empty) board for this rules instance.
    fn init_board(&self) -> Self::State;

    /// Legality of every action, `action_size()` entries.
    ///
    /// Any non-terminal state has at least one legal action because pass is
    /// always available.
    fn valid_moves(&self, state: &Self::State) -> Vec<bool>;

    /// Apply the current mover's action.
    fn next_state(&self, state: &Self::State, action: usize) -> Self::State;

    /// Player to move.
    fn turn(&self, state: &Self::State) -> Player;

    /// Re-express `state` so that `turn`'s features lead (the mover takes
    /// the black role). Canonicalizing lets one evaluator serve both sides.
    fn canonical_form(&self, state: &Self::State, turn: Player) -> Self::State;

    /// Whether the game is over.
    fn game_ended(&self, state: &Self::State) -> bool;

    /// Exact areas `(black_role, white_role)` in this state's orientation,
    /// used for terminal scoring instead of the evaluator.
    fn areas(&self, state: &Self::State) -> (u32, u32);
}

/// Board state of [`PlacementGame`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementState {
    /// Row-major cells: +1 black-role stone, -1 white-role, 0 empty.
    cells: Vec<i8>,
    to_move: Player,
    consecutive_passes: u8,
}

impl PlacementState {
    /// Cell contents, row-major.
    pub fn cells(&self) -> &[i8] {
        &self.cells
    }

    /// Stone at `(row, col)`.
    pub fn stone(&self, row: usize, col: usize, size: usize) -> i8 {
        self.cells[row * size + col]
    }
}

/// A minimal placement game (for testing and benchmarks).
///
/// Players alternately place a stone on any empty cell or pass; two
/// consecutive passes or a full board end the game; a player's area is their
/// stone count. There are no captures and no legality rules beyond
/// emptiness, so this is a fixture exercising the rules interface, not a Go
/// implementation.
#[derive(Debug, Clone, Copy)]
pub struct PlacementGame {
    size: usize,
}

impl PlacementGame {
    pub fn new(size: usize) -> Self {
        PlacementGame { size }
    }

    /// Flat index of the pass action.
    pub fn pass_action(&self) -> usize {
        self.size * self.size
    }
}

impl GameRules for PlacementGame {
    type State = PlacementState;

    fn board_size(&self) -> usize {
        self.size
    }

    fn init_board(&self) -> PlacementState {
        PlacementState {
            cells: vec![0; self.size * self.size],
            to_move: Player::Black,
            consecutive_passes: 0,
        }
    }

    fn valid_moves(&self, state: &PlacementState) -> Vec<bool> {
        let mut valid: Vec<bool> = state.cells.iter().map(|&c| c == 0).collect();
        valid.push(true); // pass
        valid
    }

    fn next_state(&self, state: &PlacementState, action: usize) -> PlacementState {
        let mut next = state.clone();
        if action == self.pass_action() {
            next.consecutive_passes += 1;
        } else {
            next.cells[action] = state.to_move.sign();
            next.consecutive_passes = 0;
        }
        next.to_move = state.to_move.opponent();
        next
    }

    fn turn(&self, state: &PlacementState) -> Player {
        state.to_move
    }

    fn canonical_form(&self, state: &PlacementState, turn: Player) -> PlacementState {
        match turn {
            Player::Black => state.clone(),
            Player::White => PlacementState {
                cells: state.cells.iter().map(|&c| -c).collect(),
                to_move: Player::Black,
                consecutive_passes: state.consecutive_passes,
            },
        }
    }

    fn game_ended(&self, state: &PlacementState) -> bool {
        state.consecutive_passes >= 2 || state.cells.iter().all(|&c| c != 0)
    }

    fn areas(&self, state: &PlacementState) -> (u32, u32) {
        let black = state.cells.iter().filter(|&&c| c > 0).count() as u32;
        let white = state.cells.iter().filter(|&&c| c < 0).count() as u32;
        (black, white)
    }
}
