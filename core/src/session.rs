//! Game session: grid + score + won/over latches, composed per move.

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::{Direction, Grid};

/// Score-submission collaborator.
///
/// Invoked by [`GameSession`] at most once per latch transition with the
/// current score. Fire-and-forget from the engine's perspective:
/// implementations must not fail into the caller or block gameplay.
pub trait ScoreSink: Send {
    fn submit_score(&mut self, score: u32);
}

/// A sink that discards scores; used when no reporting is wired up.
pub struct NullSink;

impl ScoreSink for NullSink {
    fn submit_score(&mut self, _score: u32) {}
}

/// Result of applying a move to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Whether the grid changed (and a new tile was spawned).
    pub moved: bool,
    /// Points earned from merges in this move.
    pub gained: u32,
    /// Whether the winning tile has been reached (latched; play continues).
    pub won: bool,
    /// Whether the game is over (latched; further moves are rejected).
    pub over: bool,
}

/// One player, one board: the session owns the grid, the cumulative score,
/// the RNG and the won/over latches, and drives the whole move pipeline
/// (shift, spawn, terminal check, score hand-off) synchronously.
///
/// `won` and `over` are latches: once set they stay set for the remainder
/// of the session. `over` is the only state that blocks further input;
/// reaching 2048 is non-terminal and the player may keep going.
pub struct GameSession {
    grid: Grid,
    score: u32,
    won: bool,
    over: bool,
    rng: SmallRng,
    sink: Box<dyn ScoreSink>,
}

impl GameSession {
    /// Create a session with the given RNG seed and no score reporting.
    ///
    /// The board starts with exactly two spawned tiles.
    pub fn new(seed: u64) -> Self {
        Self::with_score_sink(seed, Box::new(NullSink))
    }

    /// Create a session that hands terminal scores to `sink`.
    pub fn with_score_sink(seed: u64, sink: Box<dyn ScoreSink>) -> Self {
        let mut session = GameSession {
            grid: Grid::EMPTY,
            score: 0,
            won: false,
            over: false,
            rng: SmallRng::seed_from_u64(seed),
            sink,
        };
        session.spawn_initial_tiles();
        session
    }

    /// Apply a move in the given direction.
    ///
    /// An `over` session rejects all input. A move that changes nothing is
    /// a no-op: no score, no spawn, and no terminal re-evaluation. An
    /// accepted move adds the merge points to the score, spawns exactly one
    /// tile, re-evaluates the terminal conditions, and on the first latch
    /// transition submits the current score to the sink (never twice for an
    /// already-latched condition).
    pub fn apply_move(&mut self, dir: Direction) -> MoveOutcome {
        if self.over {
            return self.outcome(false, 0);
        }

        let (shifted, gained) = self.grid.shift(dir);
        if shifted == self.grid {
            return self.outcome(false, 0);
        }

        self.score += gained;
        self.grid = shifted.with_spawned_tile(&mut self.rng);

        let mut latched = false;
        if !self.won && self.grid.has_won() {
            self.won = true;
            latched = true;
        }
        if !self.over && self.grid.is_stuck() {
            self.over = true;
            latched = true;
        }
        if latched {
            self.sink.submit_score(self.score);
        }

        self.outcome(true, gained)
    }

    /// Start a fresh game: empty grid, score 0, latches re-armed, then
    /// exactly two spawned tiles.
    pub fn new_game(&mut self) {
        self.grid = Grid::EMPTY;
        self.score = 0;
        self.won = false;
        self.over = false;
        self.spawn_initial_tiles();
    }

    /// The current grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The cumulative score; never decreases within a session.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Whether the winning tile has been reached this session.
    pub fn is_won(&self) -> bool {
        self.won
    }

    /// Whether the session is over (no further moves accepted).
    pub fn is_over(&self) -> bool {
        self.over
    }

    /// Which directions would change the board, in `Direction::ALL` order.
    ///
    /// Utility for headless policies; terminal detection does not use it.
    pub fn legal_moves(&self) -> [bool; 4] {
        Direction::ALL.map(|dir| self.grid.shift(dir).0 != self.grid)
    }

    fn spawn_initial_tiles(&mut self) {
        // Always exactly two, regardless of randomness.
        self.grid = self.grid.with_spawned_tile(&mut self.rng);
        self.grid = self.grid.with_spawned_tile(&mut self.rng);
    }

    fn outcome(&self, moved: bool, gained: u32) -> MoveOutcome {
        MoveOutcome {
            moved,
            gained,
            won: self.won,
            over: self.over,
        }
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("score", &self.score)
            .field("won", &self.won)
            .field("over", &self.over)
            .finish_non_exhaustive()
    }
}
