//! The shared game: one board, one registry, one lock.

use crate::config::ServerConfig;
use crate::protocol::ServerMessage;
use crate::registry::{ConnectionId, SessionRegistry};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use strictly_gomoku::{Board, GameStatus, Grid, Move, MoveError, MoveOutcome};
use tracing::{debug, info, instrument};

/// Board state shared by every connection.
///
/// [`GameSession::submit`] applies a move, checks the result, and queues the
/// resulting broadcast while holding the board lock, so broadcasts leave in
/// the same order moves were applied.
#[derive(Debug)]
pub struct GameSession {
    board: Mutex<Board>,
    registry: Arc<SessionRegistry>,
    send_rejections: bool,
}

impl GameSession {
    /// Creates a session with an empty board sized by `config`.
    #[instrument(skip(config), fields(grid_size = config.grid_size(), winning_length = config.winning_length()))]
    pub fn new(config: &ServerConfig) -> Self {
        info!("Creating game session");
        Self {
            board: Mutex::new(Board::new(config.rules()).with_turn_order(*config.enforce_turns())),
            registry: Arc::new(SessionRegistry::new()),
            send_rejections: *config.send_rejections(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Board> {
        self.board.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registry of connections that receive broadcasts.
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Number of registered connections.
    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }

    /// Copy of the current grid.
    pub fn snapshot(&self) -> Grid {
        self.lock().grid().clone()
    }

    /// Number of occupied cells.
    pub fn occupied(&self) -> usize {
        self.lock().occupied()
    }

    /// Current game status.
    pub fn status(&self) -> GameStatus {
        self.lock().status()
    }

    /// Applies a move from connection `from` and queues the broadcast.
    ///
    /// - Win: `WIN<mark>` to every connection, then the board resets.
    /// - Full board: the filled board, then the board resets and the empty
    ///   board follows.
    /// - Otherwise: the new board to every connection.
    ///
    /// A rejected move changes nothing and, when rejections are enabled, is
    /// answered to `from` alone.
    #[instrument(skip(self, mv), fields(position = %mv.position, mark = %mv.mark))]
    pub fn submit(&self, from: ConnectionId, mv: Move) -> Result<MoveOutcome, MoveError> {
        let mut board = self.lock();

        let outcome = match board.apply_move(mv) {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!(%err, "Move rejected");
                if self.send_rejections {
                    self.registry
                        .send_to(from, ServerMessage::Rejected(err.to_string()).to_wire());
                }
                return Err(err);
            }
        };

        if let Some(mark) = outcome.winner {
            let delivered = self.registry.broadcast(&ServerMessage::Win(mark).to_wire());
            info!(%mark, delivered, "Win announced");
            board.reset();
        } else if outcome.board_full {
            self.registry
                .broadcast(&ServerMessage::Board(board.grid().clone()).to_wire());
            board.reset();
            let delivered = self
                .registry
                .broadcast(&ServerMessage::Board(board.grid().clone()).to_wire());
            info!(delivered, "Draw, board reset");
        } else {
            self.registry
                .broadcast(&ServerMessage::Board(board.grid().clone()).to_wire());
        }

        Ok(outcome)
    }
}
