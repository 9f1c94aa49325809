//! Game loading — movetext to an ordered ply list with full positions.

use std::ops::ControlFlow;

use pgn_reader::{Reader, SanPlus, Skip, Visitor};
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Position};
use thiserror::Error;

/// Failure to turn movetext into a replayable game.
#[derive(Error, Debug)]
pub enum GameError {
    #[error("could not parse movetext: {0}")]
    Parse(String),
    #[error("illegal move {san} at ply {ply}")]
    IllegalMove { san: String, ply: usize },
    #[error("no moves in game")]
    Empty,
}

/// One half-move, with enough position state to hand to the engine.
#[derive(Debug, Clone)]
pub struct Ply {
    /// 0-based position in the game; the sole ordering key.
    pub index: usize,
    /// Side that makes this move.
    pub color: Color,
    /// The move as written, e.g. `Nf3` or `Qxf7#`.
    pub san: String,
    /// The move in UCI notation, e.g. `g1f3`.
    pub uci: String,
    /// Position before the move.
    pub fen_before: String,
    /// Position after the move.
    pub fen_after: String,
    /// The move checkmates the opponent.
    pub gives_checkmate: bool,
    /// The move stalemates the opponent.
    pub gives_stalemate: bool,
}

/// An ordered, immutable sequence of plies.
#[derive(Debug, Clone)]
pub struct Game {
    plies: Vec<Ply>,
}

impl Game {
    pub fn plies(&self) -> &[Ply] {
        &self.plies
    }

    pub fn len(&self) -> usize {
        self.plies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plies.is_empty()
    }
}

/// Visitor that replays the mainline and records one `Ply` per move.
#[derive(Default)]
struct GameLoader {
    plies: Vec<Ply>,
    error: Option<GameError>,
}

impl Visitor for GameLoader {
    type Tags = ();
    type Movetext = Chess;
    type Output = ();

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, _: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        ControlFlow::Continue(Chess::default())
    }

    fn begin_variation(&mut self, _: &mut Self::Movetext) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn san(&mut self, board: &mut Self::Movetext, san_plus: SanPlus) -> ControlFlow<Self::Output> {
        let index = self.plies.len();
        let mv = match san_plus.san.to_move(board) {
            Ok(m) => m,
            Err(_) => {
                self.error = Some(GameError::IllegalMove {
                    san: san_plus.san.to_string(),
                    ply: index,
                });
                return ControlFlow::Break(());
            }
        };

        let fen_before = Fen::from_position(board, EnPassantMode::Legal).to_string();
        let color = board.turn();
        let uci = mv.to_uci(CastlingMode::Standard).to_string();

        board.play_unchecked(mv);

        let fen_after = Fen::from_position(board, EnPassantMode::Legal).to_string();

        self.plies.push(Ply {
            index,
            color,
            san: san_plus.to_string(),
            uci,
            fen_before,
            fen_after,
            gives_checkmate: board.is_checkmate(),
            gives_stalemate: board.is_stalemate(),
        });

        ControlFlow::Continue(())
    }

    fn end_game(&mut self, _board: Self::Movetext) -> Self::Output {}
}

/// Parse movetext into a `Game`, replaying every move for legality.
pub fn load_game(movetext: &str) -> Result<Game, GameError> {
    let mut reader = Reader::new(movetext.as_bytes());
    let mut loader = GameLoader::default();

    match reader.read_game(&mut loader) {
        Ok(Some(())) => {}
        Ok(None) => return Err(GameError::Empty),
        Err(e) => return Err(GameError::Parse(e.to_string())),
    }

    if let Some(err) = loader.error.take() {
        return Err(err);
    }
    if loader.plies.is_empty() {
        return Err(GameError::Empty);
    }

    Ok(Game {
        plies: loader.plies,
    })
}
