//! Game runner - deploys armies and plays a full match
//!
//! Level 3 - Step-level implementation

use std::sync::Arc;

use anyhow::{Context, Result};
use ringwar_core::{
    Board, ConnectivityGraph, EngineError, GameState, Move, PathCache, PlayerId, UnitClass,
};
use serde::Serialize;

use crate::config::{ArmySpec, MatchConfig};
use crate::controller::SearchController;

// ============================================================================
// DEPLOYMENT
// ============================================================================

/// Place every player's army inside its own arc of the outer rings
///
/// Each ring is split into equal arcs in seating order. Units fill the
/// outermost ring first, essential classes taking the first cells.
pub fn deploy_armies(graph: &ConnectivityGraph, board: &mut Board, army: &ArmySpec) -> ringwar_core::Result<()> {
    let players = board.players().to_vec();
    let units = army.units();

    for (seat, player) in players.iter().enumerate() {
        let cells = arc_cells(graph, seat, players.len());
        if cells.len() < units.len() {
            return Err(EngineError::InvalidLayout(format!(
                "{} units do not fit the {} cells of {}'s arc",
                units.len(),
                cells.len(),
                player
            )));
        }
        for (class, node) in units.iter().zip(cells) {
            board.place(*player, *class, node)?;
        }
    }
    Ok(())
}

/// Cells of seat `seat` of `seats`, outermost ring first, inner ring excluded
fn arc_cells(graph: &ConnectivityGraph, seat: usize, seats: usize) -> Vec<usize> {
    let mut cells = Vec::new();
    for ring in (1..graph.rings()).rev() {
        let len = graph.ring_len(ring);
        let start = seat * len / seats;
        let end = (seat + 1) * len / seats;
        cells.extend((start..end).map(|p| ring * graph.ring_size() + p));
    }
    cells
}

// ============================================================================
// OUTCOME
// ============================================================================

/// One applied move
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TurnRecord {
    pub turn: u32,
    pub player: PlayerId,
    pub mv: Move,
    pub elapsed_ms: u128,
}

/// A player knocked out of the match
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Elimination {
    pub player: PlayerId,
    pub turn: u32,
}

/// Outcome of a single match
#[derive(Clone, Debug, Serialize)]
pub struct GameOutcome {
    /// Sole surviving player (None for draw)
    pub winner: Option<PlayerId>,
    pub winner_name: Option<String>,
    /// Moves and passes taken
    pub turns: u32,
    pub moves: Vec<TurnRecord>,
    pub eliminated: Vec<Elimination>,
}

impl GameOutcome {
    /// Turn limit reached or nobody could move
    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }
}

// ============================================================================
// GAME RUNNER
// ============================================================================

/// Plays a match between the configured computer players
pub struct GameRunner {
    config: MatchConfig,
    cache: Arc<PathCache>,
    state: GameState,
    controllers: Vec<SearchController>,
}

impl GameRunner {
    /// Build the board, deploy the armies and seat every player
    pub fn new(config: MatchConfig) -> Result<Self> {
        config.validate()?;
        let graph = ConnectivityGraph::ring_board(config.layout).context("Failed to build board")?;
        let players = seats(&config);

        let mut board = Board::new(&graph, players.clone());
        deploy_armies(&graph, &mut board, &config.army).context("Failed to deploy armies")?;
        let state = GameState::new(board, players[0])?;

        let cache = Arc::new(PathCache::new(Arc::new(graph)));
        cache
            .warm(UnitClass::all_restrictions())
            .context("Failed to build path tables")?;

        Ok(Self::from_position(config, cache, state))
    }

    /// Play on from an arbitrary position
    ///
    /// Uses the layout of `cache` and ignores `config.layout` and `config.army`.
    pub fn from_position(config: MatchConfig, cache: Arc<PathCache>, state: GameState) -> Self {
        let controllers = (0..state.board().players().len())
            .map(|i| SearchController::new(&config.ai_for(i), Arc::clone(&cache)))
            .collect();
        Self {
            config,
            cache,
            state,
            controllers,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn cache(&self) -> &Arc<PathCache> {
        &self.cache
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Play until one player remains, nobody can move, or the turn limit
    pub fn play(&mut self) -> Result<GameOutcome> {
        let mut turns = 0;
        let mut stalled = 0;
        let mut moves = Vec::new();
        let mut eliminated = Vec::new();

        while !self.state.is_over() && turns < self.config.max_turns {
            let player = self.state.current_player();
            let seat = self.seat_of(player)?;

            match self.controllers[seat].decide(&self.state) {
                Ok(decision) => {
                    stalled = 0;
                    self.state.simulate(decision.mv)?;
                    moves.push(TurnRecord {
                        turn: turns,
                        player,
                        mv: decision.mv,
                        elapsed_ms: decision.elapsed.as_millis(),
                    });
                    for defeated in self.state.eliminate_defeated() {
                        tracing::info!("{} eliminated on turn {}", self.name_of(defeated), turns);
                        eliminated.push(Elimination {
                            player: defeated,
                            turn: turns,
                        });
                    }
                }
                Err(EngineError::NoLegalMoves(_)) => {
                    stalled += 1;
                    if stalled >= self.state.board().active_players().len() {
                        tracing::warn!("No player can move, stopping on turn {}", turns);
                        break;
                    }
                    tracing::debug!("{} cannot move, passing", self.name_of(player));
                    self.state.pass_turn();
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("{} failed to decide", self.name_of(player)));
                }
            }
            turns += 1;
        }

        let winner = self.state.winner();
        let winner_name = winner.map(|p| self.name_of(p));
        match &winner_name {
            Some(name) => tracing::info!("Game over after {} turns: {} wins", turns, name),
            None => tracing::info!("Game over after {} turns: draw", turns),
        }

        Ok(GameOutcome {
            winner,
            winner_name,
            turns,
            moves,
            eliminated,
        })
    }

    fn seat_of(&self, player: PlayerId) -> Result<usize> {
        self.state
            .board()
            .players()
            .iter()
            .position(|p| *p == player)
            .ok_or_else(|| anyhow::anyhow!("{} has no seat", player))
    }

    fn name_of(&self, player: PlayerId) -> String {
        self.seat_of(player)
            .ok()
            .and_then(|seat| self.config.players.get(seat))
            .map_or_else(|| player.to_string(), |p| p.name.clone())
    }
}

fn seats(config: &MatchConfig) -> Vec<PlayerId> {
    (0..config.players.len()).map(|i| PlayerId(i as u8)).collect()
}
