//! Game state for the Mancala server
//!
//! This module owns every player and all board state, including:
//! - The ordered player roster (newest connection first)
//! - Name validation and the joined/not-joined lifecycle
//! - The turn, held by at most one joined player at a time
//! - The sowing rule, including wraparound and bonus turns
//! - End-of-game detection and final scoring
//!
//! Nothing here performs I/O. The network layer translates the outcome
//! values into protocol messages, which keeps every rule below directly
//! testable.

use log::info;
use shared::{average_fill, Board, MAXNAME, NPEBBLES, NPITS};

/// A connected client and their side of the board.
#[derive(Debug)]
pub struct Player {
    /// Connection identifier assigned by the network layer.
    pub conn_id: u32,
    /// Seat number, counted up from the oldest live connection.
    pub seq: u32,
    /// Display name; empty until the player joins.
    pub name: String,
    /// False until a unique non-empty name is accepted.
    pub joined: bool,
    /// This player's pits.
    pub board: Board,
}

/// Outcome of a name submission.
#[derive(Debug, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    /// Empty names are re-prompted, the connection stays open.
    EmptyName,
    /// Clashes with a joined player's name; re-prompted.
    NameTaken,
    /// Over the name budget; the connection is dropped by the caller.
    NameTooLong,
}

/// Outcome of a move request.
#[derive(Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    NotYourTurn,
    OutOfBounds,
    EmptyPit,
    Played {
        /// The last pebble landed in the mover's own end pit; the mover
        /// keeps the turn.
        bonus: bool,
    },
}

/// What `remove_player` unlinked, for the caller to report.
#[derive(Debug)]
pub struct RemovedPlayer {
    pub name: String,
    pub joined: bool,
}

/// Every player and whose move it is.
///
/// Players are kept in connection order with the newest first; turn order
/// and sowing both walk that order, wrapping at the end. The turn is stored
/// as the mover's connection id rather than a per-player flag, so at most
/// one mover can exist by construction.
pub struct GameState {
    players: Vec<Player>,
    mover: Option<u32>,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            players: Vec::new(),
            mover: None,
        }
    }

    /// Seat a freshly accepted connection, not yet joined.
    ///
    /// The very first player gets the fixed fill; every later one gets the
    /// rounded-up average over all existing players' regular pits (joined
    /// or not), so late joiners start from a fair position.
    pub fn add_player(&mut self, conn_id: u32) {
        let seq = match self.players.first() {
            Some(head) => head.seq + 1,
            None => 1,
        };
        let fill = if seq == 1 {
            NPEBBLES
        } else {
            let total = self
                .players
                .iter()
                .map(|player| player.board.regular_total())
                .sum();
            average_fill(total, self.players.len() as u32)
        };

        info!("Player {} seated with {} pebbles per pit", conn_id, fill);
        self.players.insert(
            0,
            Player {
                conn_id,
                seq,
                name: String::new(),
                joined: false,
                board: Board::new(fill),
            },
        );
    }

    /// Unlink a player. When the mover leaves, the turn moves on to the
    /// next joined player from the vacated position, wrapping.
    pub fn remove_player(&mut self, conn_id: u32) -> Option<RemovedPlayer> {
        let idx = self.index_of(conn_id)?;
        let removed = self.players.remove(idx);
        if self.mover == Some(conn_id) {
            self.select_mover_from(idx);
        }

        info!("Player {} removed", conn_id);
        Some(RemovedPlayer {
            name: removed.name,
            joined: removed.joined,
        })
    }

    /// Validate a name and, when it passes, make the player part of the
    /// game. The first join with no mover in place also seeds the turn.
    pub fn join(&mut self, conn_id: u32, name: &str) -> JoinOutcome {
        if name.len() > MAXNAME {
            return JoinOutcome::NameTooLong;
        }
        if name.is_empty() {
            return JoinOutcome::EmptyName;
        }
        if self
            .players
            .iter()
            .any(|player| player.joined && player.name == name)
        {
            return JoinOutcome::NameTaken;
        }

        if let Some(idx) = self.index_of(conn_id) {
            let player = &mut self.players[idx];
            player.name = name.to_string();
            player.joined = true;
            if self.mover.is_none() {
                self.mover = Some(conn_id);
            }
        }
        JoinOutcome::Joined
    }

    /// Validate and apply one move for the requesting player.
    pub fn process_move(&mut self, conn_id: u32, pit: usize) -> MoveOutcome {
        if self.mover != Some(conn_id) {
            return MoveOutcome::NotYourTurn;
        }
        let idx = match self.index_of(conn_id) {
            Some(idx) => idx,
            None => return MoveOutcome::NotYourTurn,
        };
        if pit >= NPITS {
            return MoveOutcome::OutOfBounds;
        }
        if self.players[idx].board.pits[pit] == 0 {
            return MoveOutcome::EmptyPit;
        }

        let bonus = self.sow(idx, pit);
        if !bonus {
            self.select_mover_from(idx + 1);
        }
        MoveOutcome::Played { bonus }
    }

    /// Distribute the pebbles from `pit` one per step: first the acting
    /// player's remaining pits and their end pit, then, wrapping through
    /// the roster, every later joined player's regular pits. No one else's
    /// end pit is ever touched, and a full lap revisits the actor's regular
    /// pits but not their end pit. Returns true when the last pebble lands
    /// in the actor's end pit.
    fn sow(&mut self, actor: usize, pit: usize) -> bool {
        let board = &mut self.players[actor].board;
        let mut remaining = board.pits[pit];
        board.pits[pit] = 0;

        let mut bonus = false;
        for target in pit + 1..NPITS {
            if remaining == 0 {
                break;
            }
            board.pits[target] += 1;
            remaining -= 1;
        }
        if remaining > 0 {
            if remaining == 1 {
                bonus = true;
            }
            board.end_pit += 1;
            remaining -= 1;
        }

        let count = self.players.len();
        let mut idx = (actor + 1) % count;
        while remaining > 0 {
            if self.players[idx].joined {
                let board = &mut self.players[idx].board;
                for target in 0..NPITS {
                    if remaining == 0 {
                        break;
                    }
                    board.pits[target] += 1;
                    remaining -= 1;
                }
            }
            idx = (idx + 1) % count;
        }
        bonus
    }

    /// Hand the turn to the first joined player at or after `start` in
    /// roster order, wrapping. Clears the turn when nobody is eligible.
    fn select_mover_from(&mut self, start: usize) {
        self.mover = None;
        let count = self.players.len();
        for offset in 0..count {
            let player = &self.players[(start + offset) % count];
            if player.joined {
                self.mover = Some(player.conn_id);
                return;
            }
        }
    }

    /// The game ends the moment any joined player's regular pits are all
    /// empty; the end pit is irrelevant. Players still choosing a name are
    /// not considered.
    pub fn is_over(&self) -> bool {
        self.players
            .iter()
            .any(|player| player.joined && player.board.is_exhausted())
    }

    pub fn player(&self, conn_id: u32) -> Option<&Player> {
        self.players.iter().find(|player| player.conn_id == conn_id)
    }

    /// The player currently allowed to move, if any.
    pub fn mover(&self) -> Option<&Player> {
        self.mover.and_then(|conn_id| self.player(conn_id))
    }

    /// Joined players in roster order, newest connection first.
    pub fn joined_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|player| player.joined)
    }

    /// One rendered board line per joined player, in roster order.
    pub fn board_lines(&self) -> Vec<String> {
        self.joined_players()
            .map(|player| player.board.render(&player.name))
            .collect()
    }

    /// Final tally: every joined player's name and total pebble count,
    /// end pit included.
    pub fn scores(&self) -> Vec<(String, u32)> {
        self.joined_players()
            .map(|player| (player.name.clone(), player.board.total()))
            .collect()
    }

    /// Number of live connections, joined or not.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    fn index_of(&self, conn_id: u32) -> Option<usize> {
        self.players
            .iter()
            .position(|player| player.conn_id == conn_id)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
