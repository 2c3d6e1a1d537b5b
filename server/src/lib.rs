//! # Mancala Game Server Library
//!
//! This library provides a TCP server hosting a multiplayer, turn-based
//! Mancala game over a line-oriented text protocol. Clients connect at any
//! time, before or after the game has started, claim a unique name, and
//! take turns sowing pebbles until one player's regular pits are empty.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Game State
//! The server owns the only copy of the board. Every move is validated and
//! applied here; clients only ever see rendered board lines and prompts.
//!
//! ### Player Management
//! Handles the complete lifecycle of client connections:
//! - Seating new connections with a fair pebble fill
//! - Name validation (unique, non-empty, bounded length)
//! - Disconnection handling, including the mover leaving mid-turn
//!
//! ### Turn Keeping and Broadcasting
//! Exactly one joined player holds the turn at a time. After every state
//! change the server broadcasts the boards, prompts the mover, and tells
//! everyone else whose move it is.
//!
//! ## Architecture Design
//!
//! All game state is owned by a single server task. Each connection gets a
//! reader task (raw bytes → complete protocol lines) and a writer task
//! (queued replies → socket); both communicate with the server task over
//! channels. One event is fully applied before the next is considered, so
//! no locking is needed and no client can observe a half-applied move.
//!
//! ## Module Organization
//!
//! - [`protocol`]: bounded line reassembly and move-line parsing
//! - [`game`]: player roster, turn state, sowing rules, scoring
//! - [`network`]: connection tasks, broadcasts, and the event loop
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut server = Server::new("0.0.0.0:3000").await?;
//!
//!     // Runs until one player's regular pits are empty, then broadcasts
//!     // the final tally and returns.
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod game;
pub mod network;
pub mod protocol;
