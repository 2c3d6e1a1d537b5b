//! Server network layer handling TCP connections and the game event loop
//!
//! All game state lives in one [`Server`] task. Every accepted connection
//! gets a reader task and a writer task; readers forward complete protocol
//! lines over a channel, the server loop applies them to the game state one
//! at a time, and replies are queued onto per-connection writer channels so
//! a slow client can never stall the game.

use crate::game::{GameState, JoinOutcome, MoveOutcome};
use crate::protocol::{parse_move, Frame, LineReader};
use log::{debug, info, warn};
use shared::MAXMESSAGE;
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Messages sent from connection tasks to the main server loop
#[derive(Debug)]
pub enum ServerMessage {
    LineReceived { conn_id: u32, line: String },
    LineOverflow { conn_id: u32 },
    Disconnected { conn_id: u32 },
}

/// Write side of one live connection.
struct Connection {
    outbound: mpsc::UnboundedSender<String>,
    writer: JoinHandle<()>,
}

/// Main server owning the listener, the game state, and all connections.
pub struct Server {
    listener: TcpListener,
    game: GameState,
    connections: HashMap<u32, Connection>,
    next_conn_id: u32,

    // Communication channel from connection tasks
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl Server {
    pub async fn new(addr: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);

        let (server_tx, server_rx) = mpsc::unbounded_channel();

        Ok(Server {
            listener,
            game: GameState::new(),
            connections: HashMap::new(),
            next_conn_id: 1,
            server_tx,
            server_rx,
        })
    }

    /// Address the listener is bound to; tests bind port 0 and look it up.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Main server loop: accept connections and apply client input until
    /// the game is over, then broadcast the final tally.
    ///
    /// A listener failure is unrecoverable and propagates out; everything
    /// connection-scoped is handled in place.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        info!("Server started successfully");

        loop {
            if self.game.is_over() {
                break;
            }

            tokio::select! {
                accepted = self.listener.accept() => {
                    let (stream, addr) = accepted?;
                    self.register_connection(stream, addr);
                },

                message = self.server_rx.recv() => {
                    match message {
                        Some(ServerMessage::LineReceived { conn_id, line }) => {
                            self.handle_line(conn_id, line);
                        },
                        Some(ServerMessage::LineOverflow { conn_id }) => {
                            self.handle_overflow(conn_id);
                        },
                        Some(ServerMessage::Disconnected { conn_id }) => {
                            self.drop_connection(conn_id);
                        },
                        None => break,
                    }
                },
            }
        }

        self.finish().await;
        Ok(())
    }

    /// Seat a freshly accepted connection and greet it.
    fn register_connection(&mut self, stream: TcpStream, addr: SocketAddr) {
        let conn_id = self.next_conn_id;
        self.next_conn_id += 1;

        let (read_half, write_half) = stream.into_split();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(write_outbound(
            conn_id,
            write_half,
            outbound_rx,
            self.server_tx.clone(),
        ));
        tokio::spawn(read_lines(conn_id, read_half, self.server_tx.clone()));

        self.game.add_player(conn_id);
        self.connections.insert(
            conn_id,
            Connection {
                outbound: outbound_tx,
                writer,
            },
        );

        info!(
            "Accepted a new connection from {} ({} connected)",
            addr,
            self.game.len()
        );
        self.send_line(conn_id, "Welcome to Mancala. What is your name?");
    }

    /// Route one complete line to the join path or the move path.
    fn handle_line(&mut self, conn_id: u32, line: String) {
        let joined = match self.game.player(conn_id) {
            Some(player) => player.joined,
            // already removed; a stale line from a torn-down connection
            None => return,
        };

        if joined {
            self.handle_move_line(conn_id, &line);
        } else {
            self.handle_name_line(conn_id, &line);
        }
    }

    fn handle_name_line(&mut self, conn_id: u32, name: &str) {
        match self.game.join(conn_id, name) {
            JoinOutcome::NameTooLong => {
                self.send_line(conn_id, "The name you entered is too long. Disconnecting.");
                self.drop_connection(conn_id);
            }
            JoinOutcome::EmptyName => {
                self.send_line(conn_id, "Your username can't be empty. Please try again.");
            }
            JoinOutcome::NameTaken => {
                self.send_line(conn_id, "The username you chose already exists. Try again.");
            }
            JoinOutcome::Joined => {
                let message = format!("{} has joined the game.", name);
                info!("{}", message);
                self.notify_all(&message, Some(conn_id));
                self.broadcast_board_state();
            }
        }
    }

    fn handle_move_line(&mut self, conn_id: u32, line: &str) {
        let pit = parse_move(line);
        match self.game.process_move(conn_id, pit) {
            MoveOutcome::NotYourTurn => {
                self.send_line(conn_id, "It is not your move.");
            }
            MoveOutcome::OutOfBounds => {
                self.send_line(
                    conn_id,
                    "Invalid move: You must enter a number that is within the bounds of your pits. Try again.",
                );
                self.announce_turn(false);
            }
            MoveOutcome::EmptyPit => {
                self.send_line(conn_id, "Invalid move: The pit you chose is empty. Try again.");
                self.announce_turn(false);
            }
            MoveOutcome::Played { bonus } => {
                debug!("Connection {} played pit {} (bonus: {})", conn_id, pit, bonus);
                self.broadcast_board_state();
            }
        }
    }

    /// A connection blew the line budget. Before a join that is an
    /// over-long name; afterwards it is plain protocol abuse. Either way
    /// only this connection goes.
    fn handle_overflow(&mut self, conn_id: u32) {
        let joined = match self.game.player(conn_id) {
            Some(player) => player.joined,
            None => return,
        };

        if joined {
            warn!("Connection {} exceeded the line budget", conn_id);
        } else {
            self.send_line(conn_id, "The name you entered is too long. Disconnecting.");
        }
        self.drop_connection(conn_id);
    }

    /// Tear down one connection: close its write side, unlink the player,
    /// hand the turn on, and tell the others when a joined player leaves.
    /// Safe to call twice; the reader and writer tasks may both report the
    /// same teardown.
    fn drop_connection(&mut self, conn_id: u32) {
        if self.connections.remove(&conn_id).is_none() {
            return;
        }
        // dropping the Connection drops the outbound sender; the writer
        // task drains whatever is queued and closes the socket

        if let Some(removed) = self.game.remove_player(conn_id) {
            info!("A client has disconnected");
            if removed.joined {
                let message = format!("{} has left the game.", removed.name);
                info!("{}", message);
                self.notify_all(&message, None);
                self.announce_turn(true);
            }
        }
    }

    /// Send every joined player's board line to everyone, then announce
    /// whose move it is.
    fn broadcast_board_state(&self) {
        for line in self.game.board_lines() {
            info!("{}", line);
            self.notify_all(&line, None);
        }
        self.announce_turn(true);
    }

    /// Prompt the mover; with `broadcast`, tell everyone else whose move
    /// it is. Nothing happens while no one holds the turn.
    fn announce_turn(&self, broadcast: bool) {
        let (mover_id, mover_name) = match self.game.mover() {
            Some(player) => (player.conn_id, player.name.clone()),
            None => return,
        };

        self.send_line(mover_id, "Your move?");
        if broadcast {
            let message = format!("It is {}'s move.", mover_name);
            info!("{}", message);
            self.notify_all(&message, Some(mover_id));
        }
    }

    /// Send `message` to every joined player except `exclude`. A dead
    /// connection never aborts the broadcast; its writer task reports the
    /// failure and the teardown happens on that event.
    fn notify_all(&self, message: &str, exclude: Option<u32>) {
        for player in self.game.joined_players() {
            if Some(player.conn_id) == exclude {
                continue;
            }
            self.send_line(player.conn_id, message);
        }
    }

    /// Queue one protocol line for a client.
    fn send_line(&self, conn_id: u32, message: &str) {
        if let Some(connection) = self.connections.get(&conn_id) {
            let _ = connection.outbound.send(format!("{}\r\n", message));
        }
    }

    /// Broadcast and print the final tally, then let the writers drain.
    async fn finish(&mut self) {
        println!("Game over!");
        self.notify_all("Game over!", None);

        for (name, points) in self.game.scores() {
            let line = format!("{} has {} points", name, points);
            println!("{}", line);
            self.notify_all(&line, None);
        }

        for (_, connection) in self.connections.drain() {
            drop(connection.outbound);
            let _ = connection.writer.await;
        }
    }
}

/// Reads newline-terminated input from one client and forwards it to the
/// server loop, one message per complete line. Overflow and end-of-stream
/// both end the task.
async fn read_lines(
    conn_id: u32,
    read_half: OwnedReadHalf,
    server_tx: mpsc::UnboundedSender<ServerMessage>,
) {
    let mut reader = LineReader::new(read_half, MAXMESSAGE);
    loop {
        match reader.next_frame().await {
            Ok(Frame::Line(line)) => {
                if server_tx
                    .send(ServerMessage::LineReceived { conn_id, line })
                    .is_err()
                {
                    break;
                }
            }
            Ok(Frame::Overflow) => {
                let _ = server_tx.send(ServerMessage::LineOverflow { conn_id });
                break;
            }
            Ok(Frame::Eof) => {
                let _ = server_tx.send(ServerMessage::Disconnected { conn_id });
                break;
            }
            Err(e) => {
                warn!("Read error on connection {}: {}", conn_id, e);
                let _ = server_tx.send(ServerMessage::Disconnected { conn_id });
                break;
            }
        }
    }
}

/// Drains one client's outbound queue onto the socket. A failed write
/// forces the connection down; the rest of the game is unaffected.
async fn write_outbound(
    conn_id: u32,
    mut write_half: OwnedWriteHalf,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
    server_tx: mpsc::UnboundedSender<ServerMessage>,
) {
    while let Some(message) = outbound_rx.recv().await {
        if let Err(e) = write_half.write_all(message.as_bytes()).await {
            warn!("Write error on connection {}: {}", conn_id, e);
            let _ = server_tx.send(ServerMessage::Disconnected { conn_id });
            break;
        }
    }
}
