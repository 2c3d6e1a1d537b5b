//! Performance benchmarks for the game engine

use server::game::{GameState, JoinOutcome, MoveOutcome};
use shared::NPITS;
use std::time::Instant;

/// Benchmarks seating and joining a large table
#[test]
fn benchmark_mass_joins() {
    let players = 200;
    let start = Instant::now();

    let mut game = GameState::new();
    for i in 1..=players {
        game.add_player(i);
        assert_eq!(game.join(i, &format!("player-{}", i)), JoinOutcome::Joined);
    }

    let duration = start.elapsed();
    println!(
        "Mass join: {} players in {:?} ({:.2} µs/join)",
        players,
        duration,
        duration.as_micros() as f64 / players as f64
    );

    // exactly one mover, and it is the first joiner
    assert_eq!(game.mover().unwrap().conn_id, 1);
    assert_eq!(game.joined_players().count(), players as usize);

    // Should complete in under 1 second
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks sustained move processing across a full table
#[test]
fn benchmark_move_throughput() {
    let mut game = GameState::new();
    for i in 1..=8u32 {
        game.add_player(i);
        game.join(i, &format!("player-{}", i));
    }

    let initial_total: u32 = game.joined_players().map(|p| p.board.total()).sum();

    let iterations = 10_000;
    let mut moves = 0;
    let start = Instant::now();

    for _ in 0..iterations {
        if game.is_over() {
            break;
        }
        let (mover_id, pit) = {
            let mover = game.mover().expect("a live game always has a mover");
            let pit = mover
                .board
                .pits
                .iter()
                .position(|&pebbles| pebbles > 0)
                .expect("the mover has a non-empty pit while the game is on");
            (mover.conn_id, pit)
        };
        assert!(matches!(
            game.process_move(mover_id, pit),
            MoveOutcome::Played { .. }
        ));
        moves += 1;
    }

    let duration = start.elapsed();
    println!(
        "Move throughput: {} moves in {:?} ({:.2} µs/move)",
        moves,
        duration,
        duration.as_micros() as f64 / moves as f64
    );

    // no pebble was created or destroyed along the way
    let final_total: u32 = game.joined_players().map(|p| p.board.total()).sum();
    assert_eq!(final_total, initial_total);

    // Should complete in under 2 seconds
    assert!(duration.as_millis() < 2000);
}

/// Benchmarks board rendering for broadcast at scale
#[test]
fn benchmark_board_rendering() {
    let mut game = GameState::new();
    for i in 1..=100u32 {
        game.add_player(i);
        game.join(i, &format!("player-{}", i));
    }

    let iterations = 1000;
    let start = Instant::now();

    let mut rendered = 0;
    for _ in 0..iterations {
        let lines = game.board_lines();
        rendered += lines.len();
    }

    let duration = start.elapsed();
    println!(
        "Board rendering: {} lines in {:?} ({:.2} µs/broadcast)",
        rendered,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert_eq!(rendered, 100 * iterations);

    // Should complete in under 2 seconds
    assert!(duration.as_millis() < 2000);
}

/// Benchmarks a sow that laps the whole table several times
#[test]
fn benchmark_wide_sow() {
    let iterations = 1000;
    let start = Instant::now();

    for _ in 0..iterations {
        let mut game = GameState::new();
        for i in 1..=16u32 {
            game.add_player(i);
            game.join(i, &format!("player-{}", i));
        }

        // each mover sows their fullest pit, which laps the table once the
        // pebbles pile up
        for _ in 0..NPITS {
            let (mover_id, pit) = {
                let mover = game.mover().expect("mover");
                let pit = mover
                    .board
                    .pits
                    .iter()
                    .enumerate()
                    .max_by_key(|(_, &pebbles)| pebbles)
                    .map(|(pit, _)| pit)
                    .expect("board has pits");
                (mover.conn_id, pit)
            };
            game.process_move(mover_id, pit);
        }
    }

    let duration = start.elapsed();
    println!(
        "Wide sow: {} games of {} moves in {:?}",
        iterations, NPITS, duration
    );

    // Should complete in under 5 seconds
    assert!(duration.as_millis() < 5000);
}
