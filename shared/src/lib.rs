use std::fmt::Write;

/// Maximum permitted name size in bytes, not including the terminator.
pub const MAXNAME: usize = 80;
/// Number of regular pits on a side, not including the end pit.
pub const NPITS: usize = 6;
/// Initial number of pebbles per pit for the very first player.
pub const NPEBBLES: u32 = 4;
/// Transport budget for a single protocol line.
pub const MAXMESSAGE: usize = MAXNAME + 50;

/// One player's side of the board: the regular pits plus the scoring end pit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub pits: [u32; NPITS],
    pub end_pit: u32,
}

impl Board {
    pub fn new(fill: u32) -> Self {
        Self {
            pits: [fill; NPITS],
            end_pit: 0,
        }
    }

    /// Pebbles in the regular pits, end pit excluded.
    pub fn regular_total(&self) -> u32 {
        self.pits.iter().sum()
    }

    /// Every pebble on this side, end pit included.
    pub fn total(&self) -> u32 {
        self.regular_total() + self.end_pit
    }

    /// True when every regular pit is empty; the end pit does not matter.
    pub fn is_exhausted(&self) -> bool {
        self.pits.iter().all(|&pebbles| pebbles == 0)
    }

    /// One human-readable line for this side, e.g.
    /// `alice:  [0]4 [1]4 [2]4 [3]4 [4]4 [5]4  [end pit]0`
    pub fn render(&self, name: &str) -> String {
        let mut line = format!("{}:  ", name);
        for (pit, pebbles) in self.pits.iter().enumerate() {
            let _ = write!(line, "[{}]{} ", pit, pebbles);
        }
        let _ = write!(line, " [end pit]{}", self.end_pit);
        line
    }
}

/// Rounded-up pebbles-per-pit across `nplayers` existing sides whose regular
/// pits hold `total_pebbles` between them. Callers guarantee `nplayers > 0`.
pub fn average_fill(total_pebbles: u32, nplayers: u32) -> u32 {
    let pits = nplayers * NPITS as u32;
    (total_pebbles + pits - 1) / pits
}
