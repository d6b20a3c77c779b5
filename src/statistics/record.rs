use std::fmt;
use std::ops::{BitOr, BitOrAssign};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Aggregate scores of one generation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoreSummary {
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    pub stddev: f64,
    /// Only present when diversity recording is on and the genome can be
    /// compared.
    pub diversity: Option<f64>,
}

/// One sample of the score history.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRecord {
    pub generation: usize,
    pub summary: ScoreSummary,
}

impl ScoreRecord {
    pub fn new(generation: usize, summary: ScoreSummary) -> Self {
        Self {
            generation,
            summary,
        }
    }

    /// A tab-separated row: the generation followed by each selected value in
    /// the order mean, max, min, deviation, diversity. Missing diversity is
    /// written as `-1`.
    pub fn to_row(&self, selection: ScoreSelection) -> String {
        let mut row = self.generation.to_string();
        let s = &self.summary;
        let columns = [
            (ScoreSelection::MEAN, s.mean),
            (ScoreSelection::MAX, s.max),
            (ScoreSelection::MIN, s.min),
            (ScoreSelection::DEVIATION, s.stddev),
            (ScoreSelection::DIVERSITY, s.diversity.unwrap_or(-1.0)),
        ];
        for (flag, value) in columns {
            if selection.contains(flag) {
                row.push('\t');
                row.push_str(&value.to_string());
            }
        }
        row
    }
}

/// Bitmask choosing which columns of the score history are written out.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScoreSelection(u8);

impl ScoreSelection {
    pub const NONE: Self = Self(0);
    pub const MEAN: Self = Self(1);
    pub const MAX: Self = Self(2);
    pub const MIN: Self = Self(4);
    pub const DEVIATION: Self = Self(8);
    pub const DIVERSITY: Self = Self(16);
    pub const ALL: Self = Self(31);

    pub fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for ScoreSelection {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for ScoreSelection {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ScoreSelection {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for ScoreSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mean {:.6}  max {:.6}  min {:.6}  dev {:.6}",
            self.mean, self.max, self.min, self.stddev
        )?;
        if let Some(d) = self.diversity {
            write!(f, "  div {:.6}", d)?;
        }
        Ok(())
    }
}
