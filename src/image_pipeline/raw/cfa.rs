//! Bayer color filter array description.
//!
//! The 2x2 tile is configuration, not code: sensors are mounted in different
//! orientations, so the same firmware sees RGGB on one board and BGGR on
//! another.

use std::fmt;
use std::str::FromStr;

use crate::image_pipeline::common::error::FormatError;

/// Physical color of a photosite filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Red = 0,
    Green = 1,
    Blue = 2,
}

impl Channel {
    fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Channel::Red),
            1 => Some(Channel::Green),
            2 => Some(Channel::Blue),
            _ => None,
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'R' => Some(Channel::Red),
            'G' => Some(Channel::Green),
            'B' => Some(Channel::Blue),
            _ => None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Red => f.write_str("R"),
            Channel::Green => f.write_str("G"),
            Channel::Blue => f.write_str("B"),
        }
    }
}

/// Filter identity of a site. The two greens are told apart by the row they share:
/// `G1` sits on the red row, `G2` on the blue row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CfaColor {
    R,
    G1,
    G2,
    B,
}

impl CfaColor {
    pub fn channel(self) -> Channel {
        match self {
            CfaColor::R => Channel::Red,
            CfaColor::G1 | CfaColor::G2 => Channel::Green,
            CfaColor::B => Channel::Blue,
        }
    }
}

/// A validated 2x2 Bayer tile, row-major: `[(0,0), (0,1), (1,0), (1,1)]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CfaPattern {
    colors: [CfaColor; 4],
}

impl CfaPattern {
    pub fn rggb() -> Self {
        Self::build([Channel::Red, Channel::Green, Channel::Green, Channel::Blue])
    }

    pub fn bggr() -> Self {
        Self::build([Channel::Blue, Channel::Green, Channel::Green, Channel::Red])
    }

    pub fn grbg() -> Self {
        Self::build([Channel::Green, Channel::Red, Channel::Blue, Channel::Green])
    }

    pub fn gbrg() -> Self {
        Self::build([Channel::Green, Channel::Blue, Channel::Red, Channel::Green])
    }

    /// Validates a permutation of {R, G, G, B}.
    ///
    /// Exactly two greens, one red and one blue are required, and the greens
    /// must lie on a diagonal of the tile.
    pub fn new(tile: [Channel; 4]) -> Result<Self, FormatError> {
        let count = |ch: Channel| tile.iter().filter(|&&c| c == ch).count();
        if count(Channel::Red) != 1 || count(Channel::Green) != 2 || count(Channel::Blue) != 1 {
            return Err(FormatError::InvalidCfaPattern(format!(
                "{} must contain one R, two G and one B",
                describe(&tile)
            )));
        }
        // Greens on the same row or column would leave a whole line without green.
        if tile[0] != tile[3] && tile[1] != tile[2] {
            return Err(FormatError::InvalidCfaPattern(format!(
                "{}: green sites must be diagonal",
                describe(&tile)
            )));
        }
        Ok(Self::build(tile))
    }

    /// Builds a pattern from numeric channel indices (0 = R, 1 = G, 2 = B),
    /// e.g. `[2, 1, 1, 0]` for BGGR.
    pub fn from_indices(indices: [u8; 4]) -> Result<Self, FormatError> {
        let mut tile = [Channel::Green; 4];
        for (slot, &index) in tile.iter_mut().zip(indices.iter()) {
            *slot = Channel::from_index(index).ok_or_else(|| {
                FormatError::InvalidCfaPattern(format!("channel index {index} is not 0, 1 or 2"))
            })?;
        }
        Self::new(tile)
    }

    fn build(tile: [Channel; 4]) -> Self {
        let red_row = if tile[0] == Channel::Red || tile[1] == Channel::Red { 0 } else { 1 };
        let mut colors = [CfaColor::R; 4];
        for (i, ch) in tile.iter().enumerate() {
            colors[i] = match ch {
                Channel::Red => CfaColor::R,
                Channel::Blue => CfaColor::B,
                Channel::Green if i / 2 == red_row => CfaColor::G1,
                Channel::Green => CfaColor::G2,
            };
        }
        Self { colors }
    }

    /// Filter color at a sensor site.
    #[inline]
    pub fn color_at(&self, row: usize, col: usize) -> CfaColor {
        self.colors[(row % 2) * 2 + (col % 2)]
    }

    #[inline]
    pub fn channel_at(&self, row: usize, col: usize) -> Channel {
        self.color_at(row, col).channel()
    }

    pub fn tile(&self) -> [Channel; 4] {
        self.colors.map(CfaColor::channel)
    }
}

impl Default for CfaPattern {
    fn default() -> Self {
        Self::rggb()
    }
}

fn describe(tile: &[Channel; 4]) -> String {
    tile.iter().map(|c| c.to_string()).collect()
}

impl fmt::Display for CfaPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&describe(&self.tile()))
    }
}

impl FromStr for CfaPattern {
    type Err = FormatError;

    /// Accepts letter form (`"BGGR"`) or comma-separated indices (`"2,1,1,0"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.contains(',') {
            let indices: Vec<u8> = s
                .split(',')
                .map(|part| part.trim().parse::<u8>())
                .collect::<Result<_, _>>()
                .map_err(|e| FormatError::InvalidCfaPattern(format!("{s}: {e}")))?;
            let indices: [u8; 4] = indices.try_into().map_err(|_| {
                FormatError::InvalidCfaPattern(format!("{s}: expected 4 entries"))
            })?;
            return Self::from_indices(indices);
        }

        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 4 {
            return Err(FormatError::InvalidCfaPattern(format!("{s}: expected 4 letters")));
        }
        let mut tile = [Channel::Green; 4];
        for (slot, &c) in tile.iter_mut().zip(chars.iter()) {
            *slot = Channel::from_char(c)
                .ok_or_else(|| FormatError::InvalidCfaPattern(format!("{s}: unknown color '{c}'")))?;
        }
        Self::new(tile)
    }
}
