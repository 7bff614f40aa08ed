//! Braille cell representation and wire codec
//!
//! A cell is six dot states in the standard braille numbering: dots 1-2-3
//! down the left column, dots 4-5-6 down the right. On the wire each cell is
//! one byte where bit n-1 carries dot n, so a payload is simply the cells in
//! reading order, one byte each. Every adapter uses this codec, which keeps
//! devices interchangeable.

use serde::Deserialize;

/// Number of dots in a cell
pub const DOTS_PER_CELL: usize = 6;

/// Mask selecting the six valid dot bits of a cell byte
const DOT_MASK: u8 = 0x3F;

/// One braille character position: six binary dot states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell {
    dots: [bool; DOTS_PER_CELL],
}

impl Cell {
    /// A cell with no dots raised
    pub const BLANK: Cell = Cell {
        dots: [false; DOTS_PER_CELL],
    };

    /// Create a cell from explicit dot states (index 0 = dot 1)
    pub fn new(dots: [bool; DOTS_PER_CELL]) -> Self {
        Self { dots }
    }

    /// Dot state by standard braille dot number (1-6).
    /// Out-of-range numbers read as lowered.
    pub fn dot(&self, number: usize) -> bool {
        match number {
            1..=DOTS_PER_CELL => self.dots[number - 1],
            _ => false,
        }
    }

    /// Pack into a wire byte in `0..=63`, bit n-1 = dot n
    pub fn to_bitmask(&self) -> u8 {
        self.dots
            .iter()
            .enumerate()
            .fold(0u8, |acc, (i, &raised)| acc | ((raised as u8) << i))
    }

    /// Unpack from a wire byte; bits above the six dot positions are ignored
    pub fn from_bitmask(byte: u8) -> Self {
        let byte = byte & DOT_MASK;
        let mut dots = [false; DOTS_PER_CELL];
        for (i, dot) in dots.iter_mut().enumerate() {
            *dot = byte & (1 << i) != 0;
        }
        Self { dots }
    }

    /// True if no dots are raised
    pub fn is_blank(&self) -> bool {
        self.dots.iter().all(|&d| !d)
    }

    /// The Unicode braille pattern for this cell.
    /// Unicode assigns dots 1-6 to the same bit positions as the wire format.
    pub fn to_unicode(&self) -> char {
        char::from_u32(0x2800 + self.to_bitmask() as u32).unwrap_or('\u{2800}')
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_unicode())
    }
}

/// External cell data in whatever shape a collaborator sends it.
///
/// The translation service and stored payloads variously use dot arrays,
/// plain bitmask integers, or named-field objects. All of them are normalized
/// into [`Cell`] at this boundary; internal code only ever sees the canonical
/// type. Malformed input never fails, it yields a blank cell.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CellInput {
    /// A bare bitmask integer
    Bitmask(i64),
    /// Dot states as an integer array, zero = lowered (truncated or
    /// zero-padded to six entries)
    Dots(Vec<i64>),
    /// Named dot fields, missing fields default to lowered
    Named {
        #[serde(default)]
        dot1: bool,
        #[serde(default)]
        dot2: bool,
        #[serde(default)]
        dot3: bool,
        #[serde(default)]
        dot4: bool,
        #[serde(default)]
        dot5: bool,
        #[serde(default)]
        dot6: bool,
    },
}

impl CellInput {
    /// Convert any accepted shape into a well-formed cell
    pub fn normalize(&self) -> Cell {
        match self {
            CellInput::Bitmask(mask) => {
                if (0..=u8::MAX as i64).contains(mask) {
                    Cell::from_bitmask(*mask as u8)
                } else {
                    Cell::BLANK
                }
            }
            CellInput::Dots(values) => {
                let mut dots = [false; DOTS_PER_CELL];
                for (i, dot) in dots.iter_mut().enumerate() {
                    *dot = values.get(i).map(|&v| v != 0).unwrap_or(false);
                }
                Cell::new(dots)
            }
            CellInput::Named {
                dot1,
                dot2,
                dot3,
                dot4,
                dot5,
                dot6,
            } => Cell::new([*dot1, *dot2, *dot3, *dot4, *dot5, *dot6]),
        }
    }
}

impl From<&CellInput> for Cell {
    fn from(input: &CellInput) -> Self {
        input.normalize()
    }
}

/// Normalize a sequence of external cell shapes
pub fn normalize_cells(inputs: &[CellInput]) -> Vec<Cell> {
    inputs.iter().map(CellInput::normalize).collect()
}

/// Pack cells into the wire payload: one byte per cell in reading order
pub fn pack_cells(cells: &[Cell]) -> Vec<u8> {
    cells.iter().map(Cell::to_bitmask).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitmask_round_trip() {
        for mask in 0u8..=63 {
            let cell = Cell::from_bitmask(mask);
            assert_eq!(cell.to_bitmask(), mask);
        }
    }

    #[test]
    fn test_high_bits_ignored() {
        assert_eq!(Cell::from_bitmask(0xFF).to_bitmask(), 0x3F);
        assert_eq!(Cell::from_bitmask(0x40), Cell::BLANK);
    }

    #[test]
    fn test_dot_numbering() {
        // Dot 1 is bit 0, dot 6 is bit 5
        let cell = Cell::from_bitmask(0b000001);
        assert!(cell.dot(1));
        assert!(!cell.dot(6));

        let cell = Cell::from_bitmask(0b100000);
        assert!(cell.dot(6));
        assert!(!cell.dot(1));

        // Out-of-range dot numbers read as lowered
        assert!(!cell.dot(0));
        assert!(!cell.dot(7));
    }

    #[test]
    fn test_normalize_bitmask() {
        assert_eq!(CellInput::Bitmask(5).normalize().to_bitmask(), 5);
        assert_eq!(CellInput::Bitmask(-1).normalize(), Cell::BLANK);
        assert_eq!(CellInput::Bitmask(9999).normalize(), Cell::BLANK);
    }

    #[test]
    fn test_normalize_dots_pads_and_truncates() {
        let short = CellInput::Dots(vec![1, 0, 1]);
        let cell = short.normalize();
        assert!(cell.dot(1));
        assert!(!cell.dot(2));
        assert!(cell.dot(3));
        assert!(!cell.dot(4));

        let long = CellInput::Dots(vec![1, 1, 1, 1, 1, 1, 1, 1]);
        assert_eq!(long.normalize().to_bitmask(), 0x3F);

        let empty = CellInput::Dots(vec![]);
        assert_eq!(empty.normalize(), Cell::BLANK);
    }

    #[test]
    fn test_normalize_idempotent() {
        let cell = Cell::from_bitmask(0b101010);
        let round = CellInput::Dots(
            (1..=6).map(|n| cell.dot(n) as i64).collect(),
        )
        .normalize();
        assert_eq!(round, cell);
    }

    #[test]
    fn test_deserialize_all_shapes() {
        let from_array: CellInput = serde_json::from_str("[1, 0, 0, 0, 0, 0]").unwrap();
        assert_eq!(from_array.normalize().to_bitmask(), 1);

        let from_mask: CellInput = serde_json::from_str("3").unwrap();
        assert_eq!(from_mask.normalize().to_bitmask(), 3);

        let from_named: CellInput =
            serde_json::from_str(r#"{"dot1": true, "dot6": true}"#).unwrap();
        assert_eq!(from_named.normalize().to_bitmask(), 0b100001);

        // Unknown shape still deserializes as an empty named object → blank
        let from_empty: CellInput = serde_json::from_str("{}").unwrap();
        assert_eq!(from_empty.normalize(), Cell::BLANK);
    }

    #[test]
    fn test_pack_cells_reading_order() {
        let cells = vec![
            Cell::from_bitmask(0b000001),
            Cell::from_bitmask(0b000011),
            Cell::BLANK,
        ];
        assert_eq!(pack_cells(&cells), vec![1, 3, 0]);
    }

    #[test]
    fn test_unicode_pattern() {
        // Dots 1+2 = U+2803 BRAILLE PATTERN DOTS-12
        assert_eq!(Cell::from_bitmask(0b000011).to_unicode(), '\u{2803}');
        assert_eq!(Cell::BLANK.to_unicode(), '\u{2800}');
    }
}
