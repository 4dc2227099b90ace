//! Key identities and decoding of raw TCA8418 FIFO codes.

use core::fmt;

/// Number of rows in the keypad matrix.
pub const ROWS: u8 = 5;
/// Number of columns in the keypad matrix.
pub const COLUMNS: u8 = 5;
/// Number of keys on the keypad.
pub const KEY_COUNT: usize = (ROWS * COLUMNS) as usize;

const PRESS_BIT: u8 = 0x80;
const KEY_CODE_MASK: u8 = 0x7F;

/// One of the 25 keys of the 5x5 matrix, numbered `0..=24` row by row.
///
/// Key `0` sits in the top left corner, key `4` in the top right corner and
/// key `24` in the bottom right corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyId(u8);

impl KeyId {
    /// Returns the key with the given number, or `None` if it is not in `0..=24`.
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < KEY_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Returns the key at the given 0-based row and column.
    pub const fn from_position(row: u8, column: u8) -> Option<Self> {
        if row < ROWS && column < COLUMNS {
            Some(Self(row * COLUMNS + column))
        } else {
            None
        }
    }

    /// Iterates over every key in numbering order.
    pub fn all() -> impl Iterator<Item = KeyId> {
        (0..KEY_COUNT as u8).map(KeyId)
    }

    /// The key number in `0..=24`.
    pub const fn index(self) -> u8 {
        self.0
    }

    /// The 0-based row of the key.
    pub const fn row(self) -> u8 {
        self.0 / COLUMNS
    }

    /// The 0-based column of the key.
    pub const fn column(self) -> u8 {
        self.0 % COLUMNS
    }
}

impl TryFrom<u8> for KeyId {
    type Error = u8;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        KeyId::new(index).ok_or(index)
    }
}

impl From<KeyId> for u8 {
    fn from(key: KeyId) -> Self {
        key.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single press or release of one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key that changed state.
    pub key: KeyId,
    /// `true` for a press, `false` for a release.
    pub pressed: bool,
}

impl KeyEvent {
    /// Decodes one raw `KEY_EVENT_A` byte.
    ///
    /// Bit 7 is the press flag, the low seven bits hold the key code. The chip
    /// packs codes as `row * 10 + column` with columns counted from 1, so codes
    /// outside rows 0-4 / columns 1-5 belong to lines this keypad does not
    /// wire up and yield `None`. The empty-FIFO value `0` also yields `None`.
    pub fn from_raw(raw: u8) -> Option<Self> {
        let code = raw & KEY_CODE_MASK;
        let pressed = raw & PRESS_BIT != 0;
        let row = code / 10;
        let column = code % 10;

        if column == 0 {
            return None;
        }
        KeyId::from_position(row, column - 1).map(|key| KeyEvent { key, pressed })
    }

    /// `true` if this is a release event.
    pub const fn released(self) -> bool {
        !self.pressed
    }
}
