//! TCA8418 register map and the values the driver programs into it.

/// Default 7-bit I2C address of the TCA8418.
pub const TCA8418_I2C_ADDR: u8 = 0x34;

/// Registers touched by the keypad driver.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    /// Configuration register.
    Cfg = 0x01,
    /// Interrupt status register, write-one-to-clear.
    IntStat = 0x02,
    /// Head of the key event FIFO. Reads `0` once the FIFO is empty.
    KeyEventA = 0x04,
    /// Keypad/GPIO selection for ROW0-ROW7.
    KpGpio1 = 0x1D,
    /// Keypad/GPIO selection for COL0-COL7.
    KpGpio2 = 0x1E,
    /// Keypad/GPIO selection for COL8-COL9.
    KpGpio3 = 0x1F,
    /// Debounce disable for ROW0-ROW7.
    DebounceDis1 = 0x29,
    /// Debounce disable for COL0-COL7.
    DebounceDis2 = 0x2A,
    /// Debounce disable for COL8-COL9.
    DebounceDis3 = 0x2B,
}

impl From<Register> for u8 {
    fn from(reg: Register) -> Self {
        reg as u8
    }
}

// --- CFG bits ---
/// Key events generate an interrupt.
pub const CFG_KE_IEN: u8 = 1 << 0;
/// FIFO overflow generates an interrupt.
pub const CFG_OVR_FLOW_IEN: u8 = 1 << 3;

// --- INT_STAT bits ---
/// A key event is pending.
pub const INT_STAT_K_INT: u8 = 1 << 0;
/// The key event FIFO overflowed.
pub const INT_STAT_OVR_FLOW_INT: u8 = 1 << 3;

// --- Matrix selection: ROW0-ROW4 and COL0-COL4 ---
pub(crate) const KP_GPIO1_ROWS: u8 = 0x1F;
pub(crate) const KP_GPIO2_COLS: u8 = 0x1F;
pub(crate) const KP_GPIO3_UNUSED: u8 = 0x00;

// 0 = debounce enabled, 1 = disabled. Only the five lines of each bank are live.
pub(crate) const DEBOUNCE_DIS1_ROWS: u8 = 0xE0;
pub(crate) const DEBOUNCE_DIS2_COLS: u8 = 0xE0;
pub(crate) const DEBOUNCE_DIS3_UNUSED: u8 = 0xFF;

/// Depth of the hardware key event FIFO.
pub const FIFO_DEPTH: usize = 10;

/// Value of `KEY_EVENT_A` once the FIFO is drained.
pub const FIFO_EMPTY: u8 = 0x00;
