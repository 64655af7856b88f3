use std::fmt;
use std::str::FromStr;

/// Number of bits shifted out per read cycle.
pub const BUTTON_COUNT: usize = 16;

/// Logical SNES pad buttons, in the order the pad shifts them out.
///
/// The discriminant is the bit position in the frozen register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SnesButton {
    B = 0,
    Y = 1,
    Select = 2,
    Start = 3,
    Up = 4,
    Down = 5,
    Left = 6,
    Right = 7,
    A = 8,
    X = 9,
    L = 10,
    R = 11,
    Unused1 = 12,
    Unused2 = 13,
    Unused3 = 14,
    Unused4 = 15,
}

impl SnesButton {
    /// All buttons in shift order (index == bit).
    pub const ALL: [SnesButton; BUTTON_COUNT] = [
        SnesButton::B,
        SnesButton::Y,
        SnesButton::Select,
        SnesButton::Start,
        SnesButton::Up,
        SnesButton::Down,
        SnesButton::Left,
        SnesButton::Right,
        SnesButton::A,
        SnesButton::X,
        SnesButton::L,
        SnesButton::R,
        SnesButton::Unused1,
        SnesButton::Unused2,
        SnesButton::Unused3,
        SnesButton::Unused4,
    ];

    pub const fn bit(self) -> usize {
        self as usize
    }

    pub fn from_bit(bit: usize) -> Option<Self> {
        Self::ALL.get(bit).copied()
    }

    pub const fn name(self) -> &'static str {
        match self {
            SnesButton::B => "B",
            SnesButton::Y => "Y",
            SnesButton::Select => "Select",
            SnesButton::Start => "Start",
            SnesButton::Up => "Up",
            SnesButton::Down => "Down",
            SnesButton::Left => "Left",
            SnesButton::Right => "Right",
            SnesButton::A => "A",
            SnesButton::X => "X",
            SnesButton::L => "L",
            SnesButton::R => "R",
            SnesButton::Unused1 => "Unused1",
            SnesButton::Unused2 => "Unused2",
            SnesButton::Unused3 => "Unused3",
            SnesButton::Unused4 => "Unused4",
        }
    }

    /// Look up a button by name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|b| b.name().eq_ignore_ascii_case(name))
    }

    /// The four trailing bits have no physical button on a stock pad.
    pub const fn is_unused(self) -> bool {
        self.bit() >= 12
    }

    /// Host button index this button is bound to in the canonical mapping.
    pub const fn default_host_index(self) -> Option<u8> {
        if self.is_unused() {
            None
        } else {
            Some(self.bit() as u8)
        }
    }

    /// Buttons whose bit is set in a register word.
    pub fn pressed_in(word: u16) -> impl Iterator<Item = SnesButton> {
        Self::ALL
            .into_iter()
            .filter(move |b| word & (1 << b.bit()) != 0)
    }
}

impl fmt::Display for SnesButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a string does not name a [`SnesButton`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownButton(pub String);

impl fmt::Display for UnknownButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown button: {}", self.0)
    }
}

impl std::error::Error for UnknownButton {}

impl FromStr for SnesButton {
    type Err = UnknownButton;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownButton(s.to_string()))
    }
}
