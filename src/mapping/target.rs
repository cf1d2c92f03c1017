//! Console-side inputs: virtual targets and the pad state bitfield

use crate::mapping::MappingError;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// Largest circle pad deflection the console's HID service reports
pub const MAX_CIRCLE_PAD_POS: i16 = 0x9C;

bitflags! {
    /// Pressed buttons as laid out in the console's HID pad register
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[repr(transparent)]
    pub struct PadState: u32 {
        const A = 1 << 0;
        const B = 1 << 1;
        const SELECT = 1 << 2;
        const START = 1 << 3;
        const DRIGHT = 1 << 4;
        const DLEFT = 1 << 5;
        const DUP = 1 << 6;
        const DDOWN = 1 << 7;
        const R = 1 << 8;
        const L = 1 << 9;
        const X = 1 << 10;
        const Y = 1 << 11;
        const HOME = 1 << 12;
        const ZL = 1 << 14;
        const ZR = 1 << 15;
        const TOUCH = 1 << 20;
        const CRIGHT = 1 << 24;
        const CLEFT = 1 << 25;
        const CUP = 1 << 26;
        const CDOWN = 1 << 27;
        const CIRCLE_RIGHT = 1 << 28;
        const CIRCLE_LEFT = 1 << 29;
        const CIRCLE_UP = 1 << 30;
        const CIRCLE_DOWN = 1 << 31;
    }
}

/// One console input a physical input can be bound to
///
/// Declaration order is the positional order of the configuration list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum VirtualTarget {
    A,
    B,
    X,
    Y,
    L,
    R,
    ZL,
    ZR,
    Start,
    Select,
    Home,
    DUp,
    DDown,
    DLeft,
    DRight,
    CUp,
    CDown,
    CLeft,
    CRight,
    CircleUp,
    CircleDown,
    CircleLeft,
    CircleRight,
}

impl VirtualTarget {
    pub const COUNT: usize = 23;

    pub const ALL: [VirtualTarget; Self::COUNT] = [
        VirtualTarget::A,
        VirtualTarget::B,
        VirtualTarget::X,
        VirtualTarget::Y,
        VirtualTarget::L,
        VirtualTarget::R,
        VirtualTarget::ZL,
        VirtualTarget::ZR,
        VirtualTarget::Start,
        VirtualTarget::Select,
        VirtualTarget::Home,
        VirtualTarget::DUp,
        VirtualTarget::DDown,
        VirtualTarget::DLeft,
        VirtualTarget::DRight,
        VirtualTarget::CUp,
        VirtualTarget::CDown,
        VirtualTarget::CLeft,
        VirtualTarget::CRight,
        VirtualTarget::CircleUp,
        VirtualTarget::CircleDown,
        VirtualTarget::CircleLeft,
        VirtualTarget::CircleRight,
    ];

    /// Configuration key for this target
    pub const fn name(self) -> &'static str {
        match self {
            VirtualTarget::A => "pad_a",
            VirtualTarget::B => "pad_b",
            VirtualTarget::X => "pad_x",
            VirtualTarget::Y => "pad_y",
            VirtualTarget::L => "pad_l",
            VirtualTarget::R => "pad_r",
            VirtualTarget::ZL => "pad_zl",
            VirtualTarget::ZR => "pad_zr",
            VirtualTarget::Start => "pad_start",
            VirtualTarget::Select => "pad_select",
            VirtualTarget::Home => "pad_home",
            VirtualTarget::DUp => "pad_dup",
            VirtualTarget::DDown => "pad_ddown",
            VirtualTarget::DLeft => "pad_dleft",
            VirtualTarget::DRight => "pad_dright",
            VirtualTarget::CUp => "pad_cup",
            VirtualTarget::CDown => "pad_cdown",
            VirtualTarget::CLeft => "pad_cleft",
            VirtualTarget::CRight => "pad_cright",
            VirtualTarget::CircleUp => "pad_circle_up",
            VirtualTarget::CircleDown => "pad_circle_down",
            VirtualTarget::CircleLeft => "pad_circle_left",
            VirtualTarget::CircleRight => "pad_circle_right",
        }
    }

    /// Bit this target occupies in the pad register
    pub const fn pad_bit(self) -> PadState {
        match self {
            VirtualTarget::A => PadState::A,
            VirtualTarget::B => PadState::B,
            VirtualTarget::X => PadState::X,
            VirtualTarget::Y => PadState::Y,
            VirtualTarget::L => PadState::L,
            VirtualTarget::R => PadState::R,
            VirtualTarget::ZL => PadState::ZL,
            VirtualTarget::ZR => PadState::ZR,
            VirtualTarget::Start => PadState::START,
            VirtualTarget::Select => PadState::SELECT,
            VirtualTarget::Home => PadState::HOME,
            VirtualTarget::DUp => PadState::DUP,
            VirtualTarget::DDown => PadState::DDOWN,
            VirtualTarget::DLeft => PadState::DLEFT,
            VirtualTarget::DRight => PadState::DRIGHT,
            VirtualTarget::CUp => PadState::CUP,
            VirtualTarget::CDown => PadState::CDOWN,
            VirtualTarget::CLeft => PadState::CLEFT,
            VirtualTarget::CRight => PadState::CRIGHT,
            VirtualTarget::CircleUp => PadState::CIRCLE_UP,
            VirtualTarget::CircleDown => PadState::CIRCLE_DOWN,
            VirtualTarget::CircleLeft => PadState::CIRCLE_LEFT,
            VirtualTarget::CircleRight => PadState::CIRCLE_RIGHT,
        }
    }

    /// Circle pad directions feed the analog stick and never touch pad bits
    pub const fn is_analog(self) -> bool {
        matches!(
            self,
            VirtualTarget::CircleUp
                | VirtualTarget::CircleDown
                | VirtualTarget::CircleLeft
                | VirtualTarget::CircleRight
        )
    }
}

impl Display for VirtualTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VirtualTarget {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VirtualTarget::ALL
            .into_iter()
            .find(|target| target.name() == s)
            .ok_or_else(|| MappingError::UnknownTarget(s.to_string()))
    }
}

impl TryFrom<String> for VirtualTarget {
    type Error = MappingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VirtualTarget> for String {
    fn from(target: VirtualTarget) -> Self {
        target.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_order_matches_declaration() {
        for (position, target) in VirtualTarget::ALL.iter().enumerate() {
            assert_eq!(*target as usize, position);
        }
    }

    #[test]
    fn names_round_trip() {
        for target in VirtualTarget::ALL {
            assert_eq!(target.name().parse::<VirtualTarget>().unwrap(), target);
        }
        assert!("pad_turbo".parse::<VirtualTarget>().is_err());
    }

    #[test]
    fn only_circle_directions_are_analog() {
        let analog: Vec<_> = VirtualTarget::ALL
            .into_iter()
            .filter(|t| t.is_analog())
            .collect();
        assert_eq!(
            analog,
            vec![
                VirtualTarget::CircleUp,
                VirtualTarget::CircleDown,
                VirtualTarget::CircleLeft,
                VirtualTarget::CircleRight
            ]
        );
    }

    #[test]
    fn digital_targets_have_distinct_bits() {
        let mut seen = PadState::empty();
        for target in VirtualTarget::ALL {
            let bit = target.pad_bit();
            assert!(!seen.intersects(bit), "{target} shares a bit");
            seen |= bit;
        }
    }
}
