//! Physical input identifiers as supplied by configuration
//!
//! A mapping names one key, button or half-axis on one device:
//!
//! ```text
//! Window/0/Keyboard/65
//! Gilrs/1/Gamepad/Axis LeftStickX-
//! ```

use crate::mapping::MappingError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// Input framework that delivers samples for a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum DeviceFramework {
    /// Events forwarded from the host window (keyboard)
    #[default]
    Window,
    /// Gamepads read through gilrs
    Gilrs,
}

impl DeviceFramework {
    pub const fn name(self) -> &'static str {
        match self {
            DeviceFramework::Window => "Window",
            DeviceFramework::Gilrs => "Gilrs",
        }
    }
}

impl Display for DeviceFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DeviceFramework {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Window" => Ok(DeviceFramework::Window),
            "Gilrs" => Ok(DeviceFramework::Gilrs),
            other => Err(MappingError::UnknownFramework(other.to_string())),
        }
    }
}

/// Kind of physical device
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum DeviceKind {
    #[default]
    Keyboard,
    Gamepad,
}

impl DeviceKind {
    pub const fn name(self) -> &'static str {
        match self {
            DeviceKind::Keyboard => "Keyboard",
            DeviceKind::Gamepad => "Gamepad",
        }
    }
}

impl Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DeviceKind {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Keyboard" => Ok(DeviceKind::Keyboard),
            "Gamepad" => Ok(DeviceKind::Gamepad),
            other => Err(MappingError::UnknownDeviceKind(other.to_string())),
        }
    }
}

/// Identity of one physical device, the unit of device deduplication
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceIdentity {
    pub framework: DeviceFramework,
    pub kind: DeviceKind,
    pub index: usize,
}

impl DeviceIdentity {
    pub const fn new(framework: DeviceFramework, kind: DeviceKind, index: usize) -> Self {
        Self {
            framework,
            kind,
            index,
        }
    }

    /// Builds the mapping for one input of this device
    pub fn input(&self, key: impl Into<String>) -> InputMapping {
        InputMapping {
            framework: self.framework,
            index: self.index,
            kind: self.kind,
            key: key.into(),
        }
    }
}

impl Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.framework, self.index, self.kind)
    }
}

/// One physical input source
///
/// Ordering and equality cover all four fields, so the type can key the
/// mapping table directly. An empty `key` marks an unbound slot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InputMapping {
    pub framework: DeviceFramework,
    pub index: usize,
    pub kind: DeviceKind,
    pub key: String,
}

impl InputMapping {
    pub fn new(
        framework: DeviceFramework,
        kind: DeviceKind,
        index: usize,
        key: impl Into<String>,
    ) -> Self {
        Self {
            framework,
            index,
            kind,
            key: key.into(),
        }
    }

    pub fn keyboard(code: u32) -> Self {
        Self::new(
            DeviceFramework::Window,
            DeviceKind::Keyboard,
            0,
            code.to_string(),
        )
    }

    /// Shorthand for an input on the n-th gamepad
    pub fn gamepad(index: usize, key: impl Into<String>) -> Self {
        Self::new(DeviceFramework::Gilrs, DeviceKind::Gamepad, index, key)
    }

    pub fn device(&self) -> DeviceIdentity {
        DeviceIdentity::new(self.framework, self.kind, self.index)
    }

    pub fn is_unbound(&self) -> bool {
        self.key.is_empty()
    }
}

impl Display for InputMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.framework, self.index, self.kind, self.key
        )
    }
}

impl FromStr for InputMapping {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::default());
        }

        // The key may itself contain '/', so only the first three separators count
        let mut parts = s.splitn(4, '/');
        let (Some(framework), Some(index), Some(kind), Some(key)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(MappingError::Malformed(s.to_string()));
        };

        let index = index
            .parse::<usize>()
            .map_err(|_| MappingError::InvalidIndex(index.to_string()))?;

        Ok(Self {
            framework: framework.parse()?,
            index,
            kind: kind.parse()?,
            key: key.to_string(),
        })
    }
}

impl TryFrom<String> for InputMapping {
    type Error = MappingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<InputMapping> for String {
    fn from(mapping: InputMapping) -> Self {
        if mapping.is_unbound() {
            String::new()
        } else {
            mapping.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Window/0/Keyboard/65", InputMapping::keyboard(65))]
    #[case("Gilrs/1/Gamepad/Button South", InputMapping::gamepad(1, "Button South"))]
    #[case("Gilrs/0/Gamepad/Axis LeftStickX-", InputMapping::gamepad(0, "Axis LeftStickX-"))]
    #[case("Window/0/Keyboard/a/b", InputMapping::new(DeviceFramework::Window, DeviceKind::Keyboard, 0, "a/b"))]
    fn parses_textual_mapping(#[case] text: &str, #[case] expected: InputMapping) {
        let parsed: InputMapping = text.parse().unwrap();
        assert_eq!(parsed, expected);
        assert_eq!(parsed.to_string(), text);
    }

    #[rstest]
    #[case("Window/0/Keyboard", MappingError::Malformed("Window/0/Keyboard".into()))]
    #[case("SDL/0/Keyboard/65", MappingError::UnknownFramework("SDL".into()))]
    #[case("Window/x/Keyboard/65", MappingError::InvalidIndex("x".into()))]
    #[case("Window/0/Mouse/1", MappingError::UnknownDeviceKind("Mouse".into()))]
    fn rejects_bad_mapping(#[case] text: &str, #[case] expected: MappingError) {
        assert_eq!(text.parse::<InputMapping>().unwrap_err(), expected);
    }

    #[test]
    fn empty_text_is_unbound() {
        let mapping: InputMapping = "".parse().unwrap();
        assert!(mapping.is_unbound());
        assert_eq!(String::from(mapping), "");
    }

    #[test]
    fn equality_covers_the_key() {
        let a = InputMapping::keyboard(65);
        let b = InputMapping::keyboard(66);
        assert_ne!(a, b);
        assert_eq!(a.device(), b.device());
    }
}
