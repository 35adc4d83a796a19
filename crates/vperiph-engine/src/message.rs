use crate::builtin::{BuiltinRequestCode, BuiltinSetCode};
use crate::error::EngineError;

/// Index of the target code (builtin letter or screen digit) in a line.
pub const TARGET_OFFSET: usize = 1;

/// Index where screen data starts in a line.
pub const DATA_OFFSET: usize = 2;

/// Address of a screen handler, always in `0..=9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScreenId(u8);

impl ScreenId {
    /// Screen 0, always present and always reachable.
    pub const DEFAULT: ScreenId = ScreenId(0);

    /// Highest valid id.
    pub const MAX: u8 = 9;

    pub fn new(id: u8) -> Option<Self> {
        (id <= Self::MAX).then_some(Self(id))
    }

    /// Parse an ASCII digit.
    pub fn from_digit(c: char) -> Option<Self> {
        c.to_digit(10).map(|d| Self(d as u8))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// The id as its wire digit.
    pub fn as_char(self) -> char {
        char::from(b'0' + self.0)
    }

    pub fn is_default(self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<u8> for ScreenId {
    type Error = EngineError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        ScreenId::new(value).ok_or(EngineError::ScreenIdOutOfRange(value))
    }
}

impl std::str::FromStr for ScreenId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next().and_then(ScreenId::from_digit), chars.next()) {
            (Some(id), None) => Ok(id),
            _ => Err(EngineError::InvalidScreen(s.to_string())),
        }
    }
}

impl std::fmt::Display for ScreenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classification of an inbound line by its first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// `d`: changes state, no reply.
    Set,
    /// `?`: expects exactly one reply.
    Request,
    /// `e`: an error reported by the peer.
    Error,
    /// Anything else; dropped without trace.
    Unknown,
}

impl MessageKind {
    pub fn classify(line: &str) -> Self {
        match line.as_bytes().first() {
            Some(b'd') => MessageKind::Set,
            Some(b'?') => MessageKind::Request,
            Some(b'e') => MessageKind::Error,
            _ => MessageKind::Unknown,
        }
    }

    /// Wire prefix for this kind, if it has one.
    pub fn prefix(self) -> Option<char> {
        match self {
            MessageKind::Set => Some('d'),
            MessageKind::Request => Some('?'),
            MessageKind::Error => Some('e'),
            MessageKind::Unknown => None,
        }
    }
}

/// Where a set or request message is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Set(BuiltinSetCode),
    Request(BuiltinRequestCode),
    Screen(ScreenId),
    /// No code character, an unmapped letter, or a kind that is never routed.
    Unrecognized,
}

/// A classified inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    kind: MessageKind,
    text: String,
}

impl Message {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            kind: MessageKind::classify(&text),
            text,
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// The whole line as received.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Everything after the kind prefix.
    pub fn payload(&self) -> &str {
        self.text.get(TARGET_OFFSET..).unwrap_or("")
    }

    /// Everything after the target code.
    pub fn data(&self) -> &str {
        self.text.get(DATA_OFFSET..).unwrap_or("")
    }

    /// Resolve the target code. Builtin letters take precedence over digits.
    pub fn target(&self) -> Target {
        let Some(code) = self.payload().chars().next() else {
            return Target::Unrecognized;
        };
        match self.kind {
            MessageKind::Set => {
                if let Some(builtin) = BuiltinSetCode::from_code(code) {
                    return Target::Set(builtin);
                }
            }
            MessageKind::Request => {
                if let Some(builtin) = BuiltinRequestCode::from_code(code) {
                    return Target::Request(builtin);
                }
            }
            MessageKind::Error | MessageKind::Unknown => return Target::Unrecognized,
        }
        ScreenId::from_digit(code).map_or(Target::Unrecognized, Target::Screen)
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
