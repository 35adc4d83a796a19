//! Reserved single-letter codes handled by the engine itself.

/// Builtin targets of set (`d`) messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinSetCode {
    /// `L`: append the data to the log channel.
    Log,
    /// `D`: append the data to the debug channel.
    Debug,
    /// `S`: switch the active screen.
    Screen,
}

impl BuiltinSetCode {
    pub const ALL: [BuiltinSetCode; 3] = [
        BuiltinSetCode::Log,
        BuiltinSetCode::Debug,
        BuiltinSetCode::Screen,
    ];

    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'L' => Some(BuiltinSetCode::Log),
            'D' => Some(BuiltinSetCode::Debug),
            'S' => Some(BuiltinSetCode::Screen),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            BuiltinSetCode::Log => 'L',
            BuiltinSetCode::Debug => 'D',
            BuiltinSetCode::Screen => 'S',
        }
    }
}

/// Builtin targets of request (`?`) messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinRequestCode {
    /// `T`: current wall-clock time.
    Time,
    /// `V`: protocol version and registered screens.
    Version,
}

impl BuiltinRequestCode {
    pub const ALL: [BuiltinRequestCode; 2] = [BuiltinRequestCode::Time, BuiltinRequestCode::Version];

    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'T' => Some(BuiltinRequestCode::Time),
            'V' => Some(BuiltinRequestCode::Version),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            BuiltinRequestCode::Time => 'T',
            BuiltinRequestCode::Version => 'V',
        }
    }
}
