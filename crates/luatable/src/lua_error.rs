/// Errors raised by table operations.
///
/// `get`/`contains` never produce one of these; they are the probe-style
/// alternative to the checked accessors.
#[derive(Debug)]
pub enum LuaError {
    /// Direct access on an absent key - carries the rendered key
    KeyNotFound(String),
    /// Programmer error: bad index, non-string key in `add`, NaN key, ...
    PreconditionViolation(String),
    /// Typed read found a value of another kind
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// I/O failure from the persistence layer, passed through unchanged
    Io(std::io::Error),
    /// Codec failure (malformed payload, unencodable value)
    Serialize(String),
}

pub type LuaResult<T> = Result<T, LuaError>;

impl LuaError {
    #[inline]
    pub(crate) fn precondition(message: impl Into<String>) -> Self {
        LuaError::PreconditionViolation(message.into())
    }

    #[inline]
    pub(crate) fn key_not_found(key: impl std::fmt::Display) -> Self {
        LuaError::KeyNotFound(key.to_string())
    }
}

impl std::fmt::Display for LuaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LuaError::KeyNotFound(key) => write!(f, "key not found: {}", key),
            LuaError::PreconditionViolation(msg) => write!(f, "precondition violated: {}", msg),
            LuaError::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: expected {}, got {}", expected, found)
            }
            LuaError::Io(e) => write!(f, "I/O error: {}", e),
            LuaError::Serialize(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for LuaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LuaError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LuaError {
    fn from(e: std::io::Error) -> Self {
        LuaError::Io(e)
    }
}
