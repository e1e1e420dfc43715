use std::fmt;

type Atom = u32;

/// Largest property payload that is read at all, in bytes.
pub const MAX_PROPERTY_BYTES: u32 = 1024 * 1024;

pub const ANY_PROPERTY_TYPE: Atom = 0;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PropertyError {
    Missing,
    WrongType {
        expected: Atom,
        found: Atom,
    },
    Oversized {
        remaining: u32,
    },
    WrongFormat {
        expected: u8,
        found: u8,
    },
}

impl fmt::Display for PropertyError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match *self {
            PropertyError::Missing => write!(f, "property not set"),
            PropertyError::WrongType {
                expected,
                found,
            } => write!(f, "expected type {}, found {}", expected, found),
            PropertyError::Oversized {
                remaining,
            } => write!(
                f,
                "payload exceeds {} bytes ({} bytes left unread)",
                MAX_PROPERTY_BYTES, remaining
            ),
            PropertyError::WrongFormat {
                expected,
                found,
            } => write!(f, "expected format {}, found {}", expected, found),
        }
    }
}

/// Checks a GetProperty reply header against what the caller asked for.
pub fn validate(
    requested_type: Atom,
    requested_format: u8,
    type_: Atom,
    format: u8,
    bytes_after: u32,
) -> Result<(), PropertyError> {
    if type_ == ANY_PROPERTY_TYPE {
        return Err(PropertyError::Missing);
    }

    if requested_type != ANY_PROPERTY_TYPE && type_ != requested_type {
        return Err(PropertyError::WrongType {
            expected: requested_type,
            found: type_,
        });
    }

    if bytes_after > 0 {
        return Err(PropertyError::Oversized {
            remaining: bytes_after,
        });
    }

    if format != requested_format {
        return Err(PropertyError::WrongFormat {
            expected: requested_format,
            found: format,
        });
    }

    Ok(())
}
