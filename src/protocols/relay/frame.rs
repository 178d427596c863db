//! Frames exchanged between the relay and its clients.

use thiserror::Error;

use crate::game::colour::Colour;

/// Every frame is exactly this many ASCII bytes long.
pub const FRAME_SIZE: usize = 8;

/// Largest value a coordinate frame can carry on each axis.
pub const MAX_COORDINATE: u16 = 9999;

#[derive(Clone, Debug, Hash, Eq, PartialEq, Error)]
pub enum FrameError {
    #[error("Found a non-ASCII byte")]
    NonAscii,
    #[error("Unrecognized frame: {0:?}")]
    Malformed(String),
}

/// Fixed control messages, matched by exact equality.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum ControlToken {
    Disconnect,
    Rematch,
    DrawAsk,
    Decline,
    Surrender,
    Ready,
    /// Colour assignment, sent by the relay to a new session.
    White,
    Black,
}
impl ControlToken {
    pub const ALL: [Self; 8] = [
        Self::Disconnect,
        Self::Rematch,
        Self::DrawAsk,
        Self::Decline,
        Self::Surrender,
        Self::Ready,
        Self::White,
        Self::Black,
    ];

    /// The literal bytes of the token on the wire.
    pub const fn literal(self) -> &'static [u8; FRAME_SIZE] {
        match self {
            Self::Disconnect => b"!DISCONN",
            Self::Rematch => b"!REMATCH",
            Self::DrawAsk => b"!DRAWASK",
            Self::Decline => b"!DECLINE",
            Self::Surrender => b"!SURREND",
            Self::Ready => b"ready000",
            Self::White => b"w0000000",
            Self::Black => b"b0000000",
        }
    }

    /// Colour assignment token for the given colour.
    pub const fn assigning(colour: Colour) -> Self {
        match colour {
            Colour::White => Self::White,
            Colour::Black => Self::Black,
        }
    }

    /// Colour assigned by this token, if it is an assignment.
    pub const fn assigned_colour(self) -> Option<Colour> {
        match self {
            Self::White => Some(Colour::White),
            Self::Black => Some(Colour::Black),
            _ => None,
        }
    }

    fn from_bytes(bytes: &[u8; FRAME_SIZE]) -> Option<Self> {
        Self::ALL.into_iter().find(|token| token.literal() == bytes)
    }
}

/// A decoded frame.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum Frame {
    Control(ControlToken),
    /// Pixel position of a click on the sender's board.
    Coordinates { x: u16, y: u16 },
}
impl Frame {
    /// A coordinate frame.
    /// # Errors
    /// Fails if either coordinate does not fit in four digits.
    pub fn coordinates(x: u16, y: u16) -> Result<Self, FrameError> {
        if x > MAX_COORDINATE || y > MAX_COORDINATE {
            return Err(FrameError::Malformed(format!("{x}.{y}")));
        }
        Ok(Self::Coordinates { x, y })
    }

    /// Wire representation of the frame.
    pub fn encode(&self) -> [u8; FRAME_SIZE] {
        match self {
            Self::Control(token) => *token.literal(),
            Self::Coordinates { x, y } => {
                let mut bytes = [b'0'; FRAME_SIZE];
                let text = format!("{:04}{:04}", (*x).min(MAX_COORDINATE), (*y).min(MAX_COORDINATE));
                bytes.copy_from_slice(text.as_bytes());
                bytes
            }
        }
    }

    /// Decodes a frame from its wire representation.
    /// # Errors
    /// Fails if the bytes are neither a control token nor eight digits.
    pub fn decode(bytes: &[u8; FRAME_SIZE]) -> Result<Self, FrameError> {
        if !bytes.is_ascii() {
            return Err(FrameError::NonAscii);
        }
        if let Some(token) = ControlToken::from_bytes(bytes) {
            return Ok(Self::Control(token));
        }
        if !bytes.iter().all(u8::is_ascii_digit) {
            return Err(FrameError::Malformed(
                String::from_utf8_lossy(bytes).into_owned(),
            ));
        }
        let number = |digits: &[u8]| {
            digits
                .iter()
                .fold(0u16, |acc, d| acc * 10 + u16::from(d - b'0'))
        };
        Ok(Self::Coordinates {
            x: number(&bytes[..4]),
            y: number(&bytes[4..]),
        })
    }

    #[inline]
    pub fn is_control(&self) -> bool {
        matches!(self, Self::Control(_))
    }
}
impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.encode()))
    }
}
impl std::str::FromStr for Frame {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes: &[u8; FRAME_SIZE] = s
            .as_bytes()
            .try_into()
            .map_err(|_| FrameError::Malformed(s.to_string()))?;
        Self::decode(bytes)
    }
}
