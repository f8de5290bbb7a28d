use std::num::IntErrorKind;
use crate::{BvrError, Result};

/// One input line: the decimal values of an encoded image, comma separated.
///
/// Parsing only checks that every token is an integer. Whether each value fits in a byte
/// is checked by [`FrameLine::to_bytes`], which runs as part of processing the frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLine {
    values: Vec<i64>,
}

impl FrameLine {
    /// Returns `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let values = line
            .split(',')
            .map(|token| {
                let token = token.trim();
                match token.parse::<i64>() {
                    Ok(value) => Ok(value),
                    // still an integer, just not a byte; saturate so byte conversion rejects it
                    Err(err) => match err.kind() {
                        IntErrorKind::PosOverflow => Ok(i64::MAX),
                        IntErrorKind::NegOverflow => Ok(i64::MIN),
                        _ => Err(BvrError::MalformedToken { token: token.to_string() }),
                    },
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(Self { values }))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.values
            .iter()
            .enumerate()
            .map(|(position, &value)| {
                u8::try_from(value).map_err(|_| BvrError::ByteOutOfRange { position, value })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<&[u8]> for FrameLine {
    fn from(bytes: &[u8]) -> Self {
        Self {
            values: bytes.iter().map(|&b| b as i64).collect(),
        }
    }
}

/// Encodes bytes the way the host sends them: decimal values joined by commas.
pub fn encode_frame_line(bytes: &[u8]) -> String {
    bytes.iter().map(|b| b.to_string()).collect::<Vec<_>>().join(",")
}
