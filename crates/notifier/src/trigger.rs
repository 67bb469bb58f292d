//! Trigger message parsing.
//!
//! A trigger body is the UTF-8 decimal text of a notification id, e.g. `b"42"`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriggerError {
    #[error("Trigger body is not valid UTF-8")]
    NotUtf8,

    #[error("Trigger body {0:?} is not an integer notification id")]
    NotAnInteger(String),

    #[error("Notification id {0} is out of range")]
    OutOfRange(String),
}

/// Parse a queue message body into a notification id.
///
/// Leading/trailing whitespace is ignored. The id must be a positive `i32`.
pub fn parse_notification_id(body: &[u8]) -> Result<i32, TriggerError> {
    let text = std::str::from_utf8(body).map_err(|_| TriggerError::NotUtf8)?;
    let text = text.trim();

    let id: i64 = text
        .parse()
        .map_err(|_| TriggerError::NotAnInteger(text.to_string()))?;

    match i32::try_from(id) {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(TriggerError::OutOfRange(text.to_string())),
    }
}
