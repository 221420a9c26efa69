//! Check-in payload extraction from scanned NDEF messages.
//!
//! Attendance tags carry a URI whose query string identifies the person
//! checking in, e.g. `https://example.com/checkin?userId=42`.

use crate::message::NdefMessage;

/// Query parameter naming the person checking in.
pub const USER_ID_PARAM: &str = "userId";

/// Extract the check-in user id from a URI's query string.
pub fn user_id_from_uri(uri: &str) -> Option<String> {
    let (_, query) = uri.split_once('?')?;
    let query = query.split_once('#').map_or(query, |(query, _)| query);
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == USER_ID_PARAM && !value.is_empty()).then(|| value.to_string())
    })
}

/// Extract the check-in user id from the first URI record that carries one.
pub fn user_id(message: &NdefMessage) -> Option<String> {
    message
        .records()
        .iter()
        .filter_map(|record| record.to_uri())
        .find_map(|uri| user_id_from_uri(&uri))
}
