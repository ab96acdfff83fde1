//! Extraction of readable messages from panic payloads.
//!
//! Handler bodies and scheduled work run behind `catch_unwind`; this helper
//! turns the opaque payload into something worth logging or sending back in
//! an error response.

use std::any::Any;

/// Render a panic payload as text.
///
/// `String` and `&'static str` payloads (everything `panic!` normally
/// produces) come through verbatim; anything else falls back to a generic
/// description.
///
/// ```
/// use livebridge::panic::payload_message;
/// assert_eq!(payload_message(&"boom"), "boom");
/// assert_eq!(payload_message(&String::from("boom")), "boom");
/// ```
#[must_use]
pub fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        (*text).to_owned()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
