//! Response event classification
//!
//! Every native callback invocation carries a response type code. Three codes
//! are fixed by the protocol; every other code is a progress notification and
//! is passed through untouched.

/// Terminal success; payload is the JSON result
pub const RESPONSE_SUCCESS: u32 = 0;
/// Terminal failure; payload is an error envelope
pub const RESPONSE_ERROR: u32 = 1;
/// Keep-alive with no meaning for the caller
pub const RESPONSE_NOP: u32 = 2;

/// Classified response event, borrowing its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope<'a> {
    Success(&'a str),
    Failure(&'a str),
    Progress { kind: u32, payload: &'a str },
    Ignorable,
}

impl Envelope<'_> {
    /// Success and Failure resolve a request; nothing else does
    pub fn is_terminal(&self) -> bool {
        matches!(self, Envelope::Success(_) | Envelope::Failure(_))
    }
}

/// Classify one response event
///
/// Pure and infallible: malformed payloads are a concern of decoding.
///
/// # Examples
///
/// ```
/// # use bridge_runtime::envelope::{classify, Envelope};
/// assert_eq!(classify(0, "{}"), Envelope::Success("{}"));
/// assert_eq!(classify(2, ""), Envelope::Ignorable);
/// assert_eq!(
///     classify(100, "{\"step\":1}"),
///     Envelope::Progress { kind: 100, payload: "{\"step\":1}" }
/// );
/// ```
pub fn classify(kind: u32, payload: &str) -> Envelope<'_> {
    match kind {
        RESPONSE_SUCCESS => Envelope::Success(payload),
        RESPONSE_ERROR => Envelope::Failure(payload),
        RESPONSE_NOP => Envelope::Ignorable,
        kind => Envelope::Progress { kind, payload },
    }
}
