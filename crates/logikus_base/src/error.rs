//! The committed-parse failure report.

use std::error::Error;
use std::fmt;

/// What a committed parse was looking at when it failed: the consumed
/// prefix, the expected element, and the offending token (or
/// `-nothing-` at end of input).
///
/// # Example
///
/// ```
/// use logikus_base::TrackError;
///
/// let err = TrackError {
///     after: "foo ( a , b".to_string(),
///     expected: ")".to_string(),
///     found: "-nothing-".to_string(),
/// };
/// assert_eq!(
///     err.to_string(),
///     "After: foo ( a , b\nExpected: )\nFound: -nothing-",
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackError {
    /// The tokens consumed before the failure, space-joined.
    pub after: String,
    /// A description of the element that should have come next.
    pub expected: String,
    /// The token found instead.
    pub found: String,
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "After: {}\nExpected: {}\nFound: {}",
            self.after, self.expected, self.found
        )
    }
}

impl Error for TrackError {}
