//! Outcome codes written to daily attendance records.
//!
//! The record stores the code as a short token; [`OutcomeCode`] is the typed
//! form of those tokens. The token is the canonical form: two codes that
//! render the same token are the same code once stored. Build leave codes
//! with [`OutcomeCode::leave`] so a code always equals its own parse.

use serde::{Deserialize, Serialize};

/// The categorical result of a day.
///
/// # Example
///
/// ```
/// use attendance_engine::models::OutcomeCode;
///
/// assert_eq!(OutcomeCode::LateMissingExit(12).to_string(), "12 - FS");
/// assert_eq!("12 - FS".parse::<OutcomeCode>().unwrap(), OutcomeCode::LateMissingExit(12));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum OutcomeCode {
    /// No code (non-working day without leave).
    #[default]
    Unset,
    /// Present and on time: "A".
    Present,
    /// Absent: "F".
    Absent,
    /// On vacation: "V".
    Vacation,
    /// Arrival missing: "FI".
    MissingEntry,
    /// Departure missing: "FS".
    MissingExit,
    /// Late by the given minutes: "<n>".
    Late(u32),
    /// Late by the given minutes and departure missing: "<n> - FS".
    LateMissingExit(u32),
    /// A leave abbreviation such as "LSG" or "ENF".
    ///
    /// Never holds a token that parses to another variant when built with
    /// [`OutcomeCode::leave`].
    Leave(String),
}

impl OutcomeCode {
    /// The code for a leave abbreviation.
    ///
    /// An abbreviation that collides with a reserved token ("A", "F", "12",
    /// ...) becomes that token's code.
    ///
    /// ```
    /// use attendance_engine::models::OutcomeCode;
    ///
    /// assert_eq!(OutcomeCode::leave("LSG"), OutcomeCode::Leave("LSG".to_string()));
    /// assert_eq!(OutcomeCode::leave("F"), OutcomeCode::Absent);
    /// ```
    pub fn leave(abbreviation: &str) -> Self {
        OutcomeCode::from(abbreviation.to_string())
    }
}

const MISSING_EXIT_SUFFIX: &str = " - FS";

impl std::fmt::Display for OutcomeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeCode::Unset => Ok(()),
            OutcomeCode::Present => write!(f, "A"),
            OutcomeCode::Absent => write!(f, "F"),
            OutcomeCode::Vacation => write!(f, "V"),
            OutcomeCode::MissingEntry => write!(f, "FI"),
            OutcomeCode::MissingExit => write!(f, "FS"),
            OutcomeCode::Late(minutes) => write!(f, "{}", minutes),
            OutcomeCode::LateMissingExit(minutes) => {
                write!(f, "{}{}", minutes, MISSING_EXIT_SUFFIX)
            }
            OutcomeCode::Leave(abbreviation) => write!(f, "{}", abbreviation),
        }
    }
}

impl std::str::FromStr for OutcomeCode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(OutcomeCode::from(s.to_string()))
    }
}

impl From<String> for OutcomeCode {
    fn from(token: String) -> Self {
        match token.as_str() {
            "" => return OutcomeCode::Unset,
            "A" => return OutcomeCode::Present,
            "F" => return OutcomeCode::Absent,
            "V" => return OutcomeCode::Vacation,
            "FI" => return OutcomeCode::MissingEntry,
            "FS" => return OutcomeCode::MissingExit,
            _ => {}
        }

        if let Some(minutes) = token
            .strip_suffix(MISSING_EXIT_SUFFIX)
            .and_then(|prefix| prefix.parse::<u32>().ok())
        {
            return OutcomeCode::LateMissingExit(minutes);
        }

        match token.parse::<u32>() {
            Ok(minutes) => OutcomeCode::Late(minutes),
            Err(_) => OutcomeCode::Leave(token),
        }
    }
}

impl From<OutcomeCode> for String {
    fn from(code: OutcomeCode) -> Self {
        code.to_string()
    }
}
