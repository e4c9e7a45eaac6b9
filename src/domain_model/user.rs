use serde::{Deserialize, Serialize};
use std::fmt;

/// Internal identifier of a registered user. Owned by the user store; this
/// service only reads it.
#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(UserId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_subject() {
        assert_eq!("42".parse::<UserId>().unwrap(), UserId(42));
        assert_eq!(UserId(42).to_string(), "42");
    }

    #[test]
    fn rejects_non_decimal_subject() {
        assert!("".parse::<UserId>().is_err());
        assert!("-1".parse::<UserId>().is_err());
        assert!("4a".parse::<UserId>().is_err());
    }
}
