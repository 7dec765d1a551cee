//! [`Fingerprint`]: the comma-joined list of [`RdsId`]s that answers one
//! [`crate::model::Disjunction`].

use std::{fmt, str::FromStr};

/// A monotonically assigned positive integer identifying one materialized
/// RDS.
pub type RdsId = i64;

/// The composite key answering a full disjunction: one [`RdsId`] per
/// conjunct, in disjunct order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fingerprint(Vec<RdsId>);

impl Fingerprint {
    /// Build a fingerprint from the ids produced for each conjunct, in
    /// disjunct order.
    pub fn from_ids(ids: Vec<RdsId>) -> Self {
        Self(ids)
    }

    /// The ids making up this fingerprint, in order.
    pub fn ids(&self) -> &[RdsId] {
        &self.0
    }

    /// True if this fingerprint names no rds ids (an empty disjunction
    /// never reaches this type, but `Fingerprint::default()` can).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{id}")?;
        }
        Ok(())
    }
}

/// Error returned when parsing a malformed fingerprint string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFingerprintError(String);

impl fmt::Display for ParseFingerprintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a valid fingerprint: {}", self.0)
    }
}

impl std::error::Error for ParseFingerprintError {}

impl FromStr for Fingerprint {
    type Err = ParseFingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Fingerprint::default());
        }

        let ids = s
            .split(',')
            .map(|part| {
                part.parse::<RdsId>()
                    .map_err(|_| ParseFingerprintError(s.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Fingerprint(ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_display_and_parse() {
        let fp = Fingerprint::from_ids(vec![1, 2, 3]);
        assert_eq!(fp.to_string(), "1,2,3");
        assert_eq!("1,2,3".parse::<Fingerprint>().unwrap(), fp);
    }

    #[test]
    fn single_id() {
        let fp = Fingerprint::from_ids(vec![42]);
        assert_eq!(fp.to_string(), "42");
    }

    #[test]
    fn rejects_garbage() {
        assert!("1,,3".parse::<Fingerprint>().is_err());
        assert!("x".parse::<Fingerprint>().is_err());
    }
}
