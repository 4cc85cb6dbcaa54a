use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider quality score on a fixed 1–10 scale.
///
/// A provider without a rating is modelled as `Option<Rating>::None`; zero is
/// not a valid score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    /// Creates a rating, returning `None` if the score is outside 1–10.
    ///
    /// # Examples
    ///
    /// ```
    /// use carenav::Rating;
    ///
    /// assert_eq!(Rating::new(7).map(|r| r.get()), Some(7));
    /// assert!(Rating::new(0).is_none());
    /// assert!(Rating::new(11).is_none());
    /// ```
    pub fn new(score: i64) -> Option<Self> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&score) {
            Some(Self(score as u8))
        } else {
            None
        }
    }

    /// Returns the score.
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("rating {value} is outside 1-10"))
    }
}

impl From<Rating> for i64 {
    fn from(rating: Rating) -> Self {
        i64::from(rating.0)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/10", self.0)
    }
}
