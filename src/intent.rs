//! Location and result-shape hints extracted from a question.
//!
//! Everything here is plain pattern matching over the lower-cased question.
//! Geographic filtering and answer formatting only see the resulting
//! [`Intent`], so the matching rules can change without touching them.

use std::sync::LazyLock;

use regex::Regex;

use crate::geo::{DEFAULT_NEAR_RADIUS_MILES, miles_to_km};

static EXPLICIT_DISTANCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"within\s+(\d+(?:\.\d+)?)\s*(?:miles|mile|mi)\.?\s+of\s+(?:zip\s+(?:code\s+)?)?(\d{5})\b")
        .expect("valid distance pattern")
});

static IMPLICIT_DISTANCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bnear\s+(?:zip\s+(?:code\s+)?)?(\d{5})\b").expect("valid near pattern")
});

static TOP_N: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\btop\s+(\d+)\b").expect("valid top-n pattern"));

static SINGULAR_SUPERLATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bthe\s+(cheapest|best|worst|highest|lowest)\b").expect("valid superlative pattern")
});

static CHEAPEST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bcheapest\b").expect("valid cheapest pattern"));

/// Radius search derived from the question.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoConstraint {
    /// Search radius in kilometres.
    pub radius_km: f64,
    /// Five-digit ZIP the radius is measured from.
    pub origin_zip: String,
}

impl GeoConstraint {
    /// Creates a constraint from a radius in miles.
    pub fn from_miles(miles: f64, origin_zip: impl Into<String>) -> Self {
        Self {
            radius_km: miles_to_km(miles),
            origin_zip: origin_zip.into(),
        }
    }
}

/// Single-row superlatives the formatter knows how to phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Superlative {
    Cheapest,
    Best,
    Worst,
    Highest,
    Lowest,
}

impl Superlative {
    fn parse(word: &str) -> Option<Self> {
        match word {
            "cheapest" => Some(Self::Cheapest),
            "best" => Some(Self::Best),
            "worst" => Some(Self::Worst),
            "highest" => Some(Self::Highest),
            "lowest" => Some(Self::Lowest),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cheapest => "cheapest",
            Self::Best => "best",
            Self::Worst => "worst",
            Self::Highest => "highest",
            Self::Lowest => "lowest",
        }
    }
}

/// How the answer should be shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    /// "top N": a numbered list of at most `n` rows.
    TopN { n: usize, cheapest: bool },
    /// "the cheapest", "the best", ...: only the first row.
    Single(Superlative),
    /// No recognized cue.
    General,
}

/// Everything the pipeline needs to know about a question besides its SQL.
#[derive(Debug, Clone, PartialEq)]
pub struct Intent {
    pub geo: Option<GeoConstraint>,
    pub shape: ResultShape,
}

/// Extracts the location constraint and result shape from a question.
pub fn extract(question: &str) -> Intent {
    let lowered = question.to_lowercase();
    Intent {
        geo: geo_constraint(&lowered),
        shape: result_shape(&lowered),
    }
}

/// Finds "within N miles of ZIP" or "near ZIP".
///
/// The explicit form wins when both are present.
///
/// # Examples
///
/// ```
/// use carenav::intent::extract_geo;
///
/// let geo = extract_geo("Cheapest knee replacement within 25 miles of 10001").unwrap();
/// assert_eq!(geo.origin_zip, "10001");
/// assert_eq!(geo.radius_km, 25.0 * 1.60934);
///
/// assert!(extract_geo("Cheapest knee replacement in New York").is_none());
/// ```
pub fn extract_geo(question: &str) -> Option<GeoConstraint> {
    geo_constraint(&question.to_lowercase())
}

fn geo_constraint(lowered: &str) -> Option<GeoConstraint> {
    if let Some(caps) = EXPLICIT_DISTANCE.captures(lowered) {
        let miles = caps[1].parse::<f64>().ok()?;
        return Some(GeoConstraint::from_miles(miles, &caps[2]));
    }

    IMPLICIT_DISTANCE
        .captures(lowered)
        .map(|caps| GeoConstraint::from_miles(DEFAULT_NEAR_RADIUS_MILES, &caps[1]))
}

/// Classifies the question's result-shape cue.
pub fn extract_shape(question: &str) -> ResultShape {
    result_shape(&question.to_lowercase())
}

fn result_shape(lowered: &str) -> ResultShape {
    if let Some(n) = TOP_N
        .captures(lowered)
        .and_then(|caps| caps[1].parse::<usize>().ok())
        .filter(|n| *n > 0)
    {
        return ResultShape::TopN {
            n,
            cheapest: CHEAPEST.is_match(lowered),
        };
    }

    if let Some(superlative) = SINGULAR_SUPERLATIVE
        .captures(lowered)
        .and_then(|caps| Superlative::parse(&caps[1]))
    {
        return ResultShape::Single(superlative);
    }

    if CHEAPEST.is_match(lowered) {
        return ResultShape::Single(Superlative::Cheapest);
    }

    ResultShape::General
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_distance_converts_miles_to_km() {
        let geo = extract_geo("Who has the cheapest knee replacement within 25 miles of 10001?").unwrap();
        assert_eq!(geo.origin_zip, "10001");
        assert_eq!(geo.radius_km, 25.0 * 1.60934);
    }

    #[test]
    fn near_defaults_to_fifty_miles() {
        let geo = extract_geo("Best rated hospitals near 10001").unwrap();
        assert_eq!(geo.origin_zip, "10001");
        assert_eq!(geo.radius_km, 50.0 * 1.60934);
    }

    #[test]
    fn explicit_distance_takes_precedence_over_near() {
        let geo = extract_geo("Hospitals near 10001 within 10 mi of 10029").unwrap();
        assert_eq!(geo.origin_zip, "10029");
        assert_eq!(geo.radius_km, 10.0 * 1.60934);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let geo = extract_geo("WITHIN 5 MILES OF 02101").unwrap();
        assert_eq!(geo.origin_zip, "02101");
        assert_eq!(geo.radius_km, 5.0 * 1.60934);
    }

    #[test]
    fn accepts_fractional_miles_and_zip_prefix() {
        let geo = extract_geo("within 7.5 miles of zip code 10001").unwrap();
        assert_eq!(geo.origin_zip, "10001");
        assert_eq!(geo.radius_km, 7.5 * 1.60934);
    }

    #[test]
    fn no_location_language_means_no_constraint() {
        assert!(extract_geo("What is the cheapest hospital for DRG 470?").is_none());
        assert!(extract_geo("near New York").is_none());
        assert!(extract_geo("near 100011").is_none());
    }

    #[test]
    fn top_n_is_recognized_with_cheapest_flag() {
        assert_eq!(
            extract_shape("Top 5 cheapest hospitals for knee replacement"),
            ResultShape::TopN { n: 5, cheapest: true }
        );
        assert_eq!(
            extract_shape("top 3 hospitals by rating"),
            ResultShape::TopN { n: 3, cheapest: false }
        );
    }

    #[test]
    fn top_zero_is_not_a_list_request() {
        assert_eq!(extract_shape("top 0 hospitals"), ResultShape::General);
    }

    #[test]
    fn singular_superlatives_are_recognized() {
        assert_eq!(
            extract_shape("Which is the best hospital for heart failure?"),
            ResultShape::Single(Superlative::Best)
        );
        assert_eq!(
            extract_shape("Who has the LOWEST payments?"),
            ResultShape::Single(Superlative::Lowest)
        );
        assert_eq!(
            extract_shape("who is cheapest for DRG 470"),
            ResultShape::Single(Superlative::Cheapest)
        );
    }

    #[test]
    fn plain_questions_are_general() {
        assert_eq!(
            extract_shape("Which hospitals perform hip replacements?"),
            ResultShape::General
        );
    }

    #[test]
    fn extract_combines_both_hints() {
        let intent = extract("Top 3 cheapest knee replacements near 10001");
        assert_eq!(intent.shape, ResultShape::TopN { n: 3, cheapest: true });
        assert_eq!(intent.geo, Some(GeoConstraint::from_miles(50.0, "10001")));
    }
}
