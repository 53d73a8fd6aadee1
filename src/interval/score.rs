use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// A numeric score attached to an interval record, e.g. a bedGraph data
/// value. Stored as `f64`; integral values print without a fraction.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Score(f64);

impl Score {
    pub fn get(&self) -> f64 {
        self.0
    }
}

impl From<f64> for Score {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<Score> for f64 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Score {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lexical::parse(s)
            .map(Score)
            .map_err(ParseError::InvalidScore)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score() {
        assert_eq!("0.5".parse::<Score>().unwrap(), Score::from(0.5));
        assert_eq!("1000".parse::<Score>().unwrap(), Score::from(1000.0));
        assert!("high".parse::<Score>().is_err());
        assert_eq!(Score::from(0.9).to_string(), "0.9");
        assert_eq!(Score::from(1000.0).to_string(), "1000");
    }
}
