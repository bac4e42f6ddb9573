//! CSS-style anchor offsets ("50%", "120px", "120")

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Offset of the joystick center from a viewport edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AnchorRepr", into = "String")]
pub enum Anchor {
    /// Percentage of the viewport extent along the axis
    Percent(f64),
    Pixels(f64),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AnchorError {
    #[error("Invalid anchor offset: '{0}' (expected e.g. \"50%\", \"120px\" or \"120\")")]
    Invalid(String),
}

impl Anchor {
    /// Resolve to pixels against the viewport extent on this axis
    pub fn resolve(&self, extent: f64) -> f64 {
        match self {
            Anchor::Percent(pct) => extent * pct / 100.0,
            Anchor::Pixels(px) => *px,
        }
    }
}

impl Default for Anchor {
    fn default() -> Self {
        Anchor::Percent(50.0)
    }
}

impl FromStr for Anchor {
    type Err = AnchorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || AnchorError::Invalid(s.to_string());

        let (number, percent) = if let Some(n) = trimmed.strip_suffix('%') {
            (n, true)
        } else if let Some(n) = trimmed.strip_suffix("px") {
            (n, false)
        } else {
            (trimmed, false)
        };

        let value: f64 = number.trim().parse().map_err(|_| invalid())?;
        if !value.is_finite() {
            return Err(invalid());
        }

        Ok(if percent {
            Anchor::Percent(value)
        } else {
            Anchor::Pixels(value)
        })
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::Percent(pct) => write!(f, "{}%", pct),
            Anchor::Pixels(px) => write!(f, "{}px", px),
        }
    }
}

impl From<Anchor> for String {
    fn from(anchor: Anchor) -> Self {
        anchor.to_string()
    }
}

/// YAML accepts both strings and bare numbers
#[derive(Deserialize)]
#[serde(untagged)]
enum AnchorRepr {
    Number(f64),
    Text(String),
}

impl TryFrom<AnchorRepr> for Anchor {
    type Error = AnchorError;

    fn try_from(repr: AnchorRepr) -> Result<Self, Self::Error> {
        match repr {
            AnchorRepr::Number(px) if px.is_finite() => Ok(Anchor::Pixels(px)),
            AnchorRepr::Number(px) => Err(AnchorError::Invalid(px.to_string())),
            AnchorRepr::Text(text) => text.parse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variants() {
        assert_eq!("50%".parse::<Anchor>().unwrap(), Anchor::Percent(50.0));
        assert_eq!("120px".parse::<Anchor>().unwrap(), Anchor::Pixels(120.0));
        assert_eq!(" 12.5 ".parse::<Anchor>().unwrap(), Anchor::Pixels(12.5));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("left".parse::<Anchor>().is_err());
        assert!("%".parse::<Anchor>().is_err());
        assert!("NaN".parse::<Anchor>().is_err());
    }

    #[test]
    fn test_resolve() {
        assert_eq!(Anchor::Percent(25.0).resolve(800.0), 200.0);
        assert_eq!(Anchor::Pixels(40.0).resolve(800.0), 40.0);
    }

    #[test]
    fn test_yaml_accepts_numbers_and_strings() {
        let anchors: Vec<Anchor> = serde_yaml::from_str("[\"30%\", 80, \"15px\"]").unwrap();
        assert_eq!(
            anchors,
            vec![Anchor::Percent(30.0), Anchor::Pixels(80.0), Anchor::Pixels(15.0)]
        );

        assert_eq!(String::from(Anchor::Percent(30.0)), "30%");
        assert_eq!(String::from(Anchor::Pixels(12.5)), "12.5px");
    }
}
