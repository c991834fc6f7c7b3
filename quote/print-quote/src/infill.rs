//! Offered infill densities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QuoteError;

/// Interior fill density of a print.
///
/// Only four densities are offered. Serializes as the plain percentage.
///
/// ```
/// use print_quote::Infill;
///
/// let infill = Infill::from_percent(40).unwrap();
/// assert_eq!(infill, Infill::Standard);
/// assert_eq!(infill.fraction(), 0.4);
/// assert!(Infill::from_percent(50).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Infill {
    /// 15 %
    Light,
    /// 40 %
    Standard,
    /// 70 %
    Strong,
    /// 100 %
    Solid,
}

impl Infill {
    /// All offered densities, lightest first.
    pub const ALL: [Self; 4] = [Self::Light, Self::Standard, Self::Strong, Self::Solid];

    /// Look up an offered density by percentage.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::InvalidInput`] for any percentage other than
    /// 15, 40, 70 or 100.
    pub fn from_percent(percent: u32) -> Result<Self, QuoteError> {
        Self::ALL
            .into_iter()
            .find(|infill| u32::from(infill.percent()) == percent)
            .ok_or_else(|| {
                QuoteError::input(format!(
                    "infill {percent}% is not offered (choose 15, 40, 70 or 100)"
                ))
            })
    }

    /// Percentage value.
    #[must_use]
    pub const fn percent(self) -> u8 {
        match self {
            Self::Light => 15,
            Self::Standard => 40,
            Self::Strong => 70,
            Self::Solid => 100,
        }
    }

    /// Percentage as a fraction in `[0, 1]`.
    #[must_use]
    pub fn fraction(self) -> f64 {
        f64::from(self.percent()) / 100.0
    }
}

impl From<Infill> for u8 {
    fn from(infill: Infill) -> Self {
        infill.percent()
    }
}

impl TryFrom<u8> for Infill {
    type Error = QuoteError;

    fn try_from(percent: u8) -> Result<Self, Self::Error> {
        Self::from_percent(u32::from(percent))
    }
}

impl FromStr for Infill {
    type Err = QuoteError;

    /// Accepts `"40"` or `"40%"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_end_matches('%').trim_end();
        let percent = digits
            .parse::<u32>()
            .map_err(|_| QuoteError::input(format!("infill `{s}` is not a percentage")))?;
        Self::from_percent(percent)
    }
}

impl fmt::Display for Infill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}
