use crate::Error;
use serde::{Deserialize, Serialize};

/// One of the five fixed mood levels, stored as its integer value 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MoodRating {
    Terrible = 1,
    Bad = 2,
    #[default]
    Okay = 3,
    Good = 4,
    Excellent = 5,
}

impl MoodRating {
    /// All levels, worst first
    pub const ALL: [MoodRating; 5] = [
        MoodRating::Terrible,
        MoodRating::Bad,
        MoodRating::Okay,
        MoodRating::Good,
        MoodRating::Excellent,
    ];

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            MoodRating::Terrible => "Terrible",
            MoodRating::Bad => "Bad",
            MoodRating::Okay => "Okay",
            MoodRating::Good => "Good",
            MoodRating::Excellent => "Excellent",
        }
    }

    /// Weather glyph shown on calendar cells and history cards
    pub fn glyph(self) -> &'static str {
        match self {
            MoodRating::Terrible => "⚡",
            MoodRating::Bad => "☂",
            MoodRating::Okay => "☁",
            MoodRating::Good => "⛅",
            MoodRating::Excellent => "☀",
        }
    }

    /// Next better level, saturating at `Excellent`
    pub fn up(self) -> Self {
        Self::try_from(self.value() + 1).unwrap_or(self)
    }

    /// Next worse level, saturating at `Terrible`
    pub fn down(self) -> Self {
        Self::try_from(self.value().saturating_sub(1)).unwrap_or(self)
    }
}

impl TryFrom<u8> for MoodRating {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(MoodRating::Terrible),
            2 => Ok(MoodRating::Bad),
            3 => Ok(MoodRating::Okay),
            4 => Ok(MoodRating::Good),
            5 => Ok(MoodRating::Excellent),
            other => Err(Error::InvalidInput(format!(
                "mood rating must be between 1 and 5, got {}",
                other
            ))),
        }
    }
}

impl From<MoodRating> for u8 {
    fn from(rating: MoodRating) -> Self {
        rating.value()
    }
}
