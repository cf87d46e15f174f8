use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const LIKERT_MIN: i32 = 1;
pub const LIKERT_MAX: i32 = 5;

/// A Likert response at one position of the questionnaire; `None` means unanswered.
pub type Answer = Option<i32>;

pub const fn is_likert(value: i32) -> bool {
    value >= LIKERT_MIN && value <= LIKERT_MAX
}

/// Mirrors a Likert response around the midpoint (1 <-> 5, 2 <-> 4).
pub const fn reverse_likert(value: i32) -> i32 {
    LIKERT_MIN + LIKERT_MAX - value
}

/// Named question-set length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Short,
    Standard,
    Extended,
}

impl Variant {
    pub const fn ordered() -> [Self; 3] {
        [Self::Short, Self::Standard, Self::Extended]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Standard => "standard",
            Self::Extended => "extended",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Short => "简短测试",
            Self::Standard => "标准测试",
            Self::Extended => "扩展测试",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ordered()
            .into_iter()
            .find(|variant| variant.key().eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One pole of a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preference {
    Extraversion,
    Introversion,
    Sensing,
    Intuition,
    Thinking,
    Feeling,
    Judging,
    Perceiving,
}

impl Preference {
    pub const fn letter(self) -> char {
        match self {
            Self::Extraversion => 'E',
            Self::Introversion => 'I',
            Self::Sensing => 'S',
            Self::Intuition => 'N',
            Self::Thinking => 'T',
            Self::Feeling => 'F',
            Self::Judging => 'J',
            Self::Perceiving => 'P',
        }
    }
}

/// Bipolar personality axis, always processed in the order returned by [`Dimension::ordered`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    EnergyFocus,
    Perception,
    Judgment,
    Lifestyle,
}

impl Dimension {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::EnergyFocus,
            Self::Perception,
            Self::Judgment,
            Self::Lifestyle,
        ]
    }

    pub const fn index(self) -> usize {
        match self {
            Self::EnergyFocus => 0,
            Self::Perception => 1,
            Self::Judgment => 2,
            Self::Lifestyle => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::EnergyFocus => "E/I",
            Self::Perception => "S/N",
            Self::Judgment => "T/F",
            Self::Lifestyle => "J/P",
        }
    }

    pub const fn poles(self) -> (Preference, Preference) {
        match self {
            Self::EnergyFocus => (Preference::Extraversion, Preference::Introversion),
            Self::Perception => (Preference::Sensing, Preference::Intuition),
            Self::Judgment => (Preference::Thinking, Preference::Feeling),
            Self::Lifestyle => (Preference::Judging, Preference::Perceiving),
        }
    }

    fn pole_for(self, letter: char) -> Option<Preference> {
        let (first, second) = self.poles();
        let letter = letter.to_ascii_uppercase();
        if first.letter() == letter {
            Some(first)
        } else if second.letter() == letter {
            Some(second)
        } else {
            None
        }
    }

    /// Accepts exactly two single letters separated by `/` that name a known axis in order.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.trim().split('/');
        let first = single_letter(parts.next()?)?;
        let second = single_letter(parts.next()?)?;
        if parts.next().is_some() {
            return None;
        }

        Self::ordered().into_iter().find(|dimension| {
            let (l1, l2) = dimension.poles();
            l1.letter() == first && l2.letter() == second
        })
    }
}

fn single_letter(part: &str) -> Option<char> {
    let mut chars = part.chars();
    let letter = chars.next()?;
    if chars.next().is_some() || !letter.is_ascii_alphabetic() {
        return None;
    }
    Some(letter.to_ascii_uppercase())
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Catalog entry. The dimension stays a raw string so that file-backed catalogs are
/// validated position by position during scoring rather than rejected wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub dimension: String,
    pub direction: i8,
}

impl Question {
    pub fn new(text: impl Into<String>, dimension: Dimension, direction: i8) -> Self {
        Self {
            text: text.into(),
            dimension: dimension.label().to_string(),
            direction,
        }
    }

    pub fn parsed_dimension(&self) -> Option<Dimension> {
        Dimension::parse(&self.dimension)
    }
}

/// One of the sixteen four-letter types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PersonalityType {
    letters: [Preference; 4],
}

impl PersonalityType {
    /// `picks[i]` selects the second pole of the i-th ordered dimension when true.
    pub fn from_picks(picks: [bool; 4]) -> Self {
        let mut letters = [Preference::Extraversion; 4];
        for dimension in Dimension::ordered() {
            let (first, second) = dimension.poles();
            letters[dimension.index()] = if picks[dimension.index()] {
                second
            } else {
                first
            };
        }
        Self { letters }
    }

    pub fn all() -> Vec<Self> {
        (0u8..16)
            .map(|bits| {
                Self::from_picks([
                    bits & 0b1000 != 0,
                    bits & 0b0100 != 0,
                    bits & 0b0010 != 0,
                    bits & 0b0001 != 0,
                ])
            })
            .collect()
    }

    pub fn preference(&self, dimension: Dimension) -> Preference {
        self.letters[dimension.index()]
    }

    pub fn code(&self) -> String {
        self.letters.iter().map(|letter| letter.letter()).collect()
    }
}

impl fmt::Display for PersonalityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a four-letter personality type")]
pub struct InvalidTypeCode(pub String);

impl FromStr for PersonalityType {
    type Err = InvalidTypeCode;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let chars: Vec<char> = trimmed.chars().collect();
        if chars.len() != 4 {
            return Err(InvalidTypeCode(trimmed.to_string()));
        }

        let mut letters = [Preference::Extraversion; 4];
        for dimension in Dimension::ordered() {
            letters[dimension.index()] = dimension
                .pole_for(chars[dimension.index()])
                .ok_or_else(|| InvalidTypeCode(trimmed.to_string()))?;
        }
        Ok(Self { letters })
    }
}

impl Serialize for PersonalityType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.code())
    }
}

impl<'de> Deserialize<'de> for PersonalityType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

pub const UNKNOWN_CODE: &str = "unknown";

/// Scoring output: a personality type or the `unknown` sentinel for malformed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MbtiResult {
    Type(PersonalityType),
    Unknown,
}

impl MbtiResult {
    /// Lenient parse for codes arriving over the wire; anything unrecognised is `Unknown`.
    pub fn from_code(raw: &str) -> Self {
        raw.parse::<PersonalityType>()
            .map(Self::Type)
            .unwrap_or(Self::Unknown)
    }

    pub fn personality_type(&self) -> Option<PersonalityType> {
        match self {
            Self::Type(kind) => Some(*kind),
            Self::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl From<PersonalityType> for MbtiResult {
    fn from(value: PersonalityType) -> Self {
        Self::Type(value)
    }
}

impl fmt::Display for MbtiResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(kind) => write!(f, "{kind}"),
            Self::Unknown => f.write_str(UNKNOWN_CODE),
        }
    }
}

impl Serialize for MbtiResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for MbtiResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_code(&raw))
    }
}
