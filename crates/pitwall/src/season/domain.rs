use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound for skill attributes raised by simulation boosts.
pub const SKILL_CEILING: i32 = 100;
/// Lower bound for skill attributes raised by simulation boosts.
pub const SKILL_FLOOR: i32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompetitorId(pub u32);

impl fmt::Display for CompetitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub u32);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session kinds of a Grand Prix weekend, serialised with their short codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionType {
    #[serde(rename = "FP")]
    Practice,
    #[serde(rename = "QS")]
    SprintQualifying,
    #[serde(rename = "S")]
    Sprint,
    #[serde(rename = "QC")]
    Qualifying,
    #[serde(rename = "GP")]
    Race,
}

impl SessionType {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Practice => "FP",
            Self::SprintQualifying => "QS",
            Self::Sprint => "S",
            Self::Qualifying => "QC",
            Self::Race => "GP",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Practice => "Free Practice",
            Self::SprintQualifying => "Sprint Qualifying",
            Self::Sprint => "Sprint",
            Self::Qualifying => "Qualifying",
            Self::Race => "Grand Prix",
        }
    }

    pub const fn is_ranked(self) -> bool {
        !matches!(self, Self::Practice)
    }

    pub const fn is_qualifying(self) -> bool {
        matches!(self, Self::SprintQualifying | Self::Qualifying)
    }

    /// Sprint and main race sessions, the ones that award podiums.
    pub const fn is_race(self) -> bool {
        matches!(self, Self::Sprint | Self::Race)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitType {
    Street,
    #[default]
    HighSpeed,
    Wet,
}

impl CircuitType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Street => "Street",
            Self::HighSpeed => "High speed",
            Self::Wet => "Wet",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "street" => Some(Self::Street),
            "high_speed" | "highspeed" => Some(Self::HighSpeed),
            "wet" => Some(Self::Wet),
            _ => None,
        }
    }
}

/// Per-terrain aptitude, one canonical field per circuit type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitAffinity {
    pub street: i32,
    pub high_speed: i32,
    pub wet: i32,
}

impl CircuitAffinity {
    pub const fn for_circuit(&self, circuit: CircuitType) -> i32 {
        match circuit {
            CircuitType::Street => self.street,
            CircuitType::HighSpeed => self.high_speed,
            CircuitType::Wet => self.wet,
        }
    }
}

/// Skill and behaviour attributes. Only the first four move during a season.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillAttributes {
    pub speed: i32,
    pub racing: i32,
    pub reaction: i32,
    pub experience: i32,
    pub consistency: i32,
    pub error_rate: i32,
    pub affinity: CircuitAffinity,
}

impl SkillAttributes {
    /// Raise the mutable skills: speed, racing and reaction by `gain`, experience
    /// by half of it. Results are clamped to the skill range.
    pub fn boost(&mut self, gain: i32) {
        self.speed = clamp_skill(self.speed.saturating_add(gain));
        self.racing = clamp_skill(self.racing.saturating_add(gain));
        self.reaction = clamp_skill(self.reaction.saturating_add(gain));
        self.experience = clamp_skill(self.experience.saturating_add(gain.div_euclid(2)));
    }
}

pub(crate) fn clamp_skill(value: i32) -> i32 {
    value.clamp(SKILL_FLOOR, SKILL_CEILING)
}

/// Cumulative career totals, zeroed only by a season reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerTotals {
    pub points: u32,
    pub wins: u32,
    pub podiums: u32,
    pub pole_positions: u32,
    pub fastest_laps: u32,
}

/// (surname, name, number) natural key linking live rows to registry baselines.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NaturalKey {
    pub surname: String,
    pub name: String,
    pub number: u32,
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} #{}", self.name, self.surname, self.number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competitor {
    pub id: CompetitorId,
    pub surname: String,
    pub name: String,
    pub country: String,
    pub number: u32,
    pub team_id: TeamId,
    pub media_key: String,
    pub attributes: SkillAttributes,
    pub totals: CareerTotals,
}

impl Competitor {
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey {
            surname: self.surname.clone(),
            name: self.name.clone(),
            number: self.number,
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

pub(crate) fn media_key(surname: &str, number: u32) -> String {
    format!("{}_{}", surname.to_lowercase(), number)
}

/// One discrete session of a Grand Prix weekend. `index` orders the season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub index: u32,
    pub gp_name: String,
    pub circuit_name: String,
    pub date: NaiveDate,
    pub session_type: SessionType,
    pub circuit_type: CircuitType,
    pub is_simulated: bool,
}

/// Persisted outcome of one competitor in one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub session_index: u32,
    pub competitor_id: CompetitorId,
    pub position: Option<u32>,
    pub points_gained: u32,
    pub stats_gained: i32,
}
