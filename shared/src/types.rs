//! Core session record types
//!
//! A `Session` is only mutated through its own methods, which hold the
//! round-ordering and summary-once rules. Everything derived from a trial
//! comes out of the payoff calculator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::{SharedError, SharedResult};
use crate::payoff;

/// Sentinel stored for optional demographic answers left blank
pub const NOT_SPECIFIED: &str = "Not specified";

/// `P` plus eight lowercase hex digits
const PARTICIPANT_ID_LEN: usize = 9;

/// Opaque participant identifier, drawn once per session
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new() -> Self {
        let raw = Uuid::new_v4().simple().to_string();
        Self(format!("P{}", &raw[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ParticipantId {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = s.len() == PARTICIPANT_ID_LEN
            && s.starts_with('P')
            && s[1..].chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
        if !valid {
            return Err(SharedError::InvalidParticipantId { input: s.to_string() });
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for ParticipantId {
    type Error = SharedError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ParticipantId> for String {
    fn from(id: ParticipantId) -> Self {
        id.0
    }
}

/// One of the three amounts a participant may send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Amount {
    Zero,
    Five,
    Ten,
}

impl Amount {
    pub const ALL: [Amount; 3] = [Amount::Zero, Amount::Five, Amount::Ten];

    pub fn dollars(self) -> u32 {
        match self {
            Amount::Zero => 0,
            Amount::Five => 5,
            Amount::Ten => 10,
        }
    }
}

impl TryFrom<u32> for Amount {
    type Error = SharedError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Amount::Zero),
            5 => Ok(Amount::Five),
            10 => Ok(Amount::Ten),
            other => Err(SharedError::invariant(format!(
                "amount sent must be one of 0, 5, 10 (got {other})"
            ))),
        }
    }
}

impl From<Amount> for u32 {
    fn from(amount: Amount) -> Self {
        amount.dollars()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.dollars())
    }
}

/// Participant background captured before round 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demographics {
    pub age: u32,
    pub gender: String,
    pub field_of_study: String,
}

impl Demographics {
    pub const MINIMUM_AGE: u32 = 18;

    /// Blank optional answers become [`NOT_SPECIFIED`].
    pub fn new(age: u32, gender: Option<&str>, field_of_study: Option<&str>) -> Self {
        Self {
            age,
            gender: or_not_specified(gender),
            field_of_study: or_not_specified(field_of_study),
        }
    }
}

fn or_not_specified(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_SPECIFIED.to_string(),
    }
}

/// Outcome of a single decision round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trial {
    pub round_index: u32,
    pub amount_sent: Amount,
    pub amount_kept: u32,
    pub return_rate: f64,
    pub partner_received: u32,
    pub amount_returned: u32,
    pub final_earnings: u32,
    pub decision_latency_ms: u64,
    pub recorded_at: DateTime<Utc>,
}

/// Discretized average of the amounts sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrustCategory {
    #[serde(rename = "Very Low Trust")]
    VeryLow,
    #[serde(rename = "Low Trust")]
    Low,
    #[serde(rename = "Moderate Trust")]
    Moderate,
    #[serde(rename = "High Trust")]
    High,
}

impl TrustCategory {
    /// `<2` very low, `[2,5)` low, `[5,8)` moderate, `>=8` high
    pub fn from_average(average_sent: f64) -> Self {
        if average_sent >= 8.0 {
            TrustCategory::High
        } else if average_sent >= 5.0 {
            TrustCategory::Moderate
        } else if average_sent >= 2.0 {
            TrustCategory::Low
        } else {
            TrustCategory::VeryLow
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TrustCategory::VeryLow => "Very Low Trust",
            TrustCategory::Low => "Low Trust",
            TrustCategory::Moderate => "Moderate Trust",
            TrustCategory::High => "High Trust",
        }
    }
}

impl fmt::Display for TrustCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TrustCategory {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Very Low Trust" => Ok(TrustCategory::VeryLow),
            "Low Trust" => Ok(TrustCategory::Low),
            "Moderate Trust" => Ok(TrustCategory::Moderate),
            "High Trust" => Ok(TrustCategory::High),
            other => Err(SharedError::DeserializationError {
                message: format!("unknown trust category: {other}"),
            }),
        }
    }
}

/// Aggregate over all trials, computed once after the last round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_earnings: u32,
    pub average_amount_sent: f64,
    pub trust_category: TrustCategory,
    pub completed_at: DateTime<Utc>,
}

/// Record accumulated for one participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    participant_id: ParticipantId,
    started_at: DateTime<Utc>,
    demographics: Option<Demographics>,
    trials: Vec<Trial>,
    summary: Option<Summary>,
}

impl Session {
    pub fn new(participant_id: ParticipantId, started_at: DateTime<Utc>) -> Self {
        Self {
            participant_id,
            started_at,
            demographics: None,
            trials: Vec::new(),
            summary: None,
        }
    }

    pub fn participant_id(&self) -> &ParticipantId {
        &self.participant_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn demographics(&self) -> Option<&Demographics> {
        self.demographics.as_ref()
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    pub fn total_so_far(&self) -> u32 {
        self.trials.iter().map(|t| t.final_earnings).sum()
    }

    /// Demographics are set once, before any round is played.
    pub fn set_demographics(&mut self, demographics: Demographics) -> SharedResult<()> {
        if self.demographics.is_some() || !self.trials.is_empty() {
            return Err(SharedError::invariant("demographics already recorded for this session"));
        }
        self.demographics = Some(demographics);
        Ok(())
    }

    /// Append the next trial. Its round index must be exactly one past the
    /// last recorded round and the session must not be full or summarized.
    pub fn push_trial(&mut self, trial: Trial, total_rounds: u32) -> SharedResult<&Trial> {
        if self.summary.is_some() {
            return Err(SharedError::invariant("session already summarized"));
        }
        if self.trials.len() as u32 >= total_rounds {
            return Err(SharedError::invariant(format!(
                "session already holds {total_rounds} trials"
            )));
        }
        let expected = self.trials.len() as u32 + 1;
        if trial.round_index != expected {
            return Err(SharedError::invariant(format!(
                "expected round {expected}, got round {}",
                trial.round_index
            )));
        }
        self.trials.push(trial);
        Ok(&self.trials[self.trials.len() - 1])
    }

    /// Compute the summary on first call; later calls return the stored value.
    /// The session counts as completed when its last trial was recorded.
    pub fn finalize(&mut self) -> SharedResult<&Summary> {
        if self.summary.is_none() {
            let completed_at = self
                .trials
                .last()
                .map(|t| t.recorded_at)
                .ok_or_else(|| SharedError::invariant("cannot summarize a session with no trials"))?;
            self.summary = Some(payoff::summarize(&self.trials, completed_at)?);
        }
        match &self.summary {
            Some(summary) => Ok(summary),
            None => Err(SharedError::invariant("summary missing after finalize")),
        }
    }
}
