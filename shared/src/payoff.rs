//! Payoff calculation for the investment game
//!
//! Pure functions only. Given the same round, amount and latency the
//! calculator produces the same `Trial` every time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{SharedError, SharedResult};
use crate::types::{Amount, Summary, Trial, TrustCategory};

/// Dollars handed to the participant at the start of every round
pub const ENDOWMENT: u32 = 10;

/// Factor applied to whatever the participant sends
pub const MULTIPLIER: u32 = 3;

/// Number of decision rounds in a session
pub const TOTAL_ROUNDS: u32 = 5;

/// Scripted partner behaviour, one return rate per round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnRateTable([f64; TOTAL_ROUNDS as usize]);

impl ReturnRateTable {
    pub const DEFAULT_RATES: [f64; TOTAL_ROUNDS as usize] = [0.3, 0.6, 0.1, 0.8, 0.4];

    pub fn new(rates: [f64; TOTAL_ROUNDS as usize]) -> SharedResult<Self> {
        for (i, rate) in rates.iter().enumerate() {
            if !rate.is_finite() || !(0.0..=1.0).contains(rate) {
                return Err(SharedError::InvalidParameter {
                    field: format!("return_rates[{i}]"),
                    value: rate.to_string(),
                });
            }
        }
        Ok(Self(rates))
    }

    /// Rate for a 1-based round index
    pub fn rate_for(&self, round_index: u32) -> SharedResult<f64> {
        if round_index == 0 || round_index as usize > self.0.len() {
            return Err(SharedError::invariant(format!(
                "round index {round_index} outside 1..={}",
                self.0.len()
            )));
        }
        Ok(self.0[round_index as usize - 1])
    }

    pub fn rates(&self) -> &[f64] {
        &self.0
    }
}

impl Default for ReturnRateTable {
    fn default() -> Self {
        Self(Self::DEFAULT_RATES)
    }
}

/// Fixed rules of one game
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GameParameters {
    pub return_rates: ReturnRateTable,
}

impl GameParameters {
    pub fn new(return_rates: ReturnRateTable) -> Self {
        Self { return_rates }
    }

    pub fn endowment(&self) -> u32 {
        ENDOWMENT
    }

    pub fn total_rounds(&self) -> u32 {
        TOTAL_ROUNDS
    }
}

/// Compute the full trial record for one decision.
///
/// `amount_returned` is `floor(sent * 3 * rate)`. A round index outside the
/// table is an invariant violation, not something to clamp.
pub fn compute_trial(
    params: &GameParameters,
    round_index: u32,
    amount: Amount,
    decision_latency_ms: u64,
    recorded_at: DateTime<Utc>,
) -> SharedResult<Trial> {
    let return_rate = params.return_rates.rate_for(round_index)?;
    let sent = amount.dollars();
    let multiplied = sent * MULTIPLIER;
    let amount_kept = ENDOWMENT - sent;
    let amount_returned = (f64::from(multiplied) * return_rate).floor() as u32;

    Ok(Trial {
        round_index,
        amount_sent: amount,
        amount_kept,
        return_rate,
        partner_received: multiplied + ENDOWMENT,
        amount_returned,
        final_earnings: amount_kept + amount_returned,
        decision_latency_ms,
        recorded_at,
    })
}

/// Fold trials into the session summary
pub fn summarize(trials: &[Trial], completed_at: DateTime<Utc>) -> SharedResult<Summary> {
    if trials.is_empty() {
        return Err(SharedError::invariant("cannot summarize a session without trials"));
    }
    let total_earnings = trials.iter().map(|t| t.final_earnings).sum();
    let total_sent: u32 = trials.iter().map(|t| t.amount_sent.dollars()).sum();
    let average_amount_sent = f64::from(total_sent) / trials.len() as f64;

    Ok(Summary {
        total_earnings,
        average_amount_sent,
        trust_category: TrustCategory::from_average(average_amount_sent),
        completed_at,
    })
}

/// What the participant sees after a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundFeedback {
    pub round_index: u32,
    pub amount_sent: u32,
    pub amount_kept: u32,
    pub partner_received: u32,
    pub amount_returned: u32,
    pub round_earnings: u32,
    pub running_total: u32,
}

impl RoundFeedback {
    pub fn from_trial(trial: &Trial, running_total: u32) -> Self {
        Self {
            round_index: trial.round_index,
            amount_sent: trial.amount_sent.dollars(),
            amount_kept: trial.amount_kept,
            partner_received: trial.partner_received,
            amount_returned: trial.amount_returned,
            round_earnings: trial.final_earnings,
            running_total,
        }
    }
}
