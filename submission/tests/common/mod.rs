//! Test fixtures shared by the submission integration tests

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};

use shared::payoff::{compute_trial, GameParameters};
use shared::{Amount, Demographics, Session};
use submission::SubmissionPayload;

pub struct TestFixtures;

impl TestFixtures {
    pub const PARTICIPANT: &'static str = "P5eed1234";
    pub const DECISIONS: [Amount; 5] = [Amount::Zero, Amount::Five, Amount::Ten, Amount::Five, Amount::Zero];

    pub fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 9, minute, 0).unwrap()
    }

    /// Five-round session, summarized
    pub fn completed_session() -> Session {
        let params = GameParameters::default();
        let mut session = Session::new(Self::PARTICIPANT.parse().unwrap(), Self::at(0));
        session.set_demographics(Demographics::new(25, None, None)).unwrap();
        for (i, amount) in Self::DECISIONS.into_iter().enumerate() {
            let round = i as u32 + 1;
            let trial = compute_trial(&params, round, amount, 1500, Self::at(round)).unwrap();
            session.push_trial(trial, params.total_rounds()).unwrap();
        }
        session.finalize().unwrap();
        session
    }

    pub fn unfinished_session() -> Session {
        Session::new(Self::PARTICIPANT.parse().unwrap(), Self::at(0))
    }

    pub fn payload() -> SubmissionPayload {
        SubmissionPayload::from_session(&Self::completed_session(), Self::at(7)).unwrap()
    }
}
