//! Test fixtures shared by the survey integration tests

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex};

use shared::{Amount, GameParameters};
use submission::{
    AttemptReceipt, MockSubmitter, OutcomeState, SubmissionDetail, SubmissionOutcome, TransportKind,
};
use survey::{Clock, DemographicsForm, SurveyMachine, SurveyResult};

/// Clock that only moves when told to; clones share the same time
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { now: Arc::new(Mutex::new(start)) }
    }

    pub fn advance_ms(&self, ms: i64) {
        let mut now = self.now.lock().unwrap();
        *now = *now + Duration::milliseconds(ms);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub struct TestFixtures;

impl TestFixtures {
    pub const DECISIONS: [Amount; 5] = [Amount::Zero, Amount::Five, Amount::Ten, Amount::Five, Amount::Zero];
    pub const EXPECTED_EARNINGS: [u32; 5] = [10, 14, 3, 17, 10];

    pub fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 9, 0, 0).unwrap()
    }

    pub fn adult() -> DemographicsForm {
        DemographicsForm {
            age: Some(25),
            gender: None,
            field_of_study: Some("Economics".to_string()),
        }
    }

    pub fn remote_outcome() -> SubmissionOutcome {
        SubmissionOutcome {
            succeeded: true,
            transport_used: TransportKind::DirectApi,
            state: OutcomeState::Success,
            detail: SubmissionDetail::Remote {
                receipt: AttemptReceipt {
                    reference: Some("session-1".to_string()),
                    location: None,
                },
            },
            attempts: Vec::new(),
        }
    }

    /// Submitter that expects exactly `times` calls, each with a summarized session
    pub fn submitter(times: usize) -> MockSubmitter {
        let mut submitter = MockSubmitter::new();
        submitter
            .expect_submit()
            .times(times)
            .withf(|session| session.summary().is_some())
            .returning(|_| Ok(Self::remote_outcome()));
        submitter
    }
}

pub struct TestHelpers;

impl TestHelpers {
    pub fn machine(submitter: MockSubmitter) -> (SurveyMachine<MockSubmitter, ManualClock>, ManualClock) {
        let clock = ManualClock::new(TestFixtures::start());
        let machine = SurveyMachine::new(GameParameters::default(), submitter, clock.clone());
        (machine, clock)
    }

    /// Welcome → instructions → demographics → round 1
    pub async fn to_first_decision<S, C>(machine: &mut SurveyMachine<S, C>) -> SurveyResult<()>
    where
        S: submission::Submitter,
        C: Clock,
    {
        machine.advance().await?;
        machine.advance().await?;
        machine.submit_demographics(TestFixtures::adult())?;
        Ok(())
    }

    /// Play every round with `decisions`, stopping on the last feedback screen
    pub async fn play_rounds<S, C>(machine: &mut SurveyMachine<S, C>, decisions: &[Amount]) -> SurveyResult<()>
    where
        S: submission::Submitter,
        C: Clock,
    {
        for (i, amount) in decisions.iter().enumerate() {
            machine.choose(*amount)?;
            if i + 1 < decisions.len() {
                machine.advance().await?;
            }
        }
        Ok(())
    }
}
