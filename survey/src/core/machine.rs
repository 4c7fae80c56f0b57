//! Session state machine
//!
//! Drives the participant from the welcome screen through the decision
//! rounds to the final results, owning the session record the whole way.
//! The only user-recoverable failure is the age guard on the demographics
//! screen; every other error is a transition the driver should not have
//! attempted.

use chrono::{DateTime, Utc};

use shared::payoff::{self, GameParameters, RoundFeedback};
use shared::{component_debug, component_info, logging, Amount, Component, ParticipantId, Session};
use submission::{SubmissionOutcome, Submitter};

use crate::core::screen::{DemographicsForm, Screen};
use crate::error::{SurveyError, SurveyResult};
use crate::traits::{Clock, SessionView};

pub struct SurveyMachine<S, C>
where
    S: Submitter,
    C: Clock,
{
    params: GameParameters,
    session: Session,
    screen: Screen,

    /// When the current decision screen was shown
    decision_presented_at: Option<DateTime<Utc>>,
    latest_feedback: Option<RoundFeedback>,

    submission: Option<SubmissionOutcome>,
    submitted: bool,

    /// Injected services
    submitter: S,
    clock: C,
}

impl<S, C> SurveyMachine<S, C>
where
    S: Submitter,
    C: Clock,
{
    /// Start a fresh session on the welcome screen
    pub fn new(params: GameParameters, submitter: S, clock: C) -> Self {
        let session = Session::new(ParticipantId::new(), clock.now());
        component_info!(Component::Survey, participant = %session.participant_id(), "🆕 Session started");

        Self {
            params,
            session,
            screen: Screen::Welcome,
            decision_presented_at: None,
            latest_feedback: None,
            submission: None,
            submitted: false,
            submitter,
            clock,
        }
    }

    /// Give up the finished record
    pub fn into_session(self) -> Session {
        self.session
    }

    /// Forward navigation: welcome → instructions → demographics, and from a
    /// feedback screen to the next round or the final results. Entering the
    /// final results computes the summary and submits the record.
    pub async fn advance(&mut self) -> SurveyResult<Screen> {
        let next = match self.screen {
            Screen::Welcome => Screen::Instructions,
            Screen::Instructions => Screen::Demographics,
            Screen::Feedback { round } if round < self.params.total_rounds() => {
                self.present_decision(round + 1);
                Screen::Decision { round: round + 1 }
            }
            Screen::Feedback { .. } => {
                self.enter_final_results().await?;
                Screen::FinalResults
            }
            screen => {
                return Err(SurveyError::InvalidTransition { event: "advance", screen });
            }
        };

        self.screen = next;
        component_debug!(Component::Survey, screen = %next, "Screen changed");
        Ok(next)
    }

    /// Record demographics and move to round 1. A missing or under-age
    /// answer leaves the machine on the demographics screen.
    pub fn submit_demographics(&mut self, form: DemographicsForm) -> SurveyResult<Screen> {
        if self.screen != Screen::Demographics {
            return Err(SurveyError::InvalidTransition {
                event: "submit demographics",
                screen: self.screen,
            });
        }

        let demographics = form.validate()?;
        self.session.set_demographics(demographics)?;

        self.present_decision(1);
        self.screen = Screen::Decision { round: 1 };
        Ok(self.screen)
    }

    /// Record the participant's choice for the current round
    pub fn choose(&mut self, amount: Amount) -> SurveyResult<RoundFeedback> {
        let Screen::Decision { round } = self.screen else {
            return Err(SurveyError::InvalidTransition { event: "choose", screen: self.screen });
        };

        let recorded_at = self.clock.now();
        let latency_ms = self
            .decision_presented_at
            .take()
            .map(|shown| (recorded_at - shown).num_milliseconds().max(0) as u64)
            .unwrap_or(0);

        let trial = payoff::compute_trial(&self.params, round, amount, latency_ms, recorded_at)?;
        self.session.push_trial(trial, self.params.total_rounds())?;

        let trial = &self.session.trials()[self.session.trials().len() - 1];
        let feedback = RoundFeedback::from_trial(trial, self.session.total_so_far());
        component_debug!(
            Component::Survey,
            round,
            sent = amount.dollars(),
            earned = feedback.round_earnings,
            latency_ms,
            "Decision recorded"
        );

        self.latest_feedback = Some(feedback.clone());
        self.screen = Screen::Feedback { round };
        Ok(feedback)
    }

    /// Leave the final results screen
    pub fn finish(&mut self) -> SurveyResult<Screen> {
        if self.screen != Screen::FinalResults {
            return Err(SurveyError::InvalidTransition { event: "finish", screen: self.screen });
        }
        self.screen = Screen::Complete;
        logging::log_success(Component::Survey, "Session complete");
        Ok(self.screen)
    }

    /// Destructive reset back to the welcome screen with a new participant
    /// id. Does nothing unless the participant confirmed.
    pub fn restart(&mut self, confirmed: bool) -> SurveyResult<Screen> {
        if self.screen == Screen::Welcome {
            return Err(SurveyError::InvalidTransition { event: "restart", screen: self.screen });
        }
        if !confirmed {
            return Ok(self.screen);
        }

        let previous = self.session.participant_id().clone();
        self.session = Session::new(ParticipantId::new(), self.clock.now());
        self.screen = Screen::Welcome;
        self.decision_presented_at = None;
        self.latest_feedback = None;
        self.submission = None;
        self.submitted = false;

        component_info!(
            Component::Survey,
            previous = %previous,
            participant = %self.session.participant_id(),
            "🔄 Session restarted"
        );
        Ok(self.screen)
    }

    fn present_decision(&mut self, round: u32) {
        self.decision_presented_at = Some(self.clock.now());
        component_debug!(Component::Survey, round, "Decision presented");
    }

    async fn enter_final_results(&mut self) -> SurveyResult<()> {
        let summary = self.session.finalize()?;
        component_info!(
            Component::Survey,
            total = summary.total_earnings,
            average = summary.average_amount_sent,
            category = %summary.trust_category,
            "📊 Session summarized"
        );

        if self.submitted {
            return Ok(());
        }

        // A failed export leaves the flag clear so the next advance retries
        let outcome = self.submitter.submit(&self.session).await?;
        self.submitted = true;
        logging::log_progress(
            Component::Survey,
            "Submission",
            &format!("{} via {}", self.session.participant_id(), outcome.transport_used),
        );
        self.submission = Some(outcome);
        Ok(())
    }
}

impl<S, C> SessionView for SurveyMachine<S, C>
where
    S: Submitter,
    C: Clock,
{
    fn screen(&self) -> Screen {
        self.screen
    }

    fn session(&self) -> &Session {
        &self.session
    }

    fn params(&self) -> &GameParameters {
        &self.params
    }

    fn latest_feedback(&self) -> Option<&RoundFeedback> {
        self.latest_feedback.as_ref()
    }

    fn submission(&self) -> Option<&SubmissionOutcome> {
        self.submission.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockClock;
    use chrono::{Duration, TimeZone};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use submission::MockSubmitter;

    fn clock_reading(times: Vec<DateTime<Utc>>) -> MockClock {
        let times = Mutex::new(VecDeque::from(times));
        let mut clock = MockClock::new();
        clock
            .expect_now()
            .returning(move || times.lock().unwrap().pop_front().expect("clock read more often than scripted"));
        clock
    }

    #[tokio::test]
    async fn test_latency_never_negative() {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 20, 9, 0, 0).unwrap();
        // session start, round 1 shown, choice made before the shown time
        let clock = clock_reading(vec![t0, t0, t0 - Duration::seconds(1)]);
        let mut machine = SurveyMachine::new(GameParameters::default(), MockSubmitter::new(), clock);

        machine.advance().await.unwrap();
        machine.advance().await.unwrap();
        machine
            .submit_demographics(DemographicsForm { age: Some(30), ..Default::default() })
            .unwrap();
        let feedback = machine.choose(Amount::Ten).unwrap();

        assert_eq!(machine.session().trials()[0].decision_latency_ms, 0);
        assert_eq!(feedback.amount_kept, 0);
        assert_eq!(feedback.partner_received, 30);
    }

    #[test]
    fn test_new_machine_starts_on_welcome() {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 20, 9, 0, 0).unwrap();
        let machine = SurveyMachine::new(GameParameters::default(), MockSubmitter::new(), clock_reading(vec![t0]));

        assert_eq!(machine.screen(), Screen::Welcome);
        assert_eq!(machine.session().started_at(), t0);
        assert!(machine.latest_feedback().is_none());
        assert!(machine.submission().is_none());
    }
}
