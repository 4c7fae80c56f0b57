//! Line-oriented terminal front end for the survey machine

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use shared::{component_debug, component_info, Amount, Component};
use submission::Submitter;

use crate::core::{DemographicsForm, Screen, SurveyMachine};
use crate::error::SurveyResult;
use crate::render;
use crate::traits::{Clock, SessionView};

const RESTART_COMMAND: &str = "restart";

/// Reads answers from `input` and writes screens to `output` until the
/// participant finishes or the input ends.
pub struct TerminalDriver<R, W> {
    input: R,
    output: W,
}

impl<R, W> TerminalDriver<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Drive `machine` to the complete screen. End of input stops the
    /// session where it is; nothing is submitted for an unfinished session.
    pub async fn run<S, C>(&mut self, machine: &mut SurveyMachine<S, C>) -> SurveyResult<()>
    where
        S: Submitter,
        C: Clock,
    {
        loop {
            let screen = machine.screen();
            self.write(&render::render(&*machine)).await?;

            let step = match screen {
                Screen::Complete => return Ok(()),
                Screen::Welcome | Screen::Instructions | Screen::Feedback { .. } => {
                    self.continue_screen(machine).await?
                }
                Screen::Demographics => self.demographics_screen(machine).await?,
                Screen::Decision { .. } => self.decision_screen(machine).await?,
                Screen::FinalResults => self.final_screen(machine).await?,
            };

            if step == Step::Eof {
                component_info!(Component::Survey, screen = %machine.screen(), "Input closed, leaving survey");
                return Ok(());
            }
        }
    }

    async fn continue_screen<S, C>(&mut self, machine: &mut SurveyMachine<S, C>) -> SurveyResult<Step>
    where
        S: Submitter,
        C: Clock,
    {
        let Some(line) = self.prompt("> ").await? else {
            return Ok(Step::Eof);
        };
        // Nothing to discard before the participant has started
        if is_restart(&line) && machine.screen() != Screen::Welcome {
            return self.confirm_restart(machine).await;
        }
        machine.advance().await?;
        Ok(Step::Next)
    }

    async fn demographics_screen<S, C>(&mut self, machine: &mut SurveyMachine<S, C>) -> SurveyResult<Step>
    where
        S: Submitter,
        C: Clock,
    {
        let Some(age) = self.prompt("Age: ").await? else {
            return Ok(Step::Eof);
        };
        if is_restart(&age) {
            return self.confirm_restart(machine).await;
        }
        let Some(gender) = self.prompt("Gender (optional): ").await? else {
            return Ok(Step::Eof);
        };
        let Some(field) = self.prompt("Field of study (optional): ").await? else {
            return Ok(Step::Eof);
        };

        let form = DemographicsForm {
            age: DemographicsForm::parse_age(&age),
            gender: non_blank(gender),
            field_of_study: non_blank(field),
        };

        match machine.submit_demographics(form) {
            Ok(_) => Ok(Step::Next),
            Err(e) if e.is_validation() => {
                self.write(&format!("\n{e}\n\n")).await?;
                Ok(Step::Next)
            }
            Err(e) => Err(e),
        }
    }

    async fn decision_screen<S, C>(&mut self, machine: &mut SurveyMachine<S, C>) -> SurveyResult<Step>
    where
        S: Submitter,
        C: Clock,
    {
        loop {
            let Some(line) = self.prompt("Amount to send: ").await? else {
                return Ok(Step::Eof);
            };
            if is_restart(&line) {
                return self.confirm_restart(machine).await;
            }
            match parse_amount(&line) {
                Some(amount) => {
                    machine.choose(amount)?;
                    return Ok(Step::Next);
                }
                None => {
                    component_debug!(Component::Survey, input = %line.trim(), "Rejected amount");
                    self.write("Please enter 0, 5 or 10.\n").await?;
                }
            }
        }
    }

    async fn final_screen<S, C>(&mut self, machine: &mut SurveyMachine<S, C>) -> SurveyResult<Step>
    where
        S: Submitter,
        C: Clock,
    {
        let Some(line) = self.prompt("> ").await? else {
            return Ok(Step::Eof);
        };
        if is_restart(&line) {
            return self.confirm_restart(machine).await;
        }
        machine.finish()?;
        Ok(Step::Next)
    }

    async fn confirm_restart<S, C>(&mut self, machine: &mut SurveyMachine<S, C>) -> SurveyResult<Step>
    where
        S: Submitter,
        C: Clock,
    {
        let Some(answer) = self
            .prompt("Start over? All answers in this session will be discarded. [y/N] ")
            .await?
        else {
            return Ok(Step::Eof);
        };
        let confirmed = matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes");
        machine.restart(confirmed)?;
        Ok(Step::Next)
    }

    /// `None` at end of input
    async fn prompt(&mut self, text: &str) -> SurveyResult<Option<String>> {
        self.write(text).await?;
        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    async fn write(&mut self, text: &str) -> SurveyResult<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Next,
    Eof,
}

/// Accepts "5" or "$5"; anything outside 0, 5, 10 is rejected
pub fn parse_amount(input: &str) -> Option<Amount> {
    let digits = input.trim().trim_start_matches('$');
    let value: u32 = digits.parse().ok()?;
    Amount::try_from(value).ok()
}

fn is_restart(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case(RESTART_COMMAND)
}

fn non_blank(input: String) -> Option<String> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
