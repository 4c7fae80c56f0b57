//! Scripted runs of the terminal driver against a real offline pipeline

mod common;

use std::path::Path;
use tempfile::TempDir;

use common::{ManualClock, TestFixtures};
use shared::GameParameters;
use submission::{OutcomeState, SubmissionConfig, SubmissionPipeline};
use survey::{Screen, SessionView, SurveyMachine, TerminalDriver};

fn offline_machine(data_dir: &Path) -> SurveyMachine<SubmissionPipeline, ManualClock> {
    let config = SubmissionConfig::default().with_data_dir(data_dir).offline(true);
    let pipeline = SubmissionPipeline::from_config(&config);
    SurveyMachine::new(GameParameters::default(), pipeline, ManualClock::new(TestFixtures::start()))
}

async fn drive(
    machine: &mut SurveyMachine<SubmissionPipeline, ManualClock>,
    script: &str,
) -> String {
    let mut driver = TerminalDriver::new(script.as_bytes(), Vec::new());
    driver.run(machine).await.unwrap();
    String::from_utf8(driver.into_output()).unwrap()
}

#[tokio::test]
async fn test_scripted_session_lands_on_disk() {
    let temp = TempDir::new().unwrap();
    let mut machine = offline_machine(temp.path());

    let script = [
        "",          // welcome
        "",          // instructions
        "16", "", "", // rejected demographics
        "25", "", "Economics",
        "7", "0", "", // invalid amount, then round 1
        "5", "",
        "$10", "",
        "5", "",
        "0", "",     // last feedback moves to the results
        "",          // finish
    ]
    .join("\n")
        + "\n";

    let output = drive(&mut machine, &script).await;

    assert_eq!(machine.screen(), Screen::Complete);
    assert!(output.contains("You must be at least 18 years old to participate."));
    assert!(output.contains("Please enter 0, 5 or 10."));
    assert!(output.contains("Total earnings:      $54"));
    assert!(output.contains("Low Trust"));
    assert!(output.contains("saved on this device"));
    assert!(output.contains("Thank you for participating."));

    let outcome = machine.submission().unwrap();
    assert_eq!(outcome.state, OutcomeState::Degraded);

    let key = format!("trust_game_data_{}.json", machine.session().participant_id());
    let stored = std::fs::read_to_string(temp.path().join(key)).unwrap();
    assert!(stored.contains("\"csvData\""));
    assert_eq!(machine.session().demographics().unwrap().field_of_study, "Economics");
}

#[tokio::test]
async fn test_end_of_input_leaves_session_unsubmitted() {
    let temp = TempDir::new().unwrap();
    let mut machine = offline_machine(temp.path());

    drive(&mut machine, "\n\n25\n\n\n5\n").await;

    assert_eq!(machine.screen(), Screen::Feedback { round: 1 });
    assert_eq!(machine.session().trials().len(), 1);
    assert!(machine.submission().is_none());
    assert!(!temp.path().join(format!("trust_game_data_{}.json", machine.session().participant_id())).exists());
}

#[tokio::test]
async fn test_restart_prompt() {
    let temp = TempDir::new().unwrap();
    let mut machine = offline_machine(temp.path());
    let original = machine.session().participant_id().clone();

    let output = drive(&mut machine, "\nrestart\nn\n").await;
    assert_eq!(machine.screen(), Screen::Instructions);
    assert_eq!(machine.session().participant_id(), &original);
    assert!(output.contains("[y/N]"));

    drive(&mut machine, "restart\nyes\n").await;
    assert_eq!(machine.screen(), Screen::Welcome);
    assert_ne!(machine.session().participant_id(), &original);
}
