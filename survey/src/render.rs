//! Plain-text views of each screen for the terminal driver

use std::fmt::Write;

use shared::payoff::{MULTIPLIER, RoundFeedback};
use shared::{Amount, Session};
use submission::{OutcomeState, SubmissionDetail, SubmissionOutcome};

use crate::core::Screen;
use crate::traits::SessionView;

const RULE: &str = "────────────────────────────────────────────";

/// Text for the screen the view is currently on
pub fn render(view: &impl SessionView) -> String {
    match view.screen() {
        Screen::Welcome => welcome(),
        Screen::Instructions => instructions(view),
        Screen::Demographics => demographics(),
        Screen::Decision { round } => decision(view, round),
        Screen::Feedback { .. } => match view.latest_feedback() {
            Some(feedback) => feedback_text(feedback, view.params().total_rounds()),
            None => String::new(),
        },
        Screen::FinalResults => final_results(view.session(), view.submission()),
        Screen::Complete => "Thank you for participating. You may close this window.\n".to_string(),
    }
}

fn welcome() -> String {
    format!(
        "{RULE}\n  Welcome to the Investment Decision Study\n{RULE}\n\
         You will make a short series of decisions about sending money\n\
         to a partner. There are no right or wrong answers.\n\n\
         Press Enter to continue.\n"
    )
}

fn instructions(view: &impl SessionView) -> String {
    let params = view.params();
    format!(
        "{RULE}\n  Instructions\n{RULE}\n\
         In each of {rounds} rounds you receive ${endowment}.\n\
         You may send $0, $5 or $10 of it to your partner.\n\
         Whatever you send is multiplied by {MULTIPLIER} before your partner receives it.\n\
         Your partner then decides how much to send back to you.\n\
         Your earnings for a round are what you kept plus what was returned.\n\n\
         Press Enter to continue.\n",
        rounds = params.total_rounds(),
        endowment = params.endowment(),
    )
}

fn demographics() -> String {
    format!(
        "{RULE}\n  About you\n{RULE}\n\
         Age is required (18 or older). Other questions may be left blank.\n"
    )
}

fn decision(view: &impl SessionView, round: u32) -> String {
    let params = view.params();
    let options: Vec<String> = Amount::ALL.iter().map(|a| a.to_string()).collect();
    format!(
        "{RULE}\n  Round {round} of {total}\n{RULE}\n\
         You have ${endowment}. How much do you send to your partner?\n\
         Options: {options}\n",
        total = params.total_rounds(),
        endowment = params.endowment(),
        options = options.join(", "),
    )
}

pub fn feedback_text(feedback: &RoundFeedback, total_rounds: u32) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}\n  Round {} results\n{RULE}", feedback.round_index);
    let _ = writeln!(out, "You sent:              ${}", feedback.amount_sent);
    let _ = writeln!(out, "You kept:              ${}", feedback.amount_kept);
    let _ = writeln!(out, "Your partner received: ${}", feedback.partner_received);
    let _ = writeln!(out, "Your partner returned: ${}", feedback.amount_returned);
    let _ = writeln!(out, "Round earnings:        ${}", feedback.round_earnings);
    let _ = writeln!(out, "Total so far:          ${}", feedback.running_total);
    if feedback.round_index < total_rounds {
        let _ = writeln!(out, "\nPress Enter for the next round.");
    } else {
        let _ = writeln!(out, "\nPress Enter to see your final results.");
    }
    out
}

fn final_results(session: &Session, submission: Option<&SubmissionOutcome>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}\n  Final results\n{RULE}");
    let _ = writeln!(out, "Participant: {}", session.participant_id());
    let _ = writeln!(out, "{:<7}{:>6}{:>10}{:>10}", "Round", "Sent", "Returned", "Earned");
    for trial in session.trials() {
        let _ = writeln!(
            out,
            "{:<7}{:>6}{:>10}{:>10}",
            trial.round_index,
            format!("${}", trial.amount_sent.dollars()),
            format!("${}", trial.amount_returned),
            format!("${}", trial.final_earnings)
        );
    }
    if let Some(summary) = session.summary() {
        let _ = writeln!(out, "\nTotal earnings:      ${}", summary.total_earnings);
        let _ = writeln!(out, "Average amount sent: ${:.2}", summary.average_amount_sent);
        let _ = writeln!(out, "Trust profile:       {}", summary.trust_category);
    }
    if let Some(outcome) = submission {
        let _ = writeln!(out);
        out.push_str(&submission_guidance(outcome));
    }
    let _ = writeln!(out, "\nPress Enter to finish, or type 'restart' to begin again.");
    out
}

/// Next steps for the participant, by outcome state
pub fn submission_guidance(outcome: &SubmissionOutcome) -> String {
    let mut out = String::new();
    match (&outcome.state, &outcome.detail) {
        (OutcomeState::Success, SubmissionDetail::Remote { receipt }) => {
            let _ = write!(out, "✅ Your responses were saved");
            if let Some(reference) = &receipt.reference {
                let _ = write!(out, " (reference {reference})");
            }
            let _ = writeln!(out, ".");
        }
        (_, SubmissionDetail::Local { receipt, csv_filename, csv_data, .. }) => {
            if outcome.state == OutcomeState::Degraded {
                let _ = writeln!(out, "⚠️  We could not reach the study server. Your responses were saved on this device.");
                let _ = writeln!(out, "Storage key: {}", receipt.storage_key);
                for file in &receipt.files {
                    let _ = writeln!(out, "Saved file:  {}", file.display());
                }
                if !receipt.files.is_empty() {
                    let _ = writeln!(out, "Please send the saved files to the research team.");
                }
            } else {
                let _ = writeln!(out, "❌ Your responses could not be saved automatically.");
            }
            let _ = writeln!(
                out,
                "Please copy everything between the lines below into a file named {csv_filename} and send it to the research team."
            );
            let _ = writeln!(out, "{RULE}\n{}{RULE}", csv_data);
        }
        (_, SubmissionDetail::Remote { .. }) => {
            let _ = writeln!(out, "Your responses were sent via {}.", outcome.transport_used);
        }
    }
    out
}
