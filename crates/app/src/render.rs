//! Plain-text rendering of the client state.

use std::fmt::Write as _;

use quiz_core::model::{AdminListing, HistoryItem};
use services::AppState;
use services::state::{PracticePhase, PracticeState, StatsState, View};

pub fn render(state: &AppState) -> String {
    let mut out = String::new();
    let Some(user) = state.session().user() else {
        if let Some(message) = state.auth_message() {
            let _ = writeln!(out, "! {message}");
        }
        out.push_str("Not logged in. Use 'login <user> <password>' or 'signup <user> <password>'.\n");
        return out;
    };

    let role = if user.is_admin() { " (admin)" } else { "" };
    let _ = writeln!(out, "== {} == {}{}", state.active_view(), user.username(), role);

    match state.active_view() {
        View::Quiz => {
            render_practice(&mut out, state.practice());
            render_mastery(&mut out, state.stats());
        }
        View::History => {
            render_mastery(&mut out, state.stats());
            render_history(&mut out, state.stats());
        }
        View::Admin => render_admin(&mut out, state.admin().listing(), state.admin().error()),
    }
    out
}

fn render_practice(out: &mut String, practice: &PracticeState) {
    let skill = practice
        .skill()
        .map_or_else(|| "-".to_string(), |skill| format!("{}%", skill.percent()));
    let _ = writeln!(
        out,
        "Attempts: {}  Drift events: {}  Skill: {skill}",
        practice.attempts(),
        practice.drift_events()
    );

    match practice.phase() {
        PracticePhase::Idle => out.push_str("No question loaded. Use 'refresh' to load one.\n"),
        PracticePhase::Fetching => out.push_str("Loading question...\n"),
        PracticePhase::Presented | PracticePhase::Submitting | PracticePhase::Feedback => {}
    }

    if let Some(question) = practice.question() {
        let _ = writeln!(
            out,
            "\n[{} / {}] {}",
            question.topic(),
            question.difficulty(),
            question.text()
        );
        if !practice.answer().is_empty() {
            let _ = writeln!(out, "Your answer: {}", practice.answer());
        }
        if practice.phase() == PracticePhase::Submitting {
            out.push_str("Scoring...\n");
        }
    }

    if let Some(feedback) = practice.feedback() {
        let verdict = if feedback.correct() { "Correct!" } else { "Incorrect." };
        let _ = writeln!(out, "\n{verdict} {}", feedback.explanation());
        if feedback.drift_alert() {
            out.push_str("*** Skill drift detected: difficulty is being re-adjusted ***\n");
        }
        out.push_str("Type 'next' for the next question.\n");
    }

    if let Some(error) = practice.error() {
        let _ = writeln!(out, "! {error}");
    }
}

fn render_mastery(out: &mut String, stats: &StatsState) {
    out.push_str("\nTopic mastery:\n");
    if stats.mastery().is_empty() {
        out.push_str("  (no attempts yet)\n");
    }
    for entry in stats.mastery().iter() {
        let _ = writeln!(
            out,
            "  {:<20} {:>3}%  ({} attempts)",
            entry.topic(),
            entry.percent(),
            entry.attempts()
        );
    }
    if let Some(error) = stats.mastery_error() {
        let _ = writeln!(out, "! {error}");
    }
}

fn render_history(out: &mut String, stats: &StatsState) {
    out.push_str("\nHistory:\n");
    if stats.history().is_empty() {
        out.push_str("  (nothing yet)\n");
    }
    for item in stats.history() {
        render_history_item(out, item);
    }
    if let Some(error) = stats.history_error() {
        let _ = writeln!(out, "! {error}");
    }
}

fn render_history_item(out: &mut String, item: &HistoryItem) {
    let mark = if item.correct { "+" } else { "-" };
    let topic = item.topic.as_deref().unwrap_or("(deleted question)");
    let difficulty = item
        .difficulty
        .map_or_else(String::new, |difficulty| format!(" / {difficulty}"));
    let _ = writeln!(
        out,
        "  {mark} {} [{topic}{difficulty}] {}",
        item.created_at.format("%Y-%m-%d %H:%M"),
        item.question.as_deref().unwrap_or_default()
    );
    let time = item
        .time_taken_seconds
        .map_or_else(String::new, |secs| format!(" in {secs}s"));
    let _ = writeln!(out, "      answered '{}'{time}", item.user_answer);
    if let Some(explanation) = item.explanation.as_deref() {
        let _ = writeln!(out, "      {explanation}");
    }
}

fn render_admin(out: &mut String, listing: Option<&AdminListing>, error: Option<&str>) {
    match listing {
        None => out.push_str("Loading records...\n"),
        Some(listing) => {
            let _ = writeln!(out, "\nQuestions ({}):", listing.questions.len());
            for q in &listing.questions {
                let _ = writeln!(
                    out,
                    "  #{} [{} / {}] {} => {}",
                    q.id, q.topic, q.difficulty, q.text, q.correct
                );
            }
            let _ = writeln!(out, "\nNotes ({}):", listing.notes.len());
            for note in &listing.notes {
                let topic = note.topic.as_deref().unwrap_or("-");
                let file = note.file_url.as_deref().unwrap_or("");
                let _ = writeln!(out, "  #{} {} [{topic}] {file}", note.id, note.title);
            }
            let _ = writeln!(out, "\nUsers ({}):", listing.users.len());
            for user in &listing.users {
                let role = if user.is_admin { "admin" } else { "user" };
                let _ = writeln!(out, "  #{} {} ({role})", user.id, user.username);
            }
        }
    }
    if let Some(error) = error {
        let _ = writeln!(out, "! {error}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{AccessToken, UserId, UserProfile};

    #[test]
    fn anonymous_state_prompts_for_login() {
        let text = render(&AppState::default());
        assert!(text.contains("Not logged in"));
    }

    #[test]
    fn signed_in_state_shows_counters() {
        let mut state = AppState::default();
        state.sign_in(
            AccessToken::new("t").unwrap(),
            UserProfile::new(UserId::new(1), "ana", false),
        );
        let text = render(&state);
        assert!(text.contains("== quiz == ana"));
        assert!(text.contains("Attempts: 0  Drift events: 0"));
    }
}
