//! Text derived from a [`PreferenceSnapshot`].
//!
//! Both builders are pure: identical snapshots give byte-identical text.

use std::fmt::Write;

use mystery_types::preferences::PreferenceSnapshot;

/// Opening user prompt.
///
/// Clauses are appended in a fixed order (theme, player count, accomplice,
/// script type, additional details), each only when its field is present,
/// and the whole is terminated by a period.
pub fn initial_prompt(prefs: &PreferenceSnapshot) -> String {
    let mut text = String::from("Let's create a murder mystery");
    if let Some(theme) = prefs.theme() {
        let _ = write!(text, " with a {} theme", theme);
    }
    if let Some(count) = prefs.player_count() {
        let _ = write!(text, " for {} players", count);
    }
    if let Some(accomplice) = prefs.has_accomplice {
        text.push_str(if accomplice {
            ", including an accomplice"
        } else {
            ", without an accomplice"
        });
    }
    if let Some(script) = prefs.script_type {
        let _ = write!(text, " with {} scripts", script);
    }
    if let Some(details) = prefs.additional_details() {
        let _ = write!(text, ". Additional details: {}", details);
    }
    text.push('.');
    text
}

/// Reminder sent alongside every model call so the model does not ask
/// about preferences the user already gave.
pub fn system_instruction(prefs: &PreferenceSnapshot) -> String {
    let mut text = String::from(
        "This is a murder mystery creation conversation. \
         Here are the user's confirmed preferences that you should remember and not ask about again: ",
    );
    if let Some(theme) = prefs.theme() {
        let _ = write!(text, "Theme: {}. ", theme);
    }
    if let Some(count) = prefs.player_count() {
        let _ = write!(text, "Player count: {}. ", count);
    }
    if let Some(accomplice) = prefs.has_accomplice {
        let _ = write!(text, "Accomplice: {}. ", if accomplice { "Yes" } else { "No" });
    }
    if let Some(script) = prefs.script_type {
        let _ = write!(text, "Script type: {}. ", script);
    }
    text.push_str(
        "Please remember these details throughout our conversation and don't ask about them again.",
    );
    text
}
