//! Intervention decision rendering
//!
//! This module maps a chosen action plus the alternative list into the
//! presentation payload a client surface applies: overlay text, action
//! buttons, an optional styling hint, and an optional countdown. Stateless
//! and purely derived from its inputs.

use crate::types::{Alternative, CtaButton, InterventionAction, InterventionDecision};

/// Lockout countdown duration in seconds
const LOCKOUT_COUNTDOWN_SEC: u32 = 300;

/// Risk index above which the overlay text carries an index suffix
const RISK_SUFFIX_THRESHOLD: u32 = 70;

struct Template {
    overlay_text: &'static str,
    buttons: &'static [(&'static str, &'static str)],
    styling_hint: Option<&'static str>,
    countdown_sec: Option<u32>,
}

fn template(action: InterventionAction) -> Template {
    match action {
        InterventionAction::Blur => Template {
            overlay_text: "High-Risk Content Detected ⚠️",
            buttons: &[
                ("Show Alternatives", "show_alternatives"),
                ("Reveal Content", "reveal"),
            ],
            styling_hint: Some("filter: blur(8px); pointer-events: none; user-select: none;"),
            countdown_sec: None,
        },
        InterventionAction::Nudge => Template {
            overlay_text: "Consider a productive alternative 💡",
            buttons: &[("Show Alternatives", "show_alternatives")],
            styling_hint: None,
            countdown_sec: None,
        },
        InterventionAction::Replace => Template {
            overlay_text: "Content Replaced with Alternatives 🎯",
            buttons: &[("View Alternatives", "show_alternatives")],
            styling_hint: Some("display: none;"),
            countdown_sec: None,
        },
        InterventionAction::Lockout => Template {
            overlay_text: "Take a mindful break 🧘",
            buttons: &[("Set Timer", "set_timer")],
            styling_hint: Some("filter: grayscale(100%) blur(4px); opacity: 0.5; pointer-events: none;"),
            countdown_sec: Some(LOCKOUT_COUNTDOWN_SEC),
        },
        InterventionAction::None => Template {
            overlay_text: "",
            buttons: &[],
            styling_hint: None,
            countdown_sec: None,
        },
    }
}

/// Renderer mapping actions to presentation payloads
pub struct DecisionRenderer;

impl DecisionRenderer {
    /// Render the presentation payload for one decision.
    ///
    /// Templates are English-only for now; `locale` is accepted for API
    /// stability and ignored.
    pub fn render(
        action: InterventionAction,
        alternatives: &[Alternative],
        risk_index: u32,
        _locale: &str,
    ) -> InterventionDecision {
        let template = template(action);

        let overlay_text = customize_overlay_text(template.overlay_text, action, risk_index);

        let cta_buttons = template
            .buttons
            .iter()
            .map(|&(label, action_key)| {
                // Surface the alternative count on the alternatives button
                let label = if action_key == "show_alternatives" && !alternatives.is_empty() {
                    format!("View {} Alternatives", alternatives.len())
                } else {
                    label.to_string()
                };
                CtaButton {
                    label,
                    action_key: action_key.to_string(),
                }
            })
            .collect();

        InterventionDecision {
            action,
            overlay_text,
            cta_buttons,
            styling_hint: template.styling_hint.map(str::to_string),
            countdown_sec: template.countdown_sec,
            alternatives_count: alternatives.len(),
            risk_index,
        }
    }
}

fn customize_overlay_text(base: &str, action: InterventionAction, risk_index: u32) -> String {
    if base.is_empty() {
        return String::new();
    }

    let suffixed = matches!(
        action,
        InterventionAction::Blur | InterventionAction::Replace | InterventionAction::Lockout
    ) && risk_index > RISK_SUFFIX_THRESHOLD;

    if suffixed {
        format!("{} (Risk: {}/100)", base, risk_index)
    } else {
        base.to_string()
    }
}
