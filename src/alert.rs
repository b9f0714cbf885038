//! Alert system for displaying success and error messages to users.
//!
//! Alerts are rendered into the `#alert-container` element via an htmx
//! out-of-band swap so mutation endpoints can report failures without
//! replacing the page.

use maud::{Markup, Render, html};

/// Alert message types for styling
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlertType {
    Success,
    Error,
}

/// Renders alert messages with appropriate styling
pub struct AlertTemplate<'a> {
    pub alert_type: AlertType,
    pub message: &'a str,
    pub details: &'a str,
}

impl<'a> AlertTemplate<'a> {
    /// Create a new success alert
    pub fn success(message: &'a str, details: &'a str) -> Self {
        Self {
            alert_type: AlertType::Success,
            message,
            details,
        }
    }

    /// Create a new error alert
    pub fn error(message: &'a str, details: &'a str) -> Self {
        Self {
            alert_type: AlertType::Error,
            message,
            details,
        }
    }
}

impl Render for AlertTemplate<'_> {
    fn render(&self) -> Markup {
        let container_style = match self.alert_type {
            AlertType::Success => {
                "p-4 mb-4 rounded-lg border border-green-300 bg-green-50 \
                text-green-800 dark:bg-gray-800 dark:text-green-400"
            }
            AlertType::Error => {
                "p-4 mb-4 rounded-lg border border-red-300 bg-red-50 \
                text-red-800 dark:bg-gray-800 dark:text-red-400"
            }
        };

        html! {
            div id="alert-container" hx-swap-oob="innerHTML"
            {
                div class=(container_style) role="alert"
                {
                    p class="font-medium" { (self.message) }

                    @if !self.details.is_empty() {
                        p class="text-sm" { (self.details) }
                    }

                    button
                        type="button"
                        class="mt-2 text-sm underline cursor-pointer"
                        onclick="this.closest('#alert-container').classList.add('hidden')"
                    {
                        "Dismiss"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod alert_tests {
    use maud::Render;

    use super::AlertTemplate;

    #[test]
    fn error_alert_contains_message_and_details() {
        let alert = AlertTemplate::error("Could not update transaction", "Try again.");

        let markup = alert.render().into_string();

        assert!(markup.contains("Could not update transaction"));
        assert!(markup.contains("Try again."));
        assert!(markup.contains("alert-container"));
    }

    #[test]
    fn details_are_omitted_when_empty() {
        let alert = AlertTemplate::success("Saved", "");

        let markup = alert.render().into_string();

        assert!(markup.contains("Saved"));
        assert_eq!(markup.matches("<p").count(), 1);
    }
}
