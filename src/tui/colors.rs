//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::{Priority, ProjectStatus};
use crate::notice::Level;

/// Focused form fields and the table header.
pub const GOLD: Color = Color::Rgb(255, 215, 0);
/// Success notices and completed projects.
pub const DARK_GREEN: Color = Color::Rgb(0, 80, 0);
/// Confirm dialogs and error notices.
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
/// Rows marked for a bulk action.
pub const DARK_PURPLE: Color = Color::Rgb(86, 60, 92);

pub fn priority_color(priority: Option<Priority>) -> Color {
    match priority {
        Some(Priority::High) => Color::LightRed,
        Some(Priority::Medium) => Color::Yellow,
        Some(Priority::Low) => Color::Green,
        None => Color::DarkGray,
    }
}

pub fn status_color(status: ProjectStatus) -> Color {
    match status {
        ProjectStatus::Active => Color::Cyan,
        ProjectStatus::Completed => DARK_GREEN,
        ProjectStatus::OnHold => Color::Yellow,
        ProjectStatus::Archived => Color::DarkGray,
        ProjectStatus::NotStarted => Color::White,
    }
}

/// Status bar background for a notice.
pub fn notice_color(level: Level) -> Color {
    match level {
        Level::Success => DARK_GREEN,
        Level::Info => Color::Blue,
        Level::Error => DARK_RED,
    }
}
