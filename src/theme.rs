use crate::attendance::Status;
use ratatui::style::{Color, Modifier, Style};

pub(crate) const BASE_STYLE: Style = Style::new().fg(Color::White).bg(Color::Black);

pub(crate) const TITLE_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const WEEKDAY_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const PRESENT_STYLE: Style = Style::new().fg(Color::Black).bg(Color::LightGreen);

pub(crate) const PENDING_STYLE: Style = Style::new().fg(Color::Black).bg(Color::Yellow);

pub(crate) const REJECTED_STYLE: Style = Style::new()
    .fg(Color::Black)
    .bg(Color::Rgb(0xFF, 0x98, 0x00));

pub(crate) const ABSENT_STYLE: Style = Style::new().fg(Color::Black).bg(Color::LightRed);

pub(crate) const CHECKED_IN_STYLE: Style = PRESENT_STYLE;

pub(crate) const NO_CHECK_IN_STYLE: Style = BASE_STYLE;

pub(crate) const STATUS_LINE_STYLE: Style = BASE_STYLE.fg(Color::Gray);

pub(crate) const ERROR_LINE_STYLE: Style = BASE_STYLE.fg(Color::LightRed);

pub(crate) fn status_style(status: Status) -> Style {
    match status {
        Status::Present => PRESENT_STYLE,
        Status::Pending => PENDING_STYLE,
        Status::Rejected => REJECTED_STYLE,
        Status::Absent => ABSENT_STYLE,
    }
}

pub(crate) mod popup {
    use super::*;

    pub(crate) const LABEL_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

    pub(crate) const REJECTED_NOTICE_STYLE: Style = BASE_STYLE.fg(Color::LightRed);

    pub(crate) const PENDING_NOTICE_STYLE: Style = BASE_STYLE.fg(Color::Yellow);

    pub(crate) const HINT_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

    pub(crate) const FOCUSED_FIELD_STYLE: Style = BASE_STYLE.add_modifier(Modifier::UNDERLINED);
}

pub(crate) mod jumpto {
    use super::*;

    pub(crate) const UNFILLED_CELL_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

    pub(crate) const READY_ENTER_STYLE: Style = BASE_STYLE.add_modifier(Modifier::UNDERLINED);
}
