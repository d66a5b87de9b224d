use crate::popup::Popup;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Text},
    widgets::Widget,
};

static TEXT: &[&str] = &[
    "ARROWS, hjkl    Move between days",
    "ENTER           Show the selected day",
    "n, PAGE DOWN    Next month",
    "p, PAGE UP      Previous month",
    "0, HOME         Jump to this month",
    "g               Input month to jump to",
    "r               Reload this month",
    "?               Show this help",
    "q, ESC          Quit",
    "",
    "Press the Any Key to dismiss.",
];

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Help;

impl Widget for Help {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let text = TEXT.iter().map(|&s| Line::raw(s)).collect::<Text<'_>>();
        Popup::new("Commands", text).render(area, buf);
    }
}
