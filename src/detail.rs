use crate::attendance::Status;
use crate::calendar::{CalendarCell, ClassDay};
use crate::popup::Popup;
use crate::theme::{
    popup::{HINT_STYLE, LABEL_STYLE, PENDING_NOTICE_STYLE, REJECTED_NOTICE_STYLE},
    status_style, BASE_STYLE,
};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span, Text},
    widgets::Widget,
};
use time::Date;

/// What a calendar day has to say when it is selected and opened
pub(crate) trait DayDetails {
    fn detail_lines(&self) -> Vec<Line<'static>>;

    /// Whether an absence excuse may be filed for this day
    fn excusable(&self) -> bool;
}

fn field(label: &'static str, value: String, style: Style) -> Line<'static> {
    Line::from_iter([Span::styled(label, LABEL_STYLE), Span::styled(value, style)])
}

impl DayDetails for CalendarCell {
    fn detail_lines(&self) -> Vec<Line<'static>> {
        let mut lines = vec![
            field("Status: ", self.status.label().to_owned(), status_style(self.status)),
            if self.time.is_empty() {
                field("Checked in: ", String::from("not checked in"), BASE_STYLE)
            } else {
                field("Checked in: ", self.time.clone(), BASE_STYLE)
            },
        ];
        match self.status {
            Status::Rejected => {
                lines.push(Line::raw(""));
                lines.push(Line::styled(
                    "Your excuse was rejected by your teacher.",
                    REJECTED_NOTICE_STYLE,
                ));
                if !self.teacher_comment.is_empty() {
                    lines.push(field("Reason: ", self.teacher_comment.clone(), BASE_STYLE));
                }
                lines.push(Line::raw(
                    "You may submit a new excuse with a different reason.",
                ));
            }
            Status::Pending => {
                lines.push(Line::raw(""));
                lines.push(Line::styled(
                    "Your excuse is waiting for teacher review.",
                    PENDING_NOTICE_STYLE,
                ));
            }
            Status::Present | Status::Absent => (),
        }
        lines.push(Line::raw(""));
        if self.excusable() {
            lines.push(Line::styled("Press e to submit an excuse.", HINT_STYLE));
        }
        lines.push(Line::styled("Press any other key to close.", HINT_STYLE));
        lines
    }

    fn excusable(&self) -> bool {
        self.status.excusable()
    }
}

impl DayDetails for ClassDay {
    fn detail_lines(&self) -> Vec<Line<'static>> {
        let mut lines = if !self.students.is_empty() {
            self.students
                .iter()
                .map(|s| {
                    let state = if s.status == Status::Present {
                        "Checked in"
                    } else {
                        "Absent"
                    };
                    let text = match s.check_in_time.as_deref().filter(|t| !t.is_empty()) {
                        Some(t) => format!("{} - {state} ({t})", s.name()),
                        None => format!("{} - {state}", s.name()),
                    };
                    Line::styled(text, status_style(s.status))
                })
                .collect()
        } else {
            vec![Line::raw("No attendance recorded for this day.")]
        };
        lines.push(Line::raw(""));
        lines.push(Line::styled("Press any key to close.", HINT_STYLE));
        lines
    }

    fn excusable(&self) -> bool {
        false
    }
}

/// Long-form heading for a day, e.g. "Thursday, July 3, 2025"
pub(crate) fn day_title(date: Date) -> String {
    format!(
        "{}, {} {}, {}",
        date.weekday(),
        date.month(),
        date.day(),
        date.year()
    )
}

/// Popup describing the selected day
#[derive(Clone, Debug)]
pub(crate) struct DayDetail<'a, C> {
    date: Date,
    cell: &'a C,
}

impl<'a, C: DayDetails> DayDetail<'a, C> {
    pub(crate) fn new(date: Date, cell: &'a C) -> Self {
        DayDetail { date, cell }
    }
}

impl<C: DayDetails> Widget for DayDetail<'_, C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let text = Text::from(self.cell.detail_lines());
        Popup::new(&day_title(self.date), text).render(area, buf);
    }
}
