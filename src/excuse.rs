use crate::client::{ExcuseForm, MissingReason};
use crate::detail::day_title;
use crate::popup::Popup;
use crate::theme::{
    popup::{FOCUSED_FIELD_STYLE, HINT_STYLE, LABEL_STYLE},
    BASE_STYLE,
};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span, Text},
    widgets::Widget,
};
use time::Date;

const MAX_FIELD_CHARS: usize = 200;

/// Width of the visible tail of a field
const FIELD_WIDTH: usize = 40;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum Field {
    #[default]
    Reason,
    Note,
}

/// State of the form for excusing an absence on one day
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct ExcuseEditor {
    date: Date,
    reason: String,
    note: String,
    focus: Field,
}

impl ExcuseEditor {
    pub(crate) fn new(date: Date) -> ExcuseEditor {
        ExcuseEditor {
            date,
            reason: String::new(),
            note: String::new(),
            focus: Field::default(),
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            Field::Reason => &mut self.reason,
            Field::Note => &mut self.note,
        }
    }

    pub(crate) fn handle_input(&mut self, input: ExcuseInput) -> ExcuseOutput {
        match input {
            ExcuseInput::Insert(c) if !c.is_control() => {
                let field = self.focused_mut();
                if field.chars().count() >= MAX_FIELD_CHARS {
                    return ExcuseOutput::Invalid;
                }
                field.push(c);
                ExcuseOutput::Ok
            }
            ExcuseInput::Insert(_) => ExcuseOutput::Invalid,
            ExcuseInput::Backspace => match self.focused_mut().pop() {
                Some(_) => ExcuseOutput::Ok,
                None => ExcuseOutput::Invalid,
            },
            ExcuseInput::SwitchField => {
                self.focus = match self.focus {
                    Field::Reason => Field::Note,
                    Field::Note => Field::Reason,
                };
                ExcuseOutput::Ok
            }
            ExcuseInput::Submit => match ExcuseForm::new(self.date, &self.reason, &self.note) {
                Ok(form) => ExcuseOutput::Submit(form),
                Err(e) => {
                    self.focus = Field::Reason;
                    ExcuseOutput::Refused(e)
                }
            },
            ExcuseInput::Cancel => ExcuseOutput::Cancel,
        }
    }

    fn field_line(&self, label: &'static str, field: Field) -> Line<'static> {
        let value = match field {
            Field::Reason => &self.reason,
            Field::Note => &self.note,
        };
        let skip = value.chars().count().saturating_sub(FIELD_WIDTH - 1);
        let mut shown = value.chars().skip(skip).collect::<String>();
        let style = if self.focus == field {
            shown.push('_');
            FOCUSED_FIELD_STYLE
        } else {
            BASE_STYLE
        };
        Line::from_iter([
            Span::styled(label, LABEL_STYLE),
            Span::styled(format!("{shown:FIELD_WIDTH$}"), style),
        ])
    }

    fn to_text(&self) -> Text<'static> {
        Text::from_iter([
            self.field_line("Reason: ", Field::Reason),
            self.field_line("Note:   ", Field::Note),
            Line::raw(""),
            Line::styled("TAB switch field   ENTER submit   ESC cancel", HINT_STYLE),
        ])
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ExcuseInput {
    Insert(char),
    Backspace,
    SwitchField,
    Submit,
    Cancel,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum ExcuseOutput {
    Ok,
    Invalid,
    Cancel,
    Submit(ExcuseForm),
    Refused(MissingReason),
}

/// Popup showing an [`ExcuseEditor`]
#[derive(Clone, Copy, Debug)]
pub(crate) struct ExcusePopup<'a>(pub(crate) &'a ExcuseEditor);

impl Widget for ExcusePopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = format!("Excuse for {}", day_title(self.0.date));
        Popup::new(&title, self.0.to_text()).render(area, buf);
    }
}
