use crate::calendar::YearMonth;
use crate::theme::{
    jumpto::{READY_ENTER_STYLE, UNFILLED_CELL_STYLE},
    BASE_STYLE,
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Flex, Layout, Margin, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Clear, StatefulWidget, Widget},
};

const OUTER_WIDTH: u16 = 17;
const OUTER_HEIGHT: u16 = 8;
const YEAR_DIGITS: usize = 4;
const ENTER_POS: usize = 6;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct JumpTo;

impl StatefulWidget for JumpTo {
    type State = JumpToState;

    /*
     * .................
     * .┌─ Jump To… ──┐.
     * .│             │.
     * .│   YYYY-MM   │.
     * .│             │.
     * .│   [ENTER]   │.
     * .└─────────────┘.
     * .................
     */

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let [outer_area] = Layout::horizontal([OUTER_WIDTH])
            .flex(Flex::Center)
            .areas(area);
        let [outer_area] = Layout::vertical([OUTER_HEIGHT])
            .flex(Flex::Center)
            .areas(outer_area);
        Clear.render(outer_area, buf);
        Block::new().style(BASE_STYLE).render(outer_area, buf);
        let block_area = outer_area.inner(Margin::new(1, 1));
        Block::bordered()
            .title(" Jump To… ")
            .title_alignment(Alignment::Center)
            .render(block_area, buf);
        let text_area = block_area.inner(Margin::new(1, 1));
        state.to_text().render(text_area, buf);
    }
}

/// Digits typed so far for a `YYYY-MM` month
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct JumpToState {
    digits: [Option<u8>; ENTER_POS],
    pos: usize,
}

impl JumpToState {
    pub(crate) fn new() -> JumpToState {
        JumpToState::default()
    }

    fn to_text(self) -> Text<'static> {
        Text::from_iter([
            Line::styled("", BASE_STYLE),
            self.to_line(),
            Line::styled("", BASE_STYLE),
            // Style a span and convert it to a line rather than creating a
            // styled line directly so that only the "[ENTER]" text and not any
            // of its centering padding will be underlined:
            Line::from(Span::styled(
                "[ENTER]",
                if self.pos == ENTER_POS {
                    READY_ENTER_STYLE
                } else {
                    BASE_STYLE
                },
            )),
        ])
        .centered()
    }

    fn to_line(self) -> Line<'static> {
        let mut spans = Vec::with_capacity(ENTER_POS + 1);
        for (i, dg) in self.digits.iter().enumerate() {
            if i == YEAR_DIGITS {
                spans.push(Span::styled("-", BASE_STYLE));
            }
            spans.push(match dg {
                Some(d) => Span::styled(d.to_string(), BASE_STYLE),
                None if i < YEAR_DIGITS => Span::styled("Y", UNFILLED_CELL_STYLE),
                None => Span::styled("M", UNFILLED_CELL_STYLE),
            });
        }
        Line::from_iter(spans)
    }

    fn value(digits: &[Option<u8>]) -> u16 {
        digits
            .iter()
            .flatten()
            .fold(0, |acc, &d| acc * 10 + u16::from(d))
    }

    pub(crate) fn handle_input(&mut self, input: JumpToInput) -> JumpToOutput {
        match (input, self.pos) {
            (JumpToInput::Digit(d), 0..ENTER_POS) if d < 10 => {
                self.digits[self.pos] = Some(d);
                self.pos += 1;
                JumpToOutput::Ok
            }
            (JumpToInput::Backspace, 1..) => {
                self.pos -= 1;
                self.digits[self.pos] = None;
                JumpToOutput::Ok
            }
            (JumpToInput::Enter, ENTER_POS) => {
                let (year, month) = self.digits.split_at(YEAR_DIGITS);
                let year = i32::from(JumpToState::value(year));
                let month0 = u8::try_from(JumpToState::value(month))
                    .ok()
                    .and_then(|m| m.checked_sub(1));
                match month0.and_then(|m| YearMonth::from_zero_based(year, m).ok()) {
                    Some(ym) => JumpToOutput::Jump(ym),
                    None => JumpToOutput::Invalid,
                }
            }
            _ => JumpToOutput::Invalid,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum JumpToInput {
    Digit(u8),
    Backspace,
    Enter,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum JumpToOutput {
    Ok,
    Invalid,
    Jump(YearMonth),
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Month;

    fn type_digits(state: &mut JumpToState, digits: &[u8]) {
        for &d in digits {
            assert_eq!(state.handle_input(JumpToInput::Digit(d)), JumpToOutput::Ok);
        }
    }

    #[test]
    fn test_jump() {
        let mut state = JumpToState::new();
        type_digits(&mut state, &[2, 0, 2, 6, 0, 1]);
        assert_eq!(
            state.handle_input(JumpToInput::Enter),
            JumpToOutput::Jump(YearMonth::new(2026, Month::January).unwrap())
        );
    }

    #[test]
    fn test_enter_before_complete() {
        let mut state = JumpToState::new();
        type_digits(&mut state, &[2, 0, 2, 6, 0]);
        assert_eq!(state.handle_input(JumpToInput::Enter), JumpToOutput::Invalid);
    }

    #[test]
    fn test_bad_month() {
        let mut state = JumpToState::new();
        type_digits(&mut state, &[2, 0, 2, 6, 1, 3]);
        assert_eq!(state.handle_input(JumpToInput::Enter), JumpToOutput::Invalid);
        let mut state = JumpToState::new();
        type_digits(&mut state, &[2, 0, 2, 6, 0, 0]);
        assert_eq!(state.handle_input(JumpToInput::Enter), JumpToOutput::Invalid);
    }

    #[test]
    fn test_backspace() {
        let mut state = JumpToState::new();
        assert_eq!(
            state.handle_input(JumpToInput::Backspace),
            JumpToOutput::Invalid
        );
        type_digits(&mut state, &[2, 0, 2, 6, 1, 3]);
        assert_eq!(state.handle_input(JumpToInput::Digit(1)), JumpToOutput::Invalid);
        assert_eq!(state.handle_input(JumpToInput::Backspace), JumpToOutput::Ok);
        type_digits(&mut state, &[2]);
        assert_eq!(
            state.handle_input(JumpToInput::Enter),
            JumpToOutput::Jump(YearMonth::new(2026, Month::December).unwrap())
        );
    }

    #[test]
    fn test_render() {
        let mut state = JumpToState::new();
        type_digits(&mut state, &[2, 0, 2]);
        let area = Rect::new(0, 0, 17, 8);
        let mut buf = Buffer::empty(area);
        JumpTo.render(area, &mut buf, &mut state);
        let line = (0..17).map(|x| buf[(x, 3)].symbol()).collect::<String>();
        assert_eq!(line, " │   202Y-MM   │ ");
    }
}
