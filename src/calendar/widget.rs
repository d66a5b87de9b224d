use super::grid::{DayCell, MonthGrid};
use crate::theme::{BASE_STYLE, TITLE_STYLE, WEEKDAY_STYLE};
use ratatui::{layout::Flex, prelude::*, widgets::*};

static HEADER: &str = " Su     Mo     Tu     We     Th     Fr     Sa ";

/// Width of the calendar in columns
pub(crate) const MAIN_WIDTH: u16 = 46;

/// Number of lines above the first week: title, legend, a blank line, and
/// the weekday header with its rule
pub(crate) const HEADER_LINES: u16 = 5;

const TITLE_LINE: u16 = 0;

const LEGEND_LINE: u16 = 1;

const WEEKDAY_LINE: u16 = 3;

/// Number of lines taken up by each week of the calendar
pub(crate) const WEEK_LINES: u16 = 2;

/// Number of columns per day of week
pub(crate) const DAY_WIDTH: u16 = 7;

const ACS_HLINE: char = '─';

const LEGEND_SWATCH: &str = "  ";

const LEGEND_GAP: &str = "   ";

/// A month of attendance laid out as a Sunday-first grid
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Calendar<'a, C> {
    grid: &'a MonthGrid<C>,
    selected: Option<u8>,
    today: Option<u8>,
}

impl<'a, C> Calendar<'a, C> {
    pub(crate) fn new(grid: &'a MonthGrid<C>) -> Calendar<'a, C> {
        Calendar {
            grid,
            selected: None,
            today: None,
        }
    }

    /// Bracket the given day
    pub(crate) fn selected(mut self, day: Option<u8>) -> Self {
        self.selected = day;
        self
    }

    /// Underline the given day
    pub(crate) fn today(mut self, day: Option<u8>) -> Self {
        self.today = day;
        self
    }

    /// Number of lines needed to draw every week of the month
    pub(crate) fn height(&self) -> u16 {
        let weeks = u16::try_from(self.grid.week_count()).unwrap_or(u16::MAX);
        HEADER_LINES.saturating_add(weeks.saturating_mul(WEEK_LINES))
    }
}

impl<C: DayCell> Widget for Calendar<'_, C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [area] = Layout::horizontal([MAIN_WIDTH.min(area.width)])
            .flex(Flex::Center)
            .areas(area);
        let mut canvas = BufferCanvas::new(area, buf);
        canvas.draw_title(&self.grid.month().to_string());
        canvas.draw_legend(C::legend());
        canvas.draw_header();
        for (i, week) in std::iter::zip(0u16.., self.grid.weeks()) {
            for (wd, cell) in std::iter::zip(0u16.., week) {
                let Some(cell) = cell else {
                    continue;
                };
                let day = cell.day();
                let text = if self.selected == Some(day) {
                    format!("[{day:2}]")
                } else {
                    format!(" {day:2} ")
                };
                let mut style = cell.style();
                if self.today == Some(day) {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                canvas.draw_day(i, wd, text, style);
            }
        }
    }
}

#[derive(Debug, Eq, PartialEq)]
struct BufferCanvas<'a> {
    area: Rect,
    buf: &'a mut Buffer,
}

impl<'a> BufferCanvas<'a> {
    fn new(area: Rect, buf: &'a mut Buffer) -> Self {
        Self { area, buf }
    }

    fn draw_title(&mut self, title: &str) {
        self.centered(TITLE_LINE, Line::styled(title.to_owned(), TITLE_STYLE));
    }

    fn draw_legend(&mut self, legend: &[(&'static str, Style)]) {
        let mut spans = Vec::with_capacity(legend.len() * 3);
        for (i, &(label, style)) in legend.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(LEGEND_GAP, BASE_STYLE));
            }
            spans.push(Span::styled(LEGEND_SWATCH, style));
            spans.push(Span::styled(format!(" {label}"), BASE_STYLE));
        }
        self.centered(LEGEND_LINE, Line::from(spans));
    }

    fn draw_header(&mut self) {
        self.mvprint(WEEKDAY_LINE, 0, HEADER, Some(WEEKDAY_STYLE));
        self.hline(WEEKDAY_LINE + 1, 0, ACS_HLINE, MAIN_WIDTH);
    }

    fn draw_day(&mut self, week_no: u16, weekday: u16, s: String, style: Style) {
        self.mvprint(
            week_no * WEEK_LINES + HEADER_LINES,
            DAY_WIDTH * weekday,
            s,
            Some(style),
        );
    }

    fn centered(&mut self, y: u16, line: Line<'static>) {
        if y < self.area.height {
            line.centered().render(
                Rect {
                    x: self.area.x,
                    y: self.area.y + y,
                    width: self.area.width,
                    height: 1,
                },
                self.buf,
            );
        }
    }

    fn mvprint<S: AsRef<str>>(&mut self, y: u16, x: u16, s: S, style: Option<Style>) {
        if y < self.area.height && x < self.area.width {
            let text = Text::styled(s.as_ref(), style.unwrap_or_default());
            let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
            // A Paragraph truncates text running past the right edge, but the
            // Rect it is given must lie entirely within the buffer.
            Paragraph::new(text).render(
                Rect {
                    x: x + self.area.x,
                    y: y + self.area.y,
                    width: (self.area.width - x).min(width),
                    height: 1,
                },
                self.buf,
            );
        }
    }

    fn hline(&mut self, y: u16, x: u16, ch: char, length: u16) {
        self.mvprint(y, x, String::from(ch).repeat(length.into()), None);
    }
}
