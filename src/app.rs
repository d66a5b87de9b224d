use crate::calendar::{Calendar, MonthGrid, YearMonth};
use crate::client::ClientError;
use crate::detail::{DayDetail, DayDetails};
use crate::excuse::{ExcuseEditor, ExcuseInput, ExcuseOutput, ExcusePopup};
use crate::help::Help;
use crate::jumpto::{JumpTo, JumpToInput, JumpToOutput, JumpToState};
use crate::theme::{BASE_STYLE, ERROR_LINE_STYLE, STATUS_LINE_STYLE};
use crate::view::AttendanceView;
use crossterm::event::{read, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    backend::Backend,
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    text::Line,
    widgets::{StatefulWidget, Widget},
    Terminal,
};
use std::io::{self, Write};
use time::Date;

const WEEK: i16 = 7;

#[derive(Debug)]
pub(crate) struct App<V: AttendanceView> {
    view: V,
    today: Date,
    grid: MonthGrid<V::Cell>,
    /// Day of the month under the cursor
    selected: u8,
    state: AppState,
    status: Option<StatusLine>,
}

impl<V: AttendanceView> App<V> {
    /// Loads `month` and puts the cursor on today if it falls within it, or
    /// on the 1st otherwise
    pub(crate) fn new(view: V, today: Date, month: YearMonth) -> App<V> {
        let loaded = view.load(month);
        let mut app = App {
            view,
            today,
            grid: loaded.grid,
            selected: 1,
            state: AppState::Calendar,
            status: None,
        };
        app.report_load_error(loaded.error);
        if month.contains(today) {
            app.selected = today.day();
        }
        app
    }

    pub(crate) fn run<B: Backend>(mut self, mut terminal: Terminal<B>) -> io::Result<()> {
        while !self.quitting() {
            self.draw(&mut terminal)?;
            self.handle_input()?;
        }
        Ok(())
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        terminal.draw(|frame| frame.render_widget(self, frame.area()))?;
        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        let normal_modifiers = KeyModifiers::NONE | KeyModifiers::SHIFT;
        if let Some(KeyEvent {
            code, modifiers, ..
        }) = read()?.as_key_press_event()
        {
            if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
                self.state = AppState::Quitting;
            } else if !normal_modifiers.contains(modifiers) || !self.handle_key(code) {
                self.beep()?;
            }
        }
        // else: Redraw on resize, and we might as well redraw on other stuff
        // too
        Ok(())
    }

    // Returns `false` if the user pressed an invalid key
    fn handle_key(&mut self, key: KeyCode) -> bool {
        match &mut self.state {
            AppState::Calendar => match key {
                KeyCode::Char('h') | KeyCode::Left => self.move_cursor(-1),
                KeyCode::Char('l') | KeyCode::Right => self.move_cursor(1),
                KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-WEEK),
                KeyCode::Char('j') | KeyCode::Down => self.move_cursor(WEEK),
                KeyCode::Char('n') | KeyCode::PageDown => self.next_month(),
                KeyCode::Char('p') | KeyCode::PageUp => self.previous_month(),
                KeyCode::Char('0') | KeyCode::Home => {
                    self.reset();
                    true
                }
                KeyCode::Char('g') => {
                    self.state = AppState::Jumping(JumpToState::new());
                    true
                }
                KeyCode::Char('r') => {
                    self.show_month(self.grid.month());
                    true
                }
                KeyCode::Enter => {
                    self.state = AppState::Detail;
                    true
                }
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.state = AppState::Quitting;
                    true
                }
                KeyCode::Char('?') => {
                    self.state = AppState::Helping;
                    true
                }
                _ => false,
            },
            AppState::Helping => {
                self.state = AppState::Calendar;
                true
            }
            AppState::Detail => {
                match (key, self.selected_date()) {
                    (KeyCode::Char('e'), Some(date)) if self.selected_excusable() => {
                        self.state = AppState::Excusing(ExcuseEditor::new(date));
                    }
                    _ => self.state = AppState::Calendar,
                }
                true
            }
            AppState::Excusing(editor) => {
                let output = match key {
                    KeyCode::Char(c) => editor.handle_input(ExcuseInput::Insert(c)),
                    KeyCode::Backspace => editor.handle_input(ExcuseInput::Backspace),
                    KeyCode::Tab | KeyCode::BackTab => {
                        editor.handle_input(ExcuseInput::SwitchField)
                    }
                    KeyCode::Enter => editor.handle_input(ExcuseInput::Submit),
                    KeyCode::Esc => editor.handle_input(ExcuseInput::Cancel),
                    _ => ExcuseOutput::Invalid,
                };
                match output {
                    ExcuseOutput::Ok => true,
                    ExcuseOutput::Invalid => false,
                    ExcuseOutput::Cancel => {
                        self.state = AppState::Calendar;
                        true
                    }
                    ExcuseOutput::Refused(e) => {
                        self.status = Some(StatusLine::Error(e.to_string()));
                        false
                    }
                    ExcuseOutput::Submit(form) => match self.view.submit_excuse(&form) {
                        Ok(()) => {
                            tracing::info!(date = form.date(), "Excuse submitted");
                            self.state = AppState::Calendar;
                            self.show_month(self.grid.month());
                            if self.status.is_none() {
                                self.status = Some(StatusLine::Info(String::from(
                                    "Excuse submitted; waiting for teacher review",
                                )));
                            }
                            true
                        }
                        Err(e) => {
                            tracing::warn!(date = form.date(), error = %e, "Excuse submission failed");
                            self.status = Some(StatusLine::Error(format!(
                                "Could not submit excuse: {e}"
                            )));
                            false
                        }
                    },
                }
            }
            AppState::Jumping(state) => {
                if matches!(key, KeyCode::Char('q' | 'g') | KeyCode::Esc) {
                    self.state = AppState::Calendar;
                    true
                } else {
                    let output = match key {
                        KeyCode::Char(c @ '0'..='9') => {
                            let d = c.to_digit(10).and_then(|d| u8::try_from(d).ok());
                            d.map_or(JumpToOutput::Invalid, |d| {
                                state.handle_input(JumpToInput::Digit(d))
                            })
                        }
                        KeyCode::Backspace | KeyCode::Delete => {
                            state.handle_input(JumpToInput::Backspace)
                        }
                        KeyCode::Enter => state.handle_input(JumpToInput::Enter),
                        _ => JumpToOutput::Invalid,
                    };
                    match output {
                        JumpToOutput::Ok => true,
                        JumpToOutput::Invalid => false,
                        JumpToOutput::Jump(month) => {
                            self.state = AppState::Calendar;
                            self.show_month(month);
                            true
                        }
                    }
                }
            }
            AppState::Quitting => false,
        }
    }

    fn beep(&self) -> io::Result<()> {
        io::stdout().write_all(b"\x07")
    }

    fn quitting(&self) -> bool {
        self.state == AppState::Quitting
    }

    fn selected_date(&self) -> Option<Date> {
        self.grid.month().date(self.selected)
    }

    fn selected_excusable(&self) -> bool {
        self.grid
            .get(self.selected)
            .is_some_and(DayDetails::excusable)
    }

    fn move_cursor(&mut self, delta: i16) -> bool {
        let target = i16::from(self.selected) + delta;
        match u8::try_from(target) {
            Ok(day) if (1..=self.grid.month().days()).contains(&day) => {
                self.selected = day;
                true
            }
            _ => false,
        }
    }

    fn next_month(&mut self) -> bool {
        match self.grid.month().next() {
            Ok(month) => {
                self.show_month(month);
                true
            }
            Err(_) => false,
        }
    }

    fn previous_month(&mut self) -> bool {
        match self.grid.month().previous() {
            Ok(month) => {
                self.show_month(month);
                true
            }
            Err(_) => false,
        }
    }

    fn reset(&mut self) {
        self.show_month(YearMonth::containing(self.today));
        self.selected = self.today.day();
    }

    /// Fetches and displays `month`, keeping the cursor on the same day
    /// number where the month is long enough
    fn show_month(&mut self, month: YearMonth) {
        let loaded = self.view.load(month);
        self.grid = loaded.grid;
        self.selected = self.selected.min(month.days());
        self.status = None;
        self.report_load_error(loaded.error);
    }

    fn report_load_error(&mut self, error: Option<ClientError>) {
        if let Some(e) = error {
            self.status = Some(StatusLine::Error(format!(
                "Could not load attendance: {e}"
            )));
        }
    }
}

impl<V: AttendanceView> Widget for &mut App<V> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, BASE_STYLE);
        let [main_area, status_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area);
        let month = self.grid.month();
        let cal = Calendar::new(&self.grid)
            .selected(Some(self.selected))
            .today(month.contains(self.today).then_some(self.today.day()));
        let [cal_area] = Layout::vertical([cal.height()])
            .flex(Flex::Center)
            .areas(main_area);
        cal.render(cal_area, buf);
        if let Some(status) = &self.status {
            status.to_line().render(status_area, buf);
        }
        match &mut self.state {
            AppState::Helping => Help.render(area, buf),
            AppState::Jumping(state) => JumpTo.render(area, buf, state),
            AppState::Detail => {
                if let (Some(date), Some(cell)) =
                    (month.date(self.selected), self.grid.get(self.selected))
                {
                    DayDetail::new(date, cell).render(area, buf);
                }
            }
            AppState::Excusing(editor) => ExcusePopup(editor).render(area, buf),
            AppState::Calendar | AppState::Quitting => (),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum AppState {
    Calendar,
    Helping,
    Jumping(JumpToState),
    Detail,
    Excusing(ExcuseEditor),
    Quitting,
}

/// Message shown on the bottom line until the next month is displayed
#[derive(Clone, Debug, Eq, PartialEq)]
enum StatusLine {
    Info(String),
    Error(String),
}

impl StatusLine {
    fn to_line(&self) -> Line<'_> {
        match self {
            StatusLine::Info(msg) => Line::styled(msg.as_str(), STATUS_LINE_STYLE),
            StatusLine::Error(msg) => Line::styled(msg.as_str(), ERROR_LINE_STYLE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::{AttendanceRecord, Status};
    use crate::view::testing::FakeApi;
    use crate::view::{ClassView, StudentView};
    use ratatui::backend::TestBackend;
    use time::{macros::date, Month};

    fn ym(year: i32, month: Month) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    fn absent() -> AttendanceRecord {
        AttendanceRecord::default()
    }

    fn present(time: &str) -> AttendanceRecord {
        AttendanceRecord {
            status: Status::Present,
            time: time.to_owned(),
            ..AttendanceRecord::default()
        }
    }

    fn rows<V: AttendanceView>(app: &mut App<V>) -> Vec<String> {
        let area = Rect::new(0, 0, 80, 24);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect()
    }

    fn type_keys<V: AttendanceView>(app: &mut App<V>, s: &str) {
        for c in s.chars() {
            assert!(app.handle_key(KeyCode::Char(c)), "key {c:?} was refused");
        }
    }

    #[test]
    fn test_starts_on_today() {
        let api = FakeApi::new().with_student_day(ym(2025, Month::July), 3, present("07:45"));
        let app = App::new(
            StudentView::new(&api),
            date!(2025 - 07 - 16),
            ym(2025, Month::July),
        );
        assert_eq!(app.selected, 16);
        assert_eq!(app.status, None);
        assert_eq!(app.grid.get(3).unwrap().status, Status::Present);
    }

    #[test]
    fn test_starts_on_first_of_other_month() {
        let api = FakeApi::new().with_student_day(ym(2025, Month::March), 3, absent());
        let app = App::new(
            StudentView::new(&api),
            date!(2025 - 07 - 16),
            ym(2025, Month::March),
        );
        assert_eq!(app.selected, 1);
    }

    #[test]
    fn test_across_year() {
        let api = FakeApi::new()
            .with_student_day(ym(2025, Month::December), 1, absent())
            .with_student_day(ym(2026, Month::January), 1, absent());
        let mut app = App::new(
            StudentView::new(&api),
            date!(2025 - 12 - 31),
            ym(2025, Month::December),
        );
        assert!(app.handle_key(KeyCode::Char('n')));
        assert_eq!(app.grid.month(), ym(2026, Month::January));
        assert_eq!(app.status, None);
        assert!(app.handle_key(KeyCode::PageUp));
        assert_eq!(app.grid.month(), ym(2025, Month::December));
        assert_eq!(
            *api.fetches.borrow(),
            [
                ym(2025, Month::December),
                ym(2026, Month::January),
                ym(2025, Month::December)
            ]
        );
    }

    #[test]
    fn test_selection_clamped_to_shorter_month() {
        let api = FakeApi::new()
            .with_student_day(ym(2025, Month::January), 1, absent())
            .with_student_day(ym(2025, Month::February), 1, absent());
        let mut app = App::new(
            StudentView::new(&api),
            date!(2025 - 01 - 31),
            ym(2025, Month::January),
        );
        assert!(app.handle_key(KeyCode::Char('n')));
        assert_eq!(app.grid.month(), ym(2025, Month::February));
        assert_eq!(app.selected, 28);
    }

    #[test]
    fn test_cursor_stays_in_month() {
        let api = FakeApi::new().with_student_day(ym(2025, Month::July), 1, absent());
        let mut app = App::new(
            StudentView::new(&api),
            date!(2025 - 07 - 01),
            ym(2025, Month::July),
        );
        assert!(!app.handle_key(KeyCode::Left));
        assert!(!app.handle_key(KeyCode::Char('k')));
        assert!(app.handle_key(KeyCode::Char('j')));
        assert_eq!(app.selected, 8);
        assert!(app.handle_key(KeyCode::Right));
        assert_eq!(app.selected, 9);
        for _ in 0..3 {
            assert!(app.handle_key(KeyCode::Down));
        }
        assert_eq!(app.selected, 30);
        assert!(!app.handle_key(KeyCode::Down));
        assert_eq!(app.selected, 30);
    }

    #[test]
    fn test_reset_to_today() {
        let api = FakeApi::new()
            .with_student_day(ym(2025, Month::July), 1, absent())
            .with_student_day(ym(2025, Month::September), 1, absent());
        let mut app = App::new(
            StudentView::new(&api),
            date!(2025 - 07 - 16),
            ym(2025, Month::September),
        );
        assert!(app.handle_key(KeyCode::Home));
        assert_eq!(app.grid.month(), ym(2025, Month::July));
        assert_eq!(app.selected, 16);
    }

    #[test]
    fn test_jump_to_month() {
        let api = FakeApi::new()
            .with_student_day(ym(2025, Month::July), 1, absent())
            .with_student_day(ym(2024, Month::February), 1, absent());
        let mut app = App::new(
            StudentView::new(&api),
            date!(2025 - 07 - 31),
            ym(2025, Month::July),
        );
        assert!(app.handle_key(KeyCode::Char('g')));
        type_keys(&mut app, "202402");
        assert!(app.handle_key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Calendar);
        assert_eq!(app.grid.month(), ym(2024, Month::February));
        assert_eq!(app.selected, 29);
    }

    #[test]
    fn test_unavailable_month_shows_error() {
        let api = FakeApi::new().with_student_day(ym(2025, Month::July), 1, absent());
        let mut app = App::new(
            StudentView::new(&api),
            date!(2025 - 07 - 16),
            ym(2025, Month::July),
        );
        assert!(app.handle_key(KeyCode::Char('p')));
        assert_eq!(app.grid.month(), ym(2025, Month::June));
        assert!(matches!(app.status, Some(StatusLine::Error(ref msg)) if msg.contains("backend is down")));
        assert!(app
            .grid
            .cells()
            .iter()
            .flatten()
            .all(|c| c.status == Status::Absent));
        assert!(rows(&mut app)[23].contains("Could not load attendance"));
        assert!(app.handle_key(KeyCode::Char('n')));
        assert_eq!(app.status, None);
    }

    #[test]
    fn test_reload() {
        let api = FakeApi::new().with_student_day(ym(2025, Month::July), 1, absent());
        let mut app = App::new(
            StudentView::new(&api),
            date!(2025 - 07 - 16),
            ym(2025, Month::July),
        );
        assert!(app.handle_key(KeyCode::Char('r')));
        assert_eq!(api.fetches.borrow().len(), 2);
        assert_eq!(app.selected, 16);
    }

    #[test]
    fn test_submit_excuse() {
        let api = FakeApi::new().with_student_day(ym(2025, Month::July), 2, absent());
        let mut app = App::new(
            StudentView::new(&api),
            date!(2025 - 07 - 02),
            ym(2025, Month::July),
        );
        assert!(app.handle_key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Detail);
        assert!(app.handle_key(KeyCode::Char('e')));
        assert!(matches!(app.state, AppState::Excusing(_)));
        type_keys(&mut app, "Fever");
        assert!(app.handle_key(KeyCode::Tab));
        type_keys(&mut app, "Back tomorrow");
        assert!(app.handle_key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Calendar);
        let excuses = api.excuses.borrow();
        assert_eq!(excuses.len(), 1);
        assert_eq!(excuses[0].date(), "2025-7-2");
        assert_eq!(
            app.status,
            Some(StatusLine::Info(String::from(
                "Excuse submitted; waiting for teacher review"
            )))
        );
        assert_eq!(api.fetches.borrow().len(), 2);
    }

    #[test]
    fn test_empty_reason_refused() {
        let api = FakeApi::new().with_student_day(ym(2025, Month::July), 2, absent());
        let mut app = App::new(
            StudentView::new(&api),
            date!(2025 - 07 - 02),
            ym(2025, Month::July),
        );
        app.handle_key(KeyCode::Enter);
        app.handle_key(KeyCode::Char('e'));
        type_keys(&mut app, "  ");
        assert!(!app.handle_key(KeyCode::Enter));
        assert!(matches!(app.state, AppState::Excusing(_)));
        assert!(matches!(app.status, Some(StatusLine::Error(_))));
        assert!(api.excuses.borrow().is_empty());
        assert!(app.handle_key(KeyCode::Esc));
        assert_eq!(app.state, AppState::Calendar);
    }

    #[test]
    fn test_server_refuses_excuse() {
        let mut api = FakeApi::new().with_student_day(ym(2025, Month::July), 2, absent());
        api.reject_excuses = true;
        let mut app = App::new(
            StudentView::new(&api),
            date!(2025 - 07 - 02),
            ym(2025, Month::July),
        );
        app.handle_key(KeyCode::Enter);
        app.handle_key(KeyCode::Char('e'));
        type_keys(&mut app, "Fever");
        assert!(!app.handle_key(KeyCode::Enter));
        assert!(matches!(app.state, AppState::Excusing(_)));
        assert!(matches!(app.status, Some(StatusLine::Error(ref msg)) if msg.contains("Excuse already submitted")));
    }

    #[test]
    fn test_present_day_not_excusable() {
        let api = FakeApi::new().with_student_day(ym(2025, Month::July), 2, present("07:40"));
        let mut app = App::new(
            StudentView::new(&api),
            date!(2025 - 07 - 02),
            ym(2025, Month::July),
        );
        app.handle_key(KeyCode::Enter);
        assert!(app.handle_key(KeyCode::Char('e')));
        assert_eq!(app.state, AppState::Calendar);
    }

    #[test]
    fn test_class_detail() {
        let api = FakeApi::new().with_class_day(ym(2025, Month::July), 7, &["Tran An"]);
        let mut app = App::new(
            ClassView::new(&api),
            date!(2025 - 07 - 07),
            ym(2025, Month::July),
        );
        assert!(app.handle_key(KeyCode::Enter));
        let screen = rows(&mut app);
        assert!(screen.iter().any(|r| r.contains("Monday, July 7, 2025")));
        assert!(screen.iter().any(|r| r.contains("Tran An - Checked in (07:30)")));
        assert!(app.handle_key(KeyCode::Char('e')));
        assert_eq!(app.state, AppState::Calendar);
    }

    #[test]
    fn test_render() {
        let api = FakeApi::new().with_student_day(ym(2025, Month::July), 1, present("07:30"));
        let mut app = App::new(
            StudentView::new(&api),
            date!(2025 - 07 - 16),
            ym(2025, Month::July),
        );
        let screen = rows(&mut app);
        let title = screen
            .iter()
            .position(|r| r.trim() == "July 2025")
            .expect("title should be drawn");
        assert!(screen[title + 3].contains("Su     Mo     Tu"));
        assert!(screen.iter().any(|r| r.contains("[16]")));
        assert_eq!(screen[23].trim(), "");
    }

    #[test]
    fn test_help() {
        let api = FakeApi::new().with_student_day(ym(2025, Month::July), 1, absent());
        let mut app = App::new(
            StudentView::new(&api),
            date!(2025 - 07 - 16),
            ym(2025, Month::July),
        );
        assert!(app.handle_key(KeyCode::Char('?')));
        assert!(rows(&mut app).iter().any(|r| r.contains(" Commands ")));
        assert!(app.handle_key(KeyCode::Char('x')));
        assert_eq!(app.state, AppState::Calendar);
    }

    #[test]
    fn test_draw_to_terminal() {
        let api = FakeApi::new().with_student_day(ym(2025, Month::July), 1, present("07:30"));
        let mut app = App::new(
            StudentView::new(&api),
            date!(2025 - 07 - 16),
            ym(2025, Month::July),
        );
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        app.draw(&mut terminal).unwrap();
        let buffer = terminal.backend().buffer();
        assert!((0..24u16).any(|y| {
            (0..80u16)
                .map(|x| buffer[(x, y)].symbol())
                .collect::<String>()
                .contains("[16]")
        }));
    }
}
