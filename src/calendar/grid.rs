use super::month::{WeekdayExt, YearMonth, DAYS_IN_WEEK};
use crate::attendance::{
    Approval, AttendanceMap, AttendanceRecord, ClassAttendance, DayKey, Status, StudentEntry,
};
use crate::theme;
use ratatui::style::Style;

/// Something that can occupy a non-blank slot of a [`MonthGrid`]
pub(crate) trait DayCell {
    /// Day of the month, starting at 1
    fn day(&self) -> u8;

    fn style(&self) -> Style;

    /// Labels and styles explaining the colors that `style()` returns
    fn legend() -> &'static [(&'static str, Style)];
}

static STUDENT_LEGEND: &[(&str, Style)] = &[
    ("Present", theme::PRESENT_STYLE),
    ("Pending", theme::PENDING_STYLE),
    ("Rejected", theme::REJECTED_STYLE),
    ("Absent", theme::ABSENT_STYLE),
];

static CLASS_LEGEND: &[(&str, Style)] = &[("Attendance recorded", theme::CHECKED_IN_STYLE)];

/// A student's day as shown on the calendar
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct CalendarCell {
    pub(crate) day: u8,
    /// 1-based
    pub(crate) month: u8,
    pub(crate) status: Status,
    pub(crate) time: String,
    pub(crate) teacher_approval: Option<Approval>,
    pub(crate) teacher_comment: String,
}

impl CalendarCell {
    fn new(day: u8, month: u8, record: &AttendanceRecord) -> CalendarCell {
        CalendarCell {
            day,
            month,
            status: record.display_status(),
            time: record.time.clone(),
            teacher_approval: record.teacher_approval,
            teacher_comment: record.teacher_comment.clone(),
        }
    }
}

impl DayCell for CalendarCell {
    fn day(&self) -> u8 {
        self.day
    }

    fn style(&self) -> Style {
        theme::status_style(self.status)
    }

    fn legend() -> &'static [(&'static str, Style)] {
        STUDENT_LEGEND
    }
}

/// A day of a teacher's class calendar
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct ClassDay {
    pub(crate) day: u8,
    pub(crate) month: u8,
    /// Whether the server sent an entry for this day, even an empty one
    pub(crate) recorded: bool,
    pub(crate) students: Vec<StudentEntry>,
}

impl ClassDay {
    pub(crate) fn has_attendance(&self) -> bool {
        self.recorded
    }
}

impl DayCell for ClassDay {
    fn day(&self) -> u8 {
        self.day
    }

    fn style(&self) -> Style {
        if self.has_attendance() {
            theme::CHECKED_IN_STYLE
        } else {
            theme::NO_CHECK_IN_STYLE
        }
    }

    fn legend() -> &'static [(&'static str, Style)] {
        CLASS_LEGEND
    }
}

/// The days of one month laid out in complete Sunday-first weeks.
///
/// Invariants: `cells.len()` is a multiple of 7; the leading `None`s number
/// the weekday index of the 1st; the `Some`s are days 1 through the end of
/// the month in order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct MonthGrid<C> {
    month: YearMonth,
    cells: Vec<Option<C>>,
}

impl<C> MonthGrid<C> {
    pub(crate) fn build<F>(month: YearMonth, mut make_day: F) -> MonthGrid<C>
    where
        F: FnMut(u8) -> C,
    {
        let leading = month.first_weekday().index0();
        let days = month.days();
        let total = (leading + usize::from(days)).div_ceil(DAYS_IN_WEEK) * DAYS_IN_WEEK;
        let mut cells = Vec::with_capacity(total);
        cells.resize_with(leading, || None);
        cells.extend((1..=days).map(|day| Some(make_day(day))));
        cells.resize_with(total, || None);
        MonthGrid { month, cells }
    }

    pub(crate) fn month(&self) -> YearMonth {
        self.month
    }

    pub(crate) fn cells(&self) -> &[Option<C>] {
        &self.cells
    }

    pub(crate) fn weeks(&self) -> std::slice::ChunksExact<'_, Option<C>> {
        self.cells.chunks_exact(DAYS_IN_WEEK)
    }

    pub(crate) fn week_count(&self) -> usize {
        self.cells().len() / DAYS_IN_WEEK
    }

    pub(crate) fn leading_blanks(&self) -> usize {
        self.cells.iter().take_while(|c| c.is_none()).count()
    }

    pub(crate) fn get(&self, day: u8) -> Option<&C> {
        let index = self.index_of(day)?;
        self.cells.get(index).and_then(Option::as_ref)
    }

    /// Position of the given day in the grid
    pub(crate) fn index_of(&self, day: u8) -> Option<usize> {
        (1..=self.month.days())
            .contains(&day)
            .then(|| self.leading_blanks() + usize::from(day) - 1)
    }
}

/// Lays out a student's month, resolving each day's display status from its
/// attendance record.  Days without a record are absent.
pub(crate) fn student_grid(month: YearMonth, attendance: &AttendanceMap) -> MonthGrid<CalendarCell> {
    let absent = AttendanceRecord::default();
    MonthGrid::build(month, |day| {
        let record = attendance.get(DayKey::new(month, day)).unwrap_or(&absent);
        CalendarCell::new(day, month.number(), record)
    })
}

pub(crate) fn class_grid(month: YearMonth, attendance: &ClassAttendance) -> MonthGrid<ClassDay> {
    MonthGrid::build(month, |day| {
        let students = attendance.get(DayKey::new(month, day));
        ClassDay {
            day,
            month: month.number(),
            recorded: students.is_some(),
            students: students.map(<[StudentEntry]>::to_vec).unwrap_or_default(),
        }
    })
}
