mod grid;
mod month;
mod widget;
pub(crate) use self::grid::{class_grid, student_grid, CalendarCell, ClassDay, DayCell, MonthGrid};
pub(crate) use self::month::YearMonth;
pub(crate) use self::widget::Calendar;
