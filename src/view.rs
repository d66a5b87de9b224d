use crate::attendance::{AttendanceMap, ClassAttendance};
use crate::calendar::{class_grid, student_grid, CalendarCell, ClassDay, DayCell, MonthGrid, YearMonth};
use crate::client::{AttendanceApi, ClientError, ExcuseForm};
use crate::detail::DayDetails;

/// A month grid along with the error, if any, that kept its attendance from
/// being fetched
#[derive(Debug)]
pub(crate) struct Loaded<C> {
    pub(crate) grid: MonthGrid<C>,
    pub(crate) error: Option<ClientError>,
}

/// Whose attendance the calendar shows
pub(crate) trait AttendanceView {
    type Cell: DayCell + DayDetails;

    /// Fetches and lays out a month.  If the backend cannot be reached or
    /// answers with an error, every day is shown without attendance instead.
    fn load(&self, month: YearMonth) -> Loaded<Self::Cell>;

    fn submit_excuse(&self, form: &ExcuseForm) -> Result<(), ClientError>;
}

/// The logged-in student's own attendance
#[derive(Clone, Debug)]
pub(crate) struct StudentView<A>(A);

impl<A: AttendanceApi> StudentView<A> {
    pub(crate) fn new(api: A) -> Self {
        StudentView(api)
    }
}

impl<A: AttendanceApi> AttendanceView for StudentView<A> {
    type Cell = CalendarCell;

    fn load(&self, month: YearMonth) -> Loaded<CalendarCell> {
        match self.0.student_attendance(month) {
            Ok(attendance) => {
                tracing::debug!(%month, records = attendance.len(), "Loaded student attendance");
                Loaded {
                    grid: student_grid(month, &attendance),
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(%month, error = %e, "Attendance unavailable; showing month as absent");
                Loaded {
                    grid: student_grid(month, &AttendanceMap::new()),
                    error: Some(e),
                }
            }
        }
    }

    fn submit_excuse(&self, form: &ExcuseForm) -> Result<(), ClientError> {
        self.0.submit_excuse(form)
    }
}

/// The check-ins of the logged-in teacher's class
#[derive(Clone, Debug)]
pub(crate) struct ClassView<A>(A);

impl<A: AttendanceApi> ClassView<A> {
    pub(crate) fn new(api: A) -> Self {
        ClassView(api)
    }
}

impl<A: AttendanceApi> AttendanceView for ClassView<A> {
    type Cell = ClassDay;

    fn load(&self, month: YearMonth) -> Loaded<ClassDay> {
        match self.0.class_attendance(month) {
            Ok(attendance) => Loaded {
                grid: class_grid(month, &attendance),
                error: None,
            },
            Err(e) => {
                tracing::warn!(%month, error = %e, "Class attendance unavailable; showing empty month");
                Loaded {
                    grid: class_grid(month, &ClassAttendance::new()),
                    error: Some(e),
                }
            }
        }
    }

    fn submit_excuse(&self, _form: &ExcuseForm) -> Result<(), ClientError> {
        Err(ClientError::NotAStudent)
    }
}
