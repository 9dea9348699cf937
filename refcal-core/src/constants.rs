/// Cells in a month view: six weeks of seven days.
pub const GRID_CELLS: usize = 42;

/// Years on each side of the requested year returned by a window read.
pub const WINDOW_RADIUS: i32 = 1;

/// Format of `CalendarDay::date` and of dates echoed back to clients.
pub const MIDNIGHT_FORMAT: &str = "%Y-%m-%dT00:00:00";

pub const AVAILABILITY_FILE: &str = "availability.json";
pub const USERS_FILE: &str = "users.json";
