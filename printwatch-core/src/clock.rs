use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

const DISPLAY: &[BorrowedFormatItem<'static>] =
    format_description!("[day]/[month]/[year] [hour]:[minute]:[second]");
const FILE: &[BorrowedFormatItem<'static>] = format_description!("[year][month][day]_[hour][minute][second]");

/// Local time when the offset can be determined, UTC otherwise.
pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// `dd/mm/YYYY HH:MM:SS`, as shown in the dashboard.
pub fn display_stamp() -> String {
    format_display(now())
}

/// `YYYYmmdd_HHMMSS`, for export file names.
pub fn file_stamp() -> String {
    now().format(FILE).unwrap_or_default()
}

pub fn format_display(at: OffsetDateTime) -> String {
    at.format(DISPLAY).unwrap_or_default()
}
