use chrono::{DateTime, FixedOffset, Utc};
use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::database::models::AttendanceEntry;

pub const SHEET_NAME: &str = "Checked In Teams";
pub const CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const HEADERS: [(&str, f64); 5] = [
    ("S.No", 6.0),
    ("Team ID", 14.0),
    ("Team Name", 32.0),
    ("Check-in Time", 24.0),
    ("Status", 10.0),
];

/// `19 Oct 2026, 02:05 PM` in the given offset.
pub fn format_check_in_time(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset)
        .format("%d %b %Y, %I:%M %p")
        .to_string()
}

pub fn export_filename(now: DateTime<Utc>, offset: FixedOffset) -> String {
    format!(
        "Checked_In_Teams_{}.xlsx",
        now.with_timezone(&offset).format("%Y-%m-%d")
    )
}

/// Render attendance entries into a single-sheet workbook, one row per entry in
/// the order given.
pub fn attendance_workbook(
    entries: &[AttendanceEntry],
    offset: FixedOffset,
) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, (title, width)) in HEADERS.iter().enumerate() {
        let col = col as u16;
        worksheet.write_string_with_format(0, col, *title, &header_format)?;
        worksheet.set_column_width(col, *width)?;
    }

    for (index, entry) in entries.iter().enumerate() {
        let row = index as u32 + 1;
        worksheet.write_number(row, 0, (index + 1) as f64)?;
        worksheet.write_string(row, 1, entry.team_id.as_str())?;
        worksheet.write_string(row, 2, entry.team_name.as_str())?;
        worksheet.write_string(row, 3, format_check_in_time(entry.check_in_time, offset))?;
        worksheet.write_string(row, 4, entry.status.as_str())?;
    }

    workbook.save_to_buffer()
}
