pub mod checkin;
pub mod export;
pub mod import;
pub mod reconcile;
pub mod report;

pub use checkin::CheckInService;
pub use report::{ExportFile, ReportService};
