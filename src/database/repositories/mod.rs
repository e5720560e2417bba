pub mod attendance;
pub mod roster;

// Re-export all repositories for easy importing
pub use attendance::AttendanceRepository;
pub use roster::RosterRepository;
