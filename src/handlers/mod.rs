pub mod admin;
pub mod checkin;
pub mod health;
pub mod shared;
