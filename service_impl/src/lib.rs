pub mod availability;
pub mod booking;
pub mod clock;
pub mod config;
pub mod lifecycle;
pub mod macros;
pub mod notification;
pub mod queue;
pub mod retry;
pub mod schedule;
pub mod suggestion;
pub mod time_grid;
pub mod uuid_service;
