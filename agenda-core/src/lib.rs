//! Core types for agenda.
//!
//! This crate provides everything below the terminal:
//! - `appointment` and `record` for the appointment model and its wire form
//! - `recurrence` for expanding recurring appointments into instances
//! - `window` for view windows and navigation
//! - `layout` for the day/week/month layout engine
//! - `session` for wiring a backend, the layout engine and notifications together

pub mod api;
pub mod appointment;
pub mod config;
pub mod error;
pub mod layout;
pub mod notifier;
pub mod record;
pub mod recurrence;
pub mod session;
pub mod time;
pub mod upcoming;
pub mod validate;
pub mod window;

pub use appointment::{Appointment, AppointmentId, AppointmentStatus, Frequency, Recurrence, User, UserId};
pub use error::{AgendaError, AgendaResult};
pub use layout::{LayoutBlock, LayoutEngine, MonthLayout, Placement, WeekOverflow, select_visible};
pub use recurrence::{expand_all, expand_recurrence};
pub use window::{Granularity, Navigator, ViewWindow};
