//! Brush command history and job dispatch (§4.F "Plan/Reservation/Job core").

mod history;
mod job;

pub use history::{Command, PlanHistory};
pub use job::acquire_job;
