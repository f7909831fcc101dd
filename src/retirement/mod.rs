//! Age, retirement date and BUP status computations
//!
//! Everything here is a pure function of its inputs. The reference date is
//! always passed in so results are reproducible; callers use today's date.

mod age;
mod bup;

pub use age::{compute_age, age_label, add_years};
pub use bup::{
    BupStatus, ServiceStatus,
    retirement_age_for, compute_retirement_date, classify_bup_status, service_status,
};
