//! Personnel records and roster loading

mod data;
pub mod loader;

pub use data::{Personnel, parse_record_date, parse_amount, ACTIVE_CHILD_STATUS};
pub use loader::{load_personnel, load_personnel_from_reader};
