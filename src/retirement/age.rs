//! Whole-year age arithmetic

use chrono::{Datelike, Months, NaiveDate};

/// Complete years elapsed between `birth` and `as_of`.
///
/// The year difference is reduced by one when the birthday (month, then day)
/// has not yet been reached in `as_of`'s year. A missing birth date is age 0.
pub fn compute_age(birth: Option<NaiveDate>, as_of: NaiveDate) -> i32 {
    let Some(birth) = birth else {
        return 0;
    };

    let mut age = as_of.year() - birth.year();
    if (as_of.month(), as_of.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

/// Age formatted for display, e.g. "58 Tahun"
pub fn age_label(birth: Option<NaiveDate>, as_of: NaiveDate) -> Option<String> {
    birth.map(|b| format!("{} Tahun", compute_age(Some(b), as_of)))
}

/// Same month and day `years` later; 29 February lands on 28 February in common years
pub fn add_years(date: NaiveDate, years: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(years.checked_mul(12)?))
}
