//! Types that represent the import data model, such as `Cell`, `CandidateRecord` and `Category`.
mod category;
mod cell;
mod domain;
mod record;

pub use category::Category;
pub(crate) use cell::trim_trailing_empty;
pub use cell::{Cell, Grid, RawRow};
pub use domain::Domain;
pub use record::{CandidateRecord, ListedRecord, NewRecord, NEW_RECORD_DATE_FORMAT};
