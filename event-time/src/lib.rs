//! Date/time handling for event records: normalizing what organizers type
//! into event forms, masking form input as it is typed, and exporting
//! stored events as iCalendar.

mod date;
mod error;
mod form;
mod structs;
mod time;

#[cfg(feature = "ics")]
mod ics;

pub use date::{format_date_input, format_display_date, normalize_date, parse_date};
pub use error::{Error, Result};
pub use form::{EventForm, EventInput, FieldError, FormErrors};
pub use structs::{Calendar, Event};
pub use time::{
    format_time_input, format_time_range, normalize_time, parse_clock, validate_time,
};

#[cfg(feature = "ics")]
pub use crate::ics::{ics_filename, to_icalendar, IcsSettings, CONTENT_TYPE};
