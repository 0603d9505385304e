use std::fmt;

use chrono::NaiveDate;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    date::parse_date,
    time::{normalize_time, validate_time},
};

/// Event fields exactly as typed into the create/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct EventForm {
    pub title: String,
    pub date: String,
    pub end_date: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub about_event: String,
    pub details: String,
    pub organizer: String,
    pub contact_details: String,
    pub hosting_organization: String,
    pub photo_urls: Vec<String>,
    pub attachment_urls: Vec<String>,
}

/// Create/update payload for the remote data API.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct EventInput {
    pub title: String,
    pub date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location: Option<String>,
    pub about_event: Option<String>,
    pub details: Option<String>,
    pub organizer: Option<String>,
    pub contact_details: Option<String>,
    pub hosting_organization: Option<String>,
    pub photo_urls: Vec<String>,
    pub attachment_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct FormErrors {
    pub errors: Vec<FieldError>,
}

impl FormErrors {
    fn push<M: Into<String>>(&mut self, field: &'static str, message: M) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn field(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|error| error.field == field)
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, error) in self.errors.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for FormErrors {}

impl EventForm {
    /// Validates every field and converts the form into a payload. All
    /// problems are reported together. An end date before the start date is
    /// accepted.
    pub fn normalize(self) -> Result<EventInput, FormErrors> {
        let mut errors = FormErrors::default();

        let title = self.title.trim().to_string();
        if title.is_empty() {
            errors.push("title", "Title is required");
        }

        let date = match parse_date(&self.date) {
            Ok(date) => Some(date),
            Err(err) => {
                errors.push("date", err.to_string());
                None
            }
        };

        let end_date = match optional(self.end_date) {
            None => None,
            Some(end_date) => match parse_date(&end_date) {
                Ok(end_date) => Some(end_date),
                Err(err) => {
                    errors.push("endDate", err.to_string());
                    None
                }
            },
        };

        let [start_time, end_time] =
            [("startTime", self.start_time), ("endTime", self.end_time)].map(|(field, value)| {
                if !validate_time(&value) {
                    errors.push(field, format!("\"{value}\" is not a valid time"));
                }
                normalize_time(value)
            });

        let Some(date) = date.filter(|_| errors.errors.is_empty()) else {
            return Err(errors);
        };

        Ok(EventInput {
            title,
            date,
            end_date,
            start_time,
            end_time,
            location: optional(self.location),
            about_event: optional(self.about_event),
            details: optional(self.details),
            organizer: optional(self.organizer),
            contact_details: optional(self.contact_details),
            hosting_organization: optional(self.hosting_organization),
            photo_urls: self.photo_urls,
            attachment_urls: self.attachment_urls,
        })
    }
}

fn optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
