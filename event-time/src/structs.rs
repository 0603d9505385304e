use chrono::{DateTime, NaiveDate, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Calendar {
    pub name: String,
    pub events: Vec<Event>,
}

/// An event as stored by the remote data API.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Event {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    #[cfg_attr(feature = "serde", serde(default))]
    pub end_date: Option<NaiveDate>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub start_time: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub end_time: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub location: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub about_event: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub details: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub organizer: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub contact_details: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub hosting_organization: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, deserialize_with = "nullable_list"))]
    pub photo_urls: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default, deserialize_with = "nullable_list"))]
    pub attachment_urls: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub owner: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub created_at: Option<DateTime<Utc>>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Event {
    pub fn start_time(&self) -> Option<&str> {
        non_blank(self.start_time.as_deref())
    }

    pub fn end_time(&self) -> Option<&str> {
        non_blank(self.end_time.as_deref())
    }

    pub fn location(&self) -> Option<&str> {
        non_blank(self.location.as_deref())
    }

    pub fn about_event(&self) -> Option<&str> {
        non_blank(self.about_event.as_deref())
    }

    pub fn organizer(&self) -> Option<&str> {
        non_blank(self.organizer.as_deref())
    }

    /// Last calendar day the event runs on.
    pub fn last_day(&self) -> NaiveDate {
        self.end_date.unwrap_or(self.date)
    }
}

// Forms submit blank inputs as empty strings.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(feature = "serde")]
fn nullable_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let list = Option::<Vec<Option<String>>>::deserialize(deserializer)?;
    Ok(list.into_iter().flatten().flatten().collect())
}
