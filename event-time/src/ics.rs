use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use ics::{
    components::Property,
    escape_text,
    properties::{Description, DtEnd, DtStart, Location, Organizer, Summary},
    ICalendar,
};

use crate::{time::parse_clock, Calendar, Event};

pub const CONTENT_TYPE: &str = "text/calendar";

const UTC_STAMP: &str = "%Y%m%dT%H%M%SZ";

/// Fixed values stamped into every export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcsSettings {
    pub prodid: String,
    /// Appended to event ids to form globally unique `UID`s.
    pub uid_domain: String,
    /// Used when an event names no organizer.
    pub default_organizer: String,
    /// Zone the stored dates and clock times are written in.
    pub zone: Tz,
}

impl Default for IcsSettings {
    fn default() -> Self {
        Self {
            prodid: "-//HRP//Events//EN".to_string(),
            uid_domain: "hrp-events".to_string(),
            default_organizer: "HRP".to_string(),
            zone: Tz::UTC,
        }
    }
}

impl IcsSettings {
    fn to_utc(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        let local = date.and_time(time);

        if let Some(resolved) = self.zone.from_local_datetime(&local).earliest() {
            return resolved.with_timezone(&Utc);
        }

        // Skipped by a forward shift: read the wall time in the offset that
        // applied before the shift, landing just past the transition.
        let before = self
            .zone
            .offset_from_utc_datetime(&(local - Duration::days(1)))
            .fix();
        Utc.from_utc_datetime(&(local - Duration::seconds(before.local_minus_utc().into())))
    }
}

impl Calendar {
    #[must_use]
    pub fn to_ics<'a>(&'a self, settings: &'a IcsSettings) -> ICalendar<'a> {
        let mut icalendar = ICalendar::new("2.0", settings.prodid.as_str());
        icalendar.push(Property::new("X-WR-CALNAME", escape_text(self.name.as_str())));

        for event in &self.events {
            icalendar.add_event(event.to_ics(settings));
        }

        icalendar
    }
}

impl Event {
    /// Start of the event in UTC. Midnight when no usable start time is set.
    pub fn start_instant(&self, settings: &IcsSettings) -> DateTime<Utc> {
        let time = self
            .start_time()
            .and_then(parse_clock)
            .unwrap_or(NaiveTime::MIN);

        settings.to_utc(self.date, time)
    }

    /// End of the event in UTC. 23:59 on the last day when no usable end
    /// time is set.
    pub fn end_instant(&self, settings: &IcsSettings) -> DateTime<Utc> {
        let time = self
            .end_time()
            .and_then(parse_clock)
            .or_else(|| NaiveTime::from_hms_opt(23, 59, 0))
            .unwrap_or(NaiveTime::MIN);

        settings.to_utc(self.last_day(), time)
    }

    #[must_use]
    pub fn to_ics<'a>(&'a self, settings: &'a IcsSettings) -> ics::Event<'a> {
        let start = self.start_instant(settings).format(UTC_STAMP).to_string();
        let end = self.end_instant(settings).format(UTC_STAMP).to_string();

        let uid = format!("{}@{}", self.id, settings.uid_domain);

        let mut ics_event = ics::Event::new(uid, start.clone());

        ics_event.push(DtStart::new(start));
        ics_event.push(DtEnd::new(end));
        ics_event.push(Summary::new(escape_text(self.title.as_str())));
        ics_event.push(Description::new(escape_text(
            self.about_event().unwrap_or_default(),
        )));
        ics_event.push(Location::new(escape_text(
            self.location().unwrap_or_default(),
        )));
        ics_event.push(Organizer::new(escape_text(
            self.organizer()
                .unwrap_or(settings.default_organizer.as_str()),
        )));

        ics_event
    }
}

/// Renders a single event as a complete `.ics` document.
pub fn to_icalendar(event: &Event, settings: &IcsSettings) -> String {
    let mut icalendar = ICalendar::new("2.0", settings.prodid.as_str());
    icalendar.add_event(event.to_ics(settings));
    icalendar.to_string()
}

/// Download name for an event export: `Summer Rally!` becomes
/// `Summer_Rally_.ics`.
pub fn ics_filename(title: &str) -> String {
    let stem = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect::<String>();

    format!("{stem}.ics")
}
