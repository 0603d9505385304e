use chrono::{NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

macro_rules! regex {
    ($pattern:expr) => {{
        static REGEX: Lazy<Regex> = Lazy::new(|| Regex::new($pattern).unwrap());
        &REGEX
    }};
}

const MAX_TIME_CHARS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Clock {
    hour: u32,
    minute: u32,
    meridiem: Option<Meridiem>,
}

impl Clock {
    fn parse(input: &str) -> Option<Self> {
        let captures = regex!(r"^(?i)(\d{1,2}):(\d{2})\s*(AM|PM)?$").captures(input.trim())?;

        let hour = captures[1].parse::<u32>().ok()?;
        let minute = captures[2].parse::<u32>().ok()?;
        let meridiem = captures.get(3).map(|suffix| {
            if suffix.as_str().eq_ignore_ascii_case("pm") {
                Meridiem::Pm
            } else {
                Meridiem::Am
            }
        });

        let hour_in_range = match meridiem {
            Some(_) => (1..=12).contains(&hour),
            None => hour <= 23,
        };

        (hour_in_range && minute <= 59).then_some(Clock {
            hour,
            minute,
            meridiem,
        })
    }

    fn to_naive_time(self) -> Option<NaiveTime> {
        let hour = match (self.meridiem, self.hour) {
            (Some(Meridiem::Pm), hour) if hour != 12 => hour + 12,
            (Some(Meridiem::Am), 12) => 0,
            (_, hour) => hour,
        };

        NaiveTime::from_hms_opt(hour, self.minute, 0)
    }

    fn render(self) -> String {
        match self.meridiem {
            Some(Meridiem::Am) => format!("{}:{:02} AM", self.hour, self.minute),
            Some(Meridiem::Pm) => format!("{}:{:02} PM", self.hour, self.minute),
            None => format!("{:02}:{:02}", self.hour, self.minute),
        }
    }
}

/// Whether a time field holds an acceptable value. Blank means no time.
pub fn validate_time<S: AsRef<str>>(input: S) -> bool {
    let input = input.as_ref();
    input.trim().is_empty() || Clock::parse(input).is_some()
}

/// Reads `H:MM`, `HH:MM` or `H:MM AM/PM` as a 24-hour time of day.
pub fn parse_clock<S: AsRef<str>>(input: S) -> Option<NaiveTime> {
    Clock::parse(input.as_ref())?.to_naive_time()
}

/// Rewrites a valid time into its stored form, `H:MM AM` or `HH:MM`,
/// keeping whichever clock the input was written in.
pub fn normalize_time<S: AsRef<str>>(input: S) -> Option<String> {
    Clock::parse(input.as_ref()).map(Clock::render)
}

/// Masks time field input as `HH:MM AM` while it is being typed.
pub fn format_time_input<S: AsRef<str>>(input: S) -> String {
    let cleaned = input
        .as_ref()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .take(MAX_TIME_CHARS)
        .collect::<String>();

    match cleaned.len() {
        0..=2 => cleaned,
        3..=4 => format!("{}:{}", &cleaned[..2], &cleaned[2..]),
        _ => format!("{}:{} {}", &cleaned[..2], &cleaned[2..4], &cleaned[4..]),
    }
}

/// Renders a start/end pair for event listings, e.g. `2:00 PM – 4:00 PM`.
pub fn format_time_range(start: Option<&str>, end: Option<&str>) -> Option<String> {
    let start = start.and_then(parse_clock).map(display_clock);
    let end = end.and_then(parse_clock).map(display_clock);

    match (start, end) {
        (Some(start), Some(end)) => Some(format!("{start} – {end}")),
        (Some(start), None) => Some(start),
        (None, Some(end)) => Some(format!("until {end}")),
        (None, None) => None,
    }
}

fn display_clock(time: NaiveTime) -> String {
    let (pm, hour) = time.hour12();
    let suffix = if pm { "PM" } else { "AM" };
    format!("{hour}:{:02} {suffix}", time.minute())
}
