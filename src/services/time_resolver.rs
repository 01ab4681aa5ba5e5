use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// How long before the assessment start the reminder fires.
const NOTIFICATION_LEAD: i64 = 5 * 60;

#[derive(Debug, Error)]
pub enum TimeError {
    #[error("could not parse time input given, day: {day} time: {time}: {source}")]
    InvalidDateTime {
        day: String,
        time: String,
        source: chrono::ParseError,
    },
    #[error("could not load timezone {0}")]
    UnknownTimezone(String),
    #[error("local time {day} {time} does not exist in timezone {timezone}")]
    NonexistentLocalTime {
        day: String,
        time: String,
        timezone: String,
    },
}

/// The candidate's local scheduling choice.
#[derive(Debug, Clone)]
pub struct AssignmentChoices {
    pub day_chosen: String,
    pub time_chosen: String,
    pub timezone: String,
}

/// Absolute instants derived from a candidate's local choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSchedule {
    pub start_assignment_at: DateTime<Utc>,
    pub send_notification_at: DateTime<Utc>,
}

/// Reinterprets the naive `day time` pair in the named IANA zone and derives
/// the start and notification instants. The zone's offset for that specific
/// date applies, so DST transitions resolve correctly.
pub fn resolve(input: &AssignmentChoices) -> Result<ResolvedSchedule, TimeError> {
    let combined = format!("{} {}", input.day_chosen, input.time_chosen);
    let naive = NaiveDateTime::parse_from_str(&combined, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(&combined, "%Y-%m-%d %H:%M"))
        .map_err(|source| TimeError::InvalidDateTime {
            day: input.day_chosen.clone(),
            time: input.time_chosen.clone(),
            source,
        })?;

    let tz: Tz = input
        .timezone
        .parse()
        .map_err(|_| TimeError::UnknownTimezone(input.timezone.clone()))?;

    let start = match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) => t,
        // Clocks rolled back: both instants are valid, take the earlier one.
        LocalResult::Ambiguous(earlier, _) => earlier,
        // Clocks sprang forward over the chosen wall time.
        LocalResult::None => {
            return Err(TimeError::NonexistentLocalTime {
                day: input.day_chosen.clone(),
                time: input.time_chosen.clone(),
                timezone: input.timezone.clone(),
            })
        }
    }
    .with_timezone(&Utc);

    Ok(ResolvedSchedule {
        start_assignment_at: start,
        send_notification_at: start - Duration::seconds(NOTIFICATION_LEAD),
    })
}
