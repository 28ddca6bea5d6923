use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Accepts an RFC 3339 instant or a bare `YYYY-MM-DD`, which is read as UTC midnight.
pub fn parse_deadline(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Calendar date of an interview. An RFC 3339 instant is reduced to its date in `offset`.
pub fn parse_calendar_date(raw: &str, offset: &FixedOffset) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(offset).date_naive())
}

/// Parses `10:00AM`, `9:30 pm` or, without a meridiem, 24-hour `14:30`.
pub fn parse_clock_time(raw: &str) -> Option<NaiveTime> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();

    let (clock, meridiem) = if let Some(rest) = compact.strip_suffix("AM") {
        (rest, Some(false))
    } else if let Some(rest) = compact.strip_suffix("PM") {
        (rest, Some(true))
    } else {
        (compact.as_str(), None)
    };

    let (hours, minutes) = clock.split_once(':')?;
    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return None;
    }
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;

    let hours = match meridiem {
        Some(is_pm) => {
            if !(1..=12).contains(&hours) {
                return None;
            }
            match (is_pm, hours) {
                (false, 12) => 0,
                (true, h) if h < 12 => h + 12,
                (_, h) => h,
            }
        }
        None => hours,
    };

    NaiveTime::from_hms_opt(hours, minutes, 0)
}

/// Start and end of an interview slot placed at `date` + `time` in `offset`.
pub fn slot_window(
    date: NaiveDate,
    time: NaiveTime,
    offset: &FixedOffset,
    slot_minutes: i64,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let local = offset.from_local_datetime(&date.and_time(time)).single()?;
    let start = local.with_timezone(&Utc);
    Some((start, start + Duration::minutes(slot_minutes)))
}
