use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone, Utc};
use tracing::warn;

use crate::errors::CoreError;
use crate::models::range::{RangeSelector, ResolvedRange};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Maps a [`RangeSelector`] to concrete instants.
///
/// - `Today` / `Yesterday`: local midnight to local 23:59:59.999 of that
///   calendar day, one day for averaging.
/// - `Last7d` / `Last14d` / `Last30d`: `now - N days` to `now` (instant
///   arithmetic), averaged over `round((end - start) / 1 day) + 1` days.
pub struct RangeResolver;

impl RangeResolver {
    /// Resolve `selector` relative to `now`. Calendar days are taken in the
    /// time zone of `now`.
    pub fn resolve<Tz: TimeZone>(selector: RangeSelector, now: &DateTime<Tz>) -> ResolvedRange {
        match selector {
            RangeSelector::Today => Self::calendar_day(now.date_naive(), now),
            RangeSelector::Yesterday => {
                let today = now.date_naive();
                let yesterday = today.pred_opt().unwrap_or(today);
                Self::calendar_day(yesterday, now)
            }
            RangeSelector::Last7d | RangeSelector::Last14d | RangeSelector::Last30d => {
                let days = selector.trailing_days().unwrap_or(30);
                Self::trailing(now, days)
            }
        }
    }

    /// Parse a raw selector and resolve it.
    pub fn resolve_str<Tz: TimeZone>(
        raw: &str,
        now: &DateTime<Tz>,
    ) -> Result<ResolvedRange, CoreError> {
        let selector: RangeSelector = raw.parse()?;
        Ok(Self::resolve(selector, now))
    }

    /// Parse a raw selector, falling back to `Last30d` when it is not recognized.
    pub fn selector_or_default(raw: &str) -> RangeSelector {
        raw.parse().unwrap_or_else(|e: CoreError| {
            warn!(error = %e, "unrecognized range selector, using default");
            RangeSelector::default()
        })
    }

    /// `[now - days, now]` with the day count derived from the span.
    pub fn trailing<Tz: TimeZone>(now: &DateTime<Tz>, days: i64) -> ResolvedRange {
        let end = now.with_timezone(&Utc);
        let start = end - TimeDelta::days(days.max(0));
        ResolvedRange {
            start,
            end,
            day_count: Self::day_count(start, end),
        }
    }

    /// `round((end - start) / 1 day) + 1`, never below 1.
    pub fn day_count(start: DateTime<Utc>, end: DateTime<Utc>) -> u32 {
        let span = (end - start).num_milliseconds().max(0);
        let rounded = (span + MILLIS_PER_DAY / 2) / MILLIS_PER_DAY;
        u32::try_from(rounded + 1).unwrap_or(u32::MAX)
    }

    fn calendar_day<Tz: TimeZone>(date: NaiveDate, now: &DateTime<Tz>) -> ResolvedRange {
        let tz = now.timezone();
        let fallback = now.offset().fix().local_minus_utc();

        let first_instant = date.and_time(NaiveTime::MIN);
        let last_instant = first_instant + TimeDelta::milliseconds(MILLIS_PER_DAY - 1);

        let start = Self::to_utc(&tz, first_instant, fallback, false);
        let end = Self::to_utc(&tz, last_instant, fallback, true);

        ResolvedRange {
            start,
            end: end.max(start),
            day_count: 1,
        }
    }

    /// Local wall time to an instant. Ambiguous times pick the earliest (start
    /// of day) or latest (end of day) mapping; nonexistent ones use the
    /// offset of `now`.
    fn to_utc<Tz: TimeZone>(
        tz: &Tz,
        local: NaiveDateTime,
        fallback_offset_secs: i32,
        latest: bool,
    ) -> DateTime<Utc> {
        let mapped = tz.from_local_datetime(&local);
        let resolved = if latest {
            mapped.latest()
        } else {
            mapped.earliest()
        };
        match resolved {
            Some(dt) => dt.with_timezone(&Utc),
            None => (local - TimeDelta::seconds(i64::from(fallback_offset_secs))).and_utc(),
        }
    }
}
