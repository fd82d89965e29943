//! Canonical text form for durations.
//!
//! Durations are written in the invariant constant format
//! `[-][d.]hh:mm:ss[.fffffff]`, with a resolution of one tick (100 ns).
//! Reading is lenient: anything that does not parse yields [`Duration::ZERO`].

use std::fmt::Write as _;

use time::Duration;

const NANOS_PER_TICK: i128 = 100;
const TICKS_PER_SECOND: i64 = 10_000_000;
const TICKS_PER_MINUTE: i64 = TICKS_PER_SECOND * 60;
const TICKS_PER_HOUR: i64 = TICKS_PER_MINUTE * 60;
const TICKS_PER_DAY: i64 = TICKS_PER_HOUR * 24;

/// Largest day count representable in the tick range.
const MAX_DAYS: u64 = 10_675_199;
const FRACTION_DIGITS: usize = 7;

/// Format a duration in the canonical constant format.
///
/// Precision finer than one tick is truncated toward zero. The fractional
/// part is only written when it is non-zero.
pub fn encode(duration: Duration) -> String {
    let ticks = duration.whole_nanoseconds() / NANOS_PER_TICK;
    let negative = ticks < 0;
    let ticks = ticks.unsigned_abs();

    let day = TICKS_PER_DAY as u128;
    let hour = TICKS_PER_HOUR as u128;
    let minute = TICKS_PER_MINUTE as u128;
    let second = TICKS_PER_SECOND as u128;

    let mut out = String::with_capacity(26);
    if negative {
        out.push('-');
    }

    let days = ticks / day;
    if days > 0 {
        let _ = write!(out, "{}.", days);
    }

    let _ = write!(
        out,
        "{:02}:{:02}:{:02}",
        (ticks / hour) % 24,
        (ticks / minute) % 60,
        (ticks / second) % 60
    );

    let fraction = ticks % second;
    if fraction > 0 {
        let _ = write!(out, ".{:07}", fraction);
    }

    out
}

/// Parse a duration written in the canonical constant format.
///
/// Accepts `[-]d`, `[-][d.]hh:mm`, `[-][d.]hh:mm:ss` and
/// `[-][d.]hh:mm:ss.f` with one to seven fractional digits. Malformed or
/// out-of-range input returns [`Duration::ZERO`] instead of an error.
pub fn decode(text: &str) -> Duration {
    parse_constant(text.trim()).unwrap_or(Duration::ZERO)
}

fn parse_constant(text: &str) -> Option<Duration> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let ticks = if body.contains(':') {
        parse_clock(body)?
    } else {
        let days = parse_component(body, 8, MAX_DAYS)?;
        (days as i64).checked_mul(TICKS_PER_DAY)?
    };

    Some(from_ticks(if negative { -ticks } else { ticks }))
}

/// Parse `[d.]hh:mm[:ss[.fffffff]]` into a non-negative tick count.
fn parse_clock(body: &str) -> Option<i64> {
    let (days, clock) = match body.split_once('.') {
        Some((days, rest)) if !days.contains(':') => (parse_component(days, 8, MAX_DAYS)?, rest),
        _ => (0, body),
    };

    let (clock, fraction) = match clock.split_once('.') {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (clock, None),
    };

    let mut parts = clock.split(':');
    let hours = parse_component(parts.next()?, 2, 23)?;
    let minutes = parse_component(parts.next()?, 2, 59)?;
    let seconds = match parts.next() {
        Some(seconds) => parse_component(seconds, 2, 59)?,
        // A fraction needs a seconds field to hang off.
        None if fraction.is_some() => return None,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }

    let fraction = match fraction {
        Some(digits) => parse_fraction(digits)?,
        None => 0,
    };

    (days as i64)
        .checked_mul(TICKS_PER_DAY)?
        .checked_add(hours as i64 * TICKS_PER_HOUR)?
        .checked_add(minutes as i64 * TICKS_PER_MINUTE)?
        .checked_add(seconds as i64 * TICKS_PER_SECOND)?
        .checked_add(fraction)
}

/// Parse a run of ASCII digits no longer than `max_len` and no larger than `max`.
fn parse_component(text: &str, max_len: usize, max: u64) -> Option<u64> {
    if text.is_empty() || text.len() > max_len || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<u64>().ok().filter(|value| *value <= max)
}

/// Parse fractional seconds into ticks, right-padding to seven digits.
fn parse_fraction(text: &str) -> Option<i64> {
    if text.is_empty() || text.len() > FRACTION_DIGITS || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let scale = 10_i64.pow((FRACTION_DIGITS - text.len()) as u32);
    text.parse::<i64>().ok().map(|value| value * scale)
}

fn from_ticks(ticks: i64) -> Duration {
    let seconds = ticks / TICKS_PER_SECOND;
    let nanos = (ticks % TICKS_PER_SECOND) * NANOS_PER_TICK as i64;
    Duration::new(seconds, nanos as i32)
}

/// Serde adapter for `#[serde(with = "...")]` fields holding a [`Duration`].
///
/// Writes the canonical string. Reads leniently: a malformed string or a
/// non-string value becomes [`Duration::ZERO`].
pub mod canonical {
    use serde::de::IgnoredAny;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Duration;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Other(IgnoredAny),
    }

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::encode(*duration))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => super::decode(&text),
            Raw::Other(_) => Duration::ZERO,
        })
    }
}
