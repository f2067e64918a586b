use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use crate::language::FunctionLibrary;
use crate::types::Arity;
use crate::util::{number_arg, string_arg, timestamp_arg};
use crate::value::Value;
use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday,
};
use std::fmt::Write;

/// Seconds beyond which `addSeconds` / `fromUnix` refuse to compute.
const MAX_SECONDS: f64 = 1e15;

fn parse_iso_time_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    timestamp_arg("parseISOTime", args, 0).map(Value::Timestamp)
}

/// `parseTime(s, layout)` with a strftime layout. Layouts without an offset
/// are read as UTC; layouts without a time of day as midnight.
fn parse_time_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let s = string_arg("parseTime", args, 0)?;
    let layout = string_arg("parseTime", args, 1)?;
    parse_with_layout(s, layout)
        .map(Value::Timestamp)
        .ok_or_else(|| {
            EvalError::function(
                "parseTime",
                format!("{:?} does not match layout {:?}", s, layout),
            )
        })
}

fn parse_with_layout(s: &str, layout: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(t) = DateTime::parse_from_str(s, layout) {
        return Some(t);
    }
    let naive = NaiveDateTime::parse_from_str(s, layout)
        .ok()
        .or_else(|| NaiveDate::parse_from_str(s, layout).ok()?.and_hms_opt(0, 0, 0))?;
    Some(Utc.from_utc_datetime(&naive).into())
}

fn strftime_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let t = timestamp_arg("strftime", args, 0)?;
    let layout = string_arg("strftime", args, 1)?;
    let mut out = String::new();
    write!(out, "{}", t.format(layout))
        .map_err(|_| EvalError::function("strftime", format!("invalid layout {:?}", layout)))?;
    Ok(Value::String(out))
}

fn timestamps(name: &str, args: &[Value]) -> Result<Vec<DateTime<FixedOffset>>, EvalError> {
    (0..args.len()).map(|i| timestamp_arg(name, args, i)).collect()
}

fn earliest_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    timestamps("earliest", args)?
        .into_iter()
        .min()
        .map(Value::Timestamp)
        .ok_or_else(|| EvalError::function("earliest", "no values"))
}

fn latest_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    timestamps("latest", args)?
        .into_iter()
        .max()
        .map(Value::Timestamp)
        .ok_or_else(|| EvalError::function("latest", "no values"))
}

fn is_leap_year_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let year = timestamp_arg("isLeapYear", args, 0)?.year();
    Ok(Value::Bool(NaiveDate::from_ymd_opt(year, 2, 29).is_some()))
}

fn is_week_day_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let day = timestamp_arg("isWeekDay", args, 0)?.weekday();
    Ok(Value::Bool(!matches!(day, Weekday::Sat | Weekday::Sun)))
}

fn seconds_to_duration(name: &str, seconds: f64) -> Result<Duration, EvalError> {
    if !seconds.is_finite() || seconds.abs() > MAX_SECONDS {
        return Err(EvalError::function(name, format!("{} seconds is out of range", seconds)));
    }
    Ok(Duration::milliseconds((seconds * 1000.0).round() as i64))
}

/// `addSeconds(t, n)`; `n` may be negative or fractional (millisecond precision).
fn add_seconds_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let t = timestamp_arg("addSeconds", args, 0)?;
    let delta = seconds_to_duration("addSeconds", number_arg("addSeconds", args, 1)?)?;
    t.checked_add_signed(delta)
        .map(Value::Timestamp)
        .ok_or_else(|| EvalError::function("addSeconds", "result is out of range"))
}

fn unix_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let t = timestamp_arg("unix", args, 0)?;
    Ok(Value::Number(t.timestamp_millis() as f64 / 1000.0))
}

fn from_unix_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let ms = seconds_to_duration("fromUnix", number_arg("fromUnix", args, 0)?)?.num_milliseconds();
    Utc.timestamp_millis_opt(ms)
        .single()
        .map(|t| Value::Timestamp(t.into()))
        .ok_or_else(|| EvalError::function("fromUnix", "result is out of range"))
}

pub(super) fn library() -> FunctionLibrary {
    FunctionLibrary::new("time")
        .function("parseISOTime", Arity::Fixed(1), parse_iso_time_eval)
        .function("parseTime", Arity::Fixed(2), parse_time_eval)
        .function("strftime", Arity::Fixed(2), strftime_eval)
        .function("earliest", Arity::Range(1, None), earliest_eval)
        .function("latest", Arity::Range(1, None), latest_eval)
        .function("isLeapYear", Arity::Fixed(1), is_leap_year_eval)
        .function("isWeekDay", Arity::Fixed(1), is_week_day_eval)
        .function("addSeconds", Arity::Fixed(2), add_seconds_eval)
        .function("unix", Arity::Fixed(1), unix_eval)
        .function("fromUnix", Arity::Fixed(1), from_unix_eval)
}
