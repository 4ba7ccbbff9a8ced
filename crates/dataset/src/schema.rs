//! Column-level conversion from a `DataFrame` into typed `Event` rows.
//!
//! Each column is cast strictly to the type the rest of the system expects.
//! Values that would have to be coerced (a fractional id, a flag of `2`, an
//! unparseable timestamp) are reported as `DatasetError::InvalidColumn`.

use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use core_types::Event;
use polars::prelude::*;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use crate::error::DatasetError;

/// Columns every dataset must provide, in source order.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "website_session_id",
    "order_id",
    "created_at",
    "is_conversion",
    "price_usd",
    "refund_amount_usd",
    "is_refunded",
    "items_purchased",
    "product_id",
    "product_name",
];

/// Accepted textual timestamp layouts, tried in order after RFC 3339.
const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Converts a loaded frame into events, preserving row order.
pub fn events_from_frame(df: &DataFrame) -> Result<Vec<Event>, DatasetError> {
    validate_columns(df)?;

    let session_ids = non_null("website_session_id", int_column(df, "website_session_id")?)?;
    let order_ids = int_column(df, "order_id")?;
    let created_at = non_null("created_at", timestamp_column(df, "created_at")?)?;
    let is_conversion = non_null("is_conversion", flag_column(df, "is_conversion")?)?;
    let prices = decimal_column(df, "price_usd")?;
    let refunds = decimal_column(df, "refund_amount_usd")?;
    let is_refunded = flag_column(df, "is_refunded")?;
    let items = int_column(df, "items_purchased")?;
    let product_ids = int_column(df, "product_id")?;
    let product_names = text_column(df, "product_name")?;

    let events = (0..df.height())
        .map(|i| Event {
            website_session_id: session_ids[i],
            order_id: order_ids[i],
            created_at: created_at[i],
            is_conversion: is_conversion[i],
            price_usd: prices[i],
            refund_amount_usd: refunds[i],
            is_refunded: is_refunded[i],
            items_purchased: items[i],
            product_id: product_ids[i],
            product_name: product_names[i].clone(),
        })
        .collect();

    Ok(events)
}

fn validate_columns(df: &DataFrame) -> Result<(), DatasetError> {
    for name in REQUIRED_COLUMNS {
        if df.column(name).is_err() {
            return Err(DatasetError::MissingColumn(name.to_string()));
        }
    }
    Ok(())
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series, DatasetError> {
    df.column(name)
        .map_err(|_| DatasetError::MissingColumn(name.to_string()))
}

/// Fails on the first null in a column that must be fully populated.
fn non_null<T>(name: &str, values: Vec<Option<T>>) -> Result<Vec<T>, DatasetError> {
    values
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.ok_or_else(|| {
                DatasetError::invalid_column(name, format!("null value at row {}", row))
            })
        })
        .collect()
}

fn int_column(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>, DatasetError> {
    let series = column(df, name)?;

    // Parquet files written from nullable integer columns often store them
    // as floats. Accept those only when every value is integral.
    if series.dtype().is_float() {
        let floats = series.cast(&DataType::Float64)?;
        return floats
            .f64()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                None => Ok(None),
                Some(v) if v.is_finite() && v.fract() == 0.0 => Ok(Some(v as i64)),
                Some(v) => Err(DatasetError::invalid_column(
                    name,
                    format!("expected an integer at row {}, got {}", row, v),
                )),
            })
            .collect();
    }

    let ints = series
        .strict_cast(&DataType::Int64)
        .map_err(|e| DatasetError::invalid_column(name, format!("expected integers: {}", e)))?;
    Ok(ints.i64()?.into_iter().collect())
}

fn decimal_column(df: &DataFrame, name: &str) -> Result<Vec<Option<Decimal>>, DatasetError> {
    let series = column(df, name)?;

    if series.dtype() == &DataType::String {
        return series
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value.map(str::trim) {
                None | Some("") => Ok(None),
                Some(text) => Decimal::from_str(text).map(Some).map_err(|_| {
                    DatasetError::invalid_column(
                        name,
                        format!("expected a decimal at row {}, got '{}'", row, text),
                    )
                }),
            })
            .collect();
    }

    let floats = series
        .strict_cast(&DataType::Float64)
        .map_err(|e| DatasetError::invalid_column(name, format!("expected decimals: {}", e)))?;
    floats
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            None => Ok(None),
            Some(v) => Decimal::from_f64(v).map(Some).ok_or_else(|| {
                DatasetError::invalid_column(
                    name,
                    format!("value at row {} is not representable: {}", row, v),
                )
            }),
        })
        .collect()
}

fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, DatasetError> {
    let series = column(df, name)?;
    let text = series
        .cast(&DataType::String)
        .map_err(|e| DatasetError::invalid_column(name, format!("expected text: {}", e)))?;
    Ok(text
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

/// Reads a 0/1 flag. Booleans, integers, floats and the words
/// `true`/`false` are accepted; anything else is a schema error.
fn flag_column(df: &DataFrame, name: &str) -> Result<Vec<Option<bool>>, DatasetError> {
    let series = column(df, name)?;

    match series.dtype() {
        DataType::Boolean => Ok(series.bool()?.into_iter().collect()),
        DataType::String => series
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value.map(str::trim) {
                None | Some("") => Ok(None),
                Some(text) => parse_flag(text).map(Some).ok_or_else(|| {
                    DatasetError::invalid_column(
                        name,
                        format!("expected 0/1 at row {}, got '{}'", row, text),
                    )
                }),
            })
            .collect(),
        dtype if dtype.is_numeric() => {
            let floats = series.cast(&DataType::Float64)?;
            floats
                .f64()?
                .into_iter()
                .enumerate()
                .map(|(row, value)| match value {
                    None => Ok(None),
                    Some(v) if v == 0.0 => Ok(Some(false)),
                    Some(v) if v == 1.0 => Ok(Some(true)),
                    Some(v) => Err(DatasetError::invalid_column(
                        name,
                        format!("expected 0/1 at row {}, got {}", row, v),
                    )),
                })
                .collect()
        }
        other => Err(DatasetError::invalid_column(
            name,
            format!("expected a boolean flag, found column type {}", other),
        )),
    }
}

fn parse_flag(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" => Some(true),
        "0" | "0.0" | "false" => Some(false),
        _ => None,
    }
}

fn timestamp_column(
    df: &DataFrame,
    name: &str,
) -> Result<Vec<Option<NaiveDateTime>>, DatasetError> {
    let series = column(df, name)?;

    match series.dtype() {
        DataType::String => series
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value.map(str::trim) {
                None | Some("") => Ok(None),
                Some(text) => parse_timestamp(text).map(Some).ok_or_else(|| {
                    DatasetError::invalid_column(
                        name,
                        format!("unrecognised timestamp at row {}: '{}'", row, text),
                    )
                }),
            })
            .collect(),
        DataType::Datetime(unit, tz) => {
            let unit = *unit;
            let offset = match tz.as_deref() {
                None => None,
                Some(zone) => column_offset(name, zone),
            };
            let physical = series.cast(&DataType::Int64)?;
            physical
                .i64()?
                .into_iter()
                .enumerate()
                .map(|(row, value)| match value {
                    None => Ok(None),
                    Some(v) => from_epoch(v, unit)
                        .map(|utc| Some(wall_clock(utc, offset)))
                        .ok_or_else(|| {
                            DatasetError::invalid_column(
                                name,
                                format!("timestamp out of range at row {}", row),
                            )
                        }),
                })
                .collect()
        }
        DataType::Date => {
            let physical = series.cast(&DataType::Int32)?;
            physical
                .i32()?
                .into_iter()
                .enumerate()
                .map(|(row, value)| match value {
                    None => Ok(None),
                    Some(days) => date_from_epoch_days(days)
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                        .map(Some)
                        .ok_or_else(|| {
                            DatasetError::invalid_column(
                                name,
                                format!("date out of range at row {}", row),
                            )
                        }),
                })
                .collect()
        }
        other => Err(DatasetError::invalid_column(
            name,
            format!("expected a timestamp, found column type {}", other),
        )),
    }
}

/// Parses the timestamp layouts seen in exports of this dataset.
///
/// Offsets in RFC 3339 input are dropped after conversion to the writer's
/// local wall-clock time, so month bucketing follows the calendar the data
/// was recorded in.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    for format in TIMESTAMP_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn from_epoch(value: i64, unit: TimeUnit) -> Option<DateTime<Utc>> {
    match unit {
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(value)),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(value),
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(value),
    }
}

/// Offset of a time-zone-aware datetime column, as polars names it.
///
/// Fixed offsets (`+02:00`) and `UTC` are honoured. Named regional zones
/// have no fixed offset; their values stay in UTC and a warning is logged.
fn column_offset(column: &str, zone: &str) -> Option<FixedOffset> {
    if zone.eq_ignore_ascii_case("utc") {
        return None;
    }
    match zone.parse::<FixedOffset>() {
        Ok(offset) => Some(offset),
        Err(_) => {
            tracing::warn!(
                column,
                zone,
                "Regional time zone is not converted; months are bucketed in UTC."
            );
            None
        }
    }
}

/// Local wall-clock time of `utc`, matching how RFC 3339 text is read.
fn wall_clock(utc: DateTime<Utc>, offset: Option<FixedOffset>) -> NaiveDateTime {
    match offset {
        Some(offset) => utc.with_timezone(&offset).naive_local(),
        None => utc.naive_utc(),
    }
}

fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    // 719_163 days separate 0001-01-01 (day 1 of the common era) from 1970-01-01.
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(719_163)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_frame() -> DataFrame {
        df!(
            "website_session_id" => &[1i64, 2, 3],
            "order_id" => &[Some(10i64), None, Some(11)],
            "created_at" => &["2012-03-19 10:42:46", "2012-03-20 08:00:00", "2012-04-01T09:15:00"],
            "is_conversion" => &[1i64, 0, 1],
            "price_usd" => &[Some(49.99f64), None, Some(29.99)],
            "refund_amount_usd" => &[Some(0.0f64), None, Some(29.99)],
            "is_refunded" => &[Some(0i64), None, Some(1)],
            "items_purchased" => &[Some(1i64), None, Some(2)],
            "product_id" => &[Some(1i64), None, Some(2)],
            "product_name" => &[Some("The Original Mr. Fuzzy"), None, Some("The Forever Love Bear")],
        )
        .unwrap()
    }

    #[test]
    fn frame_converts_to_events_in_row_order() {
        let events = events_from_frame(&sample_frame()).unwrap();

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].order_id, Some(10));
        assert_eq!(events[0].price_usd, Some(dec!(49.99)));
        assert_eq!(events[0].is_refunded, Some(false));
        assert!(!events[1].is_conversion);
        assert_eq!(events[1].order_id, None);
        assert_eq!(events[2].refund_amount_usd, Some(dec!(29.99)));
        assert_eq!(events[2].is_refunded, Some(true));
        assert_eq!(
            events[2].created_at,
            NaiveDate::from_ymd_opt(2012, 4, 1)
                .unwrap()
                .and_hms_opt(9, 15, 0)
                .unwrap()
        );
    }

    #[test]
    fn missing_column_is_named() {
        let df = sample_frame().drop("is_conversion").unwrap();
        let err = events_from_frame(&df).unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn(c) if c == "is_conversion"));
    }

    #[test]
    fn non_binary_conversion_flag_fails_fast() {
        let mut df = sample_frame();
        df.with_column(Series::new("is_conversion", &[1i64, 2, 1]))
            .unwrap();
        let err = events_from_frame(&df).unwrap_err();
        assert!(
            matches!(err, DatasetError::InvalidColumn { ref column, .. } if column == "is_conversion"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn textual_flags_are_accepted() {
        let mut df = sample_frame();
        df.with_column(Series::new("is_conversion", &["True", "false", "1"]))
            .unwrap();
        let events = events_from_frame(&df).unwrap();
        assert!(events[0].is_conversion);
        assert!(!events[1].is_conversion);
        assert!(events[2].is_conversion);
    }

    #[test]
    fn null_session_id_is_rejected() {
        let mut df = sample_frame();
        df.with_column(Series::new("website_session_id", &[Some(1i64), None, Some(3)]))
            .unwrap();
        let err = events_from_frame(&df).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidColumn { ref column, .. } if column == "website_session_id"));
    }

    #[test]
    fn fractional_identifier_is_rejected() {
        let mut df = sample_frame();
        df.with_column(Series::new("product_id", &[Some(1.0f64), None, Some(2.5)]))
            .unwrap();
        let err = events_from_frame(&df).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidColumn { ref column, .. } if column == "product_id"));
    }

    #[test]
    fn garbage_timestamp_is_rejected() {
        let mut df = sample_frame();
        df.with_column(Series::new("created_at", &["2012-03-19", "yesterday", "2012-04-01"]))
            .unwrap();
        let err = events_from_frame(&df).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidColumn { ref column, .. } if column == "created_at"));
    }

    #[test]
    fn timestamp_layouts() {
        let expected = NaiveDate::from_ymd_opt(2013, 1, 5)
            .unwrap()
            .and_hms_opt(14, 3, 9)
            .unwrap();
        assert_eq!(parse_timestamp("2013-01-05 14:03:09"), Some(expected));
        assert_eq!(parse_timestamp("2013-01-05T14:03:09"), Some(expected));
        assert_eq!(parse_timestamp("2013-01-05T14:03:09+00:00"), Some(expected));
        assert!(parse_timestamp("2013-01-05 14:03:09.250").is_some());
        assert_eq!(
            parse_timestamp("2013-01-05"),
            NaiveDate::from_ymd_opt(2013, 1, 5).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_timestamp("05/01/2013"), None);
    }

    #[test]
    fn zoned_datetimes_use_local_wall_clock() {
        // 2013-01-31 23:30:00 UTC
        let utc = from_epoch(1_359_675_000_000, TimeUnit::Milliseconds).unwrap();

        let berlin = column_offset("created_at", "+01:00");
        assert_eq!(
            wall_clock(utc, berlin),
            NaiveDate::from_ymd_opt(2013, 2, 1).unwrap().and_hms_opt(0, 30, 0).unwrap()
        );
        assert_eq!(
            wall_clock(utc, berlin),
            parse_timestamp("2013-02-01T00:30:00+01:00").unwrap()
        );

        assert_eq!(column_offset("created_at", "UTC"), None);
        assert_eq!(column_offset("created_at", "America/New_York"), None);
        assert_eq!(wall_clock(utc, None), utc.naive_utc());
    }

    #[test]
    fn epoch_day_conversion() {
        assert_eq!(
            date_from_epoch_days(0),
            NaiveDate::from_ymd_opt(1970, 1, 1)
        );
        assert_eq!(
            date_from_epoch_days(15_418),
            NaiveDate::from_ymd_opt(2012, 3, 19)
        );
    }
}
