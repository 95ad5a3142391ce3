use chrono::{DateTime, FixedOffset, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{
    CommonDt, CommonTm, HL7_NULL, format_offset, hhmm_to_offset, offset_to_hhmm, parse_offset,
    split_offset, validate_offset,
};
use crate::error::{Hl7Error, Result};

const DATATYPE: &str = "TS";

/// Timestamp in HL7 form: `YYYY[MM[DD[HH[MM[SS[.S[S[S[S]]]]]]]]][+/-ZZZZ]`,
/// composed of a date part and an optional time-of-day part.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonTs {
    date: Option<CommonDt>,
    time: Option<CommonTm>,
    gmt_offset: Option<i32>,
    omit_offset: bool,
    explicit_null: bool,
}

impl CommonTs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_optional(Some(text))
    }

    pub fn parse_optional(text: Option<&str>) -> Result<Self> {
        let mut ts = Self::new();
        ts.set_value(text)?;
        Ok(ts)
    }

    pub fn from_naive_datetime(datetime: NaiveDateTime) -> Result<Self> {
        let date = CommonDt::from_naive_date(datetime.date())?;
        let time = datetime.time();
        let mut ts = Self::new();
        ts.set_date_second_precision(
            date.year(),
            date.month(),
            date.day(),
            time.hour() as i32,
            time.minute() as i32,
            f64::from(time.second()) + f64::from(time.nanosecond()) / 1e9,
        )?;
        Ok(ts)
    }

    pub fn from_datetime(datetime: DateTime<FixedOffset>) -> Result<Self> {
        let mut ts = Self::from_naive_datetime(datetime.naive_local())?;
        ts.set_offset(offset_to_hhmm(datetime.offset()))?;
        Ok(ts)
    }

    pub fn set_value(&mut self, value: Option<&str>) -> Result<()> {
        let Some(val) = value.filter(|v| !v.is_empty()) else {
            *self = Self::default();
            return Ok(());
        };
        if val == HL7_NULL {
            *self = Self {
                explicit_null: true,
                ..Self::default()
            };
            return Ok(());
        }
        if !val.is_ascii() {
            return Err(Hl7Error::data_type(format!(
                "The TS datatype value contains non-numeric characters. Value: {val}"
            )));
        }

        let (body, offset) = split_offset(val);
        if offset.is_some_and(|o| o.len() != 5) {
            return Err(Hl7Error::data_type(format!(
                "The length of the GMT offset for the TS datatype value does not conform to the allowable format [+/-ZZZZ]. Value: {val}"
            )));
        }
        let length_ok = match body.find('.') {
            Some(dot) => dot == 14 && (16..=19).contains(&body.len()),
            None => matches!(body.len(), 4 | 6 | 8 | 10 | 12 | 14),
        };
        if !length_ok {
            return Err(Hl7Error::data_type(format!(
                "The length of the TS datatype value does not conform to an allowable format. Value: {val}"
            )));
        }

        let split = body.len().min(8);
        let date = CommonDt::parse(&body[..split]).map_err(|err| invalid_part("date", val, err))?;
        let time = if body.len() > split {
            Some(CommonTm::parse(&body[split..]).map_err(|err| invalid_part("time", val, err))?)
        } else {
            None
        };
        let gmt_offset = offset
            .map(|offset| parse_offset(offset, DATATYPE, val))
            .transpose()?;

        *self = Self {
            date: Some(date),
            time,
            gmt_offset,
            omit_offset: gmt_offset.is_none(),
            explicit_null: false,
        };
        Ok(())
    }

    pub fn value(&self) -> Option<String> {
        if self.explicit_null {
            return Some(HL7_NULL.to_string());
        }
        let mut value = self.date.as_ref()?.value()?;
        if let Some(time) = self.time.as_ref().and_then(CommonTm::value) {
            value.push_str(&time);
        }
        if let Some(offset) = self.gmt_offset.filter(|_| !self.omit_offset) {
            value.push_str(&format_offset(offset));
        }
        Some(value)
    }

    pub fn set_date_precision(&mut self, year: i32, month: i32, day: i32) -> Result<()> {
        let mut date = CommonDt::new();
        date.set_year_month_day_precision(year, month, day)?;
        self.replace(date, None);
        Ok(())
    }

    pub fn set_date_minute_precision(
        &mut self,
        year: i32,
        month: i32,
        day: i32,
        hour: i32,
        minute: i32,
    ) -> Result<()> {
        let mut date = CommonDt::new();
        date.set_year_month_day_precision(year, month, day)?;
        let mut time = CommonTm::new();
        time.set_hour_minute_precision(hour, minute)?;
        self.replace(date, Some(time));
        Ok(())
    }

    pub fn set_date_second_precision(
        &mut self,
        year: i32,
        month: i32,
        day: i32,
        hour: i32,
        minute: i32,
        seconds: f64,
    ) -> Result<()> {
        let mut date = CommonDt::new();
        date.set_year_month_day_precision(year, month, day)?;
        let mut time = CommonTm::new();
        time.set_hour_min_second_precision(hour, minute, seconds)?;
        self.replace(date, Some(time));
        Ok(())
    }

    pub fn set_offset(&mut self, signed_offset: i32) -> Result<()> {
        validate_offset(signed_offset, DATATYPE)?;
        self.gmt_offset = Some(signed_offset);
        self.omit_offset = false;
        Ok(())
    }

    fn replace(&mut self, date: CommonDt, time: Option<CommonTm>) {
        *self = Self {
            date: Some(date),
            time,
            gmt_offset: None,
            omit_offset: true,
            explicit_null: false,
        };
    }

    pub fn date(&self) -> Option<&CommonDt> {
        self.date.as_ref()
    }

    pub fn time(&self) -> Option<&CommonTm> {
        self.time.as_ref()
    }

    pub fn year(&self) -> i32 {
        self.date.as_ref().map_or(0, CommonDt::year)
    }

    pub fn month(&self) -> i32 {
        self.date.as_ref().map_or(0, CommonDt::month)
    }

    pub fn day(&self) -> i32 {
        self.date.as_ref().map_or(0, CommonDt::day)
    }

    pub fn hour(&self) -> i32 {
        self.time.as_ref().map_or(0, CommonTm::hour)
    }

    pub fn minute(&self) -> i32 {
        self.time.as_ref().map_or(0, CommonTm::minute)
    }

    pub fn second(&self) -> i32 {
        self.time.as_ref().map_or(0, CommonTm::second)
    }

    pub fn fract_second(&self) -> f64 {
        self.time.as_ref().map_or(0.0, CommonTm::fract_second)
    }

    pub fn gmt_offset(&self) -> Option<i32> {
        self.gmt_offset
    }

    pub fn omits_offset(&self) -> bool {
        self.omit_offset
    }

    pub fn is_empty(&self) -> bool {
        !self.explicit_null && self.date.is_none()
    }

    pub fn to_naive_datetime(&self) -> Option<NaiveDateTime> {
        let date = self.date.as_ref()?.to_naive_date()?;
        let time = match &self.time {
            Some(time) => time.to_naive_time()?,
            None => NaiveTime::MIN,
        };
        Some(date.and_time(time))
    }

    /// `None` unless the literal carries an explicit offset.
    pub fn to_datetime(&self) -> Option<DateTime<FixedOffset>> {
        let offset = hhmm_to_offset(self.gmt_offset?)?;
        self.to_naive_datetime()?
            .and_local_timezone(offset)
            .single()
    }
}

impl fmt::Display for CommonTs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value().as_deref().unwrap_or(""))
    }
}

impl FromStr for CommonTs {
    type Err = Hl7Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Report a bad date or time part against the whole TS literal.
fn invalid_part(part: &str, val: &str, err: Hl7Error) -> Hl7Error {
    tracing::debug!(part, value = val, error = %err, "Invalid part in TS value");
    Hl7Error::data_type(format!(
        "The {part} part of the {DATATYPE} datatype value is not valid. Value: {val}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_precisions() {
        for literal in [
            "2023",
            "202307",
            "20230704",
            "2023070412",
            "202307041230",
            "20230704123015",
            "20230704123015.1",
            "20230704123015.1234",
            "20230704123015.1234-0500",
            "20230704+0200",
        ] {
            let ts = CommonTs::parse(literal).unwrap();
            assert_eq!(ts.value().as_deref(), Some(literal));
        }
    }

    #[test]
    fn test_components() {
        let ts = CommonTs::parse("20230704123015.25+1100").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2023, 7, 4));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (12, 30, 15));
        assert!((ts.fract_second() - 0.25).abs() < 1e-9);
        assert_eq!(ts.gmt_offset(), Some(1100));
    }

    #[test]
    fn test_rejects_invalid_literals() {
        for literal in [
            "20230",
            "202307041",
            "2023070412301",
            "20231304",
            "2023070425",
            "20230704123015.12345",
            "20230704+05",
        ] {
            assert!(
                matches!(CommonTs::parse(literal), Err(Hl7Error::DataType { .. })),
                "{literal}"
            );
        }
    }

    #[test]
    fn test_bad_time_part_names_timestamp() {
        let err = CommonTs::parse("20230704256000").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("time part of the TS datatype"), "{message}");
        assert!(message.contains("20230704256000"), "{message}");
        assert!(!message.contains("TM datatype"), "{message}");

        let err = CommonTs::parse("20231304").unwrap_err();
        assert!(err.to_string().contains("date part of the TS datatype"));
    }

    #[test]
    fn test_precision_setters_suppress_offset() {
        let mut ts = CommonTs::parse("20230704123015+0100").unwrap();
        ts.set_date_precision(2024, 2, 29).unwrap();
        assert_eq!(ts.value().as_deref(), Some("20240229"));
        assert_eq!(ts.hour(), 0);

        ts.set_date_minute_precision(2024, 2, 29, 6, 5).unwrap();
        assert_eq!(ts.value().as_deref(), Some("202402290605"));

        ts.set_date_second_precision(2024, 2, 29, 6, 5, 9.87654).unwrap();
        assert_eq!(ts.value().as_deref(), Some("20240229060509.8765"));

        ts.set_offset(-700).unwrap();
        assert_eq!(ts.value().as_deref(), Some("20240229060509.8765-0700"));
    }

    #[test]
    fn test_chrono_round_trip() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let datetime = NaiveDateTime::parse_from_str("2023-07-04 12:30:15", "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_local_timezone(offset)
            .unwrap();
        let ts = CommonTs::from_datetime(datetime).unwrap();
        assert_eq!(ts.value().as_deref(), Some("20230704123015+0200"));
        assert_eq!(ts.to_datetime(), Some(datetime));
        assert_eq!(CommonTs::parse("20230704").unwrap().to_datetime(), None);
    }
}
