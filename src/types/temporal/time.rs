use chrono::{FixedOffset, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{
    HL7_NULL, format_offset, offset_to_hhmm, pad_zeroes, parse_digits, parse_offset,
    split_offset, split_seconds, validate_offset,
};
use crate::error::{Hl7Error, Result};

const DATATYPE: &str = "TM";

/// Time of day in HL7 form: `HH[MM[SS[.S[S[S[S]]]]]][+/-ZZZZ]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonTm {
    /// Last accepted literal without its offset.
    value: Option<String>,
    hour: i32,
    minute: i32,
    second: i32,
    fract_second: f64,
    /// Signed HHMM offset; `None` when the literal carried no offset.
    gmt_offset: Option<i32>,
    omit_offset: bool,
}

impl CommonTm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_optional(Some(text))
    }

    /// Like `parse`, with `None` giving an empty value.
    pub fn parse_optional(text: Option<&str>) -> Result<Self> {
        let mut tm = Self::new();
        tm.set_value(text)?;
        Ok(tm)
    }

    /// Build a full-precision literal from a chrono time.
    pub fn from_naive_time(time: NaiveTime) -> Result<Self> {
        let mut tm = Self::new();
        let seconds = f64::from(time.second()) + f64::from(time.nanosecond()) / 1e9;
        tm.set_hour_min_second_precision(time.hour() as i32, time.minute() as i32, seconds)?;
        Ok(tm)
    }

    pub fn from_time_with_offset(time: NaiveTime, offset: FixedOffset) -> Result<Self> {
        let mut tm = Self::from_naive_time(time)?;
        tm.set_offset(offset_to_hhmm(&offset))?;
        Ok(tm)
    }

    /// Replace the stored value with `value`.
    ///
    /// `None` or an empty string clears the value. Without an offset in the
    /// literal the offset is omitted on output instead of defaulting to the
    /// local timezone.
    pub fn set_value(&mut self, value: Option<&str>) -> Result<()> {
        let Some(val) = value.filter(|v| !v.is_empty()) else {
            *self = Self::default();
            return Ok(());
        };
        if val == HL7_NULL {
            *self = Self {
                value: Some(val.to_string()),
                ..Self::default()
            };
            return Ok(());
        }
        if !val.is_ascii() {
            return Err(Hl7Error::data_type(format!(
                "The TM datatype value contains non-numeric characters. Value: {val}"
            )));
        }

        let (time_val, offset) = split_offset(val);
        if offset.is_some_and(|o| o.len() != 5) {
            return Err(Hl7Error::data_type(format!(
                "The length of the GMT offset for the TM datatype value does not conform to the allowable format [+/-ZZZZ]. Value: {val}"
            )));
        }

        let length_ok = match time_val.find('.') {
            Some(dot) => dot == 6 && (8..=11).contains(&time_val.len()),
            None => matches!(time_val.len(), 2 | 4 | 6),
        };
        if !length_ok {
            return Err(Hl7Error::data_type(format!(
                "The length of the TM datatype value does not conform to an allowable format. Value: {val}"
            )));
        }

        let mut parsed = Self::new();
        parsed.hour = parse_digits(&time_val[0..2], DATATYPE, val)?;
        check_hour(parsed.hour)?;
        if time_val.len() >= 4 {
            parsed.minute = parse_digits(&time_val[2..4], DATATYPE, val)?;
            check_minute(parsed.minute)?;
        }
        if time_val.len() >= 6 {
            parsed.second = parse_digits(&time_val[4..6], DATATYPE, val)?;
            if !(0..=59).contains(&parsed.second) {
                return Err(Hl7Error::data_type(
                    "The seconds value of the TM datatype must be >=0 and <=59",
                ));
            }
        }
        if time_val.len() >= 8 {
            let digits = &time_val[7..];
            parse_digits(digits, DATATYPE, val)?;
            let fract = format!("0.{digits}").parse::<f64>().map_err(|_| {
                Hl7Error::data_type(format!(
                    "The fractional second value of the TM datatype could not be parsed. Value: {val}"
                ))
            })?;
            if !(0.0..1.0).contains(&fract) {
                return Err(Hl7Error::data_type(
                    "The fractional second value of the TM datatype must be >= 0 and < 1",
                ));
            }
            parsed.fract_second = fract;
        }

        match offset {
            Some(offset) => {
                parsed.gmt_offset = Some(parse_offset(offset, DATATYPE, val)?);
                parsed.omit_offset = false;
            }
            None => parsed.omit_offset = true,
        }
        parsed.value = Some(time_val.to_string());
        *self = parsed;
        Ok(())
    }

    /// The literal, including the offset unless it is omitted.
    pub fn value(&self) -> Option<String> {
        let value = self.value.as_ref()?;
        match self.gmt_offset {
            Some(offset) if !self.omit_offset && value != HL7_NULL => {
                Some(format!("{value}{}", format_offset(offset)))
            }
            _ => Some(value.clone()),
        }
    }

    pub fn set_hour_precision(&mut self, hour: i32) -> Result<()> {
        check_hour(hour)?;
        *self = Self {
            value: Some(pad_zeroes(hour.into(), 2)),
            hour,
            omit_offset: true,
            ..Self::default()
        };
        Ok(())
    }

    pub fn set_hour_minute_precision(&mut self, hour: i32, minute: i32) -> Result<()> {
        check_hour(hour)?;
        check_minute(minute)?;
        *self = Self {
            value: Some(format!(
                "{}{}",
                pad_zeroes(hour.into(), 2),
                pad_zeroes(minute.into(), 2)
            )),
            hour,
            minute,
            omit_offset: true,
            ..Self::default()
        };
        Ok(())
    }

    /// Seconds are rounded to 1/10000ths before being split, so at most four
    /// fractional digits are emitted.
    pub fn set_hour_min_second_precision(
        &mut self,
        hour: i32,
        minute: i32,
        seconds: f64,
    ) -> Result<()> {
        check_hour(hour)?;
        check_minute(minute)?;
        let (whole, ten_thousandths) = split_seconds(seconds, DATATYPE)?;

        let mut value = format!(
            "{}{}{}",
            pad_zeroes(hour.into(), 2),
            pad_zeroes(minute.into(), 2),
            pad_zeroes(whole.into(), 2)
        );
        if ten_thousandths > 0 {
            value.push('.');
            value.push_str(&pad_zeroes(ten_thousandths.into(), 4));
        }

        *self = Self {
            value: Some(value),
            hour,
            minute,
            second: whole,
            fract_second: f64::from(ten_thousandths) / 10_000.0,
            gmt_offset: None,
            omit_offset: true,
        };
        Ok(())
    }

    /// Set the signed HHMM offset; it is emitted on output from now on.
    pub fn set_offset(&mut self, signed_offset: i32) -> Result<()> {
        validate_offset(signed_offset, DATATYPE)?;
        self.gmt_offset = Some(signed_offset);
        self.omit_offset = false;
        Ok(())
    }

    pub fn hour(&self) -> i32 {
        self.hour
    }

    pub fn minute(&self) -> i32 {
        self.minute
    }

    pub fn second(&self) -> i32 {
        self.second
    }

    pub fn fract_second(&self) -> f64 {
        self.fract_second
    }

    pub fn gmt_offset(&self) -> Option<i32> {
        self.gmt_offset
    }

    pub fn omits_offset(&self) -> bool {
        self.omit_offset
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    pub fn to_naive_time(&self) -> Option<NaiveTime> {
        match self.value.as_deref() {
            None | Some(HL7_NULL) => None,
            Some(_) => {
                let nanos = (self.fract_second * 1e9).round() as u32;
                NaiveTime::from_hms_nano_opt(
                    self.hour as u32,
                    self.minute as u32,
                    self.second as u32,
                    nanos,
                )
            }
        }
    }
}

fn check_hour(hour: i32) -> Result<()> {
    if !(0..=23).contains(&hour) {
        return Err(Hl7Error::data_type(
            "The hour value of the TM datatype must be >=0 and <=23",
        ));
    }
    Ok(())
}

fn check_minute(minute: i32) -> Result<()> {
    if !(0..=59).contains(&minute) {
        return Err(Hl7Error::data_type(
            "The minute value of the TM datatype must be >=0 and <=59",
        ));
    }
    Ok(())
}

impl fmt::Display for CommonTm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value().as_deref().unwrap_or(""))
    }
}

impl FromStr for CommonTm {
    type Err = Hl7Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
