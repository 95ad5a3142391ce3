use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{HL7_NULL, pad_zeroes, parse_digits};
use crate::error::{Hl7Error, Result};

const DATATYPE: &str = "DT";

/// Calendar date in HL7 form: `YYYY[MM[DD]]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonDt {
    value: Option<String>,
    year: i32,
    month: i32,
    day: i32,
}

impl CommonDt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_optional(Some(text))
    }

    pub fn parse_optional(text: Option<&str>) -> Result<Self> {
        let mut dt = Self::new();
        dt.set_value(text)?;
        Ok(dt)
    }

    pub fn from_naive_date(date: NaiveDate) -> Result<Self> {
        let mut dt = Self::new();
        dt.set_year_month_day_precision(date.year(), date.month() as i32, date.day() as i32)?;
        Ok(dt)
    }

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
        if !val.is_ascii() || !matches!(val.len(), 4 | 6 | 8) {
            return Err(Hl7Error::data_type(format!(
                "The length of the DT datatype value does not conform to an allowable format. Value: {val}"
            )));
        }

        let mut parsed = Self::new();
        parsed.year = parse_digits(&val[0..4], DATATYPE, val)?;
        check_year(parsed.year)?;
        if val.len() >= 6 {
            parsed.month = parse_digits(&val[4..6], DATATYPE, val)?;
            check_month(parsed.month)?;
        }
        if val.len() == 8 {
            parsed.day = parse_digits(&val[6..8], DATATYPE, val)?;
            check_day(parsed.year, parsed.month, parsed.day)?;
        }
        parsed.value = Some(val.to_string());
        *self = parsed;
        Ok(())
    }

    pub fn value(&self) -> Option<String> {
        self.value.clone()
    }

    pub fn set_year_precision(&mut self, year: i32) -> Result<()> {
        check_year(year)?;
        *self = Self {
            value: Some(pad_zeroes(year.into(), 4)),
            year,
            ..Self::default()
        };
        Ok(())
    }

    pub fn set_year_month_precision(&mut self, year: i32, month: i32) -> Result<()> {
        check_year(year)?;
        check_month(month)?;
        *self = Self {
            value: Some(format!(
                "{}{}",
                pad_zeroes(year.into(), 4),
                pad_zeroes(month.into(), 2)
            )),
            year,
            month,
            day: 0,
        };
        Ok(())
    }

    pub fn set_year_month_day_precision(&mut self, year: i32, month: i32, day: i32) -> Result<()> {
        check_year(year)?;
        check_month(month)?;
        check_day(year, month, day)?;
        *self = Self {
            value: Some(format!(
                "{}{}{}",
                pad_zeroes(year.into(), 4),
                pad_zeroes(month.into(), 2),
                pad_zeroes(day.into(), 2)
            )),
            year,
            month,
            day,
        };
        Ok(())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Month, or 0 when the literal has year precision only.
    pub fn month(&self) -> i32 {
        self.month
    }

    /// Day, or 0 when the literal is coarser than day precision.
    pub fn day(&self) -> i32 {
        self.day
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    /// Missing month or day default to the first.
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        match self.value.as_deref() {
            None | Some(HL7_NULL) => None,
            Some(_) => NaiveDate::from_ymd_opt(
                self.year,
                self.month.max(1) as u32,
                self.day.max(1) as u32,
            ),
        }
    }
}

fn check_year(year: i32) -> Result<()> {
    if !(0..=9999).contains(&year) {
        return Err(Hl7Error::data_type(
            "The year value of the DT datatype must be >=0 and <=9999",
        ));
    }
    Ok(())
}

fn check_month(month: i32) -> Result<()> {
    if !(1..=12).contains(&month) {
        return Err(Hl7Error::data_type(
            "The month value of the DT datatype must be >=1 and <=12",
        ));
    }
    Ok(())
}

fn check_day(year: i32, month: i32, day: i32) -> Result<()> {
    if !(1..=31).contains(&day) {
        return Err(Hl7Error::data_type(
            "The day value of the DT datatype must be >=1 and <=31",
        ));
    }
    if NaiveDate::from_ymd_opt(year, month as u32, day as u32).is_none() {
        return Err(Hl7Error::data_type(
            "The date specified in the DT datatype is not a valid date",
        ));
    }
    Ok(())
}

impl fmt::Display for CommonDt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value.as_deref().unwrap_or(""))
    }
}

impl FromStr for CommonDt {
    type Err = Hl7Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_precisions() {
        let dt = CommonDt::parse("1990").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (1990, 0, 0));

        let dt = CommonDt::parse("199010").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (1990, 10, 0));

        let dt = CommonDt::parse("19901012").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (1990, 10, 12));
        assert_eq!(dt.value().as_deref(), Some("19901012"));
    }

    #[test]
    fn test_rejects_invalid_dates() {
        for literal in ["199", "1990101", "19901312", "19900230", "1990ab01", "19900100"] {
            assert!(
                matches!(CommonDt::parse(literal), Err(Hl7Error::DataType { .. })),
                "{literal}"
            );
        }
    }

    #[test]
    fn test_leap_day() {
        assert!(CommonDt::parse("20240229").is_ok());
        assert!(CommonDt::parse("20230229").is_err());
    }

    #[test]
    fn test_precision_setters_truncate() {
        let mut dt = CommonDt::parse("19901012").unwrap();
        dt.set_year_month_precision(2001, 2).unwrap();
        assert_eq!(dt.value().as_deref(), Some("200102"));
        assert_eq!(dt.day(), 0);

        dt.set_year_precision(7).unwrap();
        assert_eq!(dt.value().as_deref(), Some("0007"));
        assert_eq!(dt.month(), 0);

        assert!(dt.set_year_month_day_precision(2001, 4, 31).is_err());
        assert!(dt.set_year_precision(10000).is_err());
        assert_eq!(dt.value().as_deref(), Some("0007"));
    }

    #[test]
    fn test_chrono_conversion() {
        let date = NaiveDate::from_ymd_opt(2023, 7, 4).unwrap();
        let dt = CommonDt::from_naive_date(date).unwrap();
        assert_eq!(dt.to_string(), "20230704");
        assert_eq!(dt.to_naive_date(), Some(date));
        assert_eq!(
            CommonDt::parse("2023").unwrap().to_naive_date(),
            NaiveDate::from_ymd_opt(2023, 1, 1)
        );
    }
}
