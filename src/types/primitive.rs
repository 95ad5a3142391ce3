use super::temporal::{CommonDt, CommonTm, CommonTs};
use super::{ExtraComponents, PrimitiveKind, UNKNOWN_TYPE_NAME};
use crate::error::Result;

/// Single-valued datatype.
///
/// The text value is the only stored state. Temporal views are parsed from
/// it on request and written back as text, so they can never go stale.
#[derive(Debug, Clone)]
pub struct Primitive {
    type_name: String,
    kind: PrimitiveKind,
    table: Option<u32>,
    value: Option<String>,
    extra: ExtraComponents,
}

impl Primitive {
    pub fn new(type_name: impl Into<String>, kind: PrimitiveKind) -> Self {
        Self {
            type_name: type_name.into(),
            kind,
            table: None,
            value: None,
            extra: ExtraComponents::new(),
        }
    }

    /// Unconstrained primitive used for unknown content.
    pub fn generic() -> Self {
        Self::new(UNKNOWN_TYPE_NAME, PrimitiveKind::Generic)
    }

    pub fn with_table(mut self, table: u32) -> Self {
        self.table = Some(table);
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    pub fn table(&self) -> Option<u32> {
        self.table
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Temporal kinds reject literals their parser does not accept; the
    /// stored value is unchanged on error.
    pub fn set_value(&mut self, value: Option<&str>) -> Result<()> {
        match self.kind {
            PrimitiveKind::Time => {
                CommonTm::parse_optional(value)?;
            }
            PrimitiveKind::Date => {
                CommonDt::parse_optional(value)?;
            }
            PrimitiveKind::DateTime => {
                CommonTs::parse_optional(value)?;
            }
            _ => {}
        }
        self.value = value.map(str::to_string);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.value.as_deref().is_none_or(str::is_empty) && self.extra.is_empty()
    }

    pub fn extra_components(&self) -> &ExtraComponents {
        &self.extra
    }

    pub fn extra_components_mut(&mut self) -> &mut ExtraComponents {
        &mut self.extra
    }

    /// The value read as a TM literal.
    pub fn time(&self) -> Result<CommonTm> {
        CommonTm::parse_optional(self.value())
    }

    pub fn set_time(&mut self, time: &CommonTm) -> Result<()> {
        self.set_value(time.value().as_deref())
    }

    /// The value read as a DT literal.
    pub fn date(&self) -> Result<CommonDt> {
        CommonDt::parse_optional(self.value())
    }

    pub fn set_date(&mut self, date: &CommonDt) -> Result<()> {
        self.set_value(date.value().as_deref())
    }

    /// The value read as a TS/DTM literal.
    pub fn date_time(&self) -> Result<CommonTs> {
        CommonTs::parse_optional(self.value())
    }

    pub fn set_date_time(&mut self, timestamp: &CommonTs) -> Result<()> {
        self.set_value(timestamp.value().as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Hl7Error;

    #[test]
    fn test_generic_accepts_anything() {
        let mut primitive = Primitive::generic();
        assert_eq!(primitive.type_name(), "UNKNOWN");
        primitive.set_value(Some("anything at all")).unwrap();
        assert_eq!(primitive.value(), Some("anything at all"));
    }

    #[test]
    fn test_temporal_kinds_validate() {
        let mut tm = Primitive::new("TM", PrimitiveKind::Time);
        assert!(matches!(
            tm.set_value(Some("2530")),
            Err(Hl7Error::DataType { .. })
        ));
        assert_eq!(tm.value(), None);
        tm.set_value(Some("0800")).unwrap();
        assert_eq!(tm.time().unwrap().hour(), 8);

        let mut dt = Primitive::new("DT", PrimitiveKind::Date);
        assert!(dt.set_value(Some("19901312")).is_err());
        dt.set_value(Some("\"\"")).unwrap();
        assert_eq!(dt.value(), Some("\"\""));
    }

    #[test]
    fn test_structured_setters_write_text() {
        let mut ts = Primitive::new("DTM", PrimitiveKind::DateTime);
        let mut value = CommonTs::new();
        value.set_date_minute_precision(2023, 7, 4, 12, 30).unwrap();
        ts.set_date_time(&value).unwrap();
        assert_eq!(ts.value(), Some("202307041230"));
        assert_eq!(ts.date_time().unwrap().minute(), 30);
    }

    #[test]
    fn test_empty_string_counts_as_empty() {
        let mut primitive = Primitive::generic();
        primitive.set_value(Some("")).unwrap();
        assert!(primitive.is_empty());
        assert_eq!(primitive.value(), Some(""));
    }
}
