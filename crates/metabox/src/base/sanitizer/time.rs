use crate::base::Sanitizer;
use time::{Date, PrimitiveDateTime, UtcOffset, format_description};

/// Storage form for dates; everything parseable normalizes to this.
pub const CANONICAL_DATE_FORMAT: &str = "[year]-[month]-[day]";

/// Storage form for datetimes.
pub const CANONICAL_DATETIME_FORMAT: &str = "[year]-[month]-[day] [hour]:[minute]";

const OFFSET_FORMAT: &str = "[offset_hour sign:mandatory]:[offset_minute]";

///
/// DateFormat
/// Parses with the configured format description and rewrites to the
/// canonical storage form.
///

pub struct DateFormat {
    format: String,
}

impl DateFormat {
    #[must_use]
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }

    #[must_use]
    pub fn canonical() -> Self {
        Self::new(CANONICAL_DATE_FORMAT)
    }
}

impl Sanitizer<String> for DateFormat {
    fn sanitize(&self, value: &mut String) -> Result<(), String> {
        let input = format_description::parse(&self.format)
            .map_err(|_| format!("invalid date format description '{}'", self.format))?;
        let output = format_description::parse(CANONICAL_DATE_FORMAT)
            .map_err(|_| "invalid canonical date format".to_owned())?;

        let date = Date::parse(value.trim(), &input)
            .map_err(|_| format!("'{value}' does not match format '{}'", self.format))?;

        *value = date
            .format(&output)
            .map_err(|err| format!("date failed to format: {err}"))?;

        Ok(())
    }
}

///
/// DatetimeFormat
///

pub struct DatetimeFormat {
    format: String,
}

impl DatetimeFormat {
    #[must_use]
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }

    #[must_use]
    pub fn canonical() -> Self {
        Self::new(CANONICAL_DATETIME_FORMAT)
    }
}

impl Sanitizer<String> for DatetimeFormat {
    fn sanitize(&self, value: &mut String) -> Result<(), String> {
        let input = format_description::parse(&self.format)
            .map_err(|_| format!("invalid datetime format description '{}'", self.format))?;
        let output = format_description::parse(CANONICAL_DATETIME_FORMAT)
            .map_err(|_| "invalid canonical datetime format".to_owned())?;

        let datetime = PrimitiveDateTime::parse(value.trim(), &input)
            .map_err(|_| format!("'{value}' does not match format '{}'", self.format))?;

        *value = datetime
            .format(&output)
            .map_err(|err| format!("datetime failed to format: {err}"))?;

        Ok(())
    }
}

/// Canonicalize a UTC offset like `+2:00` / `-05:30` from a companion
/// timezone field. Anything unparseable is an error for the caller's note.
pub fn canonical_offset(s: &str) -> Result<String, String> {
    let format = format_description::parse(OFFSET_FORMAT)
        .map_err(|_| "invalid offset format".to_owned())?;

    let offset = UtcOffset::parse(s.trim(), &format)
        .map_err(|_| format!("'{s}' is not a UTC offset"))?;

    offset
        .format(&format)
        .map_err(|err| format!("offset failed to format: {err}"))
}

///
/// TESTS
///
