//! Date helper functions

use chrono::{DateTime, Locale, Utc};
use chrono_tz::Tz;

use crate::config::SiteConfig;

/// Formats API timestamps in the site's timezone and language
#[derive(Debug, Clone)]
pub struct DateFormatter {
    date_format: String,
    datetime_format: String,
    tz: Tz,
    locale: Locale,
}

impl DateFormatter {
    pub fn new(date_format: &str, datetime_format: &str, tz: Tz, locale: Locale) -> Self {
        Self {
            date_format: date_format.to_string(),
            datetime_format: datetime_format.to_string(),
            tz,
            locale,
        }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(
            &config.date_format,
            &config.datetime_format,
            config.tz(),
            config.locale(),
        )
    }

    /// e.g. `15 mar 2021`
    pub fn date(&self, date: &DateTime<Utc>) -> String {
        format_localized(date, &self.date_format, self.tz, self.locale)
    }

    /// e.g. `19 mar 2021, às 15:49`
    pub fn datetime(&self, date: &DateTime<Utc>) -> String {
        format_localized(date, &self.datetime_format, self.tz, self.locale)
    }
}

/// Format `date` with a strftime pattern after converting it to `tz`
pub fn format_localized(date: &DateTime<Utc>, format: &str, tz: Tz, locale: Locale) -> String {
    date.with_timezone(&tz)
        .format_localized(format, locale)
        .to_string()
}

/// ISO 8601 / XML format, for `<time datetime>` attributes
pub fn date_xml(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
