//! Timestamp placeholders in object keys.

use jiff::Timestamp;
use jiff::tz::TimeZone;
use strum::{EnumIter, IntoEnumIterator};

/// Placeholder recognized inside an object key template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(EnumIter)]
pub enum Placeholder {
    /// `{year}`: four-digit year.
    Year,
    /// `{month}`: two-digit month, `01`..=`12`.
    Month,
    /// `{day}`: two-digit day of month.
    Day,
    /// `{hour}`: two-digit hour, `00`..=`23`.
    Hour,
    /// `{minute}`: two-digit minute.
    Minute,
    /// `{second}`: two-digit second.
    Second,
    /// `{epoch}`: whole seconds since the Unix epoch.
    Epoch,
}

impl Placeholder {
    /// Returns the literal token, e.g. `{year}`.
    pub fn token(self) -> &'static str {
        match self {
            Self::Year => "{year}",
            Self::Month => "{month}",
            Self::Day => "{day}",
            Self::Hour => "{hour}",
            Self::Minute => "{minute}",
            Self::Second => "{second}",
            Self::Epoch => "{epoch}",
        }
    }
}

/// Object key template with UTC date/time placeholders.
///
/// ```
/// use s3pipe_core::PathTemplate;
///
/// let at: jiff::Timestamp = "2024-03-05T07:08:09Z".parse().unwrap();
/// let key = PathTemplate::new("export/{year}/{month}/{day}/{hour}{minute}{second}.log").render(at);
/// assert_eq!(key, "export/2024/03/05/070809.log");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    template: String,
}

impl PathTemplate {
    /// Creates a template from its raw form.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Returns the raw template.
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Lists the recognized placeholders used by this template.
    pub fn placeholders(&self) -> Vec<Placeholder> {
        Placeholder::iter()
            .filter(|p| self.template.contains(p.token()))
            .collect()
    }

    /// Expands every placeholder using `at` in UTC.
    ///
    /// Unrecognized `{...}` tokens are kept verbatim.
    pub fn render(&self, at: Timestamp) -> String {
        let utc = at.to_zoned(TimeZone::UTC);

        Placeholder::iter().fold(self.template.clone(), |key, placeholder| {
            if !key.contains(placeholder.token()) {
                return key;
            }

            let value = match placeholder {
                Placeholder::Year => format!("{:04}", utc.year()),
                Placeholder::Month => format!("{:02}", utc.month()),
                Placeholder::Day => format!("{:02}", utc.day()),
                Placeholder::Hour => format!("{:02}", utc.hour()),
                Placeholder::Minute => format!("{:02}", utc.minute()),
                Placeholder::Second => format!("{:02}", utc.second()),
                Placeholder::Epoch => at.as_second().to_string(),
            };

            key.replace(placeholder.token(), &value)
        })
    }
}

impl From<&str> for PathTemplate {
    fn from(template: &str) -> Self {
        Self::new(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    #[test]
    fn expands_date_and_time_parts() {
        let template = PathTemplate::new("export/{year}/{month}/{day}/{hour}{minute}{second}.log");
        assert_eq!(
            template.render(at("2024-03-05T07:08:09Z")),
            "export/2024/03/05/070809.log"
        );
    }

    #[test]
    fn expands_epoch_without_padding() {
        let instant = Timestamp::from_second(1_700_000_000).unwrap();
        assert_eq!(
            PathTemplate::new("dump-{epoch}.bin").render(instant),
            "dump-1700000000.bin"
        );
    }

    #[test]
    fn unknown_placeholders_are_left_alone() {
        assert_eq!(
            PathTemplate::new("{foo}-{year}").render(at("2030-06-01T00:00:00Z")),
            "{foo}-2030"
        );
    }

    #[test]
    fn every_occurrence_is_replaced() {
        assert_eq!(
            PathTemplate::new("{day}/{day}-{month}-{day}").render(at("2024-12-31T23:59:59Z")),
            "31/31-12-31"
        );
    }

    #[test]
    fn non_utc_input_is_normalized_to_utc() {
        assert_eq!(
            PathTemplate::new("{year}-{month}-{day}T{hour}").render(at("2024-01-01T01:30:00+02:00")),
            "2023-12-31T23"
        );
    }

    #[test]
    fn rendering_is_deterministic() {
        let template = PathTemplate::new("{epoch}/{year}{month}{day}");
        let instant = at("2024-03-05T07:08:09Z");
        assert_eq!(template.render(instant), template.render(instant));
    }

    #[test]
    fn template_without_placeholders_is_unchanged() {
        let template = PathTemplate::from("static/key.txt");
        assert!(template.placeholders().is_empty());
        assert_eq!(template.render(Timestamp::UNIX_EPOCH), "static/key.txt");
    }

    #[test]
    fn reports_used_placeholders() {
        let template = PathTemplate::new("{epoch}-{year}-{foo}");
        assert_eq!(
            template.placeholders(),
            [Placeholder::Year, Placeholder::Epoch]
        );
    }
}
