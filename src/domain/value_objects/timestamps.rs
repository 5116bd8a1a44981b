use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Timestamp(pub OffsetDateTime);

impl Timestamp {
    pub fn now_utc() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    pub fn from(dt: OffsetDateTime) -> Self {
        Self(dt.to_offset(UtcOffset::UTC))
    }

    /// Parse an RFC 3339 string. Returns `None` for anything unparsable.
    pub fn parse_rfc3339(value: &str) -> Option<Self> {
        OffsetDateTime::parse(value, &Rfc3339).ok().map(Self::from)
    }

    /// Returns the inner UTC `OffsetDateTime` without consuming the wrapper.
    pub fn as_inner(&self) -> OffsetDateTime {
        self.0
    }

    /// Consumes the wrapper and returns the inner UTC `OffsetDateTime`.
    pub fn into_inner(self) -> OffsetDateTime {
        self.0
    }

    /// Signed milliseconds from `earlier` to `self`.
    pub fn millis_since(&self, earlier: Timestamp) -> i64 {
        let millis = (self.0 - earlier.0).whole_milliseconds();
        millis.clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }

    pub fn to_rfc3339(&self) -> String {
        self.0.format(&Rfc3339).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn given_now_utc_when_called_should_return_utc_offset() {
        let result = Timestamp::now_utc();
        assert_eq!(result.as_inner().offset(), UtcOffset::UTC);
    }

    #[test]
    fn given_from_with_non_utc_offset_when_called_should_store_same_instant_in_utc() {
        let offset = UtcOffset::from_hms(-3, 0, 0).expect("valid offset");
        let dt = OffsetDateTime::now_utc().to_offset(offset);
        let result = Timestamp::from(dt);
        assert_eq!(result.as_inner().offset(), UtcOffset::UTC);
        assert_eq!(result.as_inner().unix_timestamp(), dt.unix_timestamp());
    }

    #[test]
    fn given_rfc3339_string_when_parsed_should_return_timestamp() {
        let parsed = Timestamp::parse_rfc3339("2024-01-01T00:00:00Z").expect("valid");
        assert_eq!(parsed.as_inner(), datetime!(2024-01-01 0:00 UTC));
    }

    #[test]
    fn given_garbage_when_parsed_should_return_none() {
        assert!(Timestamp::parse_rfc3339("yesterday").is_none());
        assert!(Timestamp::parse_rfc3339("").is_none());
    }

    #[test]
    fn given_two_instants_when_millis_since_should_return_signed_delta() {
        let earlier = Timestamp::from(datetime!(2024-01-01 0:00 UTC));
        let later = Timestamp::from(datetime!(2024-01-01 0:00:01.5 UTC));
        assert_eq!(later.millis_since(earlier), 1500);
        assert_eq!(earlier.millis_since(later), -1500);
    }
}
