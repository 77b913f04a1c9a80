//! ISO-8601 timestamps with a fixed millisecond fraction (`…T10:00:00.000Z`).

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    DateTime::<Utc>::deserialize(deserializer)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Stamped {
        #[serde(with = "crate::database::models::timestamp")]
        at: DateTime<Utc>,
    }

    #[test]
    fn whole_seconds_keep_the_millisecond_fraction() {
        let at = Utc.with_ymd_and_hms(2020, 1, 28, 10, 0, 0).unwrap();
        let json = serde_json::to_value(Stamped { at }).unwrap();
        assert_eq!(json["at"], "2020-01-28T10:00:00.000Z");
    }

    #[test]
    fn reads_back_what_it_writes() {
        let at = Utc.with_ymd_and_hms(2020, 1, 28, 10, 0, 0).unwrap() + chrono::Duration::milliseconds(42);
        let json = serde_json::to_string(&Stamped { at }).unwrap();
        assert!(json.contains("2020-01-28T10:00:00.042Z"));
        assert_eq!(serde_json::from_str::<Stamped>(&json).unwrap(), Stamped { at });
    }
}
