// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Display;
use std::fmt::Formatter;

use chrono::DateTime;
use chrono::SubsecRound;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;

/// A UTC timestamp with millisecond precision, written the way browsers'
/// `Date.prototype.toISOString` writes them.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn new(dt: DateTime<Utc>) -> Self {
        Self(dt.trunc_subsecs(3))
    }

    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }

    /// The current time.
    #[cfg(feature = "clock")]
    pub fn now() -> Self {
        Self::new(Utc::now())
    }

    /// Build a timestamp from milliseconds since the Unix epoch, as returned
    /// by `Date.now()` in JavaScript.
    pub fn from_unix_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(Self)
    }

    pub fn unix_millis(self) -> i64 {
        self.0.timestamp_millis()
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S%.3fZ"))
    }
}

impl TryFrom<String> for Timestamp {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let dt = DateTime::parse_from_rfc3339(&value)
            .map_err(|_| ErrorReport::new(format!("Failed to parse timestamp: '{value}'.")))?;
        Ok(Timestamp::new(dt.with_timezone(&Utc)))
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> String {
        ts.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;

    #[test]
    fn test_timestamp_to_string() -> Fallible<()> {
        let ts = Timestamp::try_from("2023-10-05T14:30:15.123Z".to_string())?;
        assert_eq!(ts.to_string(), "2023-10-05T14:30:15.123Z");
        Ok(())
    }

    #[test]
    fn test_offset_is_normalised() -> Fallible<()> {
        let ts = Timestamp::try_from("2023-10-05T16:30:15.123+02:00".to_string())?;
        assert_eq!(ts.to_string(), "2023-10-05T14:30:15.123Z");
        Ok(())
    }

    #[test]
    fn test_unix_millis() {
        let ts = Timestamp::from_unix_millis(1_700_000_000_123).unwrap();
        assert_eq!(ts.to_string(), "2023-11-14T22:13:20.123Z");
        assert_eq!(ts.unix_millis(), 1_700_000_000_123);
    }

    #[test]
    fn test_invalid() {
        assert!(Timestamp::try_from("yesterday".to_string()).is_err());
    }

    #[test]
    fn test_serialize() -> Fallible<()> {
        let ts = Timestamp::from_unix_millis(0).unwrap();
        let serialized = serde_json::to_string(&ts)?;
        assert_eq!(serialized, "\"1970-01-01T00:00:00.000Z\"");
        let deserialized: Timestamp = serde_json::from_str(&serialized)?;
        assert_eq!(deserialized, ts);
        Ok(())
    }
}
