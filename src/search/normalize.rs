//! Raw upstream record normalization
//!
//! Upstream records are loosely structured JSON objects. Normalization is
//! additive: every field passes through, the three date fields are parsed
//! into UTC timestamps and an agency abbreviation is attached.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

use crate::types::{AppError, AppResult};

/// An upstream record as received.
pub type RawRecord = Map<String, Value>;

/// Upstream timestamp format, always UTC.
pub const UPSTREAM_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
/// Format used when showing dates to users.
pub const DISPLAY_DATE_FORMAT: &str = "%m/%d/%Y";

pub const CLOSE_DATE: &str = "close_dt";
pub const OPEN_DATE: &str = "open_dt";
pub const POSTED_DATE: &str = "posted_dt";
pub const AGENCY: &str = "agency";
pub const AGENCY_ABBREVIATION: &str = "agency_abbr";

const DATE_FIELDS: [&str; 3] = [CLOSE_DATE, OPEN_DATE, POSTED_DATE];

const DEFAULT_AGENCIES: &[(&str, &str)] = &[
    ("Department of Health and Human Services", "HHS"),
    ("National Science Foundation", "NSF"),
    ("Department of Commerce", "DOC"),
    ("National Aeronautics and Space Administration", "NASA"),
    ("Department of Energy - Office of Science", "DOE"),
    ("Department of the Air Force", "USAF"),
    ("Other Defense Agencies", "DOD"),
];

/// Full agency name to display abbreviation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgencyTable {
    entries: HashMap<String, String>,
}

impl AgencyTable {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, agency: &str) -> Option<&str> {
        self.entries.get(agency).map(String::as_str)
    }

    /// Abbreviation for `agency`, or the name itself when none is known.
    pub fn abbreviate<'a>(&'a self, agency: &'a str) -> &'a str {
        self.get(agency).unwrap_or(agency)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AgencyTable {
    fn default() -> Self {
        Self::new(DEFAULT_AGENCIES.iter().copied())
    }
}

/// A solicitation ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    #[serde(flatten)]
    pub fields: RawRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_dt: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_dt: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_dt: Option<DateTime<Utc>>,
    /// Short agency code. Absent when `agency` is missing or `null`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agency_abbr: Option<String>,
}

impl NormalizedRecord {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn solnbr(&self) -> Option<&str> {
        self.get_str("solnbr")
    }

    pub fn title(&self) -> Option<&str> {
        self.get_str("title")
    }

    pub fn agency(&self) -> Option<&str> {
        self.get_str(AGENCY)
    }

    /// Full description, falling back to the summary.
    pub fn description(&self) -> Option<&str> {
        self.get_str("description").or_else(|| self.get_str("summary"))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResultNormalizer {
    agencies: AgencyTable,
}

impl ResultNormalizer {
    pub fn new(agencies: AgencyTable) -> Self {
        Self { agencies }
    }

    pub fn agencies(&self) -> &AgencyTable {
        &self.agencies
    }

    pub fn normalize(&self, mut raw: RawRecord) -> AppResult<NormalizedRecord> {
        let mut dates = [None, None, None];
        for (slot, field) in dates.iter_mut().zip(DATE_FIELDS) {
            if let Some(value) = raw.remove(field) {
                *slot = Some(parse_date_value(field, &value)?);
            }
        }
        let [close_dt, open_dt, posted_dt] = dates;

        // Replaced by the computed abbreviation below.
        raw.remove(AGENCY_ABBREVIATION);

        let agency_abbr = match raw.get(AGENCY) {
            Some(Value::String(agency)) => Some(self.agencies.abbreviate(agency).to_string()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };

        Ok(NormalizedRecord {
            fields: raw,
            close_dt,
            open_dt,
            posted_dt,
            agency_abbr,
        })
    }

    pub fn normalize_all(&self, raw: Vec<RawRecord>) -> AppResult<Vec<NormalizedRecord>> {
        raw.into_iter().map(|r| self.normalize(r)).collect()
    }
}

/// Parse an upstream timestamp such as `2013-04-05T00:00:00Z`.
pub fn parse_upstream_date(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, UPSTREAM_DATE_FORMAT)
        .ok()
        .map(|dt| dt.and_utc())
}

fn parse_date_value(field: &str, value: &Value) -> AppResult<DateTime<Utc>> {
    let parsed = value.as_str().and_then(parse_upstream_date);
    parsed.ok_or_else(|| {
        let raw = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        debug!(field = %field, value = %raw, "Unparsable upstream date");
        AppError::MalformedRecord {
            field: field.to_string(),
            value: raw,
        }
    })
}

/// `%m/%d/%Y` rendering, empty for absent dates.
pub fn format_display_date(date: Option<&DateTime<Utc>>) -> String {
    date.map(|d| d.format(DISPLAY_DATE_FORMAT).to_string())
        .unwrap_or_default()
}
