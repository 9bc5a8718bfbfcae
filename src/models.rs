use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

pub mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(raw.trim(), FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S"))
            .map_err(D::Error::custom)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Session {
    pub id: i64,
    pub class_type: String,
    #[schema(value_type = String, format = "date", example = "2024-03-15")]
    pub date: NaiveDate,
    #[serde(with = "hh_mm")]
    #[schema(value_type = String, example = "17:00")]
    pub start_time: NaiveTime,
    #[serde(with = "hh_mm")]
    #[schema(value_type = String, example = "18:00")]
    pub end_time: NaiveTime,
    pub current_bookings: u32,
    pub max_members: u32,
    pub price: f64,
}

impl Session {
    pub fn is_full(&self) -> bool {
        self.current_bookings == self.max_members
    }

    pub fn spots_remaining(&self) -> u32 {
        self.max_members.saturating_sub(self.current_bookings)
    }

    // 0.0..=1.0
    pub fn fill_ratio(&self) -> f64 {
        if self.max_members == 0 {
            return 0.0;
        }
        f64::from(self.current_bookings) / f64::from(self.max_members)
    }

    pub fn validate(&self) -> Result<(), RecordError> {
        if self.end_time <= self.start_time {
            return Err(RecordError::TimeRange);
        }
        if self.current_bookings > self.max_members {
            return Err(RecordError::OverCapacity {
                current: self.current_bookings,
                max: self.max_members,
            });
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(RecordError::NegativePrice);
        }
        Ok(())
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, RecordError> {
        let session: Session = serde_json::from_value(value)?;
        session.validate()?;
        Ok(session)
    }
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("end_time must be after start_time")]
    TimeRange,
    #[error("current_bookings {current} exceeds max_members {max}")]
    OverCapacity { current: u32, max: u32 },
    #[error("price must be a non-negative amount")]
    NegativePrice,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct RejectedRecord {
    pub index: usize,
    pub id: Option<i64>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionFeed {
    pub sessions: Vec<Session>,
    pub rejected: Vec<RejectedRecord>,
}

impl SessionFeed {
    pub fn from_values(values: Vec<serde_json::Value>) -> Self {
        let mut feed = SessionFeed::default();
        for (index, value) in values.into_iter().enumerate() {
            let id = value.get("id").and_then(serde_json::Value::as_i64);
            match Session::from_value(value) {
                Ok(session) => feed.sessions.push(session),
                Err(err) => {
                    tracing::warn!(index, ?id, error = %err, "rejecting session record");
                    feed.rejected.push(RejectedRecord {
                        index,
                        id,
                        reason: err.to_string(),
                    });
                }
            }
        }
        feed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ClassType {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
pub struct SessionView {
    #[serde(flatten)]
    pub session: Session,
    pub is_full: bool,
    pub spots_remaining: u32,
    pub fill_percent: u32,
    pub start_label: String,
    pub end_label: String,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        Self {
            session: session.clone(),
            is_full: session.is_full(),
            spots_remaining: session.spots_remaining(),
            fill_percent: (session.fill_ratio() * 100.0).round() as u32,
            start_label: crate::schedule::format_time_12h(session.start_time),
            end_label: crate::schedule::format_time_12h(session.end_time),
        }
    }
}
