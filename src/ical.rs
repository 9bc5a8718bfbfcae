use chrono::NaiveDateTime;
use icalendar::{Calendar, Component, Event, EventLike};

use crate::models::Session;
use crate::schedule::format_time_12h;

#[derive(Clone)]
pub struct ICalExporter {
    calendar_name: String,
}

impl Default for ICalExporter {
    fn default() -> Self {
        Self::new("Gym Training Schedule")
    }
}

impl ICalExporter {
    pub fn new(calendar_name: impl Into<String>) -> Self {
        Self {
            calendar_name: calendar_name.into(),
        }
    }

    pub fn generate(&self, sessions: &[Session]) -> Vec<u8> {
        let mut calendar = Calendar::new();
        calendar.name(&self.calendar_name);

        for session in sessions {
            let start = NaiveDateTime::new(session.date, session.start_time);
            let end = NaiveDateTime::new(session.date, session.end_time);

            let mut event = Event::new();
            event.summary(&session.class_type);
            event.starts(start);
            event.ends(end);
            event.description(&format!(
                "{} - {}\nBookings: {}/{}{}\nPrice: ${:.2}",
                format_time_12h(session.start_time),
                format_time_12h(session.end_time),
                session.current_bookings,
                session.max_members,
                if session.is_full() { " (FULL)" } else { "" },
                session.price
            ));
            event.uid(&format!("session-{}@gym-schedule", session.id));
            calendar.push(event);
        }

        calendar.to_string().into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::*;

    fn session() -> Session {
        Session {
            id: 42,
            class_type: "Boxing".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            start_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            current_bookings: 10,
            max_members: 10,
            price: 25.0,
        }
    }

    #[test]
    fn test_generate_single_session() {
        let exporter = ICalExporter::default();
        let body = String::from_utf8(exporter.generate(&[session()])).unwrap();
        assert!(body.contains("BEGIN:VCALENDAR"));
        assert!(body.contains("BEGIN:VEVENT"));
        assert!(body.contains("SUMMARY:Boxing"));
        assert!(body.contains("DTSTART:20240315T170000"));
        assert!(body.contains("DTEND:20240315T183000"));
        assert!(body.contains("UID:session-42@gym-schedule"));
        assert!(body.contains("FULL"));
    }

    #[test]
    fn test_generate_empty_still_valid_calendar() {
        let exporter = ICalExporter::new("Trainer");
        let body = String::from_utf8(exporter.generate(&[])).unwrap();
        assert!(body.contains("BEGIN:VCALENDAR"));
        assert!(!body.contains("BEGIN:VEVENT"));
    }
}
