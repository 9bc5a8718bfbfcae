use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Session, SessionView};

pub const PREVIEW_LIMIT: usize = 3;

pub fn earliest_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN)
}

pub fn latest_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Month,
    Week,
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "month" => Ok(ViewMode::Month),
            "week" => Ok(ViewMode::Week),
            other => Err(format!("unknown view mode '{other}', expected month or week")),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Month => f.write_str("month"),
            ViewMode::Week => f.write_str("week"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ClassFilter {
    #[default]
    All,
    Only(String),
}

impl ClassFilter {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => ClassFilter::All,
            Some(value) if value.eq_ignore_ascii_case("all") => ClassFilter::All,
            Some(value) => ClassFilter::Only(value.to_string()),
        }
    }

    pub fn matches(&self, session: &Session) -> bool {
        match self {
            ClassFilter::All => true,
            ClassFilter::Only(class_type) => session.class_type == *class_type,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ClassFilter::All => "all",
            ClassFilter::Only(class_type) => class_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DayCell {
    #[schema(value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
    pub day_number: Option<u32>,
    pub is_today: bool,
    pub is_past: bool,
    pub session_count: usize,
    pub sessions: Vec<SessionView>,
    pub overflow: usize,
}

impl DayCell {
    fn padding() -> Self {
        Self {
            date: None,
            day_number: None,
            is_today: false,
            is_past: false,
            session_count: 0,
            sessions: Vec::new(),
            overflow: 0,
        }
    }

    fn for_date(
        date: NaiveDate,
        sessions: &[Session],
        filter: &ClassFilter,
        today: NaiveDate,
        preview_limit: Option<usize>,
    ) -> Self {
        let on_day = sessions_on_date(date, sessions, filter);
        let session_count = on_day.len();
        let shown = preview_limit.unwrap_or(session_count).min(session_count);
        Self {
            date: Some(date),
            day_number: Some(date.day()),
            is_today: date == today,
            is_past: date < today,
            session_count,
            sessions: on_day.iter().take(shown).map(SessionView::from).collect(),
            overflow: session_count - shown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ScheduleGrid {
    pub view: ViewMode,
    #[schema(value_type = String, format = "date")]
    pub reference: NaiveDate,
    pub label: String,
    pub filter: String,
    #[schema(value_type = String, format = "date")]
    pub previous: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub next: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub today: NaiveDate,
    pub cells: Vec<DayCell>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct ScheduleStats {
    pub total_sessions: usize,
    pub total_bookings: u64,
    pub average_capacity_percent: u32,
}

// Stable: sessions with identical times keep upstream order.
pub fn sessions_on_date(date: NaiveDate, sessions: &[Session], filter: &ClassFilter) -> Vec<Session> {
    let mut on_day: Vec<Session> = sessions
        .iter()
        .filter(|s| s.date == date && filter.matches(s))
        .cloned()
        .collect();
    on_day.sort_by_key(|s| (s.start_time, s.end_time));
    on_day
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

pub fn cells_for_month(
    reference: NaiveDate,
    sessions: &[Session],
    filter: &ClassFilter,
    today: NaiveDate,
) -> Vec<DayCell> {
    let first = first_of_month(reference);
    let leading = first.weekday().num_days_from_sunday() as usize;

    let mut cells: Vec<DayCell> = (0..leading).map(|_| DayCell::padding()).collect();
    cells.extend(
        first
            .iter_days()
            .take_while(|day| day.month() == first.month())
            .map(|day| DayCell::for_date(day, sessions, filter, today, Some(PREVIEW_LIMIT))),
    );
    cells
}

pub fn cells_for_week(
    reference: NaiveDate,
    sessions: &[Session],
    filter: &ClassFilter,
    today: NaiveDate,
) -> Vec<DayCell> {
    let reference = reference.clamp(earliest_date(), latest_date());
    let sunday = reference
        .checked_sub_days(Days::new(u64::from(reference.weekday().num_days_from_sunday())))
        .unwrap_or(reference);
    sunday
        .iter_days()
        .take(7)
        .map(|day| DayCell::for_date(day, sessions, filter, today, None))
        .collect()
}

// Month steps land on the 1st so Jan 31 + 1 never skips February.
// Results clamp to years 1..=9999.
pub fn advance(reference: NaiveDate, view: ViewMode, steps: i32) -> NaiveDate {
    let moved = match view {
        ViewMode::Month => {
            let first = first_of_month(reference);
            let months = Months::new(steps.unsigned_abs());
            if steps >= 0 {
                first.checked_add_months(months)
            } else {
                first.checked_sub_months(months)
            }
        }
        ViewMode::Week => {
            let days = Days::new(u64::from(steps.unsigned_abs()) * 7);
            if steps >= 0 {
                reference.checked_add_days(days)
            } else {
                reference.checked_sub_days(days)
            }
        }
    };
    moved
        .unwrap_or(if steps >= 0 {
            latest_date()
        } else {
            earliest_date()
        })
        .clamp(earliest_date(), latest_date())
}

pub fn today(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

pub fn build_grid(
    reference: NaiveDate,
    view: ViewMode,
    sessions: &[Session],
    filter: &ClassFilter,
    today: NaiveDate,
) -> ScheduleGrid {
    let cells = match view {
        ViewMode::Month => cells_for_month(reference, sessions, filter, today),
        ViewMode::Week => cells_for_week(reference, sessions, filter, today),
    };
    ScheduleGrid {
        view,
        reference,
        label: period_label(reference),
        filter: filter.as_str().to_string(),
        previous: advance(reference, view, -1),
        next: advance(reference, view, 1),
        today,
        cells,
    }
}

pub fn period_label(reference: NaiveDate) -> String {
    reference.format("%B %Y").to_string()
}

// Midnight renders as `12:00 AM`.
pub fn format_time_12h(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

pub fn class_types(sessions: &[Session]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for session in sessions {
        if !seen.contains(&session.class_type) {
            seen.push(session.class_type.clone());
        }
    }
    seen
}

pub fn stats(sessions: &[Session], filter: &ClassFilter) -> ScheduleStats {
    let matching: Vec<&Session> = sessions.iter().filter(|s| filter.matches(s)).collect();
    let total_bookings = matching
        .iter()
        .map(|s| u64::from(s.current_bookings))
        .sum();
    let average_capacity_percent = if matching.is_empty() {
        0
    } else {
        let ratio_sum: f64 = matching.iter().map(|s| s.fill_ratio()).sum();
        (ratio_sum / matching.len() as f64 * 100.0).round() as u32
    };
    ScheduleStats {
        total_sessions: matching.len(),
        total_bookings,
        average_capacity_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn session(id: i64, class_type: &str, day: NaiveDate, start: u32) -> Session {
        Session {
            id,
            class_type: class_type.to_string(),
            date: day,
            start_time: time(start, 0),
            end_time: time(start + 1, 0),
            current_bookings: 2,
            max_members: 10,
            price: 20.0,
        }
    }

    #[test]
    fn test_month_leading_blanks_for_march_2024() {
        let cells = cells_for_month(date(2024, 3, 1), &[], &ClassFilter::All, date(2024, 3, 10));
        assert_eq!(cells.len(), 5 + 31);
        assert!(cells[..5].iter().all(|c| c.date.is_none()));
        assert_eq!(cells[5].date, Some(date(2024, 3, 1)));
        assert_eq!(cells.last().unwrap().day_number, Some(31));
    }

    #[test]
    fn test_month_cell_count_matches_calendar() {
        for year in [2023, 2024] {
            for month in 1..=12 {
                let first = date(year, month, 1);
                let cells = cells_for_month(first, &[], &ClassFilter::All, first);
                let blanks = cells.iter().take_while(|c| c.date.is_none()).count();
                let days = cells.iter().filter(|c| c.date.is_some()).count();
                assert!(blanks <= 6);
                assert_eq!(blanks, first.weekday().num_days_from_sunday() as usize);
                assert_eq!(blanks + days, cells.len());
                let next = advance(first, ViewMode::Month, 1);
                assert_eq!(days as i64, (next - first).num_days());
            }
        }
    }

    #[test]
    fn test_month_reference_mid_month_uses_same_grid() {
        let a = cells_for_month(date(2024, 2, 1), &[], &ClassFilter::All, date(2024, 1, 1));
        let b = cells_for_month(date(2024, 2, 29), &[], &ClassFilter::All, date(2024, 1, 1));
        assert_eq!(a, b);
        assert_eq!(a.iter().filter(|c| c.date.is_some()).count(), 29);
    }

    #[test]
    fn test_session_lands_only_on_its_day() {
        let sessions = vec![session(1, "Boxing", date(2024, 3, 15), 9)];
        let cells = cells_for_month(date(2024, 3, 1), &sessions, &ClassFilter::All, date(2024, 3, 1));
        for cell in &cells {
            let expected = usize::from(cell.date == Some(date(2024, 3, 15)));
            assert_eq!(cell.session_count, expected, "cell {:?}", cell.date);
        }
    }

    #[test]
    fn test_preview_cap_and_overflow() {
        let day = date(2024, 3, 15);
        let sessions: Vec<Session> = (0..5).map(|i| session(i, "Yoga", day, 8 + i as u32)).collect();
        let month = cells_for_month(day, &sessions, &ClassFilter::All, day);
        let cell = month.iter().find(|c| c.date == Some(day)).unwrap();
        assert_eq!(cell.session_count, 5);
        assert_eq!(cell.sessions.len(), PREVIEW_LIMIT);
        assert_eq!(cell.overflow, 2);

        let week = cells_for_week(day, &sessions, &ClassFilter::All, day);
        let cell = week.iter().find(|c| c.date == Some(day)).unwrap();
        assert_eq!(cell.sessions.len(), 5);
        assert_eq!(cell.overflow, 0);
    }

    #[test]
    fn test_today_and_past_flags() {
        let today = date(2024, 3, 10);
        let cells = cells_for_month(date(2024, 3, 1), &[], &ClassFilter::All, today);
        let dated: Vec<&DayCell> = cells.iter().filter(|c| c.date.is_some()).collect();
        assert!(dated[8].is_past && !dated[8].is_today);
        assert!(dated[9].is_today && !dated[9].is_past);
        assert!(!dated[10].is_today && !dated[10].is_past);
        assert_eq!(dated.iter().filter(|c| c.is_today).count(), 1);
    }

    #[test]
    fn test_week_is_seven_contiguous_days_from_sunday() {
        // 2024-03-13 is a Wednesday
        for reference in [date(2024, 3, 10), date(2024, 3, 13), date(2024, 3, 16)] {
            let cells = cells_for_week(reference, &[], &ClassFilter::All, reference);
            assert_eq!(cells.len(), 7);
            let dates: Vec<NaiveDate> = cells.iter().map(|c| c.date.unwrap()).collect();
            assert_eq!(dates[0], date(2024, 3, 10));
            assert_eq!(dates[0].weekday().num_days_from_sunday(), 0);
            for pair in dates.windows(2) {
                assert_eq!((pair[1] - pair[0]).num_days(), 1);
            }
        }
    }

    #[test]
    fn test_week_spanning_month_boundary() {
        let cells = cells_for_week(date(2024, 3, 1), &[], &ClassFilter::All, date(2024, 3, 1));
        assert_eq!(cells[0].date, Some(date(2024, 2, 25)));
        assert_eq!(cells[6].date, Some(date(2024, 3, 2)));
    }

    #[test]
    fn test_sessions_on_date_filter() {
        let day = date(2024, 3, 15);
        let sessions = vec![
            session(1, "Boxing", day, 9),
            session(2, "Yoga", day, 10),
            session(3, "Boxing", date(2024, 3, 16), 9),
        ];
        let boxing = sessions_on_date(day, &sessions, &ClassFilter::parse(Some("Boxing")));
        assert_eq!(boxing.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1]);

        let all = sessions_on_date(day, &sessions, &ClassFilter::parse(Some("all")));
        assert_eq!(all.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_sessions_on_date_sorted_by_start_time() {
        let day = date(2024, 3, 15);
        let sessions = vec![
            session(1, "Boxing", day, 18),
            session(2, "Yoga", day, 7),
            session(3, "HIIT", day, 12),
            session(4, "Spin", day, 7),
        ];
        let ordered = sessions_on_date(day, &sessions, &ClassFilter::All);
        assert_eq!(ordered.iter().map(|s| s.id).collect::<Vec<_>>(), vec![2, 4, 3, 1]);
    }

    #[test]
    fn test_advance_month_clamps_to_first() {
        assert_eq!(advance(date(2024, 1, 31), ViewMode::Month, 1), date(2024, 2, 1));
        assert_eq!(advance(date(2024, 3, 31), ViewMode::Month, -1), date(2024, 2, 1));
        assert_eq!(advance(date(2024, 12, 15), ViewMode::Month, 1), date(2025, 1, 1));
        assert_eq!(advance(date(2024, 1, 15), ViewMode::Month, -13), date(2022, 12, 1));
        assert_eq!(advance(date(2024, 1, 15), ViewMode::Month, 0), date(2024, 1, 1));
    }

    #[test]
    fn test_advance_week_steps_seven_days() {
        assert_eq!(advance(date(2024, 2, 27), ViewMode::Week, 1), date(2024, 3, 5));
        assert_eq!(advance(date(2024, 3, 5), ViewMode::Week, -2), date(2024, 2, 20));
    }

    #[test]
    fn test_advance_clamps_to_supported_years() {
        assert_eq!(advance(latest_date(), ViewMode::Week, 1), latest_date());
        assert_eq!(advance(earliest_date(), ViewMode::Month, -1), earliest_date());
        assert_eq!(advance(date(9999, 12, 1), ViewMode::Month, 1), latest_date());
        assert_eq!(advance(date(1, 1, 3), ViewMode::Week, -1), earliest_date());
        assert_eq!(advance(NaiveDate::MAX, ViewMode::Week, -1), latest_date());
        assert_eq!(advance(NaiveDate::MIN, ViewMode::Week, 1), earliest_date());
    }

    #[test]
    fn test_week_at_range_edges_has_seven_cells() {
        for reference in [earliest_date(), latest_date(), NaiveDate::MIN, NaiveDate::MAX] {
            let cells = cells_for_week(reference, &[], &ClassFilter::All, date(2024, 3, 13));
            assert_eq!(cells.len(), 7, "week of {reference}");
            assert!(cells.iter().all(|c| c.date.is_some()));
        }
    }

    #[test]
    fn test_today_follows_timezone() {
        let ahead = today(chrono_tz::Pacific::Kiritimati);
        let behind = today(chrono_tz::Pacific::Pago_Pago);
        let days = (ahead - behind).num_days();
        assert!((1..=2).contains(&days), "Kiritimati {ahead} vs Pago Pago {behind}");
    }

    #[test]
    fn test_build_grid_is_idempotent_and_leaves_input_alone() {
        let day = date(2024, 3, 15);
        let sessions = vec![session(2, "Yoga", day, 18), session(1, "Boxing", day, 9)];
        let before = sessions.clone();
        let filter = ClassFilter::All;
        let first = build_grid(day, ViewMode::Month, &sessions, &filter, day);
        let second = build_grid(day, ViewMode::Month, &sessions, &filter, day);
        assert_eq!(first, second);
        assert_eq!(sessions, before);
        assert_eq!(first.label, "March 2024");
        assert_eq!(first.previous, date(2024, 2, 1));
        assert_eq!(first.next, date(2024, 4, 1));
    }

    #[test]
    fn test_view_mode_parse() {
        assert_eq!("Week".parse::<ViewMode>(), Ok(ViewMode::Week));
        assert_eq!("month".parse::<ViewMode>(), Ok(ViewMode::Month));
        assert!("year".parse::<ViewMode>().is_err());
    }

    #[test]
    fn test_format_time_12h() {
        assert_eq!(format_time_12h(time(17, 5)), "5:05 PM");
        assert_eq!(format_time_12h(time(0, 30)), "12:30 AM");
        assert_eq!(format_time_12h(time(12, 0)), "12:00 PM");
        assert_eq!(format_time_12h(time(9, 45)), "9:45 AM");
    }

    #[test]
    fn test_class_types_first_seen_order() {
        let day = date(2024, 3, 15);
        let sessions = vec![
            session(1, "Yoga", day, 9),
            session(2, "Boxing", day, 10),
            session(3, "Yoga", day, 11),
        ];
        assert_eq!(class_types(&sessions), vec!["Yoga", "Boxing"]);
    }

    #[test]
    fn test_stats() {
        let day = date(2024, 3, 15);
        let mut full = session(1, "Boxing", day, 9);
        full.current_bookings = 10;
        let half = Session {
            current_bookings: 5,
            ..session(2, "Boxing", day, 11)
        };
        let other = session(3, "Yoga", day, 13);
        let sessions = vec![full, half, other];

        let boxing = stats(&sessions, &ClassFilter::parse(Some("Boxing")));
        assert_eq!(boxing.total_sessions, 2);
        assert_eq!(boxing.total_bookings, 15);
        assert_eq!(boxing.average_capacity_percent, 75);

        let none = stats(&sessions, &ClassFilter::parse(Some("Pilates")));
        assert_eq!(none.total_sessions, 0);
        assert_eq!(none.average_capacity_percent, 0);
    }
}
