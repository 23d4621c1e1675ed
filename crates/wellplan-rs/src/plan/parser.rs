//! Line-oriented parsing of plan text into reminders.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// One line of a generated plan, optionally time-stamped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderRecord {
    pub clock_time: Option<NaiveTime>,
    pub activity: String,
    #[serde(default)]
    pub completed: bool,
}

impl ReminderRecord {
    /// `"HH:MM"`, or `"--:--"` when the line had no valid time.
    pub fn time_label(&self) -> String {
        self.clock_time
            .map_or_else(|| "--:--".to_string(), |t| t.format("%H:%M").to_string())
    }

    fn untimed(line: &str) -> Self {
        Self {
            clock_time: None,
            activity: line.to_string(),
            completed: false,
        }
    }
}

/// Parse a strict 24-hour `HH:MM` token: two digits, a colon, two digits.
///
/// Rejects single-digit hours, seconds, and AM/PM suffixes.
pub fn parse_clock_time(token: &str) -> Option<NaiveTime> {
    let bytes = token.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return None;
    }
    let digit = |i: usize| {
        let b = bytes[i];
        b.is_ascii_digit().then(|| u32::from(b - b'0'))
    };
    let hour = digit(0)? * 10 + digit(1)?;
    let minute = digit(3)? * 10 + digit(4)?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Parse one trimmed, non-empty line.
fn parse_line(line: &str) -> ReminderRecord {
    match line.split_once(' ') {
        Some((token, rest)) => match parse_clock_time(token) {
            Some(time) => ReminderRecord {
                clock_time: Some(time),
                activity: rest.to_string(),
                completed: false,
            },
            None => ReminderRecord::untimed(line),
        },
        None => ReminderRecord::untimed(line),
    }
}

/// Turn raw plan text into reminders, one per non-blank line, in order.
///
/// A line whose first space-separated token is a valid `HH:MM` yields a
/// timed reminder with the remainder as activity. Any other line is kept
/// whole with no time.
pub fn parse_reminders(raw_text: &str) -> Vec<ReminderRecord> {
    raw_text
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_line)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::CANNED_PLAN;

    fn hm(h: u32, m: u32) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(h, m, 0)
    }

    #[test]
    fn timed_line_splits_on_first_space() {
        let r = parse_reminders("08:00 Water: Drink 250ml of water");
        assert_eq!(
            r,
            vec![ReminderRecord {
                clock_time: hm(8, 0),
                activity: "Water: Drink 250ml of water".into(),
                completed: false,
            }]
        );
    }

    #[test]
    fn no_space_line_kept_untimed() {
        let r = parse_reminders("Morning");
        assert_eq!(r, vec![ReminderRecord::untimed("Morning")]);
        // A bare valid time with nothing after it is still untimed.
        assert_eq!(parse_reminders("08:00")[0].clock_time, None);
    }

    #[test]
    fn word_token_keeps_full_line() {
        let r = parse_reminders("Morning routine");
        assert_eq!(r[0], ReminderRecord::untimed("Morning routine"));

        let r = parse_reminders("Noon Lunch time");
        assert_eq!(r[0], ReminderRecord::untimed("Noon Lunch time"));
    }

    #[test]
    fn out_of_range_times_rejected() {
        for line in [
            "24:00 Sleep",
            "23:60 Sleep",
            "8:00 Water",
            "08:00:00 Water",
            "08:00AM Water",
            "0800 Water",
            "ab:cd Water",
        ] {
            let r = parse_reminders(line);
            assert_eq!(r[0].clock_time, None, "{line} should not parse");
            assert_eq!(r[0].activity, line);
        }
    }

    #[test]
    fn boundary_times_accepted() {
        assert_eq!(parse_clock_time("00:00"), hm(0, 0));
        assert_eq!(parse_clock_time("23:59"), hm(23, 59));
    }

    #[test]
    fn blank_lines_skipped_and_lines_trimmed() {
        let text = "\n  08:30 Food: Oatmeal  \n\n\t\r\n   \nDrink water\r\n";
        let r = parse_reminders(text);
        assert_eq!(r.len(), 2);
        assert_eq!(r[0].clock_time, hm(8, 30));
        assert_eq!(r[0].activity, "Food: Oatmeal");
        assert_eq!(r[1], ReminderRecord::untimed("Drink water"));
    }

    #[test]
    fn duplicates_are_not_merged() {
        let r = parse_reminders("10:00 Water: Drink\n10:00 Water: Drink");
        assert_eq!(r.len(), 2);
        assert_eq!(r[0], r[1]);
    }

    #[test]
    fn count_matches_non_blank_lines() {
        let samples = [
            "",
            "one",
            "a\n\nb\n  \nc",
            "Disclaimer: general advice only.\n07:00 Water: Glass\n\n12:00 Food: Soup",
            CANNED_PLAN,
        ];
        for text in samples {
            let expected = text.split('\n').filter(|l| !l.trim().is_empty()).count();
            assert_eq!(parse_reminders(text).len(), expected, "text: {text:?}");
        }
    }

    #[test]
    fn deterministic() {
        let text = "Disclaimer line\n09:00 Activity: Walk\nbogus 99:99";
        assert_eq!(parse_reminders(text), parse_reminders(text));
    }

    #[test]
    fn round_trip_every_minute_of_an_hour_grid() {
        for hour in [0, 9, 12, 23] {
            for minute in [0, 1, 30, 59] {
                let token = format!("{hour:02}:{minute:02}");
                let r = parse_reminders(&format!("{token} Rest: Nap"));
                assert_eq!(r[0].clock_time, hm(hour, minute));
                assert_eq!(r[0].activity, "Rest: Nap");
                assert_eq!(r[0].time_label(), token);
            }
        }
    }

    #[test]
    fn canned_plan_parses_fully_timed() {
        let r = parse_reminders(CANNED_PLAN);
        assert_eq!(r.len(), 9);
        assert!(r.iter().all(|x| x.clock_time.is_some() && !x.completed));
        assert_eq!(r[8].activity, "Sleep: Aim for 7-9 hours of quality sleep");
    }

    #[test]
    fn untimed_label() {
        assert_eq!(ReminderRecord::untimed("x").time_label(), "--:--");
    }
}
