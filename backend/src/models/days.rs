//! Weekly day-pattern codec.
//!
//! A day pattern is seven independent flags. Decoding is per-flag substring
//! containment over the case-folded text, so tokens that overlap (`"th"`
//! triggers both Tuesday's `"t"` and Thursday's `"th"`) set every flag they
//! satisfy. The weekend words `"sat"` and `"sun"` are matched first and
//! removed before the single-letter weekday checks, so `"SAT"` does not also
//! read as Tuesday.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DayPattern {
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
}

const LABELS: [&str; 7] = ["M", "T", "W", "Th", "F", "Sa", "Su"];

impl DayPattern {
    /// Decode free text such as `"MWF"`, `"TR"` or `"Sat"`.
    pub fn parse(text: &str) -> Self {
        let folded = text.to_lowercase();
        let saturday = folded.contains("sat");
        let sunday = folded.contains("sun");
        let weekdays = folded.replace("sat", " ").replace("sun", " ");

        Self {
            monday: weekdays.contains('m'),
            tuesday: weekdays.contains('t'),
            wednesday: weekdays.contains('w'),
            thursday: weekdays.contains('r') || weekdays.contains("th"),
            friday: weekdays.contains('f'),
            saturday,
            sunday,
        }
    }

    /// Flags in Monday..Sunday order.
    pub fn flags(&self) -> [bool; 7] {
        [
            self.monday,
            self.tuesday,
            self.wednesday,
            self.thursday,
            self.friday,
            self.saturday,
            self.sunday,
        ]
    }

    pub fn from_flags(flags: [bool; 7]) -> Self {
        let [monday, tuesday, wednesday, thursday, friday, saturday, sunday] = flags;
        Self {
            monday,
            tuesday,
            wednesday,
            thursday,
            friday,
            saturday,
            sunday,
        }
    }

    /// Number of days flagged.
    pub fn count(&self) -> usize {
        self.flags().iter().filter(|f| **f).count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// True when every day flagged on `other` is also flagged here.
    pub fn covers(&self, other: &DayPattern) -> bool {
        self.flags()
            .iter()
            .zip(other.flags().iter())
            .all(|(mine, theirs)| !theirs || *mine)
    }

    /// Display labels for the flagged days, in day order.
    pub fn labels(&self) -> String {
        self.flags()
            .iter()
            .zip(LABELS)
            .filter(|(flag, _)| **flag)
            .map(|(_, label)| label)
            .collect()
    }
}

impl fmt::Display for DayPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.labels())
    }
}
