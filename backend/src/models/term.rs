//! Term codec for slash-delimited strings such as `"23/FA"`.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four semester codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Semester {
    Summer,
    Fall,
    Winter,
    Spring,
}

impl Semester {
    pub const ALL: [Semester; 4] = [
        Semester::Summer,
        Semester::Fall,
        Semester::Winter,
        Semester::Spring,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Semester::Summer => "SU",
            Semester::Fall => "FA",
            Semester::Winter => "WI",
            Semester::Spring => "SP",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Semester flags. All-false is a valid state meaning "no semester resolved".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SemesterFlags {
    pub summer: bool,
    pub fall: bool,
    pub winter: bool,
    pub spring: bool,
}

impl SemesterFlags {
    pub fn only(semester: Semester) -> Self {
        let mut flags = Self::default();
        flags.set(semester, true);
        flags
    }

    pub fn get(&self, semester: Semester) -> bool {
        match semester {
            Semester::Summer => self.summer,
            Semester::Fall => self.fall,
            Semester::Winter => self.winter,
            Semester::Spring => self.spring,
        }
    }

    pub fn set(&mut self, semester: Semester, value: bool) {
        match semester {
            Semester::Summer => self.summer = value,
            Semester::Fall => self.fall = value,
            Semester::Winter => self.winter = value,
            Semester::Spring => self.spring = value,
        }
    }

    /// Semesters whose flag is set.
    pub fn iter(&self) -> impl Iterator<Item = Semester> + '_ {
        Semester::ALL.into_iter().filter(move |s| self.get(*s))
    }

    pub fn any(&self) -> bool {
        self.iter().next().is_some()
    }

    /// True when every semester flagged on `other` is flagged here.
    pub fn covers(&self, other: &SemesterFlags) -> bool {
        other.iter().all(|s| self.get(s))
    }

    /// True when at least one flag is shared.
    pub fn intersects(&self, other: &SemesterFlags) -> bool {
        other.iter().any(|s| self.get(s))
    }
}

/// Parsed term: a year plus semester flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub year: i32,
    pub semesters: SemesterFlags,
}

impl Term {
    /// Parse using the current calendar year as the fallback year.
    pub fn parse(text: &str) -> Self {
        Self::parse_with_default_year(text, chrono::Utc::now().year())
    }

    /// Parse `"<year>/<code>"`. An unparsable year falls back to
    /// `default_year`; an unknown or missing code leaves every flag false.
    pub fn parse_with_default_year(text: &str, default_year: i32) -> Self {
        let mut segments = text.split('/');
        let year = segments
            .next()
            .and_then(|y| y.trim().parse::<i32>().ok())
            .unwrap_or(default_year);
        let semesters = segments
            .next()
            .and_then(|code| Semester::from_code(code.trim()))
            .map(SemesterFlags::only)
            .unwrap_or_default();

        Self { year, semesters }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fall() {
        let term = Term::parse_with_default_year("23/FA", 2000);
        assert_eq!(term.year, 23);
        assert!(term.semesters.fall);
        assert!(!term.semesters.summer);
        assert!(!term.semesters.winter);
        assert!(!term.semesters.spring);
    }

    #[test]
    fn test_parse_trims_code() {
        let term = Term::parse_with_default_year("2024/ SP ", 2000);
        assert_eq!(term.year, 2024);
        assert_eq!(term.semesters, SemesterFlags::only(Semester::Spring));
    }

    #[test]
    fn test_unknown_code_leaves_all_flags_false() {
        let term = Term::parse_with_default_year("23/XX", 2000);
        assert_eq!(term.year, 23);
        assert!(!term.semesters.any());
    }

    #[test]
    fn test_missing_code_leaves_all_flags_false() {
        let term = Term::parse_with_default_year("23", 2000);
        assert!(!term.semesters.any());
    }

    #[test]
    fn test_bad_year_uses_default() {
        let term = Term::parse_with_default_year("xx/WI", 2031);
        assert_eq!(term.year, 2031);
        assert!(term.semesters.winter);
    }

    #[test]
    fn test_codes_are_case_sensitive() {
        let term = Term::parse_with_default_year("23/fa", 2000);
        assert!(!term.semesters.any());
    }

    #[test]
    fn test_flag_relations() {
        let mut both = SemesterFlags::only(Semester::Fall);
        both.set(Semester::Spring, true);
        let fall = SemesterFlags::only(Semester::Fall);
        assert!(both.covers(&fall));
        assert!(!fall.covers(&both));
        assert!(fall.intersects(&both));
        assert!(!fall.intersects(&SemesterFlags::only(Semester::Summer)));
    }
}
