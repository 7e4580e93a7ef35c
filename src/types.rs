/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a wire value is not a member of one of the fixed enumerations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid {} value: {}", self.kind, self.value)
    }
}

impl std::error::Error for ParseEnumError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Designation {
    Developer,
    Manager,
    Designer,
    Tester,
    #[serde(rename = "HR")]
    Hr,
}

impl Designation {
    pub const ALL: [Designation; 5] = [
        Designation::Developer,
        Designation::Manager,
        Designation::Designer,
        Designation::Tester,
        Designation::Hr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Designation::Developer => "Developer",
            Designation::Manager => "Manager",
            Designation::Designer => "Designer",
            Designation::Tester => "Tester",
            Designation::Hr => "HR",
        }
    }
}

impl FromStr for Designation {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| ParseEnumError { kind: "designation", value: s.to_string() })
    }
}

impl fmt::Display for Designation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl FromStr for Gender {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| ParseEnumError { kind: "gender", value: s.to_string() })
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Course {
    #[serde(rename = "BCA")]
    Bca,
    #[serde(rename = "MCA")]
    Mca,
    #[serde(rename = "BSC")]
    Bsc,
}

impl Course {
    pub const ALL: [Course; 3] = [Course::Bca, Course::Mca, Course::Bsc];

    pub fn as_str(&self) -> &'static str {
        match self {
            Course::Bca => "BCA",
            Course::Mca => "MCA",
            Course::Bsc => "BSC",
        }
    }
}

impl FromStr for Course {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ParseEnumError { kind: "course", value: s.to_string() })
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// De-duplicated set of courses, kept in first-seen order.
///
/// Wire payloads deliver `course` as a repeated form field, a single value, or a
/// comma separated list; [`CourseSet::parse`] accepts all three.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct CourseSet(Vec<Course>);

impl CourseSet {
    pub fn parse<I, S>(values: I) -> Result<Self, ParseEnumError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = CourseSet::default();
        for value in values {
            for part in value.as_ref().split(',') {
                let part = part.trim();
                if part.is_empty() {
                    continue;
                }
                set.insert(part.parse()?);
            }
        }
        Ok(set)
    }

    /// Adds a course, returning false when it was already present
    pub fn insert(&mut self, course: Course) -> bool {
        if self.0.contains(&course) {
            return false;
        }
        self.0.push(course);
        true
    }

    pub fn contains(&self, course: Course) -> bool {
        self.0.contains(&course)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Course> + '_ {
        self.0.iter().copied()
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(|c| c.as_str().to_string()).collect()
    }
}

impl TryFrom<Vec<String>> for CourseSet {
    type Error = ParseEnumError;

    fn try_from(values: Vec<String>) -> Result<Self, Self::Error> {
        CourseSet::parse(values)
    }
}

impl From<CourseSet> for Vec<String> {
    fn from(set: CourseSet) -> Self {
        set.to_strings()
    }
}

impl FromIterator<Course> for CourseSet {
    fn from_iter<T: IntoIterator<Item = Course>>(iter: T) -> Self {
        let mut set = CourseSet::default();
        for course in iter {
            set.insert(course);
        }
        set
    }
}

/// Columns the employee list can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Name,
    Email,
    Mobile,
    Designation,
    Gender,
    #[default]
    CreateDate,
    Active,
}

impl SortField {
    /// Parses the wire name; unknown names fall back to `createDate`
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("name") => SortField::Name,
            Some("email") => SortField::Email,
            Some("mobile") => SortField::Mobile,
            Some("designation") => SortField::Designation,
            Some("gender") => SortField::Gender,
            Some("active") => SortField::Active,
            _ => SortField::CreateDate,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Email => "email",
            SortField::Mobile => "mobile",
            SortField::Designation => "designation",
            SortField::Gender => "gender",
            SortField::CreateDate => "create_date",
            SortField::Active => "active",
        }
    }

    /// Text columns; these sort by byte value in every store
    pub fn is_text(&self) -> bool {
        !matches!(self, SortField::CreateDate | SortField::Active)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_set_removes_duplicates_in_first_seen_order() {
        let set = CourseSet::parse(["MCA", "BCA", "MCA", "BCA"]).unwrap();
        assert_eq!(set.to_strings(), vec!["MCA", "BCA"]);
    }

    #[test]
    fn course_set_accepts_comma_separated_scalar() {
        let set = CourseSet::parse(["BSC, MCA,,"]).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(Course::Bsc));
        assert!(set.contains(Course::Mca));
    }

    #[test]
    fn course_set_rejects_values_outside_enumeration() {
        let err = CourseSet::parse(["BCA", "PHD"]).unwrap_err();
        assert_eq!(err.kind, "course");
        assert_eq!(err.value, "PHD");
        assert_eq!(err.to_string(), "Invalid course value: PHD");
    }

    #[test]
    fn course_set_deserializes_and_dedups() {
        let set: CourseSet = serde_json::from_str(r#"["BSC","BSC"]"#).unwrap();
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["BSC"]"#);
    }

    #[test]
    fn designation_round_trips_hr_spelling() {
        assert_eq!("HR".parse::<Designation>().unwrap(), Designation::Hr);
        assert_eq!(serde_json::to_string(&Designation::Hr).unwrap(), "\"HR\"");
        assert!("hr".parse::<Designation>().is_err());
    }

    #[test]
    fn sort_params_fall_back_to_defaults() {
        assert_eq!(SortField::from_param(Some("salary")), SortField::CreateDate);
        assert_eq!(SortField::from_param(None), SortField::CreateDate);
        assert_eq!(SortField::from_param(Some("createDate")).column(), "create_date");
        assert!(SortField::Name.is_text());
        assert!(!SortField::Active.is_text());
        assert_eq!(SortDirection::from_param(Some("DESC")), SortDirection::Desc);
        assert_eq!(SortDirection::from_param(Some("sideways")), SortDirection::Asc);
    }
}
