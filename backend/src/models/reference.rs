//! Reference entities the resolver looks up: campuses, buildings,
//! departments and faculty. They are persisted as-is.

use serde::{Deserialize, Serialize};

use crate::api::{BuildingId, CampusId, DepartmentId, FacultyId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campus {
    pub id: CampusId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCampus {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub campus_id: Option<CampusId>,
    /// Short code used in spreadsheets, e.g. `"SCI"`.
    pub prefix: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBuilding {
    #[serde(default)]
    pub campus_id: Option<CampusId>,
    pub prefix: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDepartment {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faculty {
    pub id: FacultyId,
    pub name: String,
    pub department_id: Option<DepartmentId>,
}

impl Faculty {
    /// Case-folded form used for name lookups. Postgres compares against
    /// `lower(faculty_name)`, so both backends fold with full Unicode rules.
    pub fn fold_name(name: &str) -> String {
        name.to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFaculty {
    pub name: String,
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
}
