use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::{CourseSet, Designation, Gender, ParseEnumError};

/// Employee record as exposed on the wire
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub designation: Designation,
    pub gender: Gender,
    pub course: CourseSet,
    #[serde(default)]
    pub image: Option<String>,
    pub create_date: DateTime<Utc>,
    pub active: bool,
}

// `_id` is what document-store clients key on; `id` is emitted alongside it.
impl Serialize for Employee {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.image.is_some() { 11 } else { 10 };
        let mut s = serializer.serialize_struct("Employee", len)?;
        s.serialize_field("_id", &self.id)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("name", &self.name)?;
        s.serialize_field("email", &self.email)?;
        s.serialize_field("mobile", &self.mobile)?;
        s.serialize_field("designation", &self.designation)?;
        s.serialize_field("gender", &self.gender)?;
        s.serialize_field("course", &self.course)?;
        if let Some(image) = &self.image {
            s.serialize_field("image", image)?;
        }
        s.serialize_field("createDate", &self.create_date)?;
        s.serialize_field("active", &self.active)?;
        s.end()
    }
}

/// Row shape of the `employees` table
#[derive(Debug, Clone, FromRow)]
pub struct EmployeeRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub designation: String,
    pub gender: String,
    pub course: Vec<String>,
    pub image: Option<String>,
    pub create_date: DateTime<Utc>,
    pub active: bool,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = ParseEnumError;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            email: row.email,
            mobile: row.mobile,
            designation: row.designation.parse()?,
            gender: row.gender.parse()?,
            course: CourseSet::parse(&row.course)?,
            image: row.image,
            create_date: row.create_date,
            active: row.active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Course;

    fn sample() -> Employee {
        Employee {
            id: Uuid::new_v4(),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            mobile: "9876543210".to_string(),
            designation: Designation::Hr,
            gender: Gender::Female,
            course: [Course::Mca].into_iter().collect(),
            image: None,
            create_date: Utc::now(),
            active: true,
        }
    }

    #[test]
    fn serializes_both_id_keys_and_omits_missing_image() {
        let employee = sample();
        let value = serde_json::to_value(&employee).unwrap();
        assert_eq!(value["_id"], value["id"]);
        assert_eq!(value["designation"], "HR");
        assert_eq!(value["course"], serde_json::json!(["MCA"]));
        assert!(value.get("image").is_none());
        assert!(value.get("createDate").is_some());
    }

    #[test]
    fn deserializes_what_it_serializes() {
        let mut employee = sample();
        employee.image = Some("uploads/1-abc-photo.png".to_string());
        let json = serde_json::to_string(&employee).unwrap();
        let back: Employee = serde_json::from_str(&json).unwrap();
        assert_eq!(back, employee);
    }

    #[test]
    fn row_with_unknown_enum_value_is_rejected() {
        let row = EmployeeRow {
            id: Uuid::new_v4(),
            name: "x".into(),
            email: "x@example.com".into(),
            mobile: "0000000000".into(),
            designation: "Intern".into(),
            gender: "Other".into(),
            course: vec!["BCA".into()],
            image: None,
            create_date: Utc::now(),
            active: false,
        };
        assert!(Employee::try_from(row).is_err());
    }
}
