//! Store-independent description of an employee list query.
//!
//! The Postgres store renders it through the filter language; the memory store
//! evaluates it directly. Both must agree on matching semantics.

use serde_json::{json, Value};
use std::cmp::Ordering;

use super::models::Employee;
use crate::filter::{escape_like, FilterData, FilterOrderInfo};
use crate::types::{SortDirection, SortField};

/// Which records a list or count covers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeFilter {
    /// Lower-cased search tokens; a record matches if its name contains any of them
    pub name_tokens: Vec<String>,
    pub active: Option<bool>,
}

impl EmployeeFilter {
    /// Splits trimmed search text on whitespace. Blank text matches every record.
    pub fn from_search(search: &str) -> Self {
        Self {
            name_tokens: search.split_whitespace().map(|t| t.to_lowercase()).collect(),
            active: None,
        }
    }

    /// Same search, restricted to active records
    pub fn active_only(&self) -> Self {
        Self { active: Some(true), ..self.clone() }
    }

    pub fn matches(&self, employee: &Employee) -> bool {
        if let Some(active) = self.active {
            if employee.active != active {
                return false;
            }
        }
        if self.name_tokens.is_empty() {
            return true;
        }
        let name = employee.name.to_lowercase();
        self.name_tokens.iter().any(|token| name.contains(token.as_str()))
    }

    /// Condition document for the filter language, `None` when nothing is filtered
    pub fn to_where(&self) -> Option<Value> {
        let mut conditions = serde_json::Map::new();
        if !self.name_tokens.is_empty() {
            let any_token: Vec<Value> = self
                .name_tokens
                .iter()
                .map(|t| json!({ "name": { "$ilike": format!("%{}%", escape_like(t)) } }))
                .collect();
            conditions.insert("$or".to_string(), Value::Array(any_token));
        }
        if let Some(active) = self.active {
            conditions.insert("active".to_string(), Value::Bool(active));
        }
        if conditions.is_empty() { None } else { Some(Value::Object(conditions)) }
    }
}

/// One page of a filtered, single-field sorted listing
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeQuery {
    pub filter: EmployeeFilter,
    pub sort: SortField,
    pub direction: SortDirection,
    pub offset: i64,
    pub limit: i64,
}

impl EmployeeQuery {
    pub fn to_filter_data(&self) -> FilterData {
        FilterData {
            where_clause: self.filter.to_where(),
            order: vec![FilterOrderInfo {
                column: self.sort.column().to_string(),
                sort: self.direction,
                byte_order: self.sort.is_text(),
            }],
            limit: Some(self.limit),
            offset: Some(self.offset),
        }
    }

    /// Ordering used by in-process stores; ties keep storage order.
    /// Text compares by byte value, matching the `COLLATE "C"` the Postgres store sorts with.
    pub fn compare(&self, a: &Employee, b: &Employee) -> Ordering {
        let ord = match self.sort {
            SortField::Name => a.name.cmp(&b.name),
            SortField::Email => a.email.cmp(&b.email),
            SortField::Mobile => a.mobile.cmp(&b.mobile),
            SortField::Designation => a.designation.as_str().cmp(b.designation.as_str()),
            SortField::Gender => a.gender.as_str().cmp(b.gender.as_str()),
            SortField::CreateDate => a.create_date.cmp(&b.create_date),
            SortField::Active => a.active.cmp(&b.active),
        };
        match self.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;
    use crate::types::{Course, Designation, Gender};
    use uuid::Uuid;

    fn named(name: &str) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            mobile: "9999999999".to_string(),
            designation: Designation::Hr,
            gender: Gender::Female,
            course: [Course::Mca].into_iter().collect(),
            image: None,
            create_date: chrono::Utc::now(),
            active: true,
        }
    }

    #[test]
    fn blank_search_has_no_condition() {
        assert_eq!(EmployeeFilter::from_search("   ").to_where(), None);
        assert_eq!(EmployeeFilter::from_search("").active_only().to_where(), Some(json!({ "active": true })));
    }

    #[test]
    fn tokens_become_escaped_ilike_disjunction() {
        let filter = EmployeeFilter::from_search("  John  50%_off ");
        assert_eq!(filter.name_tokens, vec!["john", "50%_off"]);
        assert_eq!(
            filter.to_where(),
            Some(json!({
                "$or": [
                    { "name": { "$ilike": "%john%" } },
                    { "name": { "$ilike": "%50\\%\\_off%" } }
                ]
            }))
        );
    }

    #[test]
    fn renders_full_page_query() {
        let query = EmployeeQuery {
            filter: EmployeeFilter::from_search("ann").active_only(),
            sort: SortField::Name,
            direction: SortDirection::Desc,
            offset: 20,
            limit: 10,
        };
        let mut filter = Filter::new("employees").unwrap();
        filter.assign(query.to_filter_data()).unwrap();
        let sql = filter.to_sql().unwrap();
        assert_eq!(
            sql.query,
            "SELECT * FROM \"employees\" WHERE ((\"name\" ILIKE $1)) AND \"active\" = $2 ORDER BY \"name\" COLLATE \"C\" DESC LIMIT 10 OFFSET 20"
        );
        assert_eq!(sql.params, vec![json!("%ann%"), json!(true)]);
    }

    #[test]
    fn name_order_is_case_sensitive_byte_order() {
        let query = EmployeeQuery {
            filter: EmployeeFilter::default(),
            sort: SortField::Name,
            direction: SortDirection::Asc,
            offset: 0,
            limit: 10,
        };
        let mut names = vec!["bob", "Carol", "Alice"];
        names.sort_by(|a, b| query.compare(&named(a), &named(b)));
        assert_eq!(names, vec!["Alice", "Carol", "bob"]);
    }
}
