use serde_json::Value;

use super::error::FilterError;
use super::types::{is_valid_identifier, FilterOp, FilterWhereInfo};

/// Renders a MongoDB-style JSON condition document into a parameterized SQL predicate.
///
/// Supports `$or`, `$ilike` and implicit equality:
/// `{ "$or": [{ "name": { "$ilike": "%ann%" } }], "active": true }` becomes
/// `(("name" ILIKE $1)) AND "active" = $2` with the two values returned as params.
pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
    conditions: Vec<FilterWhereInfo>,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
            conditions: vec![],
        }
    }

    pub fn generate(where_data: &Value, starting_param_index: usize) -> Result<(String, Vec<Value>), FilterError> {
        let mut filter_where = Self::new(starting_param_index);
        filter_where.build(where_data)
    }

    pub fn validate(where_data: &Value) -> Result<(), FilterError> {
        match where_data {
            Value::Null | Value::Object(_) => Ok(()),
            _ => Err(FilterError::InvalidWhereClause("WHERE must be an object".to_string())),
        }
    }

    fn build(&mut self, where_data: &Value) -> Result<(String, Vec<Value>), FilterError> {
        if !where_data.is_null() {
            self.parse_where_data(where_data)?;
        }

        let mut sql_conditions = vec![];
        let conditions_snapshot = self.conditions.clone();
        for condition in &conditions_snapshot {
            sql_conditions.push(self.build_sql_condition(condition));
        }
        let where_clause = if sql_conditions.is_empty() { "1=1".to_string() } else { sql_conditions.join(" AND ") };
        Ok((where_clause, self.param_values.clone()))
    }

    fn parse_where_data(&mut self, where_data: &Value) -> Result<(), FilterError> {
        match where_data {
            Value::Object(obj) => {
                for (key, value) in obj {
                    if key.starts_with('$') {
                        self.parse_logical_operator(key, value)?;
                    } else {
                        self.parse_field_condition(key, value)?;
                    }
                }
                Ok(())
            }
            _ => Err(FilterError::InvalidWhereClause("Unsupported WHERE format".to_string())),
        }
    }

    fn parse_logical_operator(&mut self, op: &str, value: &Value) -> Result<(), FilterError> {
        if op != "$or" {
            return Err(FilterError::UnsupportedOperator(op.to_string()));
        }
        let arr = value.as_array().ok_or_else(|| FilterError::InvalidOperatorData("$or requires array".to_string()))?;
        if arr.is_empty() {
            // Empty disjunction matches nothing
            self.push_text("1=0".to_string());
            return Ok(());
        }
        let mut sql_parts = Vec::new();
        for v in arr {
            let (sql, params) = Self::generate(v, self.param_index)?;
            self.param_index += params.len();
            self.param_values.extend(params);
            sql_parts.push(format!("({})", sql));
        }
        self.push_text(format!("({})", sql_parts.join(" OR ")));
        Ok(())
    }

    fn parse_field_condition(&mut self, field: &str, value: &Value) -> Result<(), FilterError> {
        if !is_valid_identifier(field) {
            return Err(FilterError::InvalidColumn(field.to_string()));
        }
        if let Value::Object(obj) = value {
            for (op_key, op_val) in obj {
                let operator = Self::map_operator(op_key)?;
                self.conditions.push(FilterWhereInfo { column: field.to_string(), operator, data: op_val.clone() });
            }
        } else {
            // Implicit equality: { field: value }
            self.conditions.push(FilterWhereInfo { column: field.to_string(), operator: FilterOp::Eq, data: value.clone() });
        }
        Ok(())
    }

    fn map_operator(op_key: &str) -> Result<FilterOp, FilterError> {
        match op_key {
            "$ilike" => Ok(FilterOp::ILike),
            other => Err(FilterError::UnsupportedOperator(other.to_string())),
        }
    }

    fn push_text(&mut self, sql: String) {
        self.conditions.push(FilterWhereInfo { column: sql, operator: FilterOp::Text, data: Value::Null });
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> String {
        let operator = match condition.operator {
            FilterOp::Text => return condition.column.clone(),
            FilterOp::Eq => "=",
            FilterOp::ILike => "ILIKE",
        };
        format!("\"{}\" {} {}", condition.column, operator, self.param(condition.data.clone()))
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}
