use super::error::FilterError;
use super::types::{is_valid_identifier, FilterOrderInfo};

pub struct FilterOrder;

impl FilterOrder {
    pub fn validate(infos: &[FilterOrderInfo]) -> Result<(), FilterError> {
        for info in infos {
            if !is_valid_identifier(&info.column) {
                return Err(FilterError::InvalidColumn(info.column.clone()));
            }
        }
        Ok(())
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        if infos.is_empty() { return String::new(); }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| {
                let collate = if i.byte_order { " COLLATE \"C\"" } else { "" };
                format!("\"{}\"{} {}", i.column, collate, i.sort.to_sql())
            })
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SortDirection;

    fn order(column: &str, sort: SortDirection, byte_order: bool) -> FilterOrderInfo {
        FilterOrderInfo { column: column.to_string(), sort, byte_order }
    }

    #[test]
    fn text_columns_sort_by_byte_value() {
        let infos = vec![order("name", SortDirection::Desc, true), order("create_date", SortDirection::Asc, false)];
        assert_eq!(
            FilterOrder::generate(&infos),
            "ORDER BY \"name\" COLLATE \"C\" DESC, \"create_date\" ASC"
        );
    }

    #[test]
    fn no_order_renders_nothing() {
        assert_eq!(FilterOrder::generate(&[]), "");
    }

    #[test]
    fn rejects_injected_column() {
        let infos = vec![order("name\"; --", SortDirection::Asc, false)];
        assert!(matches!(FilterOrder::validate(&infos), Err(FilterError::InvalidColumn(_))));
    }
}
