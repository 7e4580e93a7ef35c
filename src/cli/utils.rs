use serde_json::{json, Value};

use crate::cli::client::EmployeeList;
use crate::cli::OutputFormat;
use crate::database::Employee;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });
            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

pub fn output_employee(output_format: &OutputFormat, employee: &Employee) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(employee)?),
        OutputFormat::Text => {
            println!("ID:          {}", employee.id);
            println!("Name:        {}", employee.name);
            println!("Email:       {}", employee.email);
            println!("Mobile:      {}", employee.mobile);
            println!("Designation: {}", employee.designation);
            println!("Gender:      {}", employee.gender);
            println!("Course:      {}", employee.course.to_strings().join(", "));
            println!("Image:       {}", employee.image.as_deref().unwrap_or("-"));
            println!("Created:     {}", employee.create_date.format("%Y-%m-%d %H:%M"));
            println!("Active:      {}", if employee.active { "yes" } else { "no" });
        }
    }
    Ok(())
}

pub fn output_employee_list(output_format: &OutputFormat, list: &EmployeeList) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "employees": list.employees,
                    "totalEmployees": list.total_employees,
                    "totalActiveEmployees": list.total_active_employees,
                    "page": list.page,
                    "limit": list.limit,
                }))?
            );
        }
        OutputFormat::Text => {
            if list.employees.is_empty() {
                println!("No employees found");
            } else {
                println!(
                    "{:<36}  {:<20}  {:<28}  {:<12}  {:<10}  {:<6}",
                    "ID", "NAME", "EMAIL", "MOBILE", "ROLE", "ACTIVE"
                );
                for e in &list.employees {
                    println!(
                        "{:<36}  {:<20}  {:<28}  {:<12}  {:<10}  {:<6}",
                        e.id,
                        truncate(&e.name, 20),
                        truncate(&e.email, 28),
                        e.mobile,
                        e.designation.as_str(),
                        if e.active { "yes" } else { "no" }
                    );
                }
            }
            println!(
                "Page {} ({} per page): {} total, {} active",
                list.page, list.limit, list.total_employees, list.total_active_employees
            );
        }
    }
    Ok(())
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_width() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Ananya Krishnamurthy", 10), "Ananya Kr…");
        assert_eq!(truncate("ééééé", 3).chars().count(), 3);
    }
}
