use clap::{Args, Subcommand};
use serde_json::json;
use std::path::PathBuf;

use crate::cli::client::{EmployeeFields, ListOptions};
use crate::cli::utils::{output_employee, output_employee_list, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum EmployeeCommands {
    #[command(about = "List employees with search, paging and sorting")]
    List {
        #[arg(long, help = "Page number (1-based)")]
        page: Option<i64>,
        #[arg(long, help = "Records per page")]
        limit: Option<i64>,
        #[arg(long, help = "Name search; any whitespace-separated word may match")]
        search: Option<String>,
        #[arg(long, help = "name, email, mobile, designation, gender, createDate or active")]
        sort: Option<String>,
        #[arg(long, help = "Sort descending")]
        desc: bool,
    },

    #[command(about = "Show one employee")]
    Get {
        #[arg(help = "Employee id")]
        id: String,
    },

    #[command(about = "Create an employee")]
    Create {
        #[command(flatten)]
        fields: FieldArgs,
    },

    #[command(about = "Update an employee; omitted fields are unchanged")]
    Update {
        #[arg(help = "Employee id")]
        id: String,
        #[command(flatten)]
        fields: FieldArgs,
    },

    #[command(about = "Delete an employee")]
    Delete {
        #[arg(help = "Employee id")]
        id: String,
    },

    #[command(about = "Flip an employee between active and inactive")]
    Toggle {
        #[arg(help = "Employee id")]
        id: String,
    },
}

#[derive(Args, Debug, Default)]
pub struct FieldArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub mobile: Option<String>,
    #[arg(long, help = "Developer, Manager, Designer, Tester or HR")]
    pub designation: Option<String>,
    #[arg(long, help = "Male, Female or Other")]
    pub gender: Option<String>,
    #[arg(long = "course", help = "BCA, MCA or BSC; repeat or comma-separate")]
    pub courses: Vec<String>,
    #[arg(long, help = "Image file to upload")]
    pub image: Option<PathBuf>,
}

impl FieldArgs {
    fn split(self) -> (EmployeeFields, Option<PathBuf>) {
        let fields = EmployeeFields {
            name: self.name,
            email: self.email,
            mobile: self.mobile,
            designation: self.designation,
            gender: self.gender,
            courses: self.courses,
        };
        (fields, self.image)
    }
}

pub async fn handle(cmd: EmployeeCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = super::authenticated_client()?;

    match cmd {
        EmployeeCommands::List { page, limit, search, sort, desc } => {
            let options = ListOptions {
                page,
                limit,
                search,
                sort_field: sort,
                sort_order: Some(if desc { "desc" } else { "asc" }.to_string()),
            };
            let list = client.list_employees(&options).await?;
            output_employee_list(&output_format, &list)
        }
        EmployeeCommands::Get { id } => {
            let employee = client.get_employee(&id).await?;
            output_employee(&output_format, &employee)
        }
        EmployeeCommands::Create { fields } => {
            let (fields, image) = fields.split();
            let created = client.create_employee(fields, image.as_deref()).await?;
            output_success(&output_format, "Employee added successfully", Some(json!({ "id": created.id })))?;
            // re-fetch so the printed record is what the server now holds
            let employee = client.get_employee(&created.id.to_string()).await?;
            output_employee(&output_format, &employee)
        }
        EmployeeCommands::Update { id, fields } => {
            let (fields, image) = fields.split();
            client.update_employee(&id, fields, image.as_deref()).await?;
            output_success(&output_format, "Employee updated successfully", Some(json!({ "id": id })))?;
            let employee = client.get_employee(&id).await?;
            output_employee(&output_format, &employee)
        }
        EmployeeCommands::Delete { id } => {
            let message = client.delete_employee(&id).await?;
            output_success(&output_format, &message, Some(json!({ "id": id })))
        }
        EmployeeCommands::Toggle { id } => {
            let active = client.toggle_active(&id).await?;
            let state = if active { "active" } else { "inactive" };
            output_success(
                &output_format,
                &format!("Employee {} is now {}", id, state),
                Some(json!({ "id": id, "active": active })),
            )
        }
    }
}
