use serde::{Deserialize, Serialize};

/// A labelled sum, e.g. sales per type or per category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Total {
    pub key: String,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeadCount {
    pub branch_id: i64,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyTotal {
    pub sales_date: String,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetProgress {
    pub total_sales: f64,
    pub target_amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: String,
    pub owner: String,
    pub start_date: Option<String>,
    pub due_date: Option<String>,
    pub label: Option<String>,
    pub color: Option<String>,
    pub branch_id: i64,
    pub created_at: String,
}

/// Fields a caller supplies to create or replace a task.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: String,
    pub owner: String,
    pub start_date: Option<String>,
    pub due_date: Option<String>,
    pub label: Option<String>,
    pub color: Option<String>,
    pub branch_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Branch {
    pub branch_id: i64,
    pub branch_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    pub id: i64,
    pub item_code: String,
    pub description: String,
    pub quantity: i64,
    pub from_location: String,
    pub to_location: String,
    pub cost: f64,
    pub status: String,
    pub notes: String,
    pub creation_date: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewTransfer {
    pub item_code: String,
    pub description: String,
    pub quantity: i64,
    pub from_location: String,
    pub to_location: String,
    pub cost: f64,
    pub status: String,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub starts_at: String,
    pub ends_at: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub starts_at: String,
    pub ends_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub client_name: String,
    pub invoice_number: String,
    pub date: String,
    pub amount: f64,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub branch: String,
    pub email: String,
    pub role: String,
    pub branch_id: i64,
    pub created_on: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub branch: String,
    pub email: String,
    pub role: String,
    pub branch_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub username: String,
    pub text: String,
    pub image: Option<String>,
    pub date: String,
    pub likes: i64,
}

#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub username: String,
    pub text: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Story {
    pub id: i64,
    pub image: String,
    pub created_at: String,
}

/// A feedback message left through the contact form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub message: String,
    pub submitted_at: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewComment {
    pub full_name: String,
    pub email: String,
    pub message: String,
}

/// Stats returned by `branchdesk stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbStats {
    pub tables: Vec<TableCount>,
    pub db_size_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableCount {
    pub table: String,
    pub rows: i64,
}
