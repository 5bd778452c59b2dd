//! Minimal user directory. Branch lists for tasks and transfers come from here.

use anyhow::Result;
use tracing::info;

use crate::db::models::{NewUser, User};
use crate::db::Database;
use crate::error::DeskError;

impl Database {
    /// Add a staff account. Emails are stored lowercased and are unique.
    pub fn add_user(&self, user: &NewUser) -> Result<User> {
        for (name, value) in [
            ("branch", &user.branch),
            ("email", &user.email),
            ("role", &user.role),
        ] {
            if value.trim().is_empty() {
                return Err(DeskError::MissingField(name).into());
            }
        }

        let email = user.email.trim().to_lowercase();
        let created_on = self.now_string();
        self.conn.execute(
            "INSERT INTO users (branch, email, role, branch_id, created_on)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                user.branch.trim(),
                email,
                user.role.trim(),
                user.branch_id,
                created_on,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        info!("Added user {id} ({email}) to branch {}", user.branch);
        Ok(User {
            id,
            branch: user.branch.trim().to_string(),
            email,
            role: user.role.trim().to_string(),
            branch_id: user.branch_id,
            created_on,
        })
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        self.query_all(
            "SELECT id, branch, email, role, branch_id, created_on FROM users ORDER BY branch, email",
            rusqlite::params![],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    branch: row.get(1)?,
                    email: row.get(2)?,
                    role: row.get(3)?,
                    branch_id: row.get(4)?,
                    created_on: row.get(5)?,
                })
            },
        )
    }
}
