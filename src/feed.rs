//! Company feed: posts, short-lived stories and feedback comments.

use anyhow::Result;
use chrono::{NaiveDateTime, TimeDelta};
use rusqlite::{OptionalExtension, Row};
use tracing::info;

use crate::db::models::{Comment, NewComment, NewPost, Post, Story};
use crate::db::Database;
use crate::error::DeskError;
use crate::filter::clock::format_timestamp;
use crate::scope::require_role;

/// How long a story stays visible.
pub const STORY_TTL_HOURS: i64 = 24;

const POST_COLUMNS: &str = "id, username, text, image, date, likes";

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        username: row.get(1)?,
        text: row.get(2)?,
        image: row.get(3)?,
        date: row.get(4)?,
        likes: row.get(5)?,
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl Database {
    /// Publish a post with zero likes. Only `editor_role` may post.
    pub fn add_post(&self, role: &str, editor_role: &str, post: &NewPost) -> Result<Post> {
        require_role(role, editor_role, "add posts")?;
        if post.username.trim().is_empty() {
            return Err(DeskError::MissingField("username").into());
        }
        if post.text.trim().is_empty() {
            return Err(DeskError::MissingField("text").into());
        }

        self.conn.execute(
            "INSERT INTO posts (username, text, image, date, likes) VALUES (?1, ?2, ?3, ?4, 0)",
            rusqlite::params![
                post.username.trim(),
                post.text.trim(),
                non_blank(post.image.as_deref()),
                self.now_string(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        info!("Published post {id} by {}", post.username);
        self.get_post(id)?
            .ok_or_else(|| DeskError::NotFound { kind: "post", id }.into())
    }

    pub fn get_post(&self, id: i64) -> Result<Option<Post>> {
        let post = self
            .conn
            .query_row(
                &format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1"),
                [id],
                post_from_row,
            )
            .optional()?;
        Ok(post)
    }

    /// All posts, newest first.
    pub fn list_posts(&self) -> Result<Vec<Post>> {
        self.query_all(
            &format!("SELECT {POST_COLUMNS} FROM posts ORDER BY date DESC, id DESC"),
            rusqlite::params![],
            post_from_row,
        )
    }

    /// Add one like. Returns `None` if the post doesn't exist.
    pub fn like_post(&self, id: i64) -> Result<Option<Post>> {
        let changed = self
            .conn
            .execute("UPDATE posts SET likes = likes + 1 WHERE id = ?1", [id])?;
        if changed == 0 {
            return Ok(None);
        }
        self.get_post(id)
    }

    /// Replace a post's text and image. Returns `None` if it doesn't exist.
    pub fn edit_post(
        &self,
        role: &str,
        editor_role: &str,
        id: i64,
        text: &str,
        image: Option<&str>,
    ) -> Result<Option<Post>> {
        require_role(role, editor_role, "edit posts")?;
        if text.trim().is_empty() {
            return Err(DeskError::MissingField("text").into());
        }

        let changed = self.conn.execute(
            "UPDATE posts SET text = ?1, image = ?2 WHERE id = ?3",
            rusqlite::params![text.trim(), non_blank(image), id],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        info!("Edited post {id}");
        self.get_post(id)
    }

    pub fn delete_post(&self, role: &str, editor_role: &str, id: i64) -> Result<bool> {
        require_role(role, editor_role, "delete posts")?;
        let deleted = self.conn.execute("DELETE FROM posts WHERE id = ?1", [id])?;
        Ok(deleted > 0)
    }

    /// Add a story stamped with the current time. Only `editor_role` may do so.
    pub fn add_story(&self, role: &str, editor_role: &str, image: &str) -> Result<Story> {
        require_role(role, editor_role, "add stories")?;
        let image = image.trim();
        if image.is_empty() {
            return Err(DeskError::MissingField("image").into());
        }

        let created_at = self.now_string();
        self.conn.execute(
            "INSERT INTO stories (image, created_at) VALUES (?1, ?2)",
            rusqlite::params![image, created_at],
        )?;
        let id = self.conn.last_insert_rowid();
        info!("Added story {id}");
        Ok(Story {
            id,
            image: image.to_string(),
            created_at,
        })
    }

    /// Stories younger than [`STORY_TTL_HOURS`], oldest first.
    pub fn active_stories(&self) -> Result<Vec<Story>> {
        self.query_all(
            "SELECT id, image, created_at FROM stories WHERE created_at > ?1 ORDER BY created_at, id",
            rusqlite::params![self.story_cutoff()],
            |row| {
                Ok(Story {
                    id: row.get(0)?,
                    image: row.get(1)?,
                    created_at: row.get(2)?,
                })
            },
        )
    }

    /// Delete stories [`STORY_TTL_HOURS`] old or older. Returns how many went.
    pub fn cleanup_stories(&self) -> Result<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM stories WHERE created_at <= ?1",
            [self.story_cutoff()],
        )?;
        info!("Removed {deleted} expired stories");
        Ok(deleted)
    }

    fn story_cutoff(&self) -> String {
        let cutoff = self
            .now()
            .checked_sub_signed(TimeDelta::hours(STORY_TTL_HOURS))
            .unwrap_or(NaiveDateTime::MIN);
        format_timestamp(cutoff)
    }

    /// Store a feedback comment.
    pub fn submit_comment(&self, comment: &NewComment) -> Result<Comment> {
        for (name, value) in [
            ("full_name", &comment.full_name),
            ("email", &comment.email),
            ("message", &comment.message),
        ] {
            if value.trim().is_empty() {
                return Err(DeskError::MissingField(name).into());
            }
        }

        let submitted_at = self.now_string();
        self.conn.execute(
            "INSERT INTO comments (full_name, email, message, submitted_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                comment.full_name.trim(),
                comment.email.trim(),
                comment.message.trim(),
                submitted_at,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        info!("Stored comment {id} from {}", comment.email.trim());
        Ok(Comment {
            id,
            full_name: comment.full_name.trim().to_string(),
            email: comment.email.trim().to_string(),
            message: comment.message.trim().to_string(),
            submitted_at,
        })
    }
}
