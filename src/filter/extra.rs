use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use super::{Column, Conditions, Param};

/// SQL function that lowercases text with full Unicode rules. Substring
/// filters apply it to the column, so it must be registered on every
/// connection that runs them (see [`register_fold`]).
pub const FOLD_FUNCTION: &str = "fold";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Column equals the value.
    Exact,
    /// Column contains the value, ignoring case (Unicode lowercase).
    Contains,
}

/// One optional field condition. A missing or blank value does not filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub column: Column,
    pub value: Option<String>,
    pub mode: MatchMode,
}

impl FieldFilter {
    pub fn exact(column: Column, value: Option<String>) -> Self {
        FieldFilter {
            column,
            value,
            mode: MatchMode::Exact,
        }
    }

    pub fn contains(column: Column, value: Option<String>) -> Self {
        FieldFilter {
            column,
            value,
            mode: MatchMode::Contains,
        }
    }

    /// The trimmed value, if it constrains anything.
    pub fn effective_value(&self) -> Option<&str> {
        self.value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

fn fold(ctx: &Context<'_>) -> rusqlite::Result<Option<String>> {
    Ok(match ctx.get_raw(0) {
        ValueRef::Null | ValueRef::Blob(_) => None,
        ValueRef::Text(bytes) => Some(String::from_utf8_lossy(bytes).to_lowercase()),
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
    })
}

/// Install [`FOLD_FUNCTION`] on `conn`.
pub fn register_fold(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        FOLD_FUNCTION,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        fold,
    )
}

/// Escape LIKE wildcards so the value matches literally.
fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

pub(super) fn compose(conds: &mut Conditions, filters: &[FieldFilter]) {
    for filter in filters {
        let Some(value) = filter.effective_value() else {
            continue;
        };
        let column = filter.column.as_str();
        match filter.mode {
            MatchMode::Exact => {
                let p = conds.bind(Param::Text(value.to_string()));
                conds.push(format!("{column} = {p}"));
            }
            MatchMode::Contains => {
                let pattern = format!("%{}%", escape_like(&value.to_lowercase()));
                let p = conds.bind(Param::Text(pattern));
                conds.push(format!("{FOLD_FUNCTION}({column}) LIKE {p} ESCAPE '\\'"));
            }
        }
    }
}
