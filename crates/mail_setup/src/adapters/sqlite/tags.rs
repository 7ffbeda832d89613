//! SQLite-backed [`TagStore`]

use rusqlite::{params, ErrorCode, OptionalExtension, Row};
use tracing::debug;

use super::pool::{memory_pool, DbPool};
use crate::tags::{DisplayMode, Tag, TagAttributes, TagKind, TagStore};
use crate::types::error::{Result, SetupError};

const TAG_COLUMNS: &str = "id, key, kind, display, display_order, search_terms, label, \
                           flag_hides, flag_editable, color, icon, template, name";

pub struct SqliteTagStore {
    pool: DbPool,
}

/// Raw row, converted to a [`Tag`] outside the rusqlite closure
struct TagRow {
    id: String,
    key: String,
    kind: String,
    display: String,
    display_order: Option<i64>,
    search_terms: Option<String>,
    label: bool,
    flag_hides: bool,
    flag_editable: bool,
    color: Option<String>,
    icon: Option<String>,
    template: Option<String>,
    name: String,
}

impl TagRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            key: row.get(1)?,
            kind: row.get(2)?,
            display: row.get(3)?,
            display_order: row.get(4)?,
            search_terms: row.get(5)?,
            label: row.get(6)?,
            flag_hides: row.get(7)?,
            flag_editable: row.get(8)?,
            color: row.get(9)?,
            icon: row.get(10)?,
            template: row.get(11)?,
            name: row.get(12)?,
        })
    }

    fn into_tag(self) -> Result<Tag> {
        let kind = TagKind::from_str(&self.kind).ok_or_else(|| {
            SetupError::Tag(format!("Unknown kind '{}' on tag {}", self.kind, self.key))
        })?;
        let display = DisplayMode::from_str(&self.display).ok_or_else(|| {
            SetupError::Tag(format!("Unknown display '{}' on tag {}", self.display, self.key))
        })?;

        Ok(Tag {
            id: self.id,
            key: self.key,
            attributes: TagAttributes {
                kind,
                display,
                display_order: self.display_order,
                search_terms: self.search_terms,
                label: self.label,
                flag_hides: self.flag_hides,
                flag_editable: self.flag_editable,
                color: self.color,
                icon: self.icon,
                template: self.template,
                name: self.name,
            },
        })
    }
}

impl SqliteTagStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(memory_pool()?))
    }
}

impl TagStore for SqliteTagStore {
    fn tag_exists(&self, key: &str) -> Result<bool> {
        let conn = self.pool.get()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM tags WHERE key = ?1)",
            params![key],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn create_tag(&self, key: &str) -> Result<Tag> {
        let tag = Tag {
            id: uuid::Uuid::new_v4().to_string(),
            key: key.to_string(),
            attributes: TagAttributes::fresh(key),
        };
        let a = &tag.attributes;
        let now = chrono::Utc::now().timestamp_millis();

        let conn = self.pool.get()?;
        let inserted = conn.execute(
            "INSERT INTO tags (id, key, kind, display, display_order, search_terms, label,
                               flag_hides, flag_editable, color, icon, template, name,
                               created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)",
            params![
                tag.id,
                tag.key,
                a.kind.as_str(),
                a.display.as_str(),
                a.display_order,
                a.search_terms,
                a.label,
                a.flag_hides,
                a.flag_editable,
                a.color,
                a.icon,
                a.template,
                a.name,
                now,
            ],
        );

        match inserted {
            Ok(_) => {
                debug!(key = %key, id = %tag.id, "Inserted tag");
                Ok(tag)
            }
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(SetupError::Tag(format!("Tag already exists: {}", key)))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn set_tag_attributes(&self, key: &str, attributes: &TagAttributes) -> Result<()> {
        let a = attributes;
        let conn = self.pool.get()?;
        let updated = conn.execute(
            "UPDATE tags SET kind = ?2, display = ?3, display_order = ?4, search_terms = ?5,
                             label = ?6, flag_hides = ?7, flag_editable = ?8, color = ?9,
                             icon = ?10, template = ?11, name = ?12, updated_at = ?13
             WHERE key = ?1",
            params![
                key,
                a.kind.as_str(),
                a.display.as_str(),
                a.display_order,
                a.search_terms,
                a.label,
                a.flag_hides,
                a.flag_editable,
                a.color,
                a.icon,
                a.template,
                a.name,
                chrono::Utc::now().timestamp_millis(),
            ],
        )?;

        if updated == 0 {
            return Err(SetupError::Tag(format!("No such tag: {}", key)));
        }
        Ok(())
    }

    fn get_tag(&self, key: &str) -> Result<Option<Tag>> {
        let conn = self.pool.get()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM tags WHERE key = ?1", TAG_COLUMNS),
                params![key],
                TagRow::from_row,
            )
            .optional()?;

        row.map(TagRow::into_tag).transpose()
    }

    fn list_tags(&self) -> Result<Vec<Tag>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM tags ORDER BY key", TAG_COLUMNS))?;
        let rows = stmt.query_map([], TagRow::from_row)?;

        let mut tags = Vec::new();
        for row in rows {
            tags.push(row?.into_tag()?);
        }
        Ok(tags)
    }
}
