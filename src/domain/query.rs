//! Relational query helpers: field registries, selection and ordering.
//!
//! Clients choose which fields to fetch (`fields=id,name,updatedAt`) and how to
//! sort (`sort=-updatedAt,name`). Both are resolved against a static
//! [`FieldSet`] so only registered column names ever reach SQL text; values
//! are always bound as parameters.

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value, json};

use crate::domain::entities::File;
use crate::error::AppError;

/// Storage kind of a registered field, used to decode dynamic rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    BigInt,
    Int,
    Text,
    OptText,
    Timestamp,
    OptBytes,
    Bytes,
}

impl FieldKind {
    pub fn sortable(&self) -> bool {
        !matches!(self, FieldKind::Bytes | FieldKind::OptBytes)
    }
}

/// A field exposed to clients and the column backing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
}

const fn field(name: &'static str, column: &'static str, kind: FieldKind) -> Field {
    Field { name, column, kind }
}

/// Registry of the selectable fields of one table.
#[derive(Debug)]
pub struct FieldSet {
    pub table: &'static str,
    pub fields: &'static [Field],
    pub default_order: &'static str,
}

impl FieldSet {
    pub fn get(&self, name: &str) -> Option<&'static Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn id(&self) -> &'static Field {
        &self.fields[0]
    }
}

/// Fields of the `files` table. The first entry must be the primary key.
pub static FILE_FIELDS: FieldSet = FieldSet {
    table: "files",
    fields: &[
        field("id", "id", FieldKind::BigInt),
        field("createdAt", "created_at", FieldKind::Timestamp),
        field("updatedAt", "updated_at", FieldKind::Timestamp),
        field("name", "name", FieldKind::Text),
        field("maxAge", "max_age", FieldKind::Text),
        field("zone", "zone", FieldKind::BigInt),
        field("type", "file_type", FieldKind::Text),
        field("size", "size", FieldKind::Int),
        field("width", "width", FieldKind::Int),
        field("height", "height", FieldKind::Int),
        field("description", "description", FieldKind::OptText),
        field("creator", "creator", FieldKind::Text),
        field("thumbnail", "thumbnail", FieldKind::OptBytes),
        field("data", "data", FieldKind::Bytes),
    ],
    default_order: "-updatedAt",
};

/// Fields chosen for a query, in client order with the id first.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    fields: Vec<&'static Field>,
}

impl Selection {
    pub fn all(set: &'static FieldSet) -> Self {
        Self {
            fields: set.fields.iter().collect(),
        }
    }

    pub fn fields(&self) -> &[&'static Field] {
        &self.fields
    }

    /// Comma-separated column list for a `SELECT`.
    pub fn columns_sql(&self) -> String {
        self.fields
            .iter()
            .map(|f| f.column)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Resolves a client field list into a [`Selection`].
///
/// `*` or an empty string selects every field. Names are trimmed, duplicates
/// keep their first position and the id is always present.
///
/// # Errors
///
/// Returns [`AppError::Validation`] for names not in the registry.
pub fn format_select(fields: &str, set: &'static FieldSet) -> Result<Selection, AppError> {
    let fields = fields.trim();
    if fields.is_empty() || fields == "*" {
        return Ok(Selection::all(set));
    }

    let mut selected = vec![set.id()];
    for name in fields.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        let field = set.get(name).ok_or_else(|| {
            AppError::bad_request(
                "Unknown field",
                json!({ "field": name, "table": set.table }),
            )
        })?;

        if !selected.contains(&field) {
            selected.push(field);
        }
    }

    Ok(Selection { fields: selected })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Sort keys for a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Ordering {
    keys: Vec<(&'static Field, Direction)>,
}

impl Ordering {
    pub fn keys(&self) -> &[(&'static Field, Direction)] {
        &self.keys
    }

    /// Renders the `ORDER BY` body, e.g. `updated_at DESC, id ASC`.
    pub fn to_sql(&self) -> String {
        self.keys
            .iter()
            .map(|(f, dir)| match dir {
                Direction::Asc => format!("{} ASC", f.column),
                Direction::Desc => format!("{} DESC", f.column),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Resolves a client sort expression into an [`Ordering`].
///
/// Keys are comma-separated; a leading `-` sorts descending. An empty
/// expression falls back to the registry default. The id is appended as a
/// final ascending key when it is not already present, so paging is stable.
///
/// # Errors
///
/// Returns [`AppError::Validation`] for unknown or binary fields.
pub fn format_order(sort: &str, set: &'static FieldSet) -> Result<Ordering, AppError> {
    let sort = match sort.trim() {
        "" => set.default_order,
        s => s,
    };

    let mut keys: Vec<(&'static Field, Direction)> = Vec::new();
    for key in sort.split(',').map(str::trim).filter(|k| !k.is_empty()) {
        let (name, direction) = match key.strip_prefix('-') {
            Some(rest) => (rest, Direction::Desc),
            None => (key.strip_prefix('+').unwrap_or(key), Direction::Asc),
        };

        let field = set.get(name).ok_or_else(|| {
            AppError::bad_request(
                "Unknown sort field",
                json!({ "field": name, "table": set.table }),
            )
        })?;

        if !field.kind.sortable() {
            return Err(AppError::bad_request(
                "Field is not sortable",
                json!({ "field": name }),
            ));
        }

        if !keys.iter().any(|(f, _)| *f == field) {
            keys.push((field, direction));
        }
    }

    let id = set.id();
    if !keys.iter().any(|(f, _)| *f == id) {
        keys.push((id, Direction::Asc));
    }

    Ok(Ordering { keys })
}

pub fn timestamp_value(ts: DateTime<Utc>) -> Value {
    Value::String(ts.to_rfc3339_opts(SecondsFormat::Secs, true))
}

pub fn bytes_value(bytes: &[u8]) -> Value {
    Value::String(STANDARD.encode(bytes))
}

/// Renders a file as a JSON object holding only the selected fields.
pub fn project(file: &File, selection: &Selection) -> Map<String, Value> {
    let mut map = Map::with_capacity(selection.fields().len());

    for f in selection.fields() {
        let value = match f.name {
            "id" => json!(file.id),
            "createdAt" => timestamp_value(file.created_at),
            "updatedAt" => timestamp_value(file.updated_at),
            "name" => json!(file.name),
            "maxAge" => json!(file.max_age),
            "zone" => json!(file.zone),
            "type" => json!(file.file_type),
            "size" => json!(file.size),
            "width" => json!(file.width),
            "height" => json!(file.height),
            "description" => json!(file.description),
            "creator" => json!(file.creator),
            "thumbnail" => file
                .thumbnail
                .as_deref()
                .map(bytes_value)
                .unwrap_or(Value::Null),
            "data" => bytes_value(&file.data),
            _ => continue,
        };
        map.insert(f.name.to_string(), value);
    }

    map
}
