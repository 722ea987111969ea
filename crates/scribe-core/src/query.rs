//! Backend-neutral description of a table read.
//!
//! A `Select` names a table, the columns and nested relations to return, a set of
//! equality filters and an optional ordering. Adapters either render it in
//! PostgREST syntax or evaluate it themselves.

use serde_json::Value;

use crate::error::DataError;

/// Equality predicate on one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Whether `row` satisfies this filter. Missing columns compare as null.
    pub fn matches(&self, row: &Value) -> bool {
        row.get(&self.column).unwrap_or(&Value::Null) == &self.value
    }

    /// PostgREST operator expression, e.g. `eq.42` or `is.null`.
    pub fn to_postgrest(&self) -> String {
        match &self.value {
            Value::Null => "is.null".to_string(),
            Value::String(s) => format!("eq.{s}"),
            other => format!("eq.{other}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

impl Order {
    pub fn to_postgrest(&self) -> String {
        let dir = match self.direction {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        };
        format!("{}.{dir}", self.column)
    }
}

/// How an embedded relation joins to its parent row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
    /// `parent[column]` holds the id of one row in `table`.
    BelongsTo { column: String, table: String },
    /// Rows in `table` whose `foreign_key` holds the parent's id.
    HasMany { table: String, foreign_key: String },
}

/// A relation expanded inline under `alias`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub alias: String,
    pub relation: Relation,
    pub selection: Selection,
}

impl Embed {
    fn render(&self) -> String {
        let hint = match &self.relation {
            Relation::BelongsTo { column, .. } => column,
            Relation::HasMany { table, .. } => table,
        };
        format!("{}:{hint}({})", self.alias, self.selection.render())
    }
}

/// Columns plus nested relations to return. No columns means all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    columns: Vec<String>,
    embeds: Vec<Embed>,
}

impl Selection {
    /// Every column, no relations.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn columns(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            embeds: Vec::new(),
        }
    }

    pub fn belongs_to(
        mut self,
        alias: impl Into<String>,
        column: impl Into<String>,
        table: impl Into<String>,
        selection: Selection,
    ) -> Self {
        self.embeds.push(Embed {
            alias: alias.into(),
            relation: Relation::BelongsTo {
                column: column.into(),
                table: table.into(),
            },
            selection,
        });
        self
    }

    pub fn has_many(
        mut self,
        alias: impl Into<String>,
        table: impl Into<String>,
        foreign_key: impl Into<String>,
        selection: Selection,
    ) -> Self {
        self.embeds.push(Embed {
            alias: alias.into(),
            relation: Relation::HasMany {
                table: table.into(),
                foreign_key: foreign_key.into(),
            },
            selection,
        });
        self
    }

    pub fn column_list(&self) -> &[String] {
        &self.columns
    }

    pub fn embeds(&self) -> &[Embed] {
        &self.embeds
    }

    /// PostgREST `select=` value.
    pub fn render(&self) -> String {
        let mut parts = if self.columns.is_empty() {
            vec!["*".to_string()]
        } else {
            self.columns.clone()
        };
        parts.extend(self.embeds.iter().map(Embed::render));
        parts.join(",")
    }
}

/// A read against one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub table: String,
    pub selection: Selection,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
}

impl Select {
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            selection: Selection::all(),
            filters: Vec::new(),
            order: None,
        }
    }

    pub fn select(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    pub fn order(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order = Some(Order {
            column: column.into(),
            direction,
        });
        self
    }
}

/// Exactly one row, or an error.
pub fn single(mut rows: Vec<Value>) -> Result<Value, DataError> {
    match rows.len() {
        0 => Err(DataError::NotFound),
        1 => Ok(rows.remove(0)),
        n => Err(DataError::MultipleRows(n)),
    }
}

/// Zero or one row; more than one is an error.
pub fn maybe_single(mut rows: Vec<Value>) -> Result<Option<Value>, DataError> {
    match rows.len() {
        0 => Ok(None),
        1 => Ok(Some(rows.remove(0))),
        n => Err(DataError::MultipleRows(n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_nested_selection() {
        let selection = Selection::all()
            .belongs_to("author", "author_id", "profiles", Selection::all())
            .has_many(
                "comments",
                "comments",
                "blog_id",
                Selection::all().belongs_to("user", "user_id", "profiles", Selection::all()),
            );

        assert_eq!(
            selection.render(),
            "*,author:author_id(*),comments:comments(*,user:user_id(*))"
        );
    }

    #[test]
    fn test_render_explicit_columns() {
        let selection = Selection::columns(&["id", "full_name"]);
        assert_eq!(selection.render(), "id,full_name");
    }

    #[test]
    fn test_filter_expressions() {
        assert_eq!(Filter::eq("slug", "hello").to_postgrest(), "eq.hello");
        assert_eq!(Filter::eq("is_published", true).to_postgrest(), "eq.true");
        assert_eq!(Filter::eq("parent", Value::Null).to_postgrest(), "is.null");
    }

    #[test]
    fn test_filter_matches_rows() {
        let row = json!({ "id": "1", "is_published": true });
        assert!(Filter::eq("is_published", true).matches(&row));
        assert!(!Filter::eq("id", "2").matches(&row));
        assert!(Filter::eq("missing", Value::Null).matches(&row));
    }

    #[test]
    fn test_order_expression() {
        let query = Select::from("blogs").order("published_at", Direction::Desc);
        assert_eq!(query.order.unwrap().to_postgrest(), "published_at.desc");
    }

    #[test]
    fn test_single_row_assertions() {
        assert!(matches!(single(vec![]), Err(DataError::NotFound)));
        assert!(matches!(
            single(vec![json!({}), json!({})]),
            Err(DataError::MultipleRows(2))
        ));
        assert_eq!(maybe_single(vec![]).unwrap(), None);
        assert_eq!(maybe_single(vec![json!(1)]).unwrap(), Some(json!(1)));
    }
}
