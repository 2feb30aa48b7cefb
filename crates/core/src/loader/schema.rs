//! Table schema registry for the movies database
//!
//! The registry maps each logical table to the DDL used to provision it and
//! to the typed, positional bindings its insert statement expects. It is
//! built once at startup and passed by reference to the provisioner and the
//! bulk loader.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use serde::{Deserialize, Serialize};

use super::error::{LoadError, RecordError, SchemaError};

/// Logical tables of the movies database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableName {
    Actors,
    Movies,
    Directors,
    Roles,
    MoviesGenres,
    DirectorsGenres,
}

impl TableName {
    /// Every table, referenced tables before referencing ones
    pub const ALL: [TableName; 6] = [
        TableName::Actors,
        TableName::Movies,
        TableName::Directors,
        TableName::Roles,
        TableName::MoviesGenres,
        TableName::DirectorsGenres,
    ];

    /// SQL table name
    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::Actors => "actors",
            TableName::Movies => "movies",
            TableName::Directors => "directors",
            TableName::Roles => "roles",
            TableName::MoviesGenres => "movies_genres",
            TableName::DirectorsGenres => "directors_genres",
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableName {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TableName::ALL
            .into_iter()
            .find(|table| table.as_str() == s)
            .ok_or_else(|| LoadError::UnknownTable(s.to_string()))
    }
}

/// Coarse semantic type of a bound field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Signed 64-bit integer
    Integer,
    /// Floating-point number
    Real,
    /// Free text, always accepted
    Text,
    /// Floating-point number or the null sentinel
    Score,
}

impl FieldKind {
    /// Check whether a raw field has this kind's shape
    pub fn accepts(&self, value: &str, null_sentinel: &str) -> bool {
        match self {
            FieldKind::Integer => value.parse::<i64>().is_ok(),
            FieldKind::Real => value.parse::<f64>().is_ok(),
            FieldKind::Text => true,
            FieldKind::Score => value == null_sentinel || value.parse::<f64>().is_ok(),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Integer => "integer",
            FieldKind::Real => "real",
            FieldKind::Text => "text",
            FieldKind::Score => "score",
        };
        f.write_str(name)
    }
}

/// A column definition used for provisioning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: &'static str,
    /// Column constraint, e.g. `NOT NULL PRIMARY KEY`
    pub constraint: Option<&'static str>,
}

impl ColumnDef {
    /// Nullable column without constraints
    pub fn new(name: &'static str, sql_type: &'static str) -> Self {
        Self {
            name,
            sql_type,
            constraint: None,
        }
    }

    /// Externally supplied integer primary key
    pub fn primary_key(name: &'static str) -> Self {
        Self {
            name,
            sql_type: "INTEGER",
            constraint: Some("NOT NULL PRIMARY KEY"),
        }
    }

    /// Synthetic auto-incrementing primary key
    pub fn auto_id(name: &'static str) -> Self {
        Self {
            name,
            sql_type: "INTEGER",
            constraint: Some("NOT NULL PRIMARY KEY AUTOINCREMENT"),
        }
    }

    fn to_sql(&self) -> String {
        match self.constraint {
            Some(constraint) => format!("\"{}\" {} {}", self.name, self.sql_type, constraint),
            None => format!("\"{}\" {}", self.name, self.sql_type),
        }
    }
}

/// A declared foreign key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references: TableName,
    pub referenced_column: &'static str,
}

impl ForeignKey {
    /// Foreign key onto another table's `id`
    pub fn to_id(column: &'static str, references: TableName) -> Self {
        Self {
            column,
            references,
            referenced_column: "id",
        }
    }
}

/// One positional insert parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub column: &'static str,
    pub kind: FieldKind,
}

impl Binding {
    pub fn new(column: &'static str, kind: FieldKind) -> Self {
        Self { column, kind }
    }
}

/// Provisioning and insert shape of one table
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: TableName,
    pub columns: Vec<ColumnDef>,
    /// Composite primary key columns (empty when a column carries the key)
    pub primary_key: Vec<&'static str>,
    pub foreign_keys: Vec<ForeignKey>,
    /// Insert parameters, in source field order
    pub bindings: Vec<Binding>,
}

impl TableSchema {
    /// Render the idempotent create statement
    pub fn create_table_sql(&self) -> String {
        let mut definitions: Vec<String> = self.columns.iter().map(ColumnDef::to_sql).collect();

        if !self.primary_key.is_empty() {
            let keys: Vec<String> = self
                .primary_key
                .iter()
                .map(|column| format!("\"{column}\""))
                .collect();
            definitions.push(format!("PRIMARY KEY({})", keys.join(", ")));
        }

        for fk in &self.foreign_keys {
            definitions.push(format!(
                "FOREIGN KEY(\"{}\") REFERENCES {}(\"{}\")",
                fk.column, fk.references, fk.referenced_column
            ));
        }

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            self.name,
            definitions.join(",\n    ")
        )
    }

    /// Render the positional insert statement
    pub fn insert_sql(&self) -> String {
        let columns: Vec<String> = self
            .bindings
            .iter()
            .map(|binding| format!("\"{}\"", binding.column))
            .collect();
        let params: Vec<String> = (1..=self.bindings.len()).map(|i| format!("?{i}")).collect();

        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.name,
            columns.join(", "),
            params.join(", ")
        )
    }

    /// Validate a record's field count and coarse field kinds
    pub fn check_record(&self, record: &[String], null_sentinel: &str) -> Result<(), RecordError> {
        if record.len() != self.bindings.len() {
            return Err(RecordError::FieldCount {
                expected: self.bindings.len(),
                found: record.len(),
            });
        }

        for (binding, value) in self.bindings.iter().zip(record) {
            if !binding.kind.accepts(value, null_sentinel) {
                return Err(RecordError::FieldKind {
                    column: binding.column.to_string(),
                    expected: binding.kind,
                    value: value.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Ordered set of table schemas
///
/// Order matters: it is both the provisioning order and the load order.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    tables: Vec<TableSchema>,
}

impl SchemaRegistry {
    /// Create a registry from explicit table schemas
    pub fn new(tables: Vec<TableSchema>) -> Self {
        Self { tables }
    }

    /// The fixed IMDB registry
    pub fn imdb() -> Self {
        use FieldKind::{Integer, Real, Score, Text};

        let actors = TableSchema {
            name: TableName::Actors,
            columns: vec![
                ColumnDef::primary_key("id"),
                ColumnDef::new("first_name", "TEXT"),
                ColumnDef::new("last_name", "TEXT"),
                ColumnDef::new("gender", "TEXT"),
            ],
            primary_key: vec![],
            foreign_keys: vec![],
            bindings: vec![
                Binding::new("id", Integer),
                Binding::new("first_name", Text),
                Binding::new("last_name", Text),
                Binding::new("gender", Text),
            ],
        };

        let movies = TableSchema {
            name: TableName::Movies,
            columns: vec![
                ColumnDef::primary_key("id"),
                ColumnDef::new("name", "TEXT"),
                ColumnDef::new("year", "INTEGER"),
                ColumnDef::new("rank", "REAL"),
            ],
            primary_key: vec![],
            foreign_keys: vec![],
            bindings: vec![
                Binding::new("id", Integer),
                Binding::new("name", Text),
                Binding::new("year", Integer),
                Binding::new("rank", Score),
            ],
        };

        let directors = TableSchema {
            name: TableName::Directors,
            columns: vec![
                ColumnDef::primary_key("id"),
                ColumnDef::new("first_name", "TEXT"),
                ColumnDef::new("last_name", "TEXT"),
            ],
            primary_key: vec![],
            foreign_keys: vec![],
            bindings: vec![
                Binding::new("id", Integer),
                Binding::new("first_name", Text),
                Binding::new("last_name", Text),
            ],
        };

        let roles = TableSchema {
            name: TableName::Roles,
            columns: vec![
                ColumnDef::auto_id("id"),
                ColumnDef::new("actor_id", "INTEGER"),
                ColumnDef::new("movie_id", "INTEGER"),
                ColumnDef::new("role", "TEXT"),
            ],
            primary_key: vec![],
            foreign_keys: vec![
                ForeignKey::to_id("actor_id", TableName::Actors),
                ForeignKey::to_id("movie_id", TableName::Movies),
            ],
            bindings: vec![
                Binding::new("actor_id", Integer),
                Binding::new("movie_id", Integer),
                Binding::new("role", Text),
            ],
        };

        let movies_genres = TableSchema {
            name: TableName::MoviesGenres,
            columns: vec![
                ColumnDef::new("movie_id", "INTEGER"),
                ColumnDef::new("genre", "TEXT"),
            ],
            primary_key: vec!["movie_id", "genre"],
            foreign_keys: vec![ForeignKey::to_id("movie_id", TableName::Movies)],
            bindings: vec![Binding::new("movie_id", Integer), Binding::new("genre", Text)],
        };

        let directors_genres = TableSchema {
            name: TableName::DirectorsGenres,
            columns: vec![
                ColumnDef::new("director_id", "INTEGER"),
                ColumnDef::new("genre", "TEXT"),
                ColumnDef::new("prob", "REAL"),
            ],
            primary_key: vec![],
            foreign_keys: vec![ForeignKey::to_id("director_id", TableName::Directors)],
            bindings: vec![
                Binding::new("director_id", Integer),
                Binding::new("genre", Text),
                Binding::new("prob", Real),
            ],
        };

        Self::new(vec![
            actors,
            movies,
            directors,
            roles,
            movies_genres,
            directors_genres,
        ])
    }

    /// All tables in provisioning order
    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }

    /// Get a table schema by identifier
    pub fn get(&self, name: TableName) -> Option<&TableSchema> {
        self.tables.iter().find(|table| table.name == name)
    }

    /// Resolve a logical table name
    pub fn lookup(&self, name: &str) -> Result<&TableSchema, LoadError> {
        self.tables
            .iter()
            .find(|table| table.name.as_str() == name)
            .ok_or_else(|| LoadError::UnknownTable(name.to_string()))
    }

    /// Check that every referenced table is created before its dependents
    pub fn validate_dependency_order(&self) -> Result<(), SchemaError> {
        let mut graph = DiGraph::<TableName, ()>::new();
        let mut nodes = HashMap::new();
        let mut positions = HashMap::new();

        for (position, table) in self.tables.iter().enumerate() {
            nodes.insert(table.name, graph.add_node(table.name));
            positions.insert(table.name, position);
        }

        for table in &self.tables {
            for fk in &table.foreign_keys {
                let referenced =
                    nodes
                        .get(&fk.references)
                        .ok_or_else(|| SchemaError::UnknownReference {
                            table: table.name.to_string(),
                            referenced: fk.references.to_string(),
                        })?;
                graph.add_edge(*referenced, nodes[&table.name], ());
            }
        }

        toposort(&graph, None)
            .map_err(|cycle| SchemaError::DependencyCycle(graph[cycle.node_id()].to_string()))?;

        for table in &self.tables {
            for fk in &table.foreign_keys {
                if positions[&fk.references] > positions[&table.name] {
                    return Err(SchemaError::OutOfOrder {
                        table: table.name.to_string(),
                        referenced: fk.references.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}
