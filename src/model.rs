//! The diagram model: tables, columns, and foreign keys plus each table's
//! mutable logical position and size.
//!
//! Tables live in an arena indexed by [`TableId`] with a side index from name
//! to id. Ids are stable for the lifetime of one [`Diagram`]; a new parse
//! produces a new diagram with fresh ids.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ast::Schema;
use crate::geometry::{Point, Rect, Size};
use crate::parser::parse_schema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableId(pub usize);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub data_type: String,
    pub is_primary_key: bool,
}

/// A directed column reference. Either end may name a table that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKey {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
}

impl ForeignKey {
    /// Edge label, e.g. `user_id → id`.
    pub fn label(&self) -> String {
        format!("{} → {}", self.from_column, self.to_column)
    }
}

/// How a column is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    PrimaryKey,
    ForeignKey,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub primary_keys: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
    /// Top-left corner in logical units.
    pub position: Point,
    /// Logical size, assigned by the layout engine.
    pub size: Size,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_keys: Vec::new(),
            foreign_keys: Vec::new(),
            position: Point::default(),
            size: Size::default(),
        }
    }

    pub fn push_column(&mut self, column: Column) {
        if column.is_primary_key {
            self.primary_keys.push(column.name.clone());
        }
        self.columns.push(column);
    }

    /// Logical bounding box.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    pub fn is_foreign_key(&self, column: &str) -> bool {
        self.foreign_keys.iter().any(|fk| fk.from_column == column)
    }

    /// Primary key wins over foreign key.
    pub fn column_kind(&self, column: &Column) -> ColumnKind {
        if column.is_primary_key {
            ColumnKind::PrimaryKey
        } else if self.is_foreign_key(&column.name) {
            ColumnKind::ForeignKey
        } else {
            ColumnKind::Plain
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagram {
    tables: Vec<Table>,
    #[serde(skip)]
    index: HashMap<String, TableId>,
    relationships: Vec<ForeignKey>,
}

impl PartialEq for Diagram {
    fn eq(&self, other: &Self) -> bool {
        self.tables == other.tables && self.relationships == other.relationships
    }
}

impl Diagram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a diagram from parsed declarations.
    ///
    /// Tables are inserted first so a `Ref` attaches to its source table no
    /// matter where that table is declared.
    pub fn from_schema(schema: &Schema) -> Self {
        let mut diagram = Self::new();

        for decl in &schema.tables {
            let mut table = Table::new(decl.name.clone());
            for col in &decl.columns {
                table.push_column(Column {
                    name: col.name.clone(),
                    data_type: col.data_type.clone(),
                    is_primary_key: col.is_primary_key,
                });
            }
            diagram.insert_table(table);
        }

        for decl in &schema.refs {
            diagram.add_relationship(ForeignKey {
                from_table: decl.from.table.clone(),
                from_column: decl.from.column.clone(),
                to_table: decl.to.table.clone(),
                to_column: decl.to.column.clone(),
            });
        }

        diagram
    }

    /// Insert a table. A table with the same name is replaced in place and
    /// keeps its original id and iteration slot.
    pub fn insert_table(&mut self, table: Table) -> TableId {
        if let Some(&id) = self.index.get(&table.name) {
            tracing::debug!(
                table = %table.name,
                "duplicate table declaration replaces earlier one"
            );
            self.tables[id.0] = table;
            return id;
        }
        let id = TableId(self.tables.len());
        self.index.insert(table.name.clone(), id);
        self.tables.push(table);
        id
    }

    /// Record a relationship globally and on its source table, if present.
    pub fn add_relationship(&mut self, fk: ForeignKey) {
        if let Some(&id) = self.index.get(&fk.from_table) {
            self.tables[id.0].foreign_keys.push(fk.clone());
        }
        self.relationships.push(fk);
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Tables in declaration order.
    pub fn tables(&self) -> impl Iterator<Item = (TableId, &Table)> {
        self.tables.iter().enumerate().map(|(i, t)| (TableId(i), t))
    }

    pub fn tables_mut(&mut self) -> impl Iterator<Item = &mut Table> {
        self.tables.iter_mut()
    }

    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.tables.get(id.0)
    }

    pub fn table_mut(&mut self, id: TableId) -> Option<&mut Table> {
        self.tables.get_mut(id.0)
    }

    pub fn id_of(&self, name: &str) -> Option<TableId> {
        self.index.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.id_of(name).and_then(|id| self.table(id))
    }

    pub fn relationships(&self) -> &[ForeignKey] {
        &self.relationships
    }

    /// Relationships with an endpoint table that is not declared.
    pub fn dangling_references(&self) -> impl Iterator<Item = &ForeignKey> {
        self.relationships.iter().filter(|fk| {
            !self.index.contains_key(&fk.from_table) || !self.index.contains_key(&fk.to_table)
        })
    }

    /// Set a table's logical position. Returns `false` for an unknown id.
    pub fn move_table(&mut self, id: TableId, position: Point) -> bool {
        match self.table_mut(id) {
            Some(table) => {
                table.position = position;
                true
            }
            None => false,
        }
    }

    /// Logical bounding box of every table, `None` when empty.
    pub fn bounds(&self) -> Option<Rect> {
        self.tables
            .iter()
            .map(Table::bounds)
            .reduce(|acc, r| acc.union(&r))
    }
}

/// Parse schema text straight into a diagram (no layout applied).
pub fn parse(text: &str) -> Diagram {
    let schema = parse_schema(text);
    Diagram::from_schema(&schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO_A: &str = "Table users { id integer [pk] }\nTable posts {\n  id integer [pk]\n  user_id integer\n}\nRef: posts.user_id > users.id";

    fn names(diagram: &Diagram) -> Vec<&str> {
        diagram.tables().map(|(_, t)| t.name.as_str()).collect()
    }

    #[test]
    fn test_scenario_a_model() {
        let diagram = parse(SCENARIO_A);
        assert_eq!(names(&diagram), vec!["users", "posts"]);
        assert_eq!(diagram.relationships().len(), 1);

        let posts = diagram.get("posts").unwrap();
        assert_eq!(posts.columns.len(), 2);
        assert_eq!(posts.primary_keys, vec!["id"]);
        assert_eq!(posts.foreign_keys, diagram.relationships().to_vec());
        assert!(diagram.get("users").unwrap().foreign_keys.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let diagram = parse("");
        assert!(diagram.is_empty());
        assert!(diagram.relationships().is_empty());
        assert_eq!(diagram.bounds(), None);
    }

    #[test]
    fn test_last_declaration_wins() {
        let diagram = parse(
            "Table a { id int }\nTable b { id int }\nTable a { x text [pk]\n y text }",
        );
        assert_eq!(names(&diagram), vec!["a", "b"]);
        let a = diagram.get("a").unwrap();
        assert_eq!(a.columns.len(), 2);
        assert_eq!(a.columns[0].name, "x");
        assert_eq!(a.primary_keys, vec!["x"]);
        assert_eq!(diagram.id_of("a"), Some(TableId(0)));
    }

    #[test]
    fn test_primary_key_set_matches_markers() {
        let diagram = parse(
            "Table t {\n a int [pk]\n b int\n c int primary key\n d int [unique]\n}",
        );
        assert_eq!(diagram.get("t").unwrap().primary_keys, vec!["a", "c"]);
    }

    #[test]
    fn test_ref_attaches_to_table_declared_later() {
        let diagram = parse("Ref: late.x > early.id\nTable early { id int }\nTable late { x int }");
        assert_eq!(diagram.get("late").unwrap().foreign_keys.len(), 1);
    }

    #[test]
    fn test_dangling_reference_is_kept_globally() {
        let diagram = parse("Table a { x int }\nRef: a.x > missing.y");
        assert_eq!(diagram.relationships().len(), 1);
        assert_eq!(diagram.get("a").unwrap().foreign_keys.len(), 1);
        let dangling: Vec<_> = diagram.dangling_references().collect();
        assert_eq!(dangling.len(), 1);
        assert_eq!(dangling[0].to_table, "missing");
    }

    #[test]
    fn test_column_kind() {
        let diagram = parse(SCENARIO_A);
        let posts = diagram.get("posts").unwrap();
        assert_eq!(posts.column_kind(&posts.columns[0]), ColumnKind::PrimaryKey);
        assert_eq!(posts.column_kind(&posts.columns[1]), ColumnKind::ForeignKey);
        let users = diagram.get("users").unwrap();
        assert_eq!(users.column_kind(&users.columns[0]), ColumnKind::PrimaryKey);
    }

    #[test]
    fn test_parse_is_structurally_idempotent() {
        assert_eq!(parse(SCENARIO_A), parse(SCENARIO_A));
    }

    #[test]
    fn test_move_table() {
        let mut diagram = parse(SCENARIO_A);
        let id = diagram.id_of("posts").unwrap();
        assert!(diagram.move_table(id, Point::new(5.0, 6.0)));
        assert_eq!(diagram.table(id).unwrap().position, Point::new(5.0, 6.0));
        assert!(!diagram.move_table(TableId(99), Point::default()));
    }

    #[test]
    fn test_foreign_key_label() {
        let diagram = parse(SCENARIO_A);
        assert_eq!(diagram.relationships()[0].label(), "user_id → id");
    }
}
