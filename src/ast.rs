/// Everything recognised in one piece of schema text, in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    pub tables: Vec<TableDecl>,
    pub refs: Vec<RefDecl>,
    /// Fragments that looked like declarations but were dropped.
    pub skipped: Vec<Skipped>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableDecl {
    pub name: String,
    pub columns: Vec<ColumnDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDecl {
    pub name: String,
    pub data_type: String,
    pub is_primary_key: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefDecl {
    /// Present for the `Ref name: a.b > c.d` form.
    pub name: Option<String>,
    pub from: ColumnRef,
    /// The relation operator as written (`>`, `<`, `-`, `<>`, ...). Not interpreted.
    pub op: String,
    pub to: ColumnRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skipped {
    /// `Table name {` with no matching `}`.
    UnterminatedTable { name: String, offset: usize },
    /// A body line with fewer than two whitespace-separated tokens.
    MalformedColumn { table: String, line: String },
    /// `Ref` not followed by `: table.column <op> table.column`.
    MalformedRef { offset: usize },
}
