use std::ops::Range;

use crate::ast::*;
use crate::lexer::{Lexer, Spanned, Token, strip_comments};

const TABLE_KEYWORD: &str = "Table";
const REF_KEYWORD: &str = "Ref";

/// Best-effort parser for DBML-like schema text.
///
/// Parsing never fails. Unrecognised top-level tokens are skipped one at a
/// time; fragments that start like a declaration but cannot be completed are
/// recorded in [`Schema::skipped`].
pub struct Parser {
    source: String,
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        let source = strip_comments(input);
        let tokens = Lexer::new(&source).tokenize();
        Self {
            source,
            tokens,
            pos: 0,
        }
    }

    fn peek(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .map_or(&Token::Eof, |t| &t.token)
    }

    fn advance(&mut self) -> &Token {
        let tok = self.tokens.get(self.pos).map_or(&Token::Eof, |t| &t.token);
        self.pos += 1;
        tok
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.source.len(), |t| t.span.start)
    }

    fn check_ident(&self, name: &str) -> bool {
        matches!(self.peek(), Token::Ident(s) if s == name)
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_ident(&mut self) -> Option<String> {
        match self.peek().clone() {
            Token::Ident(s) => {
                self.advance();
                Some(s)
            }
            _ => None,
        }
    }

    fn eat_rel_op(&mut self) -> Option<String> {
        match self.peek().clone() {
            Token::RelOp(op) => {
                self.advance();
                Some(op)
            }
            _ => None,
        }
    }

    pub fn parse(&mut self) -> Schema {
        let mut schema = Schema::default();

        while *self.peek() != Token::Eof {
            if self.check_ident(TABLE_KEYWORD) {
                self.parse_table(&mut schema);
            } else if self.check_ident(REF_KEYWORD) {
                self.parse_ref(&mut schema);
            } else {
                self.advance();
            }
        }

        schema
    }

    /// `Table <ident> { body }`. Leaves `pos` just past the keyword when the
    /// header does not match, so the name token is rescanned at top level.
    fn parse_table(&mut self, schema: &mut Schema) {
        let start = self.pos;
        self.advance(); // Table

        let Some(name) = self.eat_ident() else {
            self.pos = start + 1;
            return;
        };
        let open = self.pos;
        if !self.eat(&Token::LBrace) {
            self.pos = start + 1;
            return;
        }

        let Some((segments, close)) = self.find_block_end(open) else {
            tracing::debug!(table = %name, "table block has no closing brace, dropped");
            schema.skipped.push(Skipped::UnterminatedTable {
                name,
                offset: self.tokens[start].span.start,
            });
            // Resume inside the body so later declarations are still found.
            self.pos = open + 1;
            return;
        };

        let mut columns = Vec::new();
        for segment in segments {
            for line in self.source[segment].lines() {
                match parse_column_line(line) {
                    ColumnLine::Blank => {}
                    ColumnLine::Column(column) => columns.push(column),
                    ColumnLine::Malformed(line) => {
                        tracing::debug!(table = %name, line, "column line skipped");
                        schema.skipped.push(Skipped::MalformedColumn {
                            table: name.clone(),
                            line: line.to_string(),
                        });
                    }
                }
            }
        }

        self.pos = close + 1;
        schema.tables.push(TableDecl { name, columns });
    }

    /// Find the `}` matching the `{` at token index `open`.
    ///
    /// Returns the byte ranges of the body that sit directly inside the block
    /// (nested `{ ... }` sub-blocks cut out) and the index of the closing token.
    fn find_block_end(&self, open: usize) -> Option<(Vec<Range<usize>>, usize)> {
        let mut segments = Vec::new();
        let mut depth = 1usize;
        let mut seg_start = self.tokens[open].span.end;

        for (idx, tok) in self.tokens.iter().enumerate().skip(open + 1) {
            match tok.token {
                Token::LBrace => {
                    if depth == 1 {
                        segments.push(seg_start..tok.span.start);
                    }
                    depth += 1;
                }
                Token::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        segments.push(seg_start..tok.span.start);
                        return Some((segments, idx));
                    }
                    if depth == 1 {
                        seg_start = tok.span.end;
                    }
                }
                Token::Eof => return None,
                _ => {}
            }
        }

        None
    }

    /// `Ref: a.b <op> c.d` or `Ref name: a.b <op> c.d`.
    fn parse_ref(&mut self, schema: &mut Schema) {
        let start = self.pos;
        let offset = self.offset();
        self.advance(); // Ref

        match self.parse_ref_body() {
            Some(decl) => schema.refs.push(decl),
            None => {
                tracing::debug!(offset, "malformed Ref skipped");
                schema.skipped.push(Skipped::MalformedRef { offset });
                self.pos = start + 1;
            }
        }
    }

    fn parse_ref_body(&mut self) -> Option<RefDecl> {
        let name = self.eat_ident();
        if !self.eat(&Token::Colon) {
            return None;
        }
        let from = self.parse_column_ref()?;
        let op = self.eat_rel_op()?;
        let to = self.parse_column_ref()?;
        Some(RefDecl { name, from, op, to })
    }

    fn parse_column_ref(&mut self) -> Option<ColumnRef> {
        let table = self.eat_ident()?;
        if !self.eat(&Token::Dot) {
            return None;
        }
        let column = self.eat_ident()?;
        Some(ColumnRef { table, column })
    }
}

enum ColumnLine<'a> {
    Blank,
    Column(ColumnDecl),
    Malformed(&'a str),
}

/// `name type [markers...]`; anything after the second token is only
/// inspected for primary-key markers.
fn parse_column_line(line: &str) -> ColumnLine<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ColumnLine::Blank;
    }

    let mut parts = line.split_whitespace();
    let (Some(name), Some(data_type)) = (parts.next(), parts.next()) else {
        return ColumnLine::Malformed(line);
    };

    let lower = line.to_lowercase();
    let is_primary_key = lower.contains("[pk]") || lower.contains("primary key");

    ColumnLine::Column(ColumnDecl {
        name: name.to_string(),
        data_type: data_type.to_string(),
        is_primary_key,
    })
}

/// Parse schema text into its declarations.
pub fn parse_schema(input: &str) -> Schema {
    Parser::new(input).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_names(table: &TableDecl) -> Vec<&str> {
        table.columns.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_parse_table() {
        let input = r#"
            Table users {
                id integer [pk]
                username varchar
                email varchar [not null, unique]
            }
        "#;
        let schema = parse_schema(input);
        assert_eq!(schema.tables.len(), 1);
        let users = &schema.tables[0];
        assert_eq!(users.name, "users");
        assert_eq!(column_names(users), vec!["id", "username", "email"]);
        assert_eq!(users.columns[0].data_type, "integer");
        assert!(users.columns[0].is_primary_key);
        assert!(!users.columns[2].is_primary_key);
        assert!(schema.skipped.is_empty());
    }

    #[test]
    fn test_primary_key_markers_are_case_insensitive() {
        let input = r#"
            Table t {
                a int [PK]
                b int PRIMARY KEY
                c int [pk, increment]
                d int [Primary Key]
            }
        "#;
        let schema = parse_schema(input);
        let flags: Vec<bool> = schema.tables[0]
            .columns
            .iter()
            .map(|c| c.is_primary_key)
            .collect();
        // `[pk, increment]` does not contain the literal `[pk]` marker.
        assert_eq!(flags, vec![true, true, false, true]);
    }

    #[test]
    fn test_data_type_is_second_token() {
        let schema = parse_schema("Table t {\n amount decimal(10,2) [note: 'x y']\n}");
        assert_eq!(schema.tables[0].columns[0].data_type, "decimal(10,2)");
    }

    #[test]
    fn test_single_token_line_is_skipped() {
        let schema = parse_schema("Table t { id }");
        assert_eq!(schema.tables.len(), 1);
        assert!(schema.tables[0].columns.is_empty());
        assert_eq!(
            schema.skipped,
            vec![Skipped::MalformedColumn {
                table: "t".into(),
                line: "id".into(),
            }]
        );
    }

    #[test]
    fn test_empty_body_is_a_table() {
        let schema = parse_schema("Table empty {}");
        assert_eq!(schema.tables.len(), 1);
        assert!(schema.tables[0].columns.is_empty());
    }

    #[test]
    fn test_unterminated_table_is_dropped() {
        let schema = parse_schema("Table a {\n id int\n");
        assert!(schema.tables.is_empty());
        assert!(matches!(
            schema.skipped[0],
            Skipped::UnterminatedTable { ref name, offset: 0 } if name == "a"
        ));
    }

    #[test]
    fn test_unterminated_table_does_not_swallow_next_table() {
        let input = "Table a {\n id int\n\nTable b {\n x int\n}\n";
        let schema = parse_schema(input);
        assert_eq!(schema.tables.len(), 1);
        assert_eq!(schema.tables[0].name, "b");
        assert_eq!(column_names(&schema.tables[0]), vec!["x"]);
    }

    #[test]
    fn test_nested_blocks_are_not_columns() {
        let input = r#"
            Table orders {
                id int [pk]
                indexes {
                    (id, created_at) [unique]
                }
                created_at timestamp
            }
        "#;
        let schema = parse_schema(input);
        assert_eq!(column_names(&schema.tables[0]), vec!["id", "created_at"]);
    }

    #[test]
    fn test_comments_are_ignored() {
        let input = r#"
            // Table ghost { id int }
            /* Table hidden {
                id int
            } */
            Table real {
                id int // trailing note
            }
        "#;
        let schema = parse_schema(input);
        assert_eq!(schema.tables.len(), 1);
        assert_eq!(schema.tables[0].name, "real");
        assert_eq!(schema.tables[0].columns[0].data_type, "int");
    }

    #[test]
    fn test_keyword_must_be_exact() {
        let schema = parse_schema("table lower { id int }\nMyTable x { id int }");
        assert!(schema.tables.is_empty());
    }

    #[test]
    fn test_parse_refs() {
        let input = r#"
            Ref: posts.user_id > users.id
            Ref:comments.post_id<posts.id
            Ref fk_tag: tags.id <> posts.id
        "#;
        let schema = parse_schema(input);
        assert_eq!(schema.refs.len(), 3);
        assert_eq!(
            schema.refs[0].from,
            ColumnRef {
                table: "posts".into(),
                column: "user_id".into()
            }
        );
        assert_eq!(schema.refs[0].to.table, "users");
        assert_eq!(schema.refs[1].op, "<");
        assert_eq!(schema.refs[2].name.as_deref(), Some("fk_tag"));
        assert_eq!(schema.refs[2].op, "<>");
    }

    #[test]
    fn test_malformed_ref_is_recorded() {
        let schema = parse_schema("Ref: posts.user_id users.id\nRef: a.b - c.d");
        assert_eq!(schema.refs.len(), 1);
        assert_eq!(schema.refs[0].from.table, "a");
        assert_eq!(schema.skipped, vec![Skipped::MalformedRef { offset: 0 }]);
    }

    #[test]
    fn test_empty_input() {
        let schema = parse_schema("");
        assert_eq!(schema, Schema::default());
    }

    #[test]
    fn test_garbage_input_does_not_panic() {
        let schema = parse_schema("}}{{ Table { Ref: . > . [pk] /* Table x {");
        assert!(schema.tables.is_empty());
        assert!(schema.refs.is_empty());
    }

    #[test]
    fn test_parse_unicode() {
        let schema = parse_schema("Table ユーザー {\n 名前 文字列 [pk]\n}");
        assert_eq!(schema.tables[0].name, "ユーザー");
        assert_eq!(schema.tables[0].columns[0].name, "名前");
        assert!(schema.tables[0].columns[0].is_primary_key);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let input = "Table a { id int [pk] }\nRef: a.id > a.id";
        assert_eq!(parse_schema(input), parse_schema(input));
    }
}
