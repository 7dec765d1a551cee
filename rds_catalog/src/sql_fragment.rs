//! Emits parameterized SQL predicate fragments for tag atoms.
//!
//! The specification (§4.3) describes this as string interpolation and
//! calls out escaping as carried design debt. Per its own compliance
//! requirement ("the builder's contract includes escaping... a compliant
//! implementation MUST either use parameterized statements or reject/escape
//! quote characters"), this implementation only ever emits `?` placeholders
//! and returns the bound values alongside the SQL text — no tag name,
//! namespace, key, or value is ever interpolated into a statement string.

use crate::{
    executor::SqlValue,
    model::{AtomWithRelated, Op, TagAtom},
};

/// A predicate fragment: SQL text with `?` placeholders, and the values to
/// bind to them, in order.
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    /// The fragment text, safe to splice into a larger `WHERE`/`OR` chain.
    pub sql: String,
    /// Positional parameters corresponding to the fragment's placeholders.
    pub params: Vec<SqlValue>,
}

impl Fragment {
    fn push_atom(&mut self, atom: &TagAtom) {
        match atom {
            TagAtom::ById { tag_id } => {
                self.sql.push_str("tagging.tag_id = ? ");
                self.params.push(SqlValue::int(*tag_id));
            }
            TagAtom::ByName { tag } => {
                self.sql.push_str("tagname = ? ");
                self.params.push(SqlValue::text(tag.clone()));
            }
            TagAtom::Triple {
                namespace,
                key,
                op,
                value,
            } => {
                self.sql.push_str("tagname = ? and `key` = ? and value ");
                self.params.push(SqlValue::text(namespace.clone()));
                self.params.push(SqlValue::text(key.clone()));
                match op {
                    Op::Eq => {
                        self.sql.push_str("= ? ");
                        self.params.push(SqlValue::text(value.clone()));
                    }
                    Op::Contains => {
                        self.sql.push_str("like ? ");
                        self.params.push(SqlValue::text(format!("%{value}%")));
                    }
                    Op::Gt => {
                        self.sql.push_str("> ? ");
                        self.params.push(SqlValue::text(value.clone()));
                    }
                    Op::Lt => {
                        self.sql.push_str("< ? ");
                        self.params.push(SqlValue::text(value.clone()));
                    }
                }
            }
        }
    }
}

/// Render one chain position's alternatives (`atom` plus every `related`
/// sibling) as a single OR-joined fragment, matching the `P(n) [ OR
/// P(n.related[0]) OR ... ]` shape used throughout §4.5.
pub fn render_alternatives(node: &AtomWithRelated) -> Fragment {
    let mut fragment = Fragment::default();
    for (i, atom) in node.alternatives().enumerate() {
        if i > 0 {
            fragment.sql.push_str("OR ");
        }
        fragment.push_atom(atom);
    }
    fragment
}
