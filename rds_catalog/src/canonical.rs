//! Deterministic serialization of one [`Conjunction`] into its canonical
//! subquery string — the cache key in `RDS_catalog`.
//!
//! `related` siblings are deliberately not part of the canonical form: the
//! specification's algorithm (§4.2) only walks the main chain and the
//! per-position `negated` chains. Two conjunctions whose heads differ only
//! in which reasoner-expanded alternatives are attached still share a
//! subquery, because the expansion is re-derived identically from the head
//! tag every time the cache is rebuilt.

use crate::{
    error::{EmptyConjunctionSnafu, InvalidAtomSnafu, Result},
    model::{Conjunction, Op, TagAtom},
};

/// Render one conjunction into its canonical subquery string.
///
/// Callers MUST NOT call this on an empty conjunction (no chain atoms); this
/// returns [`crate::error::Error::EmptyConjunction`] rather than panicking,
/// but upstream code should never hit it on a well-formed query tree.
pub fn canonicalize(conjunction: &Conjunction) -> Result<String> {
    if conjunction.chain.is_empty() {
        return EmptyConjunctionSnafu.fail();
    }

    let mut out = String::new();

    for node in &conjunction.chain {
        out.push_str(&render_atom(&node.atom)?);
    }

    for negated_at_position in &conjunction.negated {
        for negated in negated_at_position {
            out.push_str("-/");
            out.push_str(&render_atom(&negated.atom)?);
        }
    }

    Ok(out)
}

fn render_atom(atom: &TagAtom) -> Result<String> {
    match atom {
        TagAtom::ById { .. } => InvalidAtomSnafu.fail(),
        TagAtom::ByName { tag } => Ok(format!("{tag}/")),
        TagAtom::Triple {
            namespace,
            key,
            op,
            value,
        } => Ok(format!(
            "{namespace}/{key}/{}/{value}/",
            op_token(*op)
        )),
    }
}

fn op_token(op: Op) -> &'static str {
    op.canonical_token()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AtomWithRelated;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    fn tag(name: &str) -> TagAtom {
        TagAtom::ByName {
            tag: name.to_string(),
        }
    }

    #[test]
    fn single_tag() {
        let conj = Conjunction::from_chain(vec![AtomWithRelated::new(tag("red"))]);
        assert_eq!(canonicalize(&conj).unwrap(), "red/");
    }

    #[test]
    fn triple_atom_matches_s4() {
        let conj = Conjunction::from_chain(vec![AtomWithRelated::new(TagAtom::Triple {
            namespace: "author".to_string(),
            key: "name".to_string(),
            op: Op::Eq,
            value: "Tx0".to_string(),
        })]);
        assert_eq!(canonicalize(&conj).unwrap(), "author/name/eq/Tx0/");
    }

    #[test]
    fn negation_is_appended_after_main_chain() {
        let mut conj = Conjunction::from_chain(vec![AtomWithRelated::new(tag("red"))]);
        conj.negated[0].push(AtomWithRelated::new(tag("big")));
        assert_eq!(canonicalize(&conj).unwrap(), "red/-/big/");
    }

    #[test]
    fn related_siblings_do_not_affect_the_key() {
        let with_related = Conjunction::from_chain(vec![AtomWithRelated::with_related(
            tag("red"),
            vec![tag("crimson")],
        )]);
        let without_related =
            Conjunction::from_chain(vec![AtomWithRelated::new(tag("red"))]);
        assert_eq!(
            canonicalize(&with_related).unwrap(),
            canonicalize(&without_related).unwrap()
        );
    }

    #[test]
    fn id_only_atom_is_rejected() {
        let conj = Conjunction::from_chain(vec![AtomWithRelated::new(TagAtom::ById {
            tag_id: 7,
        })]);
        assert_matches!(canonicalize(&conj), Err(crate::error::Error::InvalidAtom));
    }

    #[test]
    fn empty_conjunction_is_rejected() {
        assert_matches!(
            canonicalize(&Conjunction::default()),
            Err(crate::error::Error::EmptyConjunction)
        );
    }

    fn arb_tag_name() -> impl Strategy<Value = String> {
        "[a-z]{1,8}".prop_map(|s| s)
    }

    fn arb_atom() -> impl Strategy<Value = TagAtom> {
        prop_oneof![
            arb_tag_name().prop_map(|tag| TagAtom::ByName { tag }),
            (arb_tag_name(), arb_tag_name(), arb_tag_name()).prop_map(
                |(namespace, key, value)| TagAtom::Triple {
                    namespace,
                    key,
                    op: Op::Eq,
                    value,
                }
            ),
        ]
    }

    fn arb_node() -> impl Strategy<Value = AtomWithRelated> {
        (arb_atom(), proptest::collection::vec(arb_atom(), 0..3))
            .prop_map(|(atom, related)| AtomWithRelated::with_related(atom, related))
    }

    fn arb_conjunction() -> impl Strategy<Value = Conjunction> {
        proptest::collection::vec(arb_node(), 1..4).prop_map(Conjunction::from_chain)
    }

    proptest! {
        /// Invariant 1: canonicalization determinism — cloning a conjunction
        /// (definitionally structurally equal to itself) must always yield
        /// byte-identical subquery strings.
        #[test]
        fn canonicalization_is_deterministic(conj in arb_conjunction()) {
            let a = canonicalize(&conj);
            let b = canonicalize(&conj.clone());
            prop_assert_eq!(a.ok(), b.ok());
        }

        /// Canonicalization never observes `related` siblings.
        #[test]
        fn related_never_changes_the_key(conj in arb_conjunction(), extra in arb_atom()) {
            let mut with_extra_related = conj.clone();
            with_extra_related.chain[0].related.push(extra);
            prop_assert_eq!(canonicalize(&conj).ok(), canonicalize(&with_extra_related).ok());
        }
    }
}
