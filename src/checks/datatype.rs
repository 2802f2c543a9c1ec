//! Literal values against declared datatype ranges.

use oxigraph::model::NamedNodeRef;

use super::lexical::{in_lexical_space, is_derived_from};
use super::{CheckContext, CheckKind, Checker, Focus};
use crate::model::{Literal, Object, Resource, Triple};
use crate::violation::Violation;
use crate::vocab::{rdf, rdfs, xsd};

#[derive(Debug, Default, Clone, Copy)]
pub struct DatatypeChecker;

/// Whether `literal` is a member of the value space of `datatype`.
pub fn literal_conforms(literal: &Literal, datatype: &Resource) -> bool {
    if datatype.is(rdfs::LITERAL) {
        return true;
    }
    if datatype.is(rdf::LANG_STRING) {
        return literal.language.is_some();
    }
    if literal.language.is_some() {
        return false;
    }

    let Resource::Iri(expected) = datatype else {
        return literal.datatype == *datatype;
    };
    let expected = NamedNodeRef::new_unchecked(expected);
    let actual = NamedNodeRef::new_unchecked(literal.datatype.as_str());

    // Plain strings are judged by their lexical form alone. Typed literals
    // must sit on the same derivation chain as the range.
    let related = is_derived_from(actual, expected) || is_derived_from(expected, actual);
    if actual != xsd::STRING && !related {
        return false;
    }
    if in_lexical_space(&literal.lexical, actual) == Some(false) {
        return false;
    }
    match in_lexical_space(&literal.lexical, expected) {
        Some(valid) => valid,
        None => actual == expected,
    }
}

impl DatatypeChecker {
    pub fn check_triple(&self, ctx: &CheckContext<'_>, triple: &Triple) -> Vec<Violation> {
        let Object::Literal(literal) = &triple.object else {
            return Vec::new();
        };
        let Some(declaration) = ctx.index.property(&triple.predicate) else {
            return Vec::new();
        };

        declaration
            .datatype_ranges
            .iter()
            .filter(|datatype| !literal_conforms(literal, datatype))
            .map(|datatype| Violation::DatatypeMismatch {
                triple: triple.clone(),
                expected: datatype.clone(),
            })
            .collect()
    }
}

impl Checker for DatatypeChecker {
    fn kind(&self) -> CheckKind {
        CheckKind::Datatype
    }

    fn targets(&self, ctx: &CheckContext<'_>) -> Vec<Focus> {
        ctx.index
            .properties()
            .filter(|declaration| !declaration.datatype_ranges.is_empty())
            .flat_map(|declaration| {
                ctx.data
                    .triples_with_predicate(declaration.property.as_str())
                    .into_iter()
                    .filter(|triple| matches!(triple.object, Object::Literal(_)))
                    .map(Focus::Triple)
            })
            .collect()
    }

    fn check(&self, ctx: &CheckContext<'_>, focus: &Focus) -> Vec<Violation> {
        match focus {
            Focus::Triple(triple) => self.check_triple(ctx, triple),
            Focus::Resource(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_support::{ex, run};
    use crate::violation::ViolationKind;

    const SCHEMA: &str = r#"
        :age a owl:DatatypeProperty ; rdfs:range xsd:nonNegativeInteger .
        :born a owl:DatatypeProperty ; rdfs:range xsd:date .
        :label rdfs:range rdf:langString .
        :note rdfs:range rdfs:Literal .
        :code rdfs:range :CodeType .
        :CodeType a rdfs:Datatype .
    "#;

    fn xsd_literal(lexical: &str, datatype: NamedNodeRef<'_>) -> Literal {
        Literal::typed(lexical, datatype.into())
    }

    #[test]
    fn typed_literal_with_matching_datatype_passes() {
        let found = run(
            &DatatypeChecker,
            r#":x :age "42"^^xsd:nonNegativeInteger ; :born "1990-05-17"^^xsd:date ."#,
            SCHEMA,
        );
        assert!(found.is_empty(), "{found:?}");
    }

    #[test]
    fn plain_string_judged_by_lexical_form() {
        let ok = run(&DatatypeChecker, r#":x :age "42" ."#, SCHEMA);
        assert!(ok.is_empty(), "{ok:?}");

        let bad = run(&DatatypeChecker, r#":x :age "forty-two" ."#, SCHEMA);
        assert_eq!(bad.count_of(ViolationKind::DatatypeMismatch), 1);
    }

    #[test]
    fn out_of_value_space_is_reported() {
        let ok = run(&DatatypeChecker, r#":x :age "3"^^xsd:integer ."#, SCHEMA);
        assert!(ok.is_empty(), "{ok:?}");

        let found = run(&DatatypeChecker, r#":x :age "-3"^^xsd:integer ."#, SCHEMA);
        let expected = Violation::DatatypeMismatch {
            triple: Triple::new(ex("x"), ex("age"), xsd_literal("-3", xsd::INTEGER)),
            expected: xsd::NON_NEGATIVE_INTEGER.into(),
        };
        assert_eq!(found.len(), 1);
        assert!(found.contains(&expected));
    }

    #[test]
    fn derived_datatype_is_accepted() {
        assert!(literal_conforms(
            &xsd_literal("7", xsd::BYTE),
            &Resource::from(xsd::INTEGER)
        ));
        assert!(!literal_conforms(
            &xsd_literal("7.5", xsd::DECIMAL),
            &Resource::from(xsd::INTEGER)
        ));
        assert!(!literal_conforms(
            &xsd_literal("300", xsd::BYTE),
            &Resource::from(xsd::INTEGER)
        ));
        assert!(!literal_conforms(
            &xsd_literal("1", xsd::BOOLEAN),
            &Resource::from(xsd::INTEGER)
        ));
    }

    #[test]
    fn language_tags() {
        let found = run(
            &DatatypeChecker,
            r#":x :label "chat"@fr ; :note "anything"@en ; :age "5"@en ."#,
            SCHEMA,
        );
        assert_eq!(found.len(), 1);
        assert!(found.iter().all(|v| matches!(
            v,
            Violation::DatatypeMismatch { triple, .. } if triple.predicate == ex("age")
        )));

        let untagged = run(&DatatypeChecker, r#":x :label "chat" ."#, SCHEMA);
        assert_eq!(untagged.len(), 1);
    }

    #[test]
    fn custom_datatype_requires_exact_type() {
        let ok = run(&DatatypeChecker, r#":x :code "A1"^^:CodeType ."#, SCHEMA);
        assert!(ok.is_empty());
        let bad = run(&DatatypeChecker, r#":x :code "A1" ."#, SCHEMA);
        assert_eq!(bad.len(), 1);
    }

    #[test]
    fn resource_objects_are_not_checked() {
        let found = run(&DatatypeChecker, ":x :age :y .", SCHEMA);
        assert!(found.is_empty());
    }
}
