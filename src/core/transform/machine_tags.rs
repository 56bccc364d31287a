//! Machine tag parsing
//!
//! Flickr machine tags have the form `namespace:predicate=value`. A tag
//! contributes to the output only when its predicate names a whitelisted
//! Darwin Core term.

use crate::domain::schema;
use regex::Regex;
use std::sync::OnceLock;

/// Parsed `namespace:predicate=value` triple
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineTag<'a> {
    pub namespace: &'a str,
    pub predicate: &'a str,
    pub value: &'a str,
}

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(.+):(.+)=(.+)$").expect("machine tag pattern is valid"))
}

/// Splits a tag into its machine tag parts, `None` for plain tags.
///
/// Matching is greedy, so with repeated separators the last `:` before the
/// last `=` splits namespace from predicate.
pub fn parse(tag: &str) -> Option<MachineTag<'_>> {
    let caps = pattern().captures(tag.trim())?;
    Some(MachineTag {
        namespace: caps.get(1)?.as_str(),
        predicate: caps.get(2)?.as_str(),
        value: caps.get(3)?.as_str(),
    })
}

/// Resolves a tag to `(schema field, value)` when its predicate is an
/// allowed term. The field is the canonical schema spelling.
pub fn to_field(tag: &str) -> Option<(&'static str, &str)> {
    let tag = parse(tag)?;
    let field = schema::canonical_tag(tag.predicate)?;
    Some((field, tag.value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_parse_machine_tag() {
        let tag = parse("taxonomy:scientificName=Felis catus").unwrap();
        assert_eq!(tag.namespace, "taxonomy");
        assert_eq!(tag.predicate, "scientificName");
        assert_eq!(tag.value, "Felis catus");
    }

    #[test_case("cat" ; "plain tag")]
    #[test_case("taxonomy:genus" ; "missing value")]
    #[test_case("genus=felis" ; "missing namespace")]
    #[test_case("taxonomy:=felis" ; "empty predicate")]
    fn test_parse_rejects(tag: &str) {
        assert!(parse(tag).is_none());
    }

    #[test_case("taxonomy:scientificName=Felis catus", "scientificName", "Felis catus")]
    #[test_case("dwc:SCIENTIFICNAME=Felis catus", "scientificName", "Felis catus")]
    #[test_case("taxonomy:binomial:genus=felis", "genus", "felis")]
    #[test_case("geo:country=Australia", "country", "Australia")]
    fn test_to_field(tag: &str, field: &str, value: &str) {
        assert_eq!(to_field(tag), Some((field, value)));
    }

    #[test]
    fn test_unknown_predicate_is_dropped() {
        assert_eq!(to_field("taxonomy:bogusfield=x"), None);
    }

    #[test]
    fn test_derived_column_is_not_a_tag_target() {
        assert_eq!(to_field("dwc:occurrenceID=abc"), None);
    }
}
