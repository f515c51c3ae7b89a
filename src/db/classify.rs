//! Classification Adapter - token tags to entity kinds
//!
//! External analyzers classify source tokens with highlighting-style tags
//! ("definition of a method", "use of a global", "keyword", ...). This
//! module is the narrow translation layer between that vocabulary and the
//! entity model: pure mappings, no state, called while analyzers populate
//! a database. The store itself never consults it.
//!
//! @module db/classify

use super::types::{Entity, EntityKind};
use crate::core::error::{Error, Result};

// =============================================================================
// TOKEN TAGS
// =============================================================================

/// Whether a tag marks the definition of a thing or a use of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Occurrence {
    Def,
    Use,
}

/// The token-classification vocabulary the adapter understands.
///
/// The first nine variants describe entities and translate to an
/// [`EntityKind`]; the rest are legitimate classifier output that has no
/// entity counterpart and is unclassifiable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenTag {
    Function(Occurrence),
    Global(Occurrence),
    Class(Occurrence),
    Method(Occurrence),
    Field(Occurrence),
    StaticMethod(Occurrence),
    Macro(Occurrence),
    Module(Occurrence),
    TypeDef(Occurrence),
    LocalVar(Occurrence),
    Parameter(Occurrence),
    Keyword,
    Comment,
    StringLiteral,
    Operator,
    Punctuation,
}

fn entity_kind_of(tag: TokenTag) -> Option<(EntityKind, Occurrence)> {
    match tag {
        TokenTag::Function(occ) => Some((EntityKind::Function, occ)),
        TokenTag::Global(occ) => Some((EntityKind::Global, occ)),
        TokenTag::Class(occ) => Some((EntityKind::Class, occ)),
        TokenTag::Method(occ) => Some((EntityKind::Method, occ)),
        TokenTag::Field(occ) => Some((EntityKind::Field, occ)),
        TokenTag::StaticMethod(occ) => Some((EntityKind::StaticMethod, occ)),
        TokenTag::Macro(occ) => Some((EntityKind::Macro, occ)),
        TokenTag::Module(occ) => Some((EntityKind::Module, occ)),
        TokenTag::TypeDef(occ) => Some((EntityKind::Type, occ)),
        _ => None,
    }
}

/// The entity kind defined by a definition-site tag.
///
/// Fails with `UnclassifiableTag` for use-site tags and for tags with no
/// entity counterpart; the caller skips the token.
pub fn kind_from_definition_tag(tag: TokenTag) -> Result<EntityKind> {
    match entity_kind_of(tag) {
        Some((kind, Occurrence::Def)) => Ok(kind),
        _ => Err(Error::UnclassifiableTag {
            tag: format!("{tag:?}"),
        }),
    }
}

/// The entity kind referenced by a use-site tag.
///
/// Same failure policy as [`kind_from_definition_tag`], for definition
/// tags and non-entity tags.
pub fn kind_from_use_tag(tag: TokenTag) -> Result<EntityKind> {
    match entity_kind_of(tag) {
        Some((kind, Occurrence::Use)) => Ok(kind),
        _ => Err(Error::UnclassifiableTag {
            tag: format!("{tag:?}"),
        }),
    }
}

/// Whether `entity` is of the kind a use-site tag refers to.
///
/// Analyzers use this to filter candidate entities sharing a use-site name
/// down to the ones of the right kind before crediting the use. False for
/// tags that classify no entity at all.
pub fn matches_use(entity: &Entity, tag: TokenTag) -> bool {
    kind_from_use_tag(tag).map_or(false, |kind| kind == entity.kind())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ENTITY_TAGS: [fn(Occurrence) -> TokenTag; 9] = [
        TokenTag::Function,
        TokenTag::Global,
        TokenTag::Class,
        TokenTag::Method,
        TokenTag::Field,
        TokenTag::StaticMethod,
        TokenTag::Macro,
        TokenTag::Module,
        TokenTag::TypeDef,
    ];

    #[test]
    fn test_definition_tags_translate() {
        for make in ENTITY_TAGS {
            let kind = kind_from_definition_tag(make(Occurrence::Def)).unwrap();
            assert!(!kind.is_synthetic());
            // The use-site mapping agrees with the definition-site one.
            assert_eq!(kind_from_use_tag(make(Occurrence::Use)).unwrap(), kind);
        }
    }

    #[test]
    fn test_occurrence_mismatch_is_unclassifiable() {
        for make in ENTITY_TAGS {
            assert!(matches!(
                kind_from_definition_tag(make(Occurrence::Use)),
                Err(Error::UnclassifiableTag { .. })
            ));
            assert!(matches!(
                kind_from_use_tag(make(Occurrence::Def)),
                Err(Error::UnclassifiableTag { .. })
            ));
        }
    }

    #[test]
    fn test_non_entity_tags_are_unclassifiable() {
        for tag in [
            TokenTag::LocalVar(Occurrence::Def),
            TokenTag::Parameter(Occurrence::Use),
            TokenTag::Keyword,
            TokenTag::Comment,
            TokenTag::StringLiteral,
            TokenTag::Operator,
            TokenTag::Punctuation,
        ] {
            assert!(kind_from_definition_tag(tag).is_err());
            assert!(kind_from_use_tag(tag).is_err());
        }
    }

    #[test]
    fn test_typedef_maps_to_type() {
        assert_eq!(
            kind_from_definition_tag(TokenTag::TypeDef(Occurrence::Def)).unwrap(),
            EntityKind::Type
        );
    }

    #[test]
    fn test_matches_use() {
        let method = Entity::new(EntityKind::Method, "run", "Job.run", "a.py", 3, 4);
        assert!(matches_use(&method, TokenTag::Method(Occurrence::Use)));
        assert!(!matches_use(&method, TokenTag::Function(Occurrence::Use)));
        // Definition tags and non-entity tags never match a use.
        assert!(!matches_use(&method, TokenTag::Method(Occurrence::Def)));
        assert!(!matches_use(&method, TokenTag::Comment));
    }
}
