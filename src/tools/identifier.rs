//! Law identifier resolution
//!
//! Callers may locate a law three ways. The most specific locator wins:
//! revision id, then law id, then law number.

use serde_json::{Map, Value};

/// Which argument a resolved identifier came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierSource {
    LawRevisionId,
    LawId,
    LawNum,
}

impl IdentifierSource {
    pub fn field(&self) -> &'static str {
        match self {
            Self::LawRevisionId => "law_revision_id",
            Self::LawId => "law_id",
            Self::LawNum => "law_num",
        }
    }
}

/// One canonical locator picked from an argument bag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentifier {
    pub value: String,
    pub source: IdentifierSource,
}

/// Pick the identifier to use for `bag`.
///
/// The first field the bag contains decides, whatever its value. A string
/// or number is used as-is; an empty string, null or structured value
/// resolves nothing rather than falling through to a less specific field.
/// With `allow_revision_id` false the `law_revision_id` field is ignored
/// entirely.
pub fn resolve(bag: &Map<String, Value>, allow_revision_id: bool) -> Option<ResolvedIdentifier> {
    let order: &[IdentifierSource] = if allow_revision_id {
        &[
            IdentifierSource::LawRevisionId,
            IdentifierSource::LawId,
            IdentifierSource::LawNum,
        ]
    } else {
        &[IdentifierSource::LawId, IdentifierSource::LawNum]
    };

    let (source, raw) = order
        .iter()
        .find_map(|source| bag.get(source.field()).map(|raw| (*source, raw)))?;

    let value = match raw {
        Value::String(s) if !s.is_empty() => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    Some(ResolvedIdentifier { value, source })
}
