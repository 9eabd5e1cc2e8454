/**
This module gives the grammar of the supported annotation schemes. It parses a raw label into its
prefix and its entity type, validates sequences against a scheme and holds the errors shared by the
whole crate.
*/
use ahash::AHashSet;
use enum_iterator::{all, Sequence};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// The reserved label of a token outside of any entity. It never carries a prefix.
pub const OUTSIDE: &str = "O";

/// Character separating the prefix from the entity type, as in `B-PER`.
pub const DELIMITER: char = '-';

#[derive(
    Debug, Clone, Copy, Sequence, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
/// Enumeration of the supported schemes. They indicate how the boundaries of an entity are
/// encoded in a sequence of labels.
pub enum Scheme {
    /// Bare entity type per token (`ORG`). Spans are inferred from repetition.
    Plain,
    /// `O`, `B-<type>` and `I-<type>`.
    Bio,
    /// `O`, `B-<type>`, `I-<type>`, `L-<type>` and `U-<type>`.
    Bilou,
}

impl Scheme {
    const PLAIN_ALLOWED_PREFIXES: [Prefix; 0] = [];
    const BIO_ALLOWED_PREFIXES: [Prefix; 2] = [Prefix::B, Prefix::I];
    const BILOU_ALLOWED_PREFIXES: [Prefix; 4] = [Prefix::B, Prefix::I, Prefix::L, Prefix::U];

    /// The prefixes a non-`O` label may carry under this scheme.
    pub fn allowed_prefixes(&self) -> &'static [Prefix] {
        match self {
            Self::Plain => &Self::PLAIN_ALLOWED_PREFIXES,
            Self::Bio => &Self::BIO_ALLOWED_PREFIXES,
            Self::Bilou => &Self::BILOU_ALLOWED_PREFIXES,
        }
    }

    pub fn is_prefixed(&self) -> bool {
        !self.allowed_prefixes().is_empty()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Bio => "bio",
            Self::Bilou => "bilou",
        }
    }

    /// Human readable grammar, used in error messages.
    pub fn grammar(&self) -> String {
        match self {
            Self::Plain => format!("`{OUTSIDE}` or a bare entity type such as `ORG`"),
            prefixed => {
                let alternatives = prefixed
                    .allowed_prefixes()
                    .iter()
                    .map(|p| format!("`{}{DELIMITER}<type>`", p))
                    .join(", ");
                format!("`{OUTSIDE}`, {alternatives}")
            }
        }
    }

    /// Checks a single label against the grammar of this scheme. Under `Plain`, any label
    /// that does not look prefixed is accepted, the empty label included.
    pub fn is_valid(&self, tag: &str) -> bool {
        if tag == OUTSIDE {
            return true;
        }
        let prefix_char = split_prefix(tag).map(|(prefix_char, _)| prefix_char);
        if !self.is_prefixed() {
            return prefix_char.is_none();
        }
        prefix_char
            .and_then(|c| Prefix::try_from(c).ok())
            .is_some_and(|prefix| self.allowed_prefixes().contains(&prefix))
    }

    /// Validates every label of `tags`. The first offending label is reported.
    ///
    /// * `tags`: A single sequence of labels, one per token.
    pub fn validate<S: AsRef<str>>(&self, tags: &[S]) -> Result<(), MalformedSchemeError> {
        match tags.iter().position(|tag| !self.is_valid(tag.as_ref())) {
            None => Ok(()),
            Some(index) => Err(MalformedSchemeError::new(index, tags[index].as_ref(), *self)),
        }
    }

    /// Tries to detect the scheme used by a collection of sequences. The prefixes are collected
    /// once over every sequence. Sequences without any prefix are `Plain`, sequences using only
    /// `B` and `I` are `Bio` and any `L` or `U` makes them `Bilou`.
    ///
    /// Note that a BILOU corpus which happens to contain no `L`/`U` prefix is detected as `Bio`.
    pub fn try_auto_detect<T, S>(sequences: &[T]) -> Result<Scheme, AutoDetectError>
    where
        T: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut prefixes: AHashSet<Prefix> = AHashSet::default();
        let mut first_prefixed: Option<&str> = None;
        let mut first_bare: Option<&str> = None;
        for tag in sequences
            .iter()
            .flat_map(|sequence| sequence.as_ref().iter())
            .map(|tag| tag.as_ref())
            .filter(|tag| *tag != OUTSIDE)
        {
            match split_prefix(tag) {
                Some((prefix_char, _)) => {
                    let prefix = Prefix::try_from(prefix_char)
                        .map_err(|_| AutoDetectError::UnknownPrefix(String::from(tag)))?;
                    prefixes.insert(prefix);
                    first_prefixed.get_or_insert(tag);
                }
                None => {
                    first_bare.get_or_insert(tag);
                }
            }
        }
        if let (Some(prefixed), Some(bare)) = (first_prefixed, first_bare) {
            return Err(AutoDetectError::MixedSchemes {
                prefixed: String::from(prefixed),
                bare: String::from(bare),
            });
        }
        let scheme = if prefixes.is_empty() {
            Scheme::Plain
        } else if prefixes.contains(&Prefix::L) || prefixes.contains(&Prefix::U) {
            Scheme::Bilou
        } else {
            Scheme::Bio
        };
        log::debug!(
            "auto-detected the {} scheme from the prefixes {:?}",
            scheme,
            prefixes
        );
        Ok(scheme)
    }
}

impl Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = ParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        all::<Scheme>()
            .find(|scheme| scheme.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParsingError::UnknownScheme(String::from(s)))
    }
}

#[derive(Debug, PartialEq, Hash, Clone, Copy, Sequence, Eq)]
/// Prefix of a label, indicating the position of the token in its span. Prefixes are always a
/// single ascii character.
pub enum Prefix {
    /// Beginning of a span
    B,
    /// Inside a span
    I,
    /// Last token of a span
    L,
    /// Unit, i.e. a span of a single token
    U,
}

impl Prefix {
    pub fn as_char(&self) -> char {
        match self {
            Self::B => 'B',
            Self::I => 'I',
            Self::L => 'L',
            Self::U => 'U',
        }
    }
}

impl TryFrom<char> for Prefix {
    type Error = ParsingError;
    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            'B' => Ok(Self::B),
            'I' => Ok(Self::I),
            'L' => Ok(Self::L),
            'U' => Ok(Self::U),
            _ => Err(ParsingError::UnknownPrefix(value)),
        }
    }
}

impl Display for Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Splits a label into its prefix character and everything after the first delimiter. Returns
/// `None` when the second character is not the delimiter or when nothing follows it.
pub(crate) fn split_prefix(tag: &str) -> Option<(char, &str)> {
    let mut chars = tag.chars();
    let prefix_char = chars.next()?;
    if chars.next()? != DELIMITER {
        return None;
    }
    let entity = chars.as_str();
    if entity.is_empty() {
        None
    } else {
        Some((prefix_char, entity))
    }
}

/// The entity type of a label: whatever follows its last delimiter, or the label itself.
/// `B-ai-center` is of type `center`.
pub(crate) fn entity_of(tag: &str) -> &str {
    tag.rsplit_once(DELIMITER).map_or(tag, |(_, entity)| entity)
}

/// Builds a prefixed label, such as `B-ORG`.
pub(crate) fn prefixed(prefix: Prefix, entity: &str) -> String {
    format!("{}{}{}", prefix.as_char(), DELIMITER, entity)
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Parsed view of a single label.
pub(crate) struct InnerTag<'a> {
    /// The full label, such as `"B-PER"` or `"O"`.
    pub(crate) tag: &'a str,
    /// `None` for `"O"` and for bare labels.
    pub(crate) prefix: Option<Prefix>,
    /// The entity type, such as `"PER"`. Equal to `tag` when there is no prefix.
    pub(crate) entity: &'a str,
}

impl<'a> InnerTag<'a> {
    pub(crate) fn try_new(tag: &'a str) -> Result<Self, ParsingError> {
        if tag == OUTSIDE {
            return Ok(Self {
                tag,
                prefix: None,
                entity: tag,
            });
        }
        match split_prefix(tag) {
            Some((prefix_char, _)) => Ok(Self {
                tag,
                prefix: Some(Prefix::try_from(prefix_char)?),
                entity: entity_of(tag),
            }),
            None => Ok(Self {
                tag,
                prefix: None,
                entity: tag,
            }),
        }
    }

    pub(crate) fn is_outside(&self) -> bool {
        self.tag == OUTSIDE
    }

    /// Whether `neighbor` carries one of `prefixes` on the same entity type as `self`.
    pub(crate) fn neighbor_matches(&self, neighbor: Option<&str>, prefixes: &[Prefix]) -> bool {
        let Some(neighbor) = neighbor else {
            return false;
        };
        split_prefix(neighbor).is_some_and(|(prefix_char, _)| {
            entity_of(neighbor) == self.entity
                && Prefix::try_from(prefix_char).is_ok_and(|p| prefixes.contains(&p))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Could not parse a string into a `Scheme` or a char into a `Prefix`.
pub enum ParsingError {
    #[error("Could not parse the following string into a Scheme: {0}")]
    UnknownScheme(String),
    #[error("Could not parse the following char into a Prefix: {0}")]
    UnknownPrefix(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Malformed label {offending_value:?} at index {offending_index}{}: expected {} under the {expected} scheme",
    fmt_sent_id(.sent_id),
    .expected.grammar()
)]
/// A label does not match the grammar of the scheme it was declared with.
pub struct MalformedSchemeError {
    /// Index of the sequence in a batch, if the label comes from one.
    pub sent_id: Option<usize>,
    /// Index of the label inside its sequence.
    pub offending_index: usize,
    pub offending_value: String,
    pub expected: Scheme,
}

fn fmt_sent_id(sent_id: &Option<usize>) -> String {
    match sent_id {
        Some(id) => format!(" of sequence {}", id),
        None => String::new(),
    }
}

impl MalformedSchemeError {
    pub(crate) fn new(offending_index: usize, offending_value: &str, expected: Scheme) -> Self {
        Self {
            sent_id: None,
            offending_index,
            offending_value: String::from(offending_value),
            expected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutoDetectError {
    #[error("Both prefixed ({prefixed:?}) and bare ({bare:?}) entity labels were found. It is therefore ambiguous")]
    MixedSchemes { prefixed: String, bare: String },
    #[error("The label {0:?} uses a prefix that no supported scheme allows")]
    UnknownPrefix(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Enum of errors returned when converting or repairing a sequence or a vocabulary.
pub enum ConversionError {
    #[error(transparent)]
    MalformedScheme(#[from] MalformedSchemeError),
    #[error("Converting from the {from} scheme to the {to} scheme is not supported")]
    UnsupportedSchemeTransition { from: Scheme, to: Scheme },
    /// A logic error. Validation should make it unreachable.
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
    #[error(transparent)]
    AutoDetect(#[from] AutoDetectError),
}

impl ConversionError {
    /// Attaches the index of the sequence in its batch to a malformed label error.
    pub(crate) fn with_sent_id(self, sent_id: usize) -> Self {
        match self {
            Self::MalformedScheme(mut err) => {
                err.sent_id = Some(sent_id);
                Self::MalformedScheme(err)
            }
            other => other,
        }
    }
}
