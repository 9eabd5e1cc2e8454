/**
This module converts sequences of labels between the plain, BIO and BILOU schemes and repairs
malformed BIO/BILOU sequences.
*/
use crate::config::ConverterConfig;
use crate::schemes::{entity_of, prefixed, ConversionError, InnerTag, Prefix, Scheme, OUTSIDE};
use itertools::multizip;
use rayon::prelude::*;
use std::iter::once;

/// Prefixes of a label that lets the next label continue its span.
const SPAN_OPENERS: [Prefix; 2] = [Prefix::B, Prefix::I];
/// Prefixes of a label continuing the span of the previous label.
const SPAN_CONTINUERS: [Prefix; 2] = [Prefix::I, Prefix::L];
/// A BILOU label only moves forward along `I -> L -> B -> U`.
pub(crate) const MAX_REWRITES_PER_TAG: usize = 3;

/// Converts a single sequence of labels from the `source` scheme to the `target` scheme. When
/// both schemes are the same prefixed scheme, the sequence is repaired instead: its prefixes are
/// rewritten until they obey the adjacency rules of the scheme. The input is never modified.
///
/// * `tags`: The labels of a single sequence, one per token.
/// * `source`: The scheme every label of `tags` must conform to.
/// * `target`: The scheme of the returned labels.
///
/// # Example
/// ```rust
/// use annotation_tags::{convert_scheme, Scheme};
///
/// let bio = convert_scheme(&["O", "ORG", "ORG", "O", "LOC"], Scheme::Plain, Scheme::Bio).unwrap();
/// assert_eq!(bio, ["O", "B-ORG", "I-ORG", "O", "B-LOC"]);
///
/// let repaired = convert_scheme(&["B-ORG", "O"], Scheme::Bilou, Scheme::Bilou).unwrap();
/// assert_eq!(repaired, ["U-ORG", "O"]);
/// ```
pub fn convert_scheme<S: AsRef<str>>(
    tags: &[S],
    source: Scheme,
    target: Scheme,
) -> Result<Vec<String>, ConversionError> {
    source.validate(tags)?;
    log::trace!(
        "converting {} labels from {} to {}",
        tags.len(),
        source,
        target
    );
    match (source, target) {
        (Scheme::Plain, Scheme::Plain) => Ok(tags.iter().map(|t| t.as_ref().to_owned()).collect()),
        (Scheme::Plain, Scheme::Bio) => Ok(plain_to_bio(tags)),
        (Scheme::Plain, Scheme::Bilou) => Ok(plain_to_bilou(tags)),
        (prefixed, Scheme::Plain) if prefixed.is_prefixed() => Ok(prefixed_to_plain(tags)),
        (Scheme::Bio, Scheme::Bio) => repair_bio(tags),
        (Scheme::Bilou, Scheme::Bilou) => repair_bilou(tags),
        (from, to) => Err(ConversionError::UnsupportedSchemeTransition { from, to }),
    }
}

/// Yields every label along with the label before and the label after it.
fn with_neighbors<'a, S: AsRef<str> + 'a>(
    tags: &'a [S],
) -> impl Iterator<Item = (Option<&'a str>, &'a str, Option<&'a str>)> + 'a {
    let current = tags.iter().map(|tag| -> &'a str { tag.as_ref() });
    let previous = once(None).chain(current.clone().map(Some));
    let subsequent = current.clone().skip(1).map(Some).chain(once(None));
    multizip((previous, current, subsequent))
}

/// A plain span starts whenever the label differs from the previous one. Two adjacent entities
/// of the same type are merged into a single span.
fn plain_to_bio<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    with_neighbors(tags)
        .map(|(previous, tag, _)| {
            if tag == OUTSIDE {
                tag.to_owned()
            } else if previous != Some(tag) {
                prefixed(Prefix::B, tag)
            } else {
                prefixed(Prefix::I, tag)
            }
        })
        .collect()
}

fn plain_to_bilou<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    with_neighbors(tags)
        .map(|(previous, tag, subsequent)| {
            if tag == OUTSIDE {
                return tag.to_owned();
            }
            let previous_differs = previous != Some(tag);
            let subsequent_differs = subsequent != Some(tag);
            let prefix = match (previous_differs, subsequent_differs) {
                (true, true) => Prefix::U,
                (true, false) => Prefix::B,
                (false, true) => Prefix::L,
                (false, false) => Prefix::I,
            };
            prefixed(prefix, tag)
        })
        .collect()
}

/// Keeps the entity type of every label, i.e. whatever follows its last delimiter. This is
/// lossy: the span boundaries are lost, and so is the head of a dashed type (`B-ai-center`
/// becomes `center`).
fn prefixed_to_plain<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    tags.iter()
        .map(|tag| entity_of(tag.as_ref()).to_owned())
        .collect()
}

fn parse_for_repair(tag: &str, scheme: Scheme) -> Result<InnerTag<'_>, ConversionError> {
    let inner = InnerTag::try_new(tag).map_err(|e| {
        ConversionError::InvariantViolation(format!("{} label {:?}: {}", scheme, tag, e))
    })?;
    if inner.prefix.is_none() && !inner.is_outside() {
        return Err(ConversionError::InvariantViolation(format!(
            "{} label {:?} has no prefix",
            scheme, tag
        )));
    }
    Ok(inner)
}

/// Repairs a BIO sequence. An `I-<type>` whose (already repaired) previous label is neither
/// `B-<type>` nor `I-<type>` becomes `B-<type>`.
fn repair_bio<S: AsRef<str>>(tags: &[S]) -> Result<Vec<String>, ConversionError> {
    let mut repaired: Vec<String> = Vec::with_capacity(tags.len());
    for (index, tag) in tags.iter().map(|t| t.as_ref()).enumerate() {
        let inner = parse_for_repair(tag, Scheme::Bio)?;
        let corrected = match inner.prefix {
            None | Some(Prefix::B) => tag.to_owned(),
            Some(Prefix::I) => {
                let previous = repaired.last().map(String::as_str);
                if inner.neighbor_matches(previous, &SPAN_OPENERS) {
                    tag.to_owned()
                } else {
                    let corrected = prefixed(Prefix::B, inner.entity);
                    log::debug!("label {} at index {} repaired into {}", tag, index, corrected);
                    corrected
                }
            }
            Some(other) => {
                return Err(ConversionError::InvariantViolation(format!(
                    "bio label {:?} carries the prefix {}",
                    tag, other
                )))
            }
        };
        repaired.push(corrected);
    }
    Ok(repaired)
}

/// Repairs a BILOU sequence in a single pass. Every label is repaired against the original,
/// unmodified labels around it, never against the repaired ones. The output is therefore not
/// always consistent: `["L-X", "I-X"]` becomes `["B-X", "U-X"]`.
fn repair_bilou<S: AsRef<str>>(tags: &[S]) -> Result<Vec<String>, ConversionError> {
    with_neighbors(tags)
        .map(|(previous, tag, subsequent)| {
            repair_bilou_tag(tag, previous, subsequent).map(|(repaired, _)| repaired)
        })
        .collect()
}

/// Repairs a single BILOU label given its neighbors. Returns the repaired label and the number
/// of rewrites it took.
pub(crate) fn repair_bilou_tag(
    tag: &str,
    previous: Option<&str>,
    subsequent: Option<&str>,
) -> Result<(String, usize), ConversionError> {
    let inner = parse_for_repair(tag, Scheme::Bilou)?;
    let Some(mut prefix) = inner.prefix else {
        return Ok((tag.to_owned(), 0));
    };
    let previous_supports = inner.neighbor_matches(previous, &SPAN_OPENERS);
    let subsequent_continues = inner.neighbor_matches(subsequent, &SPAN_CONTINUERS);
    let mut rewrites = 0;
    loop {
        let next = match prefix {
            Prefix::I if !subsequent_continues => Prefix::L,
            Prefix::I if !previous_supports => Prefix::B,
            Prefix::L if !previous_supports => Prefix::B,
            Prefix::B if !subsequent_continues => Prefix::U,
            _ => break,
        };
        rewrites += 1;
        if rewrites > MAX_REWRITES_PER_TAG {
            return Err(ConversionError::InvariantViolation(format!(
                "bilou label {:?} rewritten more than {} times",
                tag, MAX_REWRITES_PER_TAG
            )));
        }
        prefix = next;
    }
    if rewrites == 0 {
        return Ok((tag.to_owned(), 0));
    }
    let repaired = prefixed(prefix, inner.entity);
    log::debug!(
        "label {} between {:?} and {:?} repaired into {}",
        tag,
        previous,
        subsequent,
        repaired
    );
    Ok((repaired, rewrites))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Converts or repairs many sequences with the same `ConverterConfig`. The converter holds no
/// state besides its config and can be shared across threads.
///
/// # Example
/// ```rust
/// use annotation_tags::{ConverterConfigBuilder, LabelSequenceConverter, Scheme};
///
/// let config = ConverterConfigBuilder::default()
///     .target(Scheme::Bilou)
///     .parallel(true)
///     .build();
/// let converter = LabelSequenceConverter::new(config);
/// let sequences = vec![vec!["O", "ORG", "ORG"], vec!["LOC"]];
/// let converted = converter.convert_batch(&sequences).unwrap();
/// assert_eq!(converted, vec![vec!["O", "B-ORG", "L-ORG"], vec!["U-LOC"]]);
/// ```
pub struct LabelSequenceConverter {
    config: ConverterConfig,
}

impl LabelSequenceConverter {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Converts a single sequence. Without a source scheme in the config, it is auto-detected
    /// from this sequence alone.
    pub fn convert<S: AsRef<str>>(&self, tags: &[S]) -> Result<Vec<String>, ConversionError> {
        let source = self.resolve_source::<&[S], S>(&[tags])?;
        convert_scheme(tags, source, self.config.target)
    }

    /// Converts every sequence of a batch. Without a source scheme in the config, it is
    /// auto-detected once over the whole batch. The first failing sequence aborts the batch and
    /// its index is reported in the error.
    pub fn convert_batch<T, S>(&self, sequences: &[T]) -> Result<Vec<Vec<String>>, ConversionError>
    where
        T: AsRef<[S]> + Sync,
        S: AsRef<str> + Sync,
    {
        let source = self.resolve_source::<T, S>(sequences)?;
        let target = self.config.target;
        let convert_one = |(sent_id, tags): (usize, &T)| {
            convert_scheme(tags.as_ref(), source, target).map_err(|e| e.with_sent_id(sent_id))
        };
        if self.config.parallel {
            sequences.par_iter().enumerate().map(convert_one).collect()
        } else {
            sequences.iter().enumerate().map(convert_one).collect()
        }
    }

    fn resolve_source<T, S>(&self, sequences: &[T]) -> Result<Scheme, ConversionError>
    where
        T: AsRef<[S]>,
        S: AsRef<str>,
    {
        match self.config.source {
            Some(source) => Ok(source),
            None => Ok(Scheme::try_auto_detect::<T, S>(sequences)?),
        }
    }
}
