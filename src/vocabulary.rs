/**
This module holds the set of label classes of a dataset. The vocabulary derives its scheme,
completes the `B-`/`I-` pairs and sorts the classes into the canonical label-to-index table.
*/
use crate::schemes::{
    entity_of, prefixed, split_prefix, ConversionError, Prefix, Scheme, DELIMITER, OUTSIDE,
};
use ahash::AHashSet;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
/// Ordered set of the label classes of a dataset.
///
/// The classes always start with `"O"`, followed by the other classes in strictly increasing
/// lexicographic order. A vocabulary is immutable once built: changing its scheme returns a new
/// vocabulary.
///
/// # Example
///
/// ```rust
/// use annotation_tags::{LabelVocabulary, Scheme};
///
/// let vocabulary = LabelVocabulary::from_classes(["O", "B-PER"]);
/// assert_eq!(vocabulary.classes(), ["O", "B-PER", "I-PER"]);
/// assert_eq!(vocabulary.scheme(), Scheme::Bio);
///
/// let plain = vocabulary.change_scheme(Scheme::Plain).unwrap();
/// assert_eq!(plain.classes(), ["O", "PER"]);
/// ```
pub struct LabelVocabulary {
    classes: Vec<String>,
    /// Either `Plain` or `Bio`. A vocabulary cannot tell `Bio` from `Bilou`.
    scheme: Scheme,
}

impl LabelVocabulary {
    /// Builds the vocabulary from the raw classes observed in a dataset. Duplicates are
    /// collapsed and `"O"` is added when missing.
    pub fn from_classes<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut classes: Vec<String> = classes.into_iter().map(Into::into).collect();
        let scheme = Self::derive_scheme(&classes);
        if scheme == Scheme::Bio {
            Self::ensure_completeness(&mut classes);
        }
        Self {
            classes: Self::sort_classes(classes),
            scheme,
        }
    }

    /// Any class containing the delimiter makes the whole vocabulary prefixed.
    fn derive_scheme(classes: &[String]) -> Scheme {
        if classes.iter().any(|class| class.contains(DELIMITER)) {
            Scheme::Bio
        } else {
            Scheme::Plain
        }
    }

    /// Adds `I-<type>` for every `B-<type>` missing it.
    fn ensure_completeness(classes: &mut Vec<String>) {
        let present: AHashSet<&str> = classes.iter().map(String::as_str).collect();
        let missing: Vec<String> = classes
            .iter()
            .filter_map(|class| match split_prefix(class) {
                Some(('B', entity)) => Some(prefixed(Prefix::I, entity)),
                _ => None,
            })
            .filter(|inside| !present.contains(inside.as_str()))
            .unique()
            .collect();
        if !missing.is_empty() {
            log::debug!("completing the vocabulary with {:?}", missing);
        }
        classes.extend(missing);
    }

    fn sort_classes(classes: Vec<String>) -> Vec<String> {
        std::iter::once(String::from(OUTSIDE))
            .chain(
                classes
                    .into_iter()
                    .filter(|class| class != OUTSIDE)
                    .sorted()
                    .dedup(),
            )
            .collect()
    }

    /// Projects the vocabulary into another scheme.
    ///
    /// * Same scheme: the vocabulary is returned unchanged.
    /// * `Bio` to `Plain`: every class is cut down to what follows its last delimiter and the
    ///     resulting entity types are deduplicated.
    /// * `Plain` to `Bio`: every entity type gets a `B-` and an `I-` class.
    ///
    /// Any other transition returns `ConversionError::UnsupportedSchemeTransition`.
    pub fn change_scheme(&self, target: Scheme) -> Result<LabelVocabulary, ConversionError> {
        match (self.scheme, target) {
            (current, target) if current == target => Ok(self.clone()),
            (Scheme::Bio, Scheme::Plain) => Ok(Self::from_classes(self.entity_types())),
            (Scheme::Plain, Scheme::Bio) => Ok(Self::from_classes(
                self.entity_types()
                    .into_iter()
                    .flat_map(|entity| [prefixed(Prefix::B, entity), prefixed(Prefix::I, entity)]),
            )),
            (from, to) => Err(ConversionError::UnsupportedSchemeTransition { from, to }),
        }
    }

    /// The distinct entity types of the vocabulary, sorted and without `"O"`. The type of a class
    /// is whatever follows its last delimiter.
    pub fn entity_types(&self) -> Vec<&str> {
        self.classes
            .iter()
            .filter(|class| *class != OUTSIDE)
            .map(|class| entity_of(class))
            .sorted()
            .dedup()
            .collect()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Always false, `"O"` is part of every vocabulary.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.label_to_id(label).is_some()
    }

    /// Index of `label` in the canonical ordering. `"O"` is always `0`.
    pub fn label_to_id(&self, label: &str) -> Option<usize> {
        if label == OUTSIDE {
            return Some(0);
        }
        // Everything after "O" is sorted.
        self.classes[1..]
            .binary_search_by(|class| class.as_str().cmp(label))
            .ok()
            .map(|index| index + 1)
    }

    pub fn id_to_label(&self, id: usize) -> Option<&str> {
        self.classes.get(id).map(String::as_str)
    }
}

impl From<Vec<String>> for LabelVocabulary {
    fn from(value: Vec<String>) -> Self {
        Self::from_classes(value)
    }
}

impl From<LabelVocabulary> for Vec<String> {
    fn from(value: LabelVocabulary) -> Self {
        value.classes
    }
}

impl<'a> IntoIterator for &'a LabelVocabulary {
    type Item = &'a str;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, String>, fn(&'a String) -> &'a str>;
    fn into_iter(self) -> Self::IntoIter {
        self.classes
            .iter()
            .map(String::as_str as fn(&'a String) -> &'a str)
    }
}

impl Display for LabelVocabulary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.classes.iter().join(", "), self.scheme)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck as quickcheck_test;
    use rstest::rstest;

    #[test]
    fn test_completeness_of_bio_classes() {
        let vocabulary = LabelVocabulary::from_classes(["O", "B-PER"]);
        assert_eq!(vocabulary.classes(), ["O", "B-PER", "I-PER"]);
        assert_eq!(vocabulary.scheme(), Scheme::Bio);
    }

    #[test]
    fn test_outside_is_added_and_sorted_first() {
        let vocabulary = LabelVocabulary::from_classes(vec!["PER", "LOC", "ORG", "LOC"]);
        assert_eq!(vocabulary.classes(), ["O", "LOC", "ORG", "PER"]);
        assert_eq!(vocabulary.scheme(), Scheme::Plain);
    }

    #[test]
    fn test_sort_keeps_b_before_i() {
        let vocabulary =
            LabelVocabulary::from_classes(["I-time", "B-person", "O", "B-time", "I-person"]);
        assert_eq!(
            vocabulary.classes(),
            ["O", "B-person", "B-time", "I-person", "I-time"]
        );
    }

    #[rstest]
    #[case(vec!["O", "B-PER", "I-PER", "B-LOC"], Scheme::Plain, vec!["O", "LOC", "PER"])]
    #[case(vec!["O", "PER", "LOC"], Scheme::Bio, vec!["O", "B-LOC", "B-PER", "I-LOC", "I-PER"])]
    #[case(vec!["O", "PER"], Scheme::Plain, vec!["O", "PER"])]
    #[case(vec!["B-PER"], Scheme::Bio, vec!["O", "B-PER", "I-PER"])]
    #[case(vec!["O", "B-ai-center"], Scheme::Plain, vec!["O", "center"])]
    fn test_change_scheme(
        #[case] classes: Vec<&str>,
        #[case] target: Scheme,
        #[case] expected: Vec<&str>,
    ) {
        let vocabulary = LabelVocabulary::from_classes(classes);
        let changed = vocabulary.change_scheme(target).unwrap();
        assert_eq!(changed.classes(), expected.as_slice());
        assert_eq!(changed.scheme(), target);
    }

    #[test]
    fn test_change_scheme_to_bilou_is_unsupported() {
        let vocabulary = LabelVocabulary::from_classes(["O", "PER"]);
        assert_eq!(
            vocabulary.change_scheme(Scheme::Bilou),
            Err(ConversionError::UnsupportedSchemeTransition {
                from: Scheme::Plain,
                to: Scheme::Bilou
            })
        );
    }

    #[test]
    fn test_change_scheme_does_not_touch_the_original() {
        let vocabulary = LabelVocabulary::from_classes(["O", "B-PER"]);
        let _plain = vocabulary.change_scheme(Scheme::Plain).unwrap();
        assert_eq!(vocabulary.classes(), ["O", "B-PER", "I-PER"]);
    }

    #[test]
    fn test_label_to_id_and_back() {
        let vocabulary = LabelVocabulary::from_classes(["O", "B-PER", "B-LOC"]);
        for (id, label) in vocabulary.iter().enumerate() {
            assert_eq!(vocabulary.label_to_id(label), Some(id));
            assert_eq!(vocabulary.id_to_label(id), Some(label));
        }
        assert_eq!(vocabulary.label_to_id("B-ORG"), None);
        assert_eq!(vocabulary.id_to_label(vocabulary.len()), None);
        assert!(vocabulary.contains("I-LOC"));
        assert!(!vocabulary.is_empty());
    }

    #[test]
    fn test_entity_types() {
        let vocabulary = LabelVocabulary::from_classes(["B-PER", "I-PER", "B-ai-center"]);
        assert_eq!(vocabulary.entity_types(), vec!["PER", "center"]);
    }

    #[test]
    fn test_serde_reruns_construction() {
        let vocabulary: LabelVocabulary =
            serde_json::from_str(r#"["B-PER", "O", "B-LOC"]"#).unwrap();
        assert_eq!(vocabulary.classes(), ["O", "B-LOC", "B-PER", "I-LOC", "I-PER"]);
        let serialized = serde_json::to_string(&vocabulary).unwrap();
        assert_eq!(serialized, r#"["O","B-LOC","B-PER","I-LOC","I-PER"]"#);
    }

    #[quickcheck_test]
    fn propertie_test_sorted_classes(classes: Vec<String>) -> bool {
        let vocabulary = LabelVocabulary::from_classes(classes);
        vocabulary.classes()[0] == OUTSIDE
            && vocabulary.classes()[1..]
                .windows(2)
                .all(|pair| pair[0] < pair[1])
            && vocabulary.classes()[1..].iter().all(|class| class != OUTSIDE)
    }

    #[quickcheck_test]
    fn propertie_test_completeness(entities: Vec<String>) -> TestResult {
        if entities.is_empty() || entities.iter().any(String::is_empty) {
            return TestResult::discard();
        }
        let classes: Vec<String> = entities.iter().map(|e| format!("B-{}", e)).collect();
        let vocabulary = LabelVocabulary::from_classes(classes);
        TestResult::from_bool(
            entities
                .iter()
                .all(|e| vocabulary.classes().contains(&format!("I-{}", e))),
        )
    }
}
