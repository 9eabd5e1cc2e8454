/*!
This library converts sequences of named entity labels between annotation schemes and repairs
sequences whose prefixes are inconsistent, such as the raw predictions of a model or a noisy
dataset. It works purely on labels: it knows nothing about the text, the tokens or the tensors
built from them.
# SCHEMES
The following schemes are supported:
* plain: The bare entity type is given to every token (`ORG`). There is no boundary marker, so the
    spans are inferred from the repetition of a label.
* BIO: `B` marks the beginning of a span and `I` a token inside it. `O` is used for tokens outside
    of every span.
* BILOU: Same as BIO, with `L` marking the last token of a span and `U` a span of a single token.

The supported conversions are plain to BIO, plain to BILOU and BIO/BILOU to plain. Converting a
BIO (or BILOU) sequence into the same scheme repairs it.

# Terminology
* A class is a label found in a dataset, such as `ORG`, `B-ORG` or `O`. The `LabelVocabulary`
    holds every class of a dataset and gives their canonical ordering.
* A prefix is the letter before the `-` delimiter of a class. It indicates where the token sits in
    its span.
* A span is a maximal run of consecutive tokens sharing an entity type.

# Example
```rust
use annotation_tags::{convert_scheme, LabelVocabulary, Scheme};

let vocabulary = LabelVocabulary::from_classes(["O", "ORG", "LOC"]);
let bio_vocabulary = vocabulary.change_scheme(Scheme::Bio).unwrap();
assert_eq!(bio_vocabulary.classes(), ["O", "B-LOC", "B-ORG", "I-LOC", "I-ORG"]);

let tags = ["O", "ORG", "ORG", "O", "LOC"];
let bio = convert_scheme(&tags, Scheme::Plain, Scheme::Bio).unwrap();
assert_eq!(bio, ["O", "B-ORG", "I-ORG", "O", "B-LOC"]);
let ids: Vec<usize> = bio
    .iter()
    .map(|label| bio_vocabulary.label_to_id(label).unwrap())
    .collect();
assert_eq!(ids, [0, 2, 4, 0, 1]);
```
*/

mod config;
mod converter;
mod schemes;
mod vocabulary;

// The public api starts here
pub use schemes::{
    AutoDetectError, ConversionError, MalformedSchemeError, ParsingError, Prefix, Scheme,
    DELIMITER, OUTSIDE,
};

pub use converter::{convert_scheme, LabelSequenceConverter};

pub use vocabulary::LabelVocabulary;

pub use config::{ConverterConfig, ConverterConfigBuilder};
