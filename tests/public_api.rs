use annotation_tags::{
    convert_scheme, ConversionError, ConverterConfigBuilder, LabelSequenceConverter,
    LabelVocabulary, Scheme,
};
use std::sync::Arc;
use std::thread;

#[test]
fn plain_to_bio() {
    let actual =
        convert_scheme(&["O", "ORG", "ORG", "O", "LOC"], Scheme::Plain, Scheme::Bio).unwrap();
    assert_eq!(actual, ["O", "B-ORG", "I-ORG", "O", "B-LOC"]);
}

#[test]
fn plain_to_bilou() {
    let actual =
        convert_scheme(&["O", "ORG", "ORG", "O", "LOC"], Scheme::Plain, Scheme::Bilou).unwrap();
    assert_eq!(actual, ["O", "B-ORG", "L-ORG", "O", "U-LOC"]);
}

#[test]
fn bio_to_plain() {
    let actual = convert_scheme(&["O", "B-ORG", "I-ORG"], Scheme::Bio, Scheme::Plain).unwrap();
    assert_eq!(actual, ["O", "ORG", "ORG"]);
}

#[test]
fn bio_repair_promotes_leading_inside() {
    let actual = convert_scheme(&["O", "I-ORG", "I-ORG"], Scheme::Bio, Scheme::Bio).unwrap();
    assert_eq!(actual, ["O", "B-ORG", "I-ORG"]);
}

#[test]
fn bilou_repair_turns_lonely_begin_into_unit() {
    let actual = convert_scheme(&["B-ORG", "O"], Scheme::Bilou, Scheme::Bilou).unwrap();
    assert_eq!(actual, ["U-ORG", "O"]);
}

#[test]
fn bilou_repair_reads_the_original_neighbors() {
    let actual = convert_scheme(&["L-X", "I-X"], Scheme::Bilou, Scheme::Bilou).unwrap();
    assert_eq!(actual, ["B-X", "U-X"]);
}

#[test]
fn prefix_stripping_keeps_the_last_segment() {
    let actual =
        convert_scheme(&["B-ai-center", "I-ai-center"], Scheme::Bio, Scheme::Plain).unwrap();
    assert_eq!(actual, ["center", "center"]);
    let vocabulary = LabelVocabulary::from_classes(["O", "B-ai-center"]);
    assert_eq!(
        vocabulary.change_scheme(Scheme::Plain).unwrap().classes(),
        ["O", "center"]
    );
}

#[test]
fn vocabulary_is_completed() {
    let vocabulary = LabelVocabulary::from_classes(["O", "B-PER"]);
    assert_eq!(vocabulary.classes(), ["O", "B-PER", "I-PER"]);
}

#[test]
fn vocabulary_round_trip_through_plain() {
    let vocabulary = LabelVocabulary::from_classes(["B-PER", "O", "I-LOC", "B-LOC"]);
    let plain = vocabulary.change_scheme(Scheme::Plain).unwrap();
    assert_eq!(plain.classes(), ["O", "LOC", "PER"]);
    let bio = plain.change_scheme(Scheme::Bio).unwrap();
    assert_eq!(bio.classes(), ["O", "B-LOC", "B-PER", "I-LOC", "I-PER"]);
}

#[test]
fn malformed_errors_are_displayed() {
    let err = convert_scheme(&["O", "B-ORG"], Scheme::Plain, Scheme::Bio).unwrap_err();
    assert!(matches!(err, ConversionError::MalformedScheme(_)));
    let message = err.to_string();
    assert!(message.contains("\"B-ORG\""));
    assert!(message.contains("index 1"));
    assert!(message.contains("plain"));
}

#[test]
fn unsupported_transition() {
    let err = convert_scheme(&["B-ORG"], Scheme::Bio, Scheme::Bilou).unwrap_err();
    assert_eq!(
        err,
        ConversionError::UnsupportedSchemeTransition {
            from: Scheme::Bio,
            to: Scheme::Bilou
        }
    );
}

#[test]
fn converter_repairs_model_predictions_in_parallel() {
    let config = ConverterConfigBuilder::default()
        .target(Scheme::Bilou)
        .parallel(true)
        .build();
    let converter = LabelSequenceConverter::new(config);
    let predictions = vec![
        vec!["O", "I-PER", "L-PER", "O"],
        vec!["B-LOC", "B-LOC", "O"],
        vec!["U-ORG"],
    ];
    let actual = converter.convert_batch(&predictions).unwrap();
    let expected: Vec<Vec<&str>> = vec![
        vec!["O", "B-PER", "L-PER", "O"],
        vec!["U-LOC", "U-LOC", "O"],
        vec!["U-ORG"],
    ];
    assert_eq!(actual, expected);
}

#[test]
fn vocabulary_and_converter_are_shared_across_threads() {
    let vocabulary = Arc::new(
        LabelVocabulary::from_classes(["O", "PER", "LOC"])
            .change_scheme(Scheme::Bio)
            .unwrap(),
    );
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let vocabulary = Arc::clone(&vocabulary);
            thread::spawn(move || {
                let tags = if i % 2 == 0 {
                    vec!["PER", "PER", "O"]
                } else {
                    vec!["LOC", "O", "PER"]
                };
                convert_scheme(&tags, Scheme::Plain, Scheme::Bio)
                    .unwrap()
                    .iter()
                    .map(|label| vocabulary.label_to_id(label).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    let ids: Vec<Vec<usize>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(ids[0], [2, 4, 0]);
    assert_eq!(ids[1], [1, 0, 2]);
}
