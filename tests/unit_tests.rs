// Unit tests for Label Score

use label_score::core::{Interpreter, Scorer};
use label_score::error::LabelError;
use label_score::models::{
    images_to_base64, ImageInput, LabelElements, LabelMessage, MaterialShare, MissingPreference, Preference,
    PreferenceRanks, SentMessage,
};
use label_score::services::score_client::build_full_route_with_prefix;
use label_score::services::{build_full_route, http_call_url, ScoreTarget};

fn ranks(order: [Preference; 4]) -> PreferenceRanks {
    PreferenceRanks::from_preferences(&order).unwrap()
}

#[test]
fn test_ranks_from_reversed_preferences() {
    let ranks = ranks([
        Preference::Health,
        Preference::Animal,
        Preference::Societal,
        Preference::Environment,
    ]);

    assert_eq!(ranks.health, 1);
    assert_eq!(ranks.animal, 2);
    assert_eq!(ranks.societal, 3);
    assert_eq!(ranks.environment, 4);
}

#[test]
fn test_each_missing_preference_fails() {
    for missing in Preference::ALL {
        let remaining: Vec<Preference> = Preference::ALL.into_iter().filter(|p| *p != missing).collect();
        assert_eq!(
            PreferenceRanks::from_preferences(&remaining),
            Err(MissingPreference(missing))
        );
    }
}

#[test]
fn test_duplicate_preference_keeps_first_position() {
    let ranks = PreferenceRanks::from_preferences(&[
        Preference::Animal,
        Preference::Animal,
        Preference::Health,
        Preference::Societal,
        Preference::Environment,
    ])
    .unwrap();

    assert_eq!(ranks.animal, 1);
    assert_eq!(ranks.environment, 5);
}

#[test]
fn test_http_call_url() {
    assert_eq!(http_call_url("http://localhost", Some(8080)), "http://localhost:8080");
    assert_eq!(http_call_url("http://example.com", Some(8080)), "http://example.com");
    assert_eq!(ScoreTarget::Remote.call_url("http://localhost", Some(8080)), "http://localhost");
}

#[test]
fn test_build_full_route() {
    assert_eq!(build_full_route("/score", "/post_compute_score"), "/v1/score/post_compute_score");
    assert_eq!(build_full_route_with_prefix("/score", "/post_compute_score", ""), "/score/post_compute_score");
}

#[test]
fn test_base64_round_trip_reproduces_bytes() {
    let images: Vec<Vec<u8>> = vec![vec![], vec![0], (0..=255).collect(), b"\x89PNG\r\n\x1a\n".to_vec()];

    let sent = SentMessage::new(
        Some(images.iter().cloned().map(ImageInput::Raw).collect()),
        None,
        None,
        "u1",
        Preference::ALL.to_vec(),
    );
    let received: LabelMessage = serde_json::from_str(&serde_json::to_string(&sent).unwrap()).unwrap();

    assert_eq!(received.images, Some(images));
}

#[test]
fn test_encoded_images_pass_through() {
    let encoded = images_to_base64(Some(vec![ImageInput::Encoded("already-encoded".to_string())]));
    assert_eq!(encoded, Some(vec!["already-encoded".to_string()]));
}

#[test]
fn test_interpreter_reports_each_label_error() {
    let interpreter = Interpreter::new().unwrap();
    let read = |text: &str| interpreter.interpret(&[text.to_string()]);

    assert_eq!(read(""), Err(LabelError::TextNotFound));
    assert_eq!(read("made in bangladesh"), Err(LabelError::MaterialNotFound));
    assert_eq!(read("100% acrylic"), Err(LabelError::CountryNotFound));
    assert_eq!(
        read("50% cotton 50% polyester lining: viscose made in china"),
        Err(LabelError::MissingMaterialPercentage("viscose".to_string()))
    );
    assert!(matches!(read("dry flat"), Err(LabelError::MultipleLabelErrors(errors)) if errors.len() == 2));
}

#[test]
fn test_interpreter_keeps_first_percentage_for_repeated_material() {
    let interpreter = Interpreter::new().unwrap();
    let elements = interpreter
        .interpret(&["shell: 100% cotton".to_string(), "lining: 100% cotton made in india".to_string()])
        .unwrap();

    assert_eq!(
        elements.materials,
        vec![MaterialShare { name: "cotton".to_string(), percentage: 100.0 }]
    );
}

#[test]
fn test_scorer_prefers_better_materials() {
    let scorer = Scorer::new();
    let ranks = PreferenceRanks::default();
    let label = |material: &str| LabelElements {
        materials: vec![MaterialShare { name: material.to_string(), percentage: 100.0 }],
        country: "portugal".to_string(),
        label: None,
    };

    assert!(scorer.score(&label("linen"), &ranks) > scorer.score(&label("acrylic"), &ranks));
}

#[test]
fn test_scorer_prefers_better_countries_when_societal_first() {
    let scorer = Scorer::new();
    let ranks = ranks([
        Preference::Societal,
        Preference::Environment,
        Preference::Animal,
        Preference::Health,
    ]);
    let label = |country: &str| LabelElements {
        materials: vec![MaterialShare { name: "cotton".to_string(), percentage: 100.0 }],
        country: country.to_string(),
        label: None,
    };

    assert!(scorer.score(&label("france"), &ranks) > scorer.score(&label("bangladesh"), &ranks));
}
