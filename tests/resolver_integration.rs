//! Resolution-algorithm properties exercised through the public API.

use audioprobe_core::metadata::MetadataDocument;
use audioprobe_core::resolve::{AutoDub, DottedPrefixStrategy, resolve_audio_tracks};

fn document(value: serde_json::Value) -> MetadataDocument {
    serde_json::from_value(value).unwrap()
}

#[test]
fn single_track_without_format_signals_stays_unknown() {
    // audioTracks.len() <= 1 and no per-format auto-dub flags: the flag
    // must remain unknown no matter which fallback tier produced the
    // languages.
    let doc = document(serde_json::json!({
        "captions": {"playerCaptionsTracklistRenderer": {
            "captionTracks": [{"languageCode": "en"}],
            "audioTracks": [{"audioTrackId": "a", "captionTrackIndices": [0]}]
        }},
        "streamingData": {"adaptiveFormats": [
            {"mimeType": "audio/mp4", "language": "en"}
        ]}
    }));
    let summary = resolve_audio_tracks(&doc, None, "test");
    assert_eq!(summary.has_auto_dub, AutoDub::Unknown);
    assert_eq!(summary.languages_all.as_slice(), ["en"]);
}

#[test]
fn auto_dub_promotion_is_order_independent() {
    let track_pairs = [
        (("en", false), ("es", true)),
        (("es", true), ("en", false)),
    ];
    for ((first_id, first_flag), (second_id, second_flag)) in track_pairs {
        let doc = document(serde_json::json!({
            "captions": {"playerCaptionsTracklistRenderer": {
                "captionTracks": [{"languageCode": first_id}, {"languageCode": second_id}],
                "audioTracks": [
                    {"audioTrackId": first_id, "captionTrackIndices": [0]},
                    {"audioTrackId": second_id, "captionTrackIndices": [1]}
                ]
            }},
            "streamingData": {"adaptiveFormats": [
                {"mimeType": "audio/mp4",
                 "audioTrack": {"audioTrackId": first_id, "isAutoDubbed": first_flag}},
                {"mimeType": "audio/mp4",
                 "audioTrack": {"audioTrackId": second_id, "isAutoDubbed": second_flag}}
            ]}
        }));
        let summary = resolve_audio_tracks(&doc, None, "test");
        assert_eq!(
            summary.has_auto_dub,
            AutoDub::True,
            "order {first_id}/{second_id} must not affect the flag"
        );
    }
}

#[test]
fn non_auto_languages_are_subset_of_all() {
    let documents = [
        serde_json::json!({}),
        serde_json::json!({
            "streamingData": {"adaptiveFormats": [
                {"mimeType": "audio/mp4", "language": "en"},
                {"mimeType": "audio/webm", "language": "ja"}
            ]}
        }),
        serde_json::json!({
            "captions": {"playerCaptionsTracklistRenderer": {
                "captionTracks": [{"languageCode": "en"}, {"languageCode": "es"}],
                "audioTracks": [
                    {"audioTrackId": "en.4", "captionTrackIndices": [0]},
                    {"audioTrackId": "es.10", "captionTrackIndices": [1]}
                ]
            }},
            "streamingData": {"adaptiveFormats": [
                {"mimeType": "audio/mp4",
                 "audioTrack": {"audioTrackId": "es.10", "isAutoDubbed": true}}
            ]}
        }),
    ];
    let strategy = DottedPrefixStrategy;
    for value in documents {
        let doc = document(value);
        let summary = resolve_audio_tracks(&doc, Some(&strategy), "test");
        for language in summary.languages_non_auto.as_slice() {
            assert!(
                summary.languages_all.contains(language),
                "{language} in non-auto but not in all"
            );
        }
    }
}

#[test]
fn fallback_tiers_stay_silent_once_earlier_tiers_produce() {
    // Caption reconciliation produces en/es; the bare format language "ko"
    // and the default-track caption "es" must not be added by tiers 3/4.
    let doc = document(serde_json::json!({
        "captions": {"playerCaptionsTracklistRenderer": {
            "captionTracks": [{"languageCode": "en"}, {"languageCode": "es"}],
            "audioTracks": [
                {"audioTrackId": "a", "captionTrackIndices": [0], "defaultCaptionTrackIndex": 1},
                {"audioTrackId": "b", "captionTrackIndices": [1]}
            ],
            "defaultAudioTrackIndex": 0
        }},
        "streamingData": {"adaptiveFormats": [
            {"mimeType": "audio/mp4", "language": "ko"}
        ]}
    }));
    let summary = resolve_audio_tracks(&doc, None, "test");
    assert_eq!(summary.languages_all.as_slice(), ["en", "es"]);
    assert!(!summary.languages_all.contains("ko"));
}

#[test]
fn both_provider_shapes_resolve_through_one_algorithm() {
    // The same two-language video as seen by each document shape.
    let innertube_shape = document(serde_json::json!({
        "captions": {"playerCaptionsTracklistRenderer": {
            "captionTracks": [{"languageCode": "en"}, {"languageCode": "es"}],
            "audioTracks": [
                {"audioTrackId": "en.4", "captionTrackIndices": [0]},
                {"audioTrackId": "es.10", "captionTrackIndices": [1]}
            ]
        }}
    }));
    let strategy = DottedPrefixStrategy;
    let with_strategy = resolve_audio_tracks(&innertube_shape, Some(&strategy), "innertube");
    assert_eq!(with_strategy.languages_all.as_slice(), ["en", "es"]);

    let format_only_shape = document(serde_json::json!({
        "streamingData": {"adaptiveFormats": [
            {"mimeType": "audio/webm", "language": "en"},
            {"mimeType": "audio/webm", "language": "es"}
        ]}
    }));
    let without_strategy = resolve_audio_tracks(&format_only_shape, None, "yt-dlp");
    assert_eq!(without_strategy.languages_all.as_slice(), ["en", "es"]);
    assert_eq!(without_strategy.has_auto_dub, AutoDub::Unknown);
}
