//! Quality analyzer behaviour on synthetic images.

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use leafcheck_core::quality::sample_height;
use leafcheck_core::{QualityAnalyzer, QualityConfig, Verdict};
use leafcheck_test_support::{CountingDecoder, SyntheticImageBuilder};

fn analyzer() -> QualityAnalyzer<CountingDecoder> {
    QualityAnalyzer::new(CountingDecoder::new(), QualityConfig::default())
}

#[tokio::test]
async fn test_black_image_is_too_dark() {
    let report = analyzer().assess(&SyntheticImageBuilder::black(10, 10)).await;
    assert_eq!(report.verdict, Verdict::TooDark);
    assert!(report.stats.unwrap().brightness.abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_white_image_is_too_bright() {
    let report = analyzer().assess(&SyntheticImageBuilder::white(10, 10)).await;
    assert_eq!(report.verdict, Verdict::TooBright);
    assert!((report.stats.unwrap().brightness - 255.0).abs() < 0.5);
}

#[tokio::test]
async fn test_flat_gray_is_too_blurry() {
    let report = analyzer()
        .assess(&SyntheticImageBuilder::mid_gray(10, 10))
        .await;
    let stats = report.stats.unwrap();
    assert_eq!(report.verdict, Verdict::TooBlurry);
    // A flat image stays flat through the resample
    assert_eq!(stats.brightness, 128.0);
    assert_eq!(stats.edge_score, 0.0);
}

#[tokio::test]
async fn test_alternating_columns_are_acceptable() {
    let report = analyzer()
        .assess(&SyntheticImageBuilder::alternating_columns(10, 10))
        .await;
    let stats = report.stats.unwrap();
    assert_eq!(report.verdict, Verdict::Acceptable);
    assert!((stats.brightness - 127.5).abs() < 10.0);
    assert!(stats.edge_score > 5.0);
}

#[tokio::test]
async fn test_checkerboard_is_acceptable() {
    let report = analyzer()
        .assess(&SyntheticImageBuilder::checkerboard(40, 40, 4))
        .await;
    assert_eq!(report.verdict, Verdict::Acceptable);
    assert!(report.stats.unwrap().edge_score > 5.0);
}

#[tokio::test]
async fn test_dark_wins_over_blurry() {
    let verdict = analyzer()
        .analyze(&SyntheticImageBuilder::uniform(20, 20, [10, 10, 10]))
        .await;
    assert_eq!(verdict, Verdict::TooDark);
}

#[tokio::test]
async fn test_transparency_is_ignored() {
    // Alpha is dropped, so a fully transparent white image still reads as white.
    let verdict = analyzer()
        .analyze(&SyntheticImageBuilder::transparent(10, 10, [255, 255, 255]))
        .await;
    assert_eq!(verdict, Verdict::TooBright);
}

#[tokio::test]
async fn test_sample_is_resampled_to_fixed_width() {
    let report = analyzer()
        .assess(&SyntheticImageBuilder::textured_leaf(1000, 500))
        .await;
    let sample = report.sample.unwrap();
    assert_eq!((sample.width, sample.height), (300, 150));
    assert_eq!(report.stats.unwrap().pixel_count, 300 * 150);

    let report = analyzer()
        .assess(&SyntheticImageBuilder::textured_leaf(333, 100))
        .await;
    assert_eq!(report.sample.unwrap().height, sample_height(333, 100, 300));
}

#[tokio::test]
async fn test_corrupt_bytes_fail_open_and_release() {
    let analyzer = analyzer();
    let report = analyzer.assess(&SyntheticImageBuilder::corrupt()).await;

    assert_eq!(report.verdict, Verdict::Acceptable);
    assert!(!report.is_assessed());
    assert_eq!(analyzer_decoder_counts(&analyzer), (1, 1));
}

#[tokio::test]
async fn test_empty_payload_is_acceptable() {
    let analyzer = analyzer();
    let verdict = analyzer.analyze(&SyntheticImageBuilder::empty()).await;

    assert_eq!(verdict, Verdict::Acceptable);
    // Nothing was opened, so nothing is left to release.
    assert_eq!(analyzer_decoder_counts(&analyzer), (0, 0));
}

#[tokio::test]
async fn test_decode_failure_after_open_still_releases() {
    let analyzer = QualityAnalyzer::new(
        CountingDecoder::new().failing_decode(),
        QualityConfig::default(),
    );
    let verdict = analyzer.analyze(&SyntheticImageBuilder::black(10, 10)).await;

    assert_eq!(verdict, Verdict::Acceptable);
    assert_eq!(analyzer_decoder_counts(&analyzer), (1, 1));
}

#[tokio::test]
async fn test_open_failure_is_acceptable() {
    let analyzer = QualityAnalyzer::new(
        CountingDecoder::new().failing_open(),
        QualityConfig::default(),
    );
    let verdict = analyzer.analyze(&SyntheticImageBuilder::black(10, 10)).await;
    assert_eq!(verdict, Verdict::Acceptable);
}

#[tokio::test]
async fn test_every_successful_analysis_releases_its_handle() {
    let analyzer = analyzer();
    for image in [
        SyntheticImageBuilder::black(10, 10),
        SyntheticImageBuilder::white(10, 10),
        SyntheticImageBuilder::alternating_columns(10, 10),
    ] {
        let _ = analyzer.analyze(&image).await;
    }
    assert_eq!(analyzer_decoder_counts(&analyzer), (3, 3));
}

#[tokio::test]
async fn test_very_tall_image_fails_open() {
    let analyzer = analyzer();
    // 1x3000 would resample to 300x900000
    let report = analyzer
        .assess(&SyntheticImageBuilder::mid_gray(1, 3000))
        .await;

    assert_eq!(report.verdict, Verdict::Acceptable);
    assert!(!report.is_assessed());
    assert_eq!(analyzer_decoder_counts(&analyzer), (1, 1));
}

#[tokio::test]
async fn test_tall_image_within_budget_is_assessed() {
    let analyzer = analyzer();
    // 1x10 resamples to 300x3000, exactly the budget
    let report = analyzer.assess(&SyntheticImageBuilder::mid_gray(1, 10)).await;

    assert_eq!(report.verdict, Verdict::TooBlurry);
    let sample = report.sample.unwrap();
    assert_eq!((sample.width, sample.height), (300, 3000));
}

#[tokio::test]
async fn test_analysis_is_deterministic() {
    let analyzer = analyzer();
    let image = SyntheticImageBuilder::textured_leaf(64, 48);
    let first = analyzer.assess(&image).await;
    let second = analyzer.assess(&image).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_custom_thresholds_change_verdict() {
    let lenient = QualityAnalyzer::new(
        CountingDecoder::new(),
        QualityConfig {
            blur_threshold: 0.0,
            ..QualityConfig::default()
        },
    );
    let verdict = lenient
        .analyze(&SyntheticImageBuilder::mid_gray(10, 10))
        .await;
    assert_eq!(verdict, Verdict::Acceptable);
}

fn analyzer_decoder_counts(analyzer: &QualityAnalyzer<CountingDecoder>) -> (usize, usize) {
    let decoder = analyzer.decoder();
    (decoder.opened(), decoder.released())
}
