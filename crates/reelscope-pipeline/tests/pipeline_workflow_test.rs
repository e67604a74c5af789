#[path = "helpers/mod.rs"]
mod helpers;

use helpers::events::{
    detection, label_detection_completed, object_created, output_request, transcribe_output,
    transcription_state_change, upload_url_request,
};
use helpers::{setup_pipeline, setup_pipeline_with, TestPipeline, INPUT_BUCKET, OUTPUT_BUCKET};
use reelscope_core::CorrelationId;
use reelscope_pipeline::{
    handle_get_output, handle_label_detection, handle_transcript_created,
    handle_transcription_event, handle_upload_created, handle_upload_url,
};
use reelscope_services::LabelDetectionPage;
use serde_json::json;

/// Launch jobs for `key` and return the job name both services were given
async fn launch(pipeline: &TestPipeline, key: &str) -> String {
    let response = handle_upload_created(&pipeline.ctx, object_created(INPUT_BUCKET, key)).await;
    assert_eq!(response.status_code, 200, "launch failed: {:?}", response.body);

    let requests = pipeline.transcription.requests();
    let job_name = requests.last().expect("transcription started").job_name.to_string();
    let starts = pipeline.labels.starts();
    assert_eq!(starts.last().expect("label detection started").job_tag.as_str(), job_name);
    job_name
}

fn push_three_pages(pipeline: &TestPipeline) {
    pipeline.labels.push_page(LabelDetectionPage {
        labels: vec![
            detection(0, "Person", 99.1, &[]),
            detection(2000, "Car", 88.0, &["Vehicle", "Transportation"]),
        ],
        video_metadata: None,
        next_token: Some("p2".to_string()),
    });
    pipeline.labels.push_page(LabelDetectionPage {
        labels: vec![detection(2000, "Road", 75.5, &[])],
        video_metadata: None,
        next_token: Some("p3".to_string()),
    });
    pipeline.labels.push_page(LabelDetectionPage {
        labels: vec![detection(4500, "Tree", 64.25, &["Plant"])],
        video_metadata: None,
        next_token: None,
    });
}

/// Drive every completion handler for an already launched upload
async fn complete_jobs(pipeline: &TestPipeline, id: &str, object: &str, job_name: &str) {
    let response =
        handle_transcription_event(&pipeline.ctx, transcription_state_change(job_name, "COMPLETED")).await;
    assert_eq!(response.status_code, 200);

    let transcript_key = format!("{}/transcribe.json", id);
    let response =
        handle_transcript_created(&pipeline.ctx, object_created(OUTPUT_BUCKET, &transcript_key)).await;
    assert_eq!(response.status_code, 200);

    push_three_pages(pipeline);
    let response = handle_label_detection(
        &pipeline.ctx,
        label_detection_completed("mock-label-job", "SUCCEEDED", job_name, object),
    )
    .await;
    assert_eq!(response.status_code, 200);
}

#[tokio::test]
async fn test_complete_pipeline_workflow() {
    let pipeline = setup_pipeline();

    // Upload URL → Launch → Transcript → Sentiment → Labels → Output
    let response = handle_upload_url(&pipeline.ctx, upload_url_request("movie1.mp4", Some("My Movie"))).await;
    assert_eq!(response.status_code, 200);
    assert!(response.body["url"].as_str().unwrap().contains("movie1.mp4"));

    let job_name = launch(&pipeline, "movie1.mp4").await;
    pipeline
        .transcripts()
        .set_object("movie1.json", transcribe_output("What a lovely day at the beach"));
    complete_jobs(&pipeline, "movie1", "movie1.mp4", &job_name).await;

    let response = handle_get_output(&pipeline.ctx, output_request("movie1")).await;
    assert_eq!(response.status_code, 200);
    let body = response.body_json();

    assert_eq!(body["name"], "My Movie");
    assert_eq!(
        body["transcribe"],
        json!({"exists": true, "data": "What a lovely day at the beach"})
    );
    assert_eq!(body["comprehend"]["exists"], true);
    assert_eq!(body["comprehend"]["data"]["Sentiment"], "POSITIVE");
    assert_eq!(body["rekognition"]["exists"], true);
    assert_eq!(body["rekognition"]["jobId"], "mock-label-job");
    assert_eq!(body["status"]["complete"], true);
    assert_eq!(body["status"]["partialFailure"], false);
    assert_eq!(body["status"]["jobs"]["transcription"], "COMPLETED");
    assert_eq!(body["status"]["jobs"]["labelDetection"], "COMPLETED");
    assert!(body.get("jobs").is_none());

    assert_eq!(
        pipeline.sentiment.calls(),
        vec![("What a lovely day at the beach".to_string(), "en".to_string())]
    );
}

#[tokio::test]
async fn test_identifier_derivation_agrees_across_handlers() {
    let pipeline = setup_pipeline();

    // Encoded key with a dot in the stem; every artifact must still land in trip-day/
    let job_name = launch(&pipeline, "trip%2Dday.1.mp4").await;
    assert!(job_name.starts_with("trip-day_"));
    assert_eq!(
        CorrelationId::from_job_name(&job_name).unwrap().as_str(),
        "trip-day"
    );
    assert_eq!(
        pipeline.transcription.requests()[0].output_key,
        "trip-day.json"
    );

    pipeline
        .transcripts()
        .set_object("trip-day.json", transcribe_output("sun and sand"));
    complete_jobs(&pipeline, "trip-day", "trip-day.1.mp4", &job_name).await;

    let keys = pipeline.output().keys();
    for expected in [
        "trip-day/transcribe.json",
        "trip-day/comprehend.json",
        "trip-day/rekognition.json",
        "trip-day/status.json",
        "trip-day/jobs/transcription.json",
        "trip-day/jobs/labelDetection.json",
    ] {
        assert!(keys.iter().any(|key| key == expected), "missing {}", expected);
    }
    assert!(keys.iter().all(|key| key.starts_with("trip-day/")));
}

#[tokio::test]
async fn test_redelivered_completion_events_are_idempotent() {
    let pipeline = setup_pipeline();
    let job_name = launch(&pipeline, "movie1.mp4").await;
    pipeline
        .transcripts()
        .set_object("movie1.json", transcribe_output("hello again"));

    complete_jobs(&pipeline, "movie1", "movie1.mp4", &job_name).await;
    let first = pipeline.snapshot("movie1");

    complete_jobs(&pipeline, "movie1", "movie1.mp4", &job_name).await;
    assert_eq!(pipeline.snapshot("movie1"), first);
}

#[tokio::test]
async fn test_empty_transcript_skips_sentiment() {
    let pipeline = setup_pipeline();
    let job_name = launch(&pipeline, "silent.mp4").await;
    pipeline.transcripts().set_object("silent.json", transcribe_output("   "));

    complete_jobs(&pipeline, "silent", "silent.mp4", &job_name).await;

    assert!(pipeline.sentiment.calls().is_empty());
    assert_eq!(
        pipeline.output().object_json("silent/comprehend.json").unwrap(),
        json!({"exists": false})
    );
}

#[tokio::test]
async fn test_chained_sentiment_needs_no_second_trigger() {
    let pipeline = setup_pipeline_with(&[("CHAIN_SENTIMENT", "true")]);
    let job_name = launch(&pipeline, "movie1.mp4").await;
    pipeline
        .transcripts()
        .set_object("movie1.json", transcribe_output("chained analysis"));

    let response =
        handle_transcription_event(&pipeline.ctx, transcription_state_change(&job_name, "COMPLETED")).await;
    assert_eq!(response.status_code, 200);
    assert_eq!(pipeline.sentiment.calls().len(), 1);
    assert!(pipeline.output().has_object("movie1/comprehend.json"));
}

#[tokio::test]
async fn test_label_results_span_every_page() {
    let pipeline = setup_pipeline();
    let job_name = launch(&pipeline, "movie1.mp4").await;

    push_three_pages(&pipeline);
    let response = handle_label_detection(
        &pipeline.ctx,
        label_detection_completed("mock-label-job", "SUCCEEDED", &job_name, "movie1.mp4"),
    )
    .await;
    assert_eq!(response.status_code, 200);
    assert_eq!(response.body_json()["labelCount"], 4);

    assert_eq!(
        pipeline.labels.page_requests(),
        vec![
            ("mock-label-job".to_string(), None),
            ("mock-label-job".to_string(), Some("p2".to_string())),
            ("mock-label-job".to_string(), Some("p3".to_string())),
        ]
    );

    let stored = pipeline.output().object_json("movie1/rekognition.json").unwrap();
    let groups = stored["labels"].as_array().unwrap();
    let timestamps: Vec<i64> = groups.iter().map(|g| g["timestamp"].as_i64().unwrap()).collect();
    assert_eq!(timestamps, vec![0, 2000, 4500]);
    assert_eq!(groups[1]["timestampSeconds"], 2.0);
    let names: Vec<&str> = groups[1]["detectedLabels"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Car", "Road"]);
}

#[tokio::test]
async fn test_label_job_failure_is_partial() {
    let pipeline = setup_pipeline();
    let job_name = launch(&pipeline, "movie1.mp4").await;
    pipeline
        .transcripts()
        .set_object("movie1.json", transcribe_output("still transcribed"));
    handle_transcription_event(&pipeline.ctx, transcription_state_change(&job_name, "COMPLETED")).await;

    let response = handle_label_detection(
        &pipeline.ctx,
        label_detection_completed("mock-label-job", "FAILED", &job_name, "movie1.mp4"),
    )
    .await;
    assert_eq!(response.status_code, 500);

    let body = handle_get_output(&pipeline.ctx, output_request("movie1")).await.body_json();
    assert_eq!(body["rekognition"]["exists"], false);
    assert_eq!(body["rekognition"]["status"], "FAILED");
    assert_eq!(body["transcribe"]["exists"], true);
    assert_eq!(body["status"]["partialFailure"], true);
}

#[tokio::test]
async fn test_launch_failure_leaves_sentinels() {
    let pipeline = setup_pipeline();
    pipeline.labels.fail_start("AccessDenied");

    let response =
        handle_upload_created(&pipeline.ctx, object_created(INPUT_BUCKET, "movie1.mp4")).await;
    assert_eq!(response.status_code, 500);
    assert_eq!(pipeline.transcription.requests().len(), 1);

    let body = handle_get_output(&pipeline.ctx, output_request("movie1")).await.body_json();
    assert_eq!(body["rekognition"], json!({"exists": false}));
    assert!(body.get("transcribe").is_none());
    assert_eq!(body["status"]["jobs"]["labelDetection"], "FAILED");
    assert_eq!(body["status"]["jobs"]["transcription"], "LAUNCHED");
}

#[tokio::test]
async fn test_output_for_unknown_upload_is_404() {
    let pipeline = setup_pipeline();
    let response = handle_get_output(&pipeline.ctx, output_request("never-uploaded")).await;
    assert_eq!(response.status_code, 404);
    assert_eq!(
        response.body_json(),
        json!({"message": "Folder never-uploaded not found"})
    );
    assert_eq!(response.headers["Access-Control-Allow-Origin"], "*");
}

#[tokio::test]
async fn test_output_lists_only_what_exists() {
    let pipeline = setup_pipeline();
    let output = pipeline.output();
    output.set_object("movie1/", Vec::new());
    output.set_object("movie1/name.json", r#""Movie One""#);
    output.set_object("movie1/transcribe.json", r#"{"exists":true,"data":"hi"}"#);

    let body = handle_get_output(&pipeline.ctx, output_request("movie1")).await.body_json();
    assert_eq!(
        body,
        json!({"name": "Movie One", "transcribe": {"exists": true, "data": "hi"}})
    );
}

#[tokio::test]
async fn test_key_unusable_as_job_name_reaches_a_definite_end() {
    let pipeline = setup_pipeline();

    // Ingest refuses the key up front
    let response = handle_upload_url(&pipeline.ctx, upload_url_request("My Movie.mp4", None)).await;
    assert_eq!(response.status_code, 400);
    assert!(pipeline.output().keys().is_empty());

    // An object uploaded some other way still ends with both jobs failed
    let response =
        handle_upload_created(&pipeline.ctx, object_created(INPUT_BUCKET, "My+Movie.mp4")).await;
    assert_eq!(response.status_code, 500);
    assert!(pipeline.transcription.requests().is_empty());
    assert!(pipeline.labels.starts().is_empty());

    let body = handle_get_output(&pipeline.ctx, output_request("My Movie")).await.body_json();
    assert_eq!(body["transcribe"], json!({"exists": false}));
    assert_eq!(body["comprehend"], json!({"exists": false}));
    assert_eq!(body["rekognition"], json!({"exists": false}));
    assert_eq!(
        body["status"]["jobs"],
        json!({"transcription": "FAILED", "labelDetection": "FAILED"})
    );
    assert_eq!(body["status"]["pending"], json!(["name"]));
}
