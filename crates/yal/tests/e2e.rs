// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end integration tests for the complete Yal pipeline.
//!
//! Each test creates an isolated TestHarness with a temp data directory and
//! mock adapters. Tests are independent and order-insensitive.

use yal_agent::{ControlAction, RunOutcome, RunState};
use yal_core::types::{ChannelId, InteractionId, UserId};
use yal_test_utils::{MockEngine, MockReply, TestHarness};

// ---- Command to delivered result ----

#[tokio::test]
async fn command_is_delivered_with_controls_and_alert() {
    let harness = TestHarness::builder()
        .with_engine_responses(vec![", said the fox.".to_string()])
        .build()
        .await
        .unwrap();

    let outcome = harness.chat(5, "Hello").await;
    let result = outcome.result().unwrap().clone();
    assert_eq!(result.output, "Hello, said the fox.");

    let edits = harness.transport.edited_messages().await;
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0].message.controls.len(), 2);

    let texts = harness.transport.sent_texts().await;
    assert!(texts.first().unwrap().contains("<@5>"));
    assert!(texts.last().unwrap().starts_with("Job completed for <@5>."));
}

// ---- Config file drives the pipeline ----

#[tokio::test]
async fn config_file_settings_reach_the_pipeline() {
    let config = yal_config::load_and_validate_str(
        r#"
[generation]
max_attempts = 2
fallback_text = "No idea."

[queue]
mode = "bounded"
max_depth = 3
"#,
    )
    .unwrap();
    let harness = TestHarness::builder()
        .with_config(config)
        .with_engine(MockEngine::echoing())
        .build()
        .await
        .unwrap();

    let outcome = harness.chat(1, "Hi").await;
    let result = outcome.result().unwrap();
    assert!(result.used_fallback);
    assert_eq!(result.output, "No idea.");
    assert_eq!(harness.engine.call_count(), 2);
}

// ---- Conversation across a restart ----

#[tokio::test]
async fn conversation_survives_restart() {
    let harness = TestHarness::builder()
        .with_engine(MockEngine::with_replies(vec![
            MockReply::Continue(" a lighthouse.".into()),
            MockReply::Continue(" It was dark.".into()),
        ]))
        .build()
        .await
        .unwrap();
    assert!(harness.chat(1, "There was").await.is_completed());

    let restarted = harness.restart().await.unwrap();
    assert_eq!(restarted.continuations().len(), 1);

    let element = restarted.elements().all().await.remove(0);
    restarted
        .continuations()
        .submit_draft(&element.prompt_input_element_custom_id, "Tell me more.")
        .unwrap();
    let continue_id = element
        .items
        .iter()
        .map(|c| c.custom_id().to_string())
        .find(|id| ControlAction::from_custom_id(id) == Some(ControlAction::Continue))
        .unwrap();

    let outcome = restarted
        .continue_from(&InteractionId(1), &continue_id, UserId(1), ChannelId(42))
        .await
        .unwrap();
    match outcome {
        RunOutcome::Completed(result) => assert_eq!(
            result.output,
            "There was There was a lighthouse.\nTell me more. It was dark."
        ),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(restarted.elements().len().await, 2);
}

// ---- Rejections leave no trace ----

#[tokio::test]
async fn rejected_prompt_writes_nothing() {
    let mut config = yal_config::YalConfig::default();
    config.access.restrict_all_to_channel = Some(99);
    let harness = TestHarness::builder()
        .with_config(config)
        .build()
        .await
        .unwrap();

    let outcome = harness.chat(1, "Hi").await;
    assert_eq!(outcome.state(), RunState::Rejected);
    assert_eq!(harness.engine.call_count(), 0);
    assert!(harness.orchestrator.elements().is_empty().await);
    assert!(harness.transport.edited_messages().await.is_empty());
}
