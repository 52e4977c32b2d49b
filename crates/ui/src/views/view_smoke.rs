use std::sync::Arc;

use dioxus::prelude::WritableExt;

use quiz_core::model::TestId;
use storage::{LoadedTest, StorageError, TestListing, TestRepository};

use crate::vm::QuizIntent;

use super::test_harness::{ViewKind, setup_view_harness, setup_view_harness_with_repo};

fn correct_choices(harness: &super::test_harness::ViewHarness) -> Vec<usize> {
    harness.inspect(|ctl| {
        ctl.session()
            .expect("session running")
            .current_question()
            .answer()
            .indices()
    })
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_lists_tests() {
    let mut harness = setup_view_harness(ViewKind::Home);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Choose a test"), "missing heading in {html}");
    assert!(html.contains("Colours"), "missing title in {html}");
    assert!(html.contains("CLR-1"), "missing code in {html}");
    assert!(html.contains("4 questions"), "missing count in {html}");
}

struct FailingRepo;

#[async_trait::async_trait]
impl TestRepository for FailingRepo {
    async fn load_test(&self, _id: &TestId) -> Result<LoadedTest, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn list_tests(&self) -> Result<Vec<TestListing>, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_renders_error_state() {
    let mut harness = setup_view_harness_with_repo(ViewKind::Home, Arc::new(FailingRepo), None);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Could not read the test list."), "missing error in {html}");
    assert!(html.contains("Retry"), "missing retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_shows_start_screen() {
    let mut harness = setup_view_harness(ViewKind::Quiz("colours".into()));
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Colours"), "missing title in {html}");
    assert!(html.contains("Start Test"), "missing start button in {html}");
    assert!(harness.inspect(|ctl| ctl.is_idle()));
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_reports_missing_test() {
    let mut harness = setup_view_harness(ViewKind::Quiz("nope".into()));
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Test not found"), "missing message in {html}");
    assert!(html.contains("Back to tests"), "missing link in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_rejects_unsafe_id() {
    let mut harness = setup_view_harness(ViewKind::Quiz("..".into()));
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("No test selected"), "missing message in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_next_is_gated_on_answer_count() {
    let mut harness = setup_view_harness(ViewKind::Quiz("colours".into()));
    harness.settle().await;
    harness.act(|q| q.start().call(()));

    let html = harness.render();
    assert!(html.contains("Question 1 / 4"), "missing heading in {html}");
    assert!(html.contains("00:00"), "missing timer in {html}");

    harness.act(|q| q.dispatch().call(QuizIntent::Next));
    assert_eq!(harness.inspect(|ctl| ctl.session().map(|s| s.current_index())), Some(0));

    let correct = correct_choices(&harness);
    for choice in correct {
        harness.act(|q| q.dispatch().call(QuizIntent::Select(choice)));
    }
    harness.act(|q| q.dispatch().call(QuizIntent::Next));
    assert_eq!(harness.inspect(|ctl| ctl.session().map(|s| s.current_index())), Some(1));
    assert!(harness.render().contains("Question 2 / 4"));

    harness.act(|q| q.dispatch().call(QuizIntent::Previous));
    assert_eq!(harness.inspect(|ctl| ctl.session().map(|s| s.current_index())), Some(0));
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_full_run_and_retry() {
    let mut harness = setup_view_harness(ViewKind::Quiz("colours".into()));
    harness.settle().await;
    harness.act(|q| q.start().call(()));

    while !harness.inspect(|ctl| ctl.is_finished()) {
        for choice in correct_choices(&harness) {
            harness.act(|q| q.dispatch().call(QuizIntent::Select(choice)));
        }
        harness.act(|q| q.dispatch().call(QuizIntent::Next));
    }

    let html = harness.render();
    assert!(html.contains("4/4 — 100%"), "missing score in {html}");
    assert!(html.contains("Retry Test"), "missing retry in {html}");
    assert!(html.contains("Explained 1"), "missing explanation in {html}");
    assert!(html.contains("Correct"), "missing verdict in {html}");

    let retry = harness.quiz().clone();
    harness.dom.in_runtime(|| {
        let mut controller = retry.controller();
        let mut guard = controller.write();
        guard.as_mut().expect("controller loaded").reset().expect("reset");
    });
    super::test_harness::drive_dom(&mut harness.dom);

    assert!(harness.inspect(|ctl| !ctl.is_finished() && ctl.attempts() == 2));
    assert!(harness.render().contains("Question 1 / 4"));
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_escapes_markup_in_prompts() {
    let mut harness = setup_view_harness(ViewKind::Quiz("colours".into()));
    harness.settle().await;
    harness.act(|q| q.start().call(()));

    while harness.inspect(|ctl| ctl.session().map(|s| s.current_question().required_answers()))
        != Some(2)
    {
        for choice in correct_choices(&harness) {
            harness.act(|q| q.dispatch().call(QuizIntent::Select(choice)));
        }
        harness.act(|q| q.dispatch().call(QuizIntent::Next));
    }

    let html = harness.render();
    assert!(!html.contains("<primaries>"), "prompt markup leaked into {html}");
    assert!(html.contains("Select 2 answers"), "missing hint in {html}");
    assert!(html.contains("tests/colours/img/wheel.png"), "missing image in {html}");
}
