use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use quiz_core::model::{AnswerKey, QuestionId, QuestionRecord, TestDefinitionRecord, TestId};
use quiz_core::time::fixed_now;
use services::{Clock, QuizController, QuizWorkflowService};
use storage::{InMemoryRepository, TestRepository};

use crate::context::{UiApp, build_app_context};
use crate::views::quiz::QuizTestHandles;
use crate::views::{HomeView, QuizView};

pub const SEED: u64 = 7;

#[derive(Clone)]
struct TestApp {
    launch_test: Option<String>,
    workflow: Arc<QuizWorkflowService>,
}

impl UiApp for TestApp {
    fn launch_test(&self) -> Option<String> {
        self.launch_test.clone()
    }

    fn workflow(&self) -> Arc<QuizWorkflowService> {
        Arc::clone(&self.workflow)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    Quiz(String),
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
    quiz_handles: Option<QuizTestHandles>,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for ViewHarnessProps {}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view.clone());
    if let Some(handles) = props.quiz_handles.clone() {
        use_context_provider(|| handles);
    }
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Home => rsx! { HomeView {} },
        ViewKind::Quiz(test_id) => rsx! { QuizView { test_id } },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub quiz_handles: Option<QuizTestHandles>,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Rebuild, then let resources resolve.
    pub async fn settle(&mut self) {
        self.rebuild();
        for _ in 0..3 {
            self.drive_async().await;
        }
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }

    pub fn quiz(&self) -> &QuizTestHandles {
        self.quiz_handles.as_ref().expect("quiz view harness")
    }

    /// Run `f` inside the dom's runtime, then flush the resulting renders.
    pub fn act(&mut self, f: impl FnOnce(&QuizTestHandles)) {
        let handles = self.quiz().clone();
        self.dom.in_runtime(|| f(&handles));
        drive_dom(&mut self.dom);
    }

    /// Read the live controller of the quiz view.
    pub fn inspect<R>(&self, f: impl FnOnce(&QuizController) -> R) -> R {
        let handles = self.quiz().clone();
        self.dom.in_runtime(|| {
            let controller = handles.controller();
            let guard = controller.peek();
            f(guard.as_ref().expect("controller loaded"))
        })
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

/// Three single-answer questions plus one pick-two question.
pub fn sample_record() -> TestDefinitionRecord {
    let single = |id: u64, prompt: &str, answer: usize| QuestionRecord {
        id: QuestionId::from(id),
        prompt: prompt.to_string(),
        image: None,
        image_alt: None,
        choices: vec!["red".into(), "green".into(), "blue".into()],
        answer: AnswerKey::Single(answer),
        required_answers: None,
        explanation: Some(format!("Explained {id}")),
    };
    TestDefinitionRecord {
        title: "Colours".into(),
        code: "CLR-1".into(),
        questions: vec![
            single(1, "First colour?", 0),
            single(2, "Second colour?", 1),
            single(3, "Third colour?", 2),
            QuestionRecord {
                id: QuestionId::from(4),
                prompt: "Pick two <primaries>".into(),
                image: Some("img/wheel.png".into()),
                image_alt: Some("Colour wheel".into()),
                choices: vec!["red".into(), "grey".into(), "blue".into(), "beige".into()],
                answer: AnswerKey::Multiple(vec![0, 2]),
                required_answers: Some(2),
                explanation: None,
            },
        ],
    }
}

pub fn sample_repository() -> InMemoryRepository {
    let repo = InMemoryRepository::new();
    repo.insert_test(TestId::new("colours").expect("valid id"), sample_record())
        .expect("insert test");
    repo
}

pub fn setup_view_harness(view: ViewKind) -> ViewHarness {
    setup_view_harness_with_repo(view, Arc::new(sample_repository()), None)
}

pub fn setup_view_harness_with_repo(
    view: ViewKind,
    tests: Arc<dyn TestRepository>,
    launch_test: Option<String>,
) -> ViewHarness {
    let workflow = QuizWorkflowService::new(Clock::fixed(fixed_now()), tests).with_seed(Some(SEED));
    let app = Arc::new(TestApp {
        launch_test,
        workflow: Arc::new(workflow),
    });

    let quiz_handles = match view {
        ViewKind::Quiz(_) => Some(QuizTestHandles::default()),
        ViewKind::Home => None,
    };

    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            app,
            view,
            quiz_handles: quiz_handles.clone(),
        },
    );

    ViewHarness { dom, quiz_handles }
}
