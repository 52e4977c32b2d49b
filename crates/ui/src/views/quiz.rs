use dioxus::document::eval;
use dioxus::prelude::*;
use dioxus_router::Link;

use services::{QuizController, QuizState};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{QuestionScreenVm, QuizIntent, ResultsVm};

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::rc::Rc;

const TICK_MS: u64 = 500;

#[derive(Clone, Debug, PartialEq, Eq)]
struct TestHeader {
    title: String,
    code: String,
    window_title: String,
    question_count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Screen {
    Start,
    Question(QuestionScreenVm),
    Results(ResultsVm),
}

fn screen_for(controller: &QuizController) -> Screen {
    match controller.state() {
        QuizState::Idle => Screen::Start,
        QuizState::InProgress(session) => {
            Screen::Question(QuestionScreenVm::from_session(session, controller.elapsed()))
        }
        QuizState::Finished { report, .. } => Screen::Results(ResultsVm::from(report)),
    }
}

fn is_running(controller: &Signal<Option<QuizController>>) -> bool {
    controller
        .peek()
        .as_ref()
        .is_some_and(|ctl| matches!(ctl.state(), QuizState::InProgress(_)))
}

#[component]
pub fn QuizView(test_id: String) -> Element {
    let ctx = use_context::<AppContext>();
    let workflow = ctx.workflow();

    let controller = use_signal(|| None::<QuizController>);
    let mut tick = use_signal(|| 0_u64);

    let resource = use_resource(move || {
        let workflow = workflow.clone();
        let test_id = test_id.clone();
        let mut controller = controller;
        async move {
            let prepared = workflow
                .prepare(Some(&test_id))
                .await
                .map_err(|err| ViewError::from(&err))?;
            let definition = prepared.definition();
            let header = TestHeader {
                title: definition.title().to_owned(),
                code: definition.code().to_owned(),
                window_title: definition.window_title(),
                question_count: definition.len(),
            };
            controller.set(Some(prepared));
            Ok::<_, ViewError>(header)
        }
    });
    let state = view_state_from_resource(&resource);

    // Elapsed label refresh; stops counting once the attempt is finished.
    use_future(move || async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_millis(TICK_MS));
        loop {
            interval.tick().await;
            if is_running(&controller) {
                *tick.write() += 1;
            }
        }
    });

    let dispatch_intent = use_callback(move |intent: QuizIntent| {
        let mut controller = controller;
        let mut guard = controller.write();
        let Some(ctl) = guard.as_mut() else {
            return;
        };
        let result = match intent {
            QuizIntent::Select(choice) => ctl.select(choice),
            QuizIntent::Next => ctl.advance().map(|_| ()),
            QuizIntent::Previous => ctl.retreat(),
        };
        if let Err(err) = result {
            tracing::debug!(?intent, error = %err, "quiz action ignored");
        }
    });

    let on_start = use_callback(move |()| {
        let mut controller = controller;
        if let Some(ctl) = controller.write().as_mut() {
            if let Err(err) = ctl.start() {
                tracing::debug!(error = %err, "start ignored");
            }
        }
    });

    let on_reset = use_callback(move |()| {
        let mut controller = controller;
        if let Some(ctl) = controller.write().as_mut() {
            if let Err(err) = ctl.reset() {
                tracing::warn!(error = %err, "reset failed");
            }
        }
    });

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(handles) = try_consume_context::<QuizTestHandles>() {
                handles.register(dispatch_intent, on_start, controller);
            }
        }
    }

    let on_key = use_callback(move |evt: KeyboardEvent| {
        let choice_count = match controller.peek().as_ref().map(QuizController::state) {
            Some(QuizState::InProgress(session)) => session.current_question().choices().len(),
            _ => return,
        };
        let key = evt.data.key().to_string();
        if let Some(intent) = QuizIntent::from_key(&key, choice_count) {
            evt.prevent_default();
            dispatch_intent.call(intent);
        }
    });

    use_effect(move || {
        let _ = eval(r#"document.getElementById("quiz-root")?.focus();"#);
    });

    let _ = tick();
    let screen = controller.read().as_ref().map(screen_for);

    rsx! {
        div { class: "page quiz-page", id: "quiz-root", tabindex: "0", onkeydown: on_key,
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    div { class: "load-error",
                        p { "{err.message()}" }
                        Link { to: Route::Home {}, class: "btn btn-secondary", "Back to tests" }
                    }
                },
                ViewState::Ready(header) => rsx! {
                    document::Title { "{header.window_title}" }
                    header { class: "quiz-header",
                        h2 { id: "test-title", "{header.title}" }
                        if !header.code.is_empty() {
                            span { class: "quiz-header__code", "{header.code}" }
                        }
                    }
                    match screen {
                        None | Some(Screen::Start) => rsx! {
                            StartScreen {
                                title: header.title.clone(),
                                question_count: header.question_count,
                                on_start,
                            }
                        },
                        Some(Screen::Question(vm)) => rsx! {
                            QuestionScreen { vm, on_intent: dispatch_intent, on_reset }
                        },
                        Some(Screen::Results(vm)) => rsx! {
                            ResultsScreen { vm, on_retry: on_reset }
                        },
                    }
                },
            }
        }
    }
}

#[component]
fn StartScreen(title: String, question_count: usize, on_start: EventHandler<()>) -> Element {
    rsx! {
        div { class: "start-screen", id: "start-screen",
            h3 { id: "start-title", "{title}" }
            p { "{question_count} questions. Questions and answers are shuffled each attempt." }
            p { class: "start-screen__keys", "Keys: 1-9 pick an answer, Enter or → next, ← previous." }
            button {
                class: "btn btn-primary",
                id: "start-btn",
                r#type: "button",
                onclick: move |_| on_start.call(()),
                "Start Test"
            }
        }
    }
}

#[component]
fn QuestionScreen(
    vm: QuestionScreenVm,
    on_intent: EventHandler<QuizIntent>,
    on_reset: EventHandler<()>,
) -> Element {
    let input_role = if vm.is_multi_select() { "checkbox" } else { "radio" };
    let heading = vm.heading();
    let hint = vm.hint();

    rsx! {
        div { class: "quiz",
            div { class: "quiz-status",
                span { class: "qnum", "{heading}" }
                span { class: "timer", id: "timer", "{vm.elapsed_label}" }
            }
            div { class: "progress",
                div { class: "progress-bar", id: "progress-bar", style: "width: {vm.progress_percent}%" }
            }
            div { class: "question-area", id: "question-area",
                div { class: "qtext", "{vm.prompt}" }
                if let Some(hint) = hint {
                    p { class: "qhint", "{hint}" }
                }
                if let Some(image) = vm.image.as_ref() {
                    div { class: "img-wrap",
                        img { class: "qimage", src: "{image.src}", alt: "{image.alt}" }
                    }
                }
                div { class: "choices", role: if vm.is_multi_select() { "group" } else { "radiogroup" },
                    for choice in vm.choices.iter().cloned() {
                        div {
                            key: "{choice.index}",
                            class: if choice.selected { "choice selected" } else { "choice" },
                            role: input_role,
                            aria_checked: "{choice.selected}",
                            "data-choice": "{choice.index}",
                            onclick: move |_| on_intent.call(QuizIntent::Select(choice.index)),
                            div { class: "marker", "{choice.marker}" }
                            div { "{choice.text}" }
                        }
                    }
                }
            }
            nav { class: "quiz-nav",
                button {
                    class: "btn btn-secondary",
                    id: "prev-btn",
                    r#type: "button",
                    disabled: !vm.can_retreat,
                    onclick: move |_| on_intent.call(QuizIntent::Previous),
                    "← Previous"
                }
                button {
                    class: "btn btn-ghost",
                    id: "reset-btn",
                    r#type: "button",
                    onclick: move |_| on_reset.call(()),
                    "Reset"
                }
                button {
                    class: "btn btn-primary",
                    id: "next-btn",
                    r#type: "button",
                    disabled: !vm.can_advance,
                    onclick: move |_| on_intent.call(QuizIntent::Next),
                    "{vm.next_label}"
                }
            }
        }
    }
}

#[component]
fn ResultsScreen(vm: ResultsVm, on_retry: EventHandler<()>) -> Element {
    rsx! {
        div { class: "results visible", id: "results",
            div { class: "card score-card",
                div { class: "score", "{vm.score_label}" }
                p { class: "score-time", "Time: {vm.elapsed_label}" }
                button {
                    class: "btn btn-ghost small",
                    id: "retry-btn",
                    r#type: "button",
                    onclick: move |_| on_retry.call(()),
                    "Retry Test"
                }
                Link { to: Route::Home {}, class: "btn btn-secondary small", "All tests" }
            }
            for row in vm.rows.iter() {
                div {
                    key: "{row.label}",
                    class: if row.is_correct { "review-item review-item--correct" } else { "review-item review-item--wrong" },
                    strong { "{row.label}" }
                    " {row.prompt}"
                    span { class: "verdict", "{row.verdict}" }
                    p { class: "review-answers", "Your answer: {row.selected} · Correct: {row.expected}" }
                    if !row.explanation.is_empty() {
                        pre { class: "expl", "{row.explanation}" }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct QuizTestHandles {
    dispatch: Rc<RefCell<Option<Callback<QuizIntent>>>>,
    start: Rc<RefCell<Option<Callback<()>>>>,
    controller: Rc<RefCell<Option<Signal<Option<QuizController>>>>>,
}

#[cfg(test)]
impl QuizTestHandles {
    pub(crate) fn register(
        &self,
        dispatch: Callback<QuizIntent>,
        start: Callback<()>,
        controller: Signal<Option<QuizController>>,
    ) {
        *self.dispatch.borrow_mut() = Some(dispatch);
        *self.start.borrow_mut() = Some(start);
        *self.controller.borrow_mut() = Some(controller);
    }

    pub(crate) fn dispatch(&self) -> Callback<QuizIntent> {
        (*self.dispatch.borrow()).expect("quiz dispatch registered")
    }

    pub(crate) fn start(&self) -> Callback<()> {
        (*self.start.borrow()).expect("quiz start registered")
    }

    pub(crate) fn controller(&self) -> Signal<Option<QuizController>> {
        (*self.controller.borrow()).expect("quiz controller registered")
    }
}
