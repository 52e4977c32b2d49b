use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{TestCardVm, map_test_cards};

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();

    {
        let ctx = ctx.clone();
        use_effect(move || {
            if let Some(test_id) = ctx.take_launch_test() {
                let _ = navigator.push(Route::Quiz { test_id });
            }
        });
    }

    let workflow = ctx.workflow();
    let mut resource = use_resource(move || {
        let workflow = workflow.clone();
        async move {
            let listings = workflow.list_tests().await.map_err(|err| {
                tracing::warn!(error = %err, "failed to list tests");
                ViewError::from(&err)
            })?;
            Ok::<_, ViewError>(map_test_cards(&listings))
        }
    });
    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page home-page",
            h2 { "Choose a test" }
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(cards) => rsx! {
                    if cards.is_empty() {
                        p { class: "empty", "No tests found." }
                    } else {
                        ul { class: "test-list",
                            for card in cards {
                                TestCard { key: "{card.id}", card: card.clone() }
                            }
                        }
                    }
                },
                ViewState::Error(_) => rsx! {
                    p { "Could not read the test list." }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| resource.restart(),
                        "Retry"
                    }
                },
            }
        }
    }
}

#[component]
fn TestCard(card: TestCardVm) -> Element {
    rsx! {
        li { class: "test-card",
            Link { to: Route::Quiz { test_id: card.id.clone() },
                span { class: "test-card__title", "{card.title}" }
                if let Some(code) = card.code.as_deref() {
                    span { class: "test-card__code", "{code}" }
                }
                span { class: "test-card__count", "{card.count_label}" }
            }
        }
    }
}
