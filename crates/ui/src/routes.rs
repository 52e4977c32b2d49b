use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::views::{HomeView, QuizView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", HomeView)] Home {},
        #[route("/quiz/:test_id", QuizView)] Quiz { test_id: String },
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            header { class: "topbar",
                Link { to: Route::Home {}, class: "brand", "Quiz" }
            }
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}
