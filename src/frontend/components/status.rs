//! Full-screen loading and error states.

use crate::backend::session::LoadingPhase;
use dioxus::prelude::*;

#[component]
pub fn LoadingScreen(phase: LoadingPhase) -> Element {
    rsx! {
        div { class: "screen-center",
            div {
                div { class: "spinner" }
                p { class: "status-text", "Initializing authentication..." }
                p { class: "status-phase", "State: {phase}" }
            }
        }
    }
}

#[component]
pub fn ErrorScreen(message: String, on_retry: EventHandler<()>) -> Element {
    rsx! {
        div { class: "screen-center",
            div { class: "error-card",
                h3 { "Authentication Service Error" }
                p { "{message}" }
                button {
                    class: "button-danger",
                    onclick: move |_| on_retry.call(()),
                    "Retry"
                }
            }
        }
    }
}
