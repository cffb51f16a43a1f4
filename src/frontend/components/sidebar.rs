//! Collapsible navigation sidebar.

use crate::frontend::data::NAV_ITEMS;
use dioxus::prelude::*;

#[component]
pub fn Sidebar(open: bool, on_close: EventHandler<()>) -> Element {
    rsx! {
        if open {
            div { class: "sidebar-backdrop", onclick: move |_| on_close.call(()) }
        }
        aside { class: if open { "sidebar open" } else { "sidebar" },
            div { class: "sidebar-header",
                span { "BusinessPro" }
                button { title: "Close menu", onclick: move |_| on_close.call(()), "‹" }
            }
            nav {
                for item in NAV_ITEMS {
                    button {
                        key: "{item.label}",
                        class: if item.active { "nav-item active" } else { "nav-item" },
                        "{item.glyph}  {item.label}"
                    }
                }
            }
        }
    }
}
