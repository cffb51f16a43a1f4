//! Dashboard shown to signed-in viewers.

use crate::backend::session::UserProfile;
use crate::backend::utils::css::ResourceLoader;
use crate::frontend::components::{OrdersTable, Sidebar, StatCard};
use crate::frontend::data::STATS;
use crate::frontend::services::context::AuthState;
use dioxus::prelude::*;
use std::rc::Rc;

#[component]
pub fn DashboardPage() -> Element {
    let auth = use_context::<AuthState>();
    let user = auth.session.read().user.clone();

    let on_logout = {
        let coordinator = Rc::clone(&auth.coordinator);
        move |_| {
            let coordinator = Rc::clone(&coordinator);
            spawn(async move {
                if let Err(e) = coordinator.logout().await {
                    log::warn!("Provider logout did not complete: {e}");
                }
            });
        }
    };

    rsx! {
        DashboardView { user, on_logout }
    }
}

#[component]
pub fn DashboardView(user: Option<UserProfile>, on_logout: EventHandler<()>) -> Element {
    let mut sidebar_open = use_signal(|| false);
    let name = user.as_ref().map_or("User", |u| u.name.as_str()).to_string();
    let email = user.as_ref().map(|u| u.email.clone()).unwrap_or_default();

    rsx! {
        style { dangerous_inner_html: ResourceLoader::get_css("dashboard") }
        div { class: "dashboard",
            Sidebar { open: sidebar_open(), on_close: move |_| sidebar_open.set(false) }

            div { class: "main-area",
                header { class: "topbar",
                    div { class: "topbar-left",
                        button {
                            title: "Toggle menu",
                            onclick: move |_| sidebar_open.toggle(),
                            "☰"
                        }
                        h2 { "Dashboard" }
                    }
                    div { class: "topbar-right",
                        div { class: "user-chip",
                            span { class: "name", "{name}" }
                            span { class: "email", "{email}" }
                        }
                        button {
                            class: "logout-button",
                            onclick: move |_| on_logout.call(()),
                            "Logout"
                        }
                    }
                }

                main { class: "content",
                    section { class: "welcome",
                        h1 { "Welcome back, {name}!" }
                        p { "Here's what's happening with your business today." }
                    }
                    section { class: "stats",
                        for stat in STATS {
                            StatCard { key: "{stat.label}", stat }
                        }
                    }
                    OrdersTable {}
                }
            }
        }
    }
}
