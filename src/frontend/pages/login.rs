//! Sign-in screen shown to unauthenticated viewers.

use crate::backend::utils::css::ResourceLoader;
use crate::frontend::services::context::AuthState;
use chrono::Datelike;
use dioxus::prelude::*;
use std::rc::Rc;

#[component]
pub fn LoginPage() -> Element {
    let auth = use_context::<AuthState>();
    let mut is_logging = use_signal(|| false);

    let logo = ResourceLoader::get_asset("logo");
    let year = chrono::Local::now().year();
    let error = auth.session.read().last_error.clone();

    let on_login = {
        let coordinator = Rc::clone(&auth.coordinator);
        move |_| {
            let coordinator = Rc::clone(&coordinator);
            is_logging.set(true);
            spawn(async move {
                if coordinator.login().await.is_err() {
                    is_logging.set(false);
                }
            });
        }
    };

    let on_dismiss = {
        let coordinator = Rc::clone(&auth.coordinator);
        move |_| coordinator.dismiss_error()
    };

    let on_check = {
        let coordinator = Rc::clone(&auth.coordinator);
        move |_| {
            let coordinator = Rc::clone(&coordinator);
            spawn(async move {
                coordinator.reconcile().await;
            });
        }
    };

    // The interactive flow reports back through events; a failure lands here.
    let session = auth.session;
    use_effect(move || {
        if session.read().last_error.is_some() {
            is_logging.set(false);
        }
    });

    rsx! {
        style { dangerous_inner_html: ResourceLoader::get_css("auth") }
        div { class: "screen-center",
            div { class: "login-card",
                div { class: "login-brand",
                    img { src: "{logo}", alt: "BusinessPro Logo" }
                    h1 { "BusinessPro" }
                }
                p { class: "login-subtitle", "Sign in to continue" }

                if let Some(message) = error {
                    div { class: "login-error",
                        span { "{message}" }
                        button { title: "Dismiss", onclick: on_dismiss, "×" }
                    }
                }

                button {
                    class: "login-button",
                    disabled: is_logging(),
                    onclick: on_login,
                    if is_logging() { "Redirecting to Keycloak..." } else { "Sign in with Keycloak" }
                }

                button { class: "check-button", hidden: true, onclick: on_check, "Check Auth Status" }

                p { class: "login-footer", "© {year} BusinessPro. All rights reserved." }
            }
        }
    }
}
