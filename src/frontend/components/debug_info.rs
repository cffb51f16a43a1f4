//! Session inspector, rendered hidden in debug builds only.

use crate::frontend::services::context::AuthState;
use dioxus::prelude::*;

#[component]
pub fn DebugInfo(route: String) -> Element {
    if !cfg!(debug_assertions) {
        return rsx! {};
    }

    let auth = use_context::<AuthState>();
    let session = auth.session.read().clone();
    let yes_no = |flag: bool| if flag { "YES" } else { "NO" };
    let user = session.display_name().unwrap_or("None").to_string();
    let error = session.last_error.clone().unwrap_or_else(|| "None".to_string());
    let token = if auth.has_token() { "Present" } else { "None" };

    rsx! {
        div { class: "debug-info", hidden: true,
            h4 { "Debug Info:" }
            div { "Authenticated: {yes_no(session.authenticated)}" }
            div { "Keycloak Ready: {session.phase}" }
            div { "User: {user}" }
            div { "Token: {token}" }
            div { "Route: {route}" }
            div { "Error: {error}" }
            div { "Keycloak Authenticated: {yes_no(auth.has_token())}" }
        }
    }
}
