//! Routing and the session shell that gates every route.

use crate::backend::auth::KeycloakClient;
use crate::backend::session::{
    LoadingPhase, Navigator, ROOT_PATH, SessionCoordinator, SessionStore,
};
use crate::backend::utils::css::ResourceLoader;
use crate::frontend::components::{DebugInfo, ErrorScreen, LoadingScreen};
use crate::frontend::pages::{DashboardPage, LoginPage};
use crate::frontend::services::context::{AuthState, LaunchContext};
use crate::frontend::services::navigator::RouterNavigator;
use dioxus::prelude::*;
use dioxus_router::{Routable, components::Outlet, navigator, use_route};
use std::rc::Rc;
use std::sync::Arc;

#[component]
pub fn Home() -> Element {
    rsx! {}
}

#[component]
pub fn Login() -> Element {
    rsx! { LoginPage {} }
}

#[component]
pub fn Dashboard() -> Element {
    rsx! { DashboardPage {} }
}

/// Unknown paths render nothing; the shell redirects them.
#[component]
pub fn NotFound(segments: Vec<String>) -> Element {
    log::debug!("Unmatched route /{}", segments.join("/"));
    rsx! {}
}

/// Main routing enum for the application.
#[derive(Clone, Routable, Debug, PartialEq, Eq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(SessionShell)]
        #[route("/")]
        Home {},
        #[route("/login")]
        Login {},
        #[route("/dashboard")]
        Dashboard {},
        #[route("/:..segments")]
        NotFound { segments: Vec<String> },
}

/// Owns the session coordinator and decides what the viewer may see.
#[component]
pub fn SessionShell() -> Element {
    let launch = use_context::<LaunchContext>();
    let route = use_route::<Route>();
    let nav = navigator();

    let path = route.to_string();
    let mut location = use_signal(|| path.clone());
    use_effect(use_reactive((&path,), move |(path,)| location.set(path)));

    let auth = use_context_provider(|| {
        let store = SessionStore::new();
        let client = Arc::new(KeycloakClient::new(launch.config.provider.clone()));
        let coordinator = SessionCoordinator::new(
            client,
            store.clone(),
            RouterNavigator::new(nav, location),
            &launch.config,
        );
        AuthState {
            session: Signal::new(store.snapshot()),
            coordinator: Rc::new(coordinator),
            launch_url: launch.launch_url.clone(),
        }
    });

    let sync = auth.clone();
    use_future(move || sync.sync_session());

    let init = auth.clone();
    use_future(move || init.start(false));

    // Land on the route the app was launched with, e.g. an OAuth callback.
    let launch_path = auth.launch_url.path().to_string();
    use_effect(move || {
        if launch_path != ROOT_PATH {
            RouterNavigator::new(nav, location).replace(&launch_path);
        }
    });

    // Re-runs whenever the session or the route changes.
    let session = auth.session;
    let guard = Rc::clone(&auth.coordinator);
    use_effect(move || {
        let _ = (session.read().phase, location.read().len());
        guard.enforce_route();
    });

    let snapshot = auth.session.read().clone();
    let error_message = snapshot.last_error.clone().unwrap_or_default();
    let on_retry = {
        let auth = auth.clone();
        move |_| {
            spawn(auth.start(true));
        }
    };

    rsx! {
        style { dangerous_inner_html: ResourceLoader::get_css("main") }
        match snapshot.phase {
            LoadingPhase::Initializing | LoadingPhase::Connecting => rsx! {
                LoadingScreen { phase: snapshot.phase }
            },
            LoadingPhase::Error => rsx! {
                ErrorScreen {
                    message: error_message,
                    on_retry,
                }
            },
            LoadingPhase::Ready => rsx! {
                Outlet::<Route> {}
                DebugInfo { route: path }
            },
        }
    }
}
