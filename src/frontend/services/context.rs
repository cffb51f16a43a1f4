//! Authentication context shared with every route.

use crate::backend::auth::{IdentityClient, KeycloakClient};
use crate::backend::session::{Session, SessionCoordinator};
use crate::backend::utils::config::AppConfig;
use crate::frontend::services::navigator::RouterNavigator;
use dioxus::prelude::*;
use std::future::Future;
use std::rc::Rc;
use url::Url;

pub type AppCoordinator = SessionCoordinator<KeycloakClient, RouterNavigator>;

/// Values fixed at launch.
#[derive(Clone)]
pub struct LaunchContext {
    pub config: AppConfig,
    /// Location treated as the current URL for callback detection.
    pub launch_url: Url,
}

#[derive(Clone)]
pub struct AuthState {
    /// Read-only mirror of the coordinator's store for rendering.
    pub session: Signal<Session>,
    pub coordinator: Rc<AppCoordinator>,
    pub launch_url: Url,
}

impl AuthState {
    /// Whether the identity client currently holds a token.
    pub fn has_token(&self) -> bool {
        self.coordinator.client().is_authenticated()
    }

    /// Runs the handshake and then serves events until the task is dropped.
    pub fn start(&self, retry: bool) -> impl Future<Output = ()> + 'static + use<> {
        let coordinator = Rc::clone(&self.coordinator);
        let launch_url = self.launch_url.clone();
        async move {
            let subscription = if retry {
                coordinator.retry(&launch_url).await
            } else {
                coordinator.initialize(&launch_url).await
            };
            if let Some(subscription) = subscription {
                coordinator.run_events(subscription).await;
            }
        }
    }

    /// Mirrors every store update into [`AuthState::session`].
    pub fn sync_session(&self) -> impl Future<Output = ()> + 'static + use<> {
        let mut receiver = self.coordinator.store().subscribe();
        let mut session = self.session;
        async move {
            loop {
                let snapshot = receiver.borrow_and_update().clone();
                session.set(snapshot);
                if receiver.changed().await.is_err() {
                    break;
                }
            }
        }
    }
}
