//! Router adapter for the session coordinator.

use crate::backend::session::Navigator;
use dioxus::prelude::*;
use dioxus_router::Navigator as RouterHandle;

/// Something that can move the app to another route.
pub trait RouteHandle {
    fn replace(&self, path: &str);
}

impl RouteHandle for RouterHandle {
    fn replace(&self, path: &str) {
        RouterHandle::replace(self, path);
    }
}

/// Last known route path.
pub trait LocationCell {
    fn path(&self) -> String;
    fn record(&self, path: String);
}

impl LocationCell for Signal<String> {
    fn path(&self) -> String {
        self.peek().clone()
    }

    fn record(&self, path: String) {
        let mut signal = *self;
        signal.set(path);
    }
}

/// Exposes the Dioxus router through the coordinator's [`Navigator`] seam.
///
/// The router only reports a new route after the next render, so `replace`
/// records the target right away. Evaluating the redirect policy again before
/// that render sees the new path and stays put.
#[derive(Clone)]
pub struct RouterNavigator<H = RouterHandle, L = Signal<String>> {
    router: H,
    location: L,
}

impl<H, L> RouterNavigator<H, L> {
    /// `location` must also be kept in sync with the current route by the owning layout.
    pub fn new(router: H, location: L) -> Self {
        Self { router, location }
    }
}

impl<H: RouteHandle, L: LocationCell> Navigator for RouterNavigator<H, L> {
    fn current_path(&self) -> String {
        self.location.path()
    }

    fn replace(&self, path: &str) {
        if self.location.path() == path {
            return;
        }
        self.location.record(path.to_string());
        self.router.replace(path);
    }
}
