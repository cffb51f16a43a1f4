//! Which route the viewer is allowed to stay on.

use super::state::LoadingPhase;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const ROOT_PATH: &str = "/";

/// Route classes the redirect policy cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Login,
    Dashboard,
    Root,
    Unmatched,
}

impl RouteKind {
    /// Classifies a path, ignoring any query string, fragment, or trailing slash.
    pub fn of(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Self::Root,
            LOGIN_PATH => Self::Login,
            DASHBOARD_PATH => Self::Dashboard,
            _ => Self::Unmatched,
        }
    }
}

/// Where the viewer must go, or `None` when the current route is allowed.
/// Never returns a path the viewer is already on.
pub fn redirect_target(
    authenticated: bool,
    phase: LoadingPhase,
    current_path: &str,
) -> Option<&'static str> {
    if phase.is_loading() {
        return None;
    }

    let target = match (authenticated, RouteKind::of(current_path)) {
        (true, RouteKind::Login | RouteKind::Root | RouteKind::Unmatched) => DASHBOARD_PATH,
        (false, RouteKind::Dashboard | RouteKind::Root | RouteKind::Unmatched) => LOGIN_PATH,
        _ => return None,
    };

    (RouteKind::of(target) != RouteKind::of(current_path)).then_some(target)
}

/// Router seam used by the coordinator.
pub trait Navigator {
    fn current_path(&self) -> String;

    /// Replaces the current history entry.
    fn replace(&self, path: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_paths() {
        assert_eq!(RouteKind::of("/"), RouteKind::Root);
        assert_eq!(RouteKind::of(""), RouteKind::Root);
        assert_eq!(RouteKind::of("/login"), RouteKind::Login);
        assert_eq!(RouteKind::of("/dashboard/"), RouteKind::Dashboard);
        assert_eq!(RouteKind::of("/dashboard?code=a&state=b"), RouteKind::Dashboard);
        assert_eq!(RouteKind::of("/reports"), RouteKind::Unmatched);
    }

    #[test]
    fn unauthenticated_viewer_leaves_dashboard() {
        assert_eq!(
            redirect_target(false, LoadingPhase::Ready, "/dashboard"),
            Some(LOGIN_PATH)
        );
        assert_eq!(redirect_target(false, LoadingPhase::Ready, "/"), Some(LOGIN_PATH));
        assert_eq!(
            redirect_target(false, LoadingPhase::Error, "/nowhere"),
            Some(LOGIN_PATH)
        );
    }

    #[test]
    fn authenticated_viewer_leaves_login() {
        assert_eq!(
            redirect_target(true, LoadingPhase::Ready, "/login"),
            Some(DASHBOARD_PATH)
        );
        assert_eq!(redirect_target(true, LoadingPhase::Ready, "/"), Some(DASHBOARD_PATH));
    }

    #[test]
    fn correct_routes_are_left_alone() {
        assert_eq!(redirect_target(true, LoadingPhase::Ready, "/dashboard"), None);
        assert_eq!(redirect_target(false, LoadingPhase::Ready, "/login"), None);
        assert_eq!(redirect_target(false, LoadingPhase::Ready, "/login/"), None);
    }

    #[test]
    fn nothing_moves_while_loading() {
        for phase in [LoadingPhase::Initializing, LoadingPhase::Connecting] {
            assert_eq!(redirect_target(false, phase, "/dashboard"), None);
            assert_eq!(redirect_target(true, phase, "/login"), None);
        }
    }
}
