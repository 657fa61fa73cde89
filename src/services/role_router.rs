use serde::Serialize;
use thiserror::Error;

use crate::models::session::Session;
use crate::models::user::Role;

/// Which top-level view the dashboard mounts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewState {
    Unauthenticated,
    Loading,
    Admin,
    HomeroomTeacher,
    SubjectTeacher,
    /// A session whose role has no dashboard; shown as an explanatory panel.
    UnknownRole,
}

impl ViewState {
    /// Whether the state is one of the role dashboards.
    pub fn is_role_view(self) -> bool {
        matches!(
            self,
            ViewState::Admin
                | ViewState::HomeroomTeacher
                | ViewState::SubjectTeacher
                | ViewState::UnknownRole
        )
    }
}

/// Selects the dashboard for a role.
pub fn view_for_role(role: &Role) -> ViewState {
    match role {
        Role::Admin => ViewState::Admin,
        Role::WaliKelas => ViewState::HomeroomTeacher,
        Role::Guru | Role::GuruKelas => ViewState::SubjectTeacher,
        Role::Unrecognized(_) => ViewState::UnknownRole,
    }
}

/// Selects the dashboard for an authorized session.
pub fn route(session: &Session) -> ViewState {
    view_for_role(&session.user.role)
}

/// Something that happened to the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouterEvent {
    RehydrationStarted,
    /// The restored session's role, or `None` if nothing was restored.
    RehydrationFinished(Option<Role>),
    LoggedIn(Role),
    /// Explicit logout or detected expiry.
    LoggedOut,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{event:?} is not valid in state {from:?}")]
pub struct InvalidTransition {
    pub from: ViewState,
    pub event: RouterEvent,
}

/// Tracks the view state of one client.
///
/// Role views only leave through logout; moving between screens inside a
/// role is the policy's business, not the router's.
#[derive(Debug, Clone)]
pub struct RoleRouter {
    state: ViewState,
}

impl Default for RoleRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl RoleRouter {
    pub fn new() -> Self {
        Self {
            state: ViewState::Unauthenticated,
        }
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Applies `event`, returning the new state.
    pub fn apply(&mut self, event: RouterEvent) -> Result<ViewState, InvalidTransition> {
        let next = match (self.state, &event) {
            (_, RouterEvent::LoggedOut) => ViewState::Unauthenticated,
            (ViewState::Unauthenticated, RouterEvent::RehydrationStarted) => ViewState::Loading,
            (ViewState::Loading, RouterEvent::RehydrationFinished(None)) => {
                ViewState::Unauthenticated
            }
            (ViewState::Loading, RouterEvent::RehydrationFinished(Some(role))) => {
                view_for_role(role)
            }
            (ViewState::Unauthenticated, RouterEvent::LoggedIn(role)) => view_for_role(role),
            (from, _) => return Err(InvalidTransition { from, event }),
        };

        tracing::debug!("🎯 View {:?} -> {:?}", self.state, next);
        self.state = next;
        Ok(next)
    }

    /// Runs a full rehydration cycle for `restored`.
    pub fn rehydrated(&mut self, restored: Option<&Session>) -> Result<ViewState, InvalidTransition> {
        self.apply(RouterEvent::RehydrationStarted)?;
        self.apply(RouterEvent::RehydrationFinished(
            restored.map(|session| session.user.role.clone()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_map_to_dashboards() {
        assert_eq!(view_for_role(&Role::Admin), ViewState::Admin);
        assert_eq!(view_for_role(&Role::WaliKelas), ViewState::HomeroomTeacher);
        assert_eq!(view_for_role(&Role::Guru), ViewState::SubjectTeacher);
        assert_eq!(view_for_role(&Role::GuruKelas), ViewState::SubjectTeacher);
        assert_eq!(view_for_role(&Role::from("kepsek")), ViewState::UnknownRole);
    }

    #[test]
    fn failed_rehydration_returns_to_login() {
        let mut router = RoleRouter::new();
        assert_eq!(router.apply(RouterEvent::RehydrationStarted), Ok(ViewState::Loading));
        assert_eq!(
            router.apply(RouterEvent::RehydrationFinished(None)),
            Ok(ViewState::Unauthenticated)
        );
    }

    #[test]
    fn successful_rehydration_selects_role_view() {
        let mut router = RoleRouter::new();
        router.apply(RouterEvent::RehydrationStarted).unwrap();
        let state = router
            .apply(RouterEvent::RehydrationFinished(Some(Role::WaliKelas)))
            .unwrap();
        assert_eq!(state, ViewState::HomeroomTeacher);
        assert!(state.is_role_view());
    }

    #[test]
    fn direct_login_and_logout() {
        let mut router = RoleRouter::new();
        assert_eq!(router.apply(RouterEvent::LoggedIn(Role::Admin)), Ok(ViewState::Admin));
        assert_eq!(router.apply(RouterEvent::LoggedOut), Ok(ViewState::Unauthenticated));
        assert_eq!(router.apply(RouterEvent::LoggedOut), Ok(ViewState::Unauthenticated));
    }

    #[test]
    fn role_views_are_terminal() {
        let mut router = RoleRouter::new();
        router.apply(RouterEvent::LoggedIn(Role::Guru)).unwrap();

        let err = router.apply(RouterEvent::LoggedIn(Role::Admin)).unwrap_err();
        assert_eq!(err.from, ViewState::SubjectTeacher);
        assert!(router.apply(RouterEvent::RehydrationStarted).is_err());
        assert_eq!(router.state(), ViewState::SubjectTeacher);
    }

    #[test]
    fn loading_only_accepts_rehydration_outcome() {
        let mut router = RoleRouter::new();
        router.apply(RouterEvent::RehydrationStarted).unwrap();
        assert!(router.apply(RouterEvent::LoggedIn(Role::Admin)).is_err());
        assert_eq!(router.state(), ViewState::Loading);
    }
}
