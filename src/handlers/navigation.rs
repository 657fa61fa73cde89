use axum::{
    Extension, Json,
    extract::{Path, Query},
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, Result},
    models::session::Session,
    services::policy::{self, Decision, MenuSection, Permission, Resource},
    services::role_router::{self, ViewState},
};

#[derive(Serialize)]
pub struct MenuResponse {
    pub view: ViewState,
    pub role: String,
    pub role_label: String,
    pub sections: Vec<MenuSection>,
}

/// The sidebar menu for the session's role.
pub async fn menu(Extension(session): Extension<Session>) -> Json<MenuResponse> {
    let role = &session.user.role;
    Json(MenuResponse {
        view: role_router::route(&session),
        role: role.to_string(),
        role_label: policy::label_for(role).to_string(),
        sections: policy::menu_for(role),
    })
}

#[derive(Deserialize)]
pub struct CheckQuery {
    #[serde(default)]
    pub path: String,
}

#[derive(Serialize)]
pub struct CheckResponse {
    pub path: String,
    pub decision: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<&'static str>,
}

/// Answers whether the session may navigate to `?path=`.
pub async fn check(
    Extension(session): Extension<Session>,
    Query(query): Query<CheckQuery>,
) -> Json<CheckResponse> {
    let decision = policy::decide(&session.user.role, &query.path);
    tracing::debug!(
        "🧭 Navigation {} for {}: {:?}",
        query.path,
        session.user.role,
        decision
    );

    let (decision, redirect_to) = match decision {
        Decision::Allow => ("allow", None),
        Decision::Deny => ("deny", None),
        Decision::Redirect(target) => ("redirect", Some(target)),
    };

    Json(CheckResponse {
        path: query.path,
        decision,
        redirect_to,
    })
}

#[derive(Serialize)]
pub struct ResourceAccess {
    pub resource: Resource,
    pub label: &'static str,
    pub path: &'static str,
    pub permission: Permission,
    pub can_read: bool,
    pub can_write: bool,
}

/// The session's permission on the resource named by `tag`.
pub async fn resource_access(
    Extension(session): Extension<Session>,
    Path(tag): Path<String>,
) -> Result<Json<ResourceAccess>> {
    let resource: Resource = tag.parse().map_err(|e| {
        tracing::debug!("{}", e);
        AppError::NotFound
    })?;
    let permission = policy::permission(&session.user.role, resource);

    Ok(Json(ResourceAccess {
        resource,
        label: resource.label(),
        path: resource.path(),
        permission,
        can_read: permission.allows_read(),
        can_write: permission.allows_write(),
    }))
}
