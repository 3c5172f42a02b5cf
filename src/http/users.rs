use axum::{extract::State, Json};

use super::{Actor, SharedAppState};
use crate::{
    api,
    db::{user::Role, UserStore as _},
    policy::{self, Action},
    Error,
};

/// Agents a ticket can be assigned to.
pub(super) async fn agents(
    State(state): State<SharedAppState>,
    Actor(actor): Actor,
) -> Result<Json<api::user::Agents>, Error> {
    policy::authorize(Some(&actor), Action::ListAgents)?;

    let agents = state
        .store
        .get_users_by_role(Role::Agent)
        .await?
        .into_iter()
        .map(|u| api::user::Agent {
            id: u.id,
            name: u.name,
            email: u.email,
        })
        .collect();
    Ok(Json(api::user::Agents { agents }))
}
