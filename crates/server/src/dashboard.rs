//! Dashboard page

use axum::{Extension, extract::State, response::Html};
use chrono::Utc;
use engine::User;

use crate::{ServerError, server::ServerState, views};

/// Totals for the logged-in user plus the current month day by day.
pub async fn show(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Html<String>, ServerError> {
    let dashboard = state.engine.dashboard(user.id, Utc::now()).await?;
    Ok(Html(views::dashboard(&dashboard)))
}
