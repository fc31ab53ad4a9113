use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use engine::{Engine, EngineError};
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer, cookie::SameSite};

use std::sync::Arc;

use crate::{ServerError, dashboard, expenses, session, user};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Knobs for the session cookie.
#[derive(Clone, Debug)]
pub struct ServerOptions {
    /// Sessions idle for longer than this are dropped.
    pub session_inactivity: time::Duration,
    /// Mark the cookie `Secure` (only sent over HTTPS).
    pub secure_cookie: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            session_inactivity: time::Duration::days(7),
            secure_cookie: false,
        }
    }
}

/// Gate for every page that needs a logged-in user.
///
/// The resolved [`engine::User`] is handed to the handlers as an extension.
async fn require_login(
    State(state): State<ServerState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(user_id) = session::current_user_id(&session).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    let user = match state.engine.user(user_id).await {
        Ok(user) => user,
        Err(EngineError::KeyNotFound(_)) => {
            tracing::warn!("session points to missing user {user_id}, logging out");
            session::log_out(&session).await?;
            return Ok(Redirect::to("/login").into_response());
        }
        Err(err) => return Err(err.into()),
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState, options: &ServerOptions) -> Router {
    let sessions = SessionManagerLayer::new(MemoryStore::default())
        .with_name("spendsplit")
        .with_secure(options.secure_cookie)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(options.session_inactivity));

    Router::new()
        .route("/logout", get(user::logout))
        .route("/profile", get(user::profile))
        .route("/dashboard", get(dashboard::show))
        .route("/expenses", get(expenses::list))
        .route("/add_expense", get(expenses::add_form).post(expenses::add))
        .route("/delete_expense/{id}", get(expenses::delete))
        .route("/edit_expense/{id}", get(expenses::edit_form))
        .route(
            "/update_expense/{id}",
            get(expenses::edit_form).post(expenses::update),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_login))
        .route("/", get(user::index))
        .route("/login", get(user::login_form).post(user::login))
        .route("/register", get(user::register_form).post(user::register))
        .layer(sessions)
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
    options: ServerOptions,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state, &options)).await
}
