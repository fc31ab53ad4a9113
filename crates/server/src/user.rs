//! Login, registration and profile pages.

use api_types::auth::{LoginForm, RegisterForm};
use axum::{
    Extension, Form,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use engine::{EngineError, NewUser, User};
use tower_sessions::Session;

use crate::{ServerError, server::ServerState, session, status_for_engine_error, views};

pub async fn index(session: Session) -> Result<Html<String>, ServerError> {
    let logged_in = session::current_user_id(&session).await?.is_some();
    let flashes = session::take_flashes(&session).await?;
    Ok(Html(views::index(logged_in, &flashes)))
}

pub async fn login_form(session: Session) -> Result<Html<String>, ServerError> {
    let flashes = session::take_flashes(&session).await?;
    Ok(Html(views::login("", &flashes)))
}

pub async fn login(
    State(state): State<ServerState>,
    session: Session,
    Form(payload): Form<LoginForm>,
) -> Result<Response, ServerError> {
    match state
        .engine
        .authenticate(&payload.email, &payload.password)
        .await
    {
        Ok(user) => {
            session::log_in(&session, user.id).await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(EngineError::InvalidCredentials) => {
            let page = views::login(&payload.email, &["Invalid email or password".to_string()]);
            Ok((StatusCode::UNAUTHORIZED, Html(page)).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn register_form(session: Session) -> Result<Html<String>, ServerError> {
    let flashes = session::take_flashes(&session).await?;
    Ok(Html(views::signup("", "", &flashes)))
}

pub async fn register(
    State(state): State<ServerState>,
    session: Session,
    Form(payload): Form<RegisterForm>,
) -> Result<Response, ServerError> {
    let RegisterForm {
        username,
        email,
        password,
        confirm_password,
    } = payload;

    let result = state
        .engine
        .register_user(NewUser {
            username: username.clone(),
            email: email.clone(),
            password,
            confirm_password,
        })
        .await;

    match result {
        Ok(user) => {
            session::log_in(&session, user.id).await?;
            session::push_flash(&session, format!("Welcome, {}!", user.username)).await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(err) => {
            let status = status_for_engine_error(&err);
            if !status.is_client_error() {
                return Err(err.into());
            }
            let page = views::signup(&username, &email, &[err.to_string()]);
            Ok((status, Html(page)).into_response())
        }
    }
}

pub async fn logout(session: Session) -> Result<Redirect, ServerError> {
    session::log_out(&session).await?;
    Ok(Redirect::to("/"))
}

pub async fn profile(Extension(user): Extension<User>) -> Html<String> {
    Html(views::profile(&user))
}
