//! Helpers over the cookie session: the logged-in user id and one-shot flash
//! messages.

use tower_sessions::Session;

use crate::ServerError;

/// Key holding the authenticated user's id.
pub const USER_ID_KEY: &str = "user_id";
const FLASH_KEY: &str = "_flash";

pub async fn current_user_id(session: &Session) -> Result<Option<i32>, ServerError> {
    Ok(session.get::<i32>(USER_ID_KEY).await?)
}

/// Binds the session to `user_id`, rotating the session id first.
pub async fn log_in(session: &Session, user_id: i32) -> Result<(), ServerError> {
    session.cycle_id().await?;
    session.insert(USER_ID_KEY, user_id).await?;
    Ok(())
}

/// Drops the whole session, flashes included.
pub async fn log_out(session: &Session) -> Result<(), ServerError> {
    session.flush().await?;
    Ok(())
}

/// Queue a message for the next rendered page.
pub async fn push_flash(session: &Session, message: impl Into<String>) -> Result<(), ServerError> {
    let mut flashes = session
        .get::<Vec<String>>(FLASH_KEY)
        .await?
        .unwrap_or_default();
    flashes.push(message.into());
    session.insert(FLASH_KEY, flashes).await?;
    Ok(())
}

/// Return and clear every queued message.
pub async fn take_flashes(session: &Session) -> Result<Vec<String>, ServerError> {
    Ok(session
        .remove::<Vec<String>>(FLASH_KEY)
        .await?
        .unwrap_or_default())
}
