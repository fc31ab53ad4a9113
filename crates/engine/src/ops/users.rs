use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, QueryFilter, QueryOrder, SqlErr,
    TransactionTrait, prelude::*,
};

use crate::{EngineError, ResultEngine, User, password, users};

use super::{Engine, normalize_email, normalize_required_text, with_tx};

/// Registration input, as typed by the user.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl Engine {
    /// Creates a new account.
    ///
    /// The confirmation is checked first, so a mismatch never touches the
    /// database. Username and email must both be unused.
    pub async fn register_user(&self, cmd: NewUser) -> ResultEngine<User> {
        if cmd.password != cmd.confirm_password {
            return Err(EngineError::PasswordMismatch);
        }
        if cmd.password.is_empty() {
            return Err(EngineError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }
        let username = normalize_required_text(&cmd.username, "username")?;
        let email = normalize_email(&cmd.email)?;
        let password_hash = password::hash_password(&cmd.password)?;

        with_tx!(self, |db_tx| {
            let taken = users::Entity::find()
                .filter(
                    Condition::any()
                        .add(users::Column::Username.eq(username.as_str()))
                        .add(users::Column::Email.eq(email.as_str())),
                )
                .one(&db_tx)
                .await?;
            if let Some(existing) = taken {
                let key = if existing.username == username {
                    username
                } else {
                    email
                };
                return Err(EngineError::ExistingKey(key));
            }

            let model = users::ActiveModel {
                id: ActiveValue::NotSet,
                username: ActiveValue::Set(username.clone()),
                email: ActiveValue::Set(email.clone()),
                password: ActiveValue::Set(password_hash),
            }
            .insert(&db_tx)
            .await
            .map_err(|err| insert_error(err, username, email))?;

            tracing::info!(user_id = model.id, "registered user {}", model.username);
            Ok(User::from(model))
        })
    }

    /// Checks email + password. Unknown email and wrong password are
    /// indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> ResultEngine<User> {
        let email = email.trim().to_lowercase();
        let model = with_tx!(self, |db_tx| {
            users::Entity::find()
                .filter(users::Column::Email.eq(email.as_str()))
                .one(&db_tx)
                .await
                .map_err(EngineError::from)
        })?;

        let Some(model) = model else {
            tracing::warn!("login attempt for unknown email {email}");
            return Err(EngineError::InvalidCredentials);
        };
        if !password::verify_password(password, &model.password)? {
            tracing::warn!(user_id = model.id, "wrong password");
            return Err(EngineError::InvalidCredentials);
        }

        Ok(User::from(model))
    }

    /// Return a user by id.
    pub async fn user(&self, user_id: i32) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await.map(User::from)
        })
    }

    /// All users, oldest first.
    pub async fn list_users(&self) -> ResultEngine<Vec<User>> {
        with_tx!(self, |db_tx| {
            users::Entity::find()
                .order_by_asc(users::Column::Id)
                .all(&db_tx)
                .await
                .map(|models| models.into_iter().map(User::from).collect())
                .map_err(EngineError::from)
        })
    }

    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: i32,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("user {user_id}")))
    }
}

/// A concurrent registration can slip past the lookup above; the unique
/// indexes still reject it.
fn insert_error(err: DbErr, username: String, email: String) -> EngineError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => {
            EngineError::ExistingKey(if message.contains("email") {
                email
            } else {
                username
            })
        }
        _ => EngineError::from(err),
    }
}

#[cfg(test)]
mod tests {
    use migration::MigratorTrait;
    use sea_orm::{ConnectionTrait, Database};

    use super::*;

    async fn duplicate_insert(sql: &str) -> DbErr {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        db.execute_unprepared(
            "INSERT INTO users (username, email, password) VALUES ('alice', 'a@x.com', 'h')",
        )
        .await
        .unwrap();
        db.execute_unprepared(sql).await.unwrap_err()
    }

    #[tokio::test]
    async fn unique_username_violation_is_existing_key() {
        let err = duplicate_insert(
            "INSERT INTO users (username, email, password) VALUES ('alice', 'b@x.com', 'h')",
        )
        .await;

        assert_eq!(
            insert_error(err, "alice".to_string(), "b@x.com".to_string()),
            EngineError::ExistingKey("alice".to_string())
        );
    }

    #[tokio::test]
    async fn unique_email_violation_is_existing_key() {
        let err = duplicate_insert(
            "INSERT INTO users (username, email, password) VALUES ('bob', 'a@x.com', 'h')",
        )
        .await;

        assert_eq!(
            insert_error(err, "bob".to_string(), "a@x.com".to_string()),
            EngineError::ExistingKey("a@x.com".to_string())
        );
    }

    #[test]
    fn other_errors_stay_database_errors() {
        let err = DbErr::Custom("disk full".to_string());

        assert!(matches!(
            insert_error(err, "alice".to_string(), "a@x.com".to_string()),
            EngineError::Database(_)
        ));
    }
}
