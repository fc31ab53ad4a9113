use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use sea_orm::DatabaseConnection;

use crate::{EngineError, ResultEngine};

mod dashboard;
mod expenses;
mod users;

pub use expenses::{NewExpense, UpdateExpense};
pub use users::NewUser;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Handle over the expense store.
///
/// Every public operation takes the acting user's id explicitly and runs in
/// its own database transaction.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    timezone: Option<Tz>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Calendar day of `at` in the engine's time zone (the server's local
    /// clock when none is set). The dashboard buckets expenses by this day.
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        match self.timezone {
            Some(tz) => at.with_timezone(&tz).date_naive(),
            None => at.with_timezone(&Local).date_naive(),
        }
    }

    /// Midday of `date` in the engine's calendar, as a UTC timestamp.
    ///
    /// Used for expenses entered with a day but no time, so they land on
    /// that day whatever the offset.
    pub fn midday_of(&self, date: NaiveDate) -> ResultEngine<DateTime<Utc>> {
        let naive = date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN));
        let resolved = match self.timezone {
            Some(tz) => tz.from_local_datetime(&naive).earliest().map(|dt| dt.to_utc()),
            None => Local.from_local_datetime(&naive).earliest().map(|dt| dt.to_utc()),
        };
        resolved.ok_or_else(|| EngineError::InvalidInput(format!("{date} does not exist locally")))
    }
}

fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_email(value: &str) -> ResultEngine<String> {
    let email = normalize_required_text(value, "email")?.to_lowercase();
    if !email.contains('@') {
        return Err(EngineError::InvalidInput(format!(
            "\"{email}\" is not an email address"
        )));
    }
    Ok(email)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    timezone: Option<Tz>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Interpret calendar months in `tz` instead of the local clock.
    pub fn timezone(mut self, tz: Tz) -> EngineBuilder {
        self.timezone = Some(tz);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            timezone: self.timezone,
        })
    }
}
