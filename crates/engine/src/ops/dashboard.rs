use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use sea_orm::{
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
    sea_query::Expr,
};

use crate::{
    Dashboard, EngineError, Expense, ResultEngine,
    dashboard::{daily_series, month_window},
    expenses,
};

use super::{Engine, with_tx};

impl Engine {
    /// Aggregates a user's expenses for the month containing `now`.
    pub async fn dashboard(&self, user_id: i32, now: DateTime<Utc>) -> ResultEngine<Dashboard> {
        match self.timezone {
            Some(tz) => self.dashboard_in(&tz, user_id, now).await,
            None => self.dashboard_in(&Local, user_id, now).await,
        }
    }

    async fn dashboard_in<Z: TimeZone>(
        &self,
        tz: &Z,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> ResultEngine<Dashboard> {
        let today = now.with_timezone(tz);
        let (year, month) = (today.year(), today.month());
        let (start, end) = month_window(tz, year, month).ok_or_else(|| {
            EngineError::InvalidInput(format!("cannot resolve {year}-{month:02} locally"))
        })?;

        let (user, totals, expense_count, month_rows) = with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;

            let totals: Option<(Option<f64>, Option<i64>)> = expenses::Entity::find()
                .select_only()
                .column_as(Expr::col(expenses::Column::Amount).sum(), "lifetime_total")
                .column_as(Expr::col(expenses::Column::SplitWith).sum(), "total_people")
                .filter(expenses::Column::UserId.eq(user_id))
                .into_tuple()
                .one(&db_tx)
                .await?;

            let expense_count = expenses::Entity::find()
                .filter(expenses::Column::UserId.eq(user_id))
                .count(&db_tx)
                .await?;

            let month_rows = expenses::Entity::find()
                .filter(expenses::Column::UserId.eq(user_id))
                .filter(expenses::Column::SpentAt.gte(start))
                .filter(expenses::Column::SpentAt.lt(end))
                .order_by_asc(expenses::Column::SpentAt)
                .all(&db_tx)
                .await?;

            Ok::<_, EngineError>((user, totals, expense_count, month_rows))
        })?;

        let (lifetime_total, total_people) = totals.unwrap_or_default();
        let month_rows: Vec<Expense> = month_rows.into_iter().map(Expense::from).collect();
        let daily = daily_series(tz, year, month, &month_rows);

        Ok(Dashboard {
            username: user.username,
            year,
            month,
            lifetime_total: lifetime_total.unwrap_or(0.0),
            month_total: daily.iter().sum(),
            daily,
            total_people: total_people.unwrap_or(0),
            expense_count,
        })
    }
}
