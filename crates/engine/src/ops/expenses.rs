use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{Amount, EngineError, Expense, ResultEngine, SplitCount, expenses};

use super::{Engine, normalize_required_text, with_tx};

/// Input for [`Engine::create_expense`].
#[derive(Clone, Debug)]
pub struct NewExpense {
    pub user_id: i32,
    pub title: String,
    pub amount: Amount,
    pub split_with: SplitCount,
    pub spent_at: DateTime<Utc>,
}

/// Input for [`Engine::update_expense`].
///
/// The spend date is kept as it was recorded.
#[derive(Clone, Debug)]
pub struct UpdateExpense {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub amount: Amount,
    pub split_with: SplitCount,
}

impl Engine {
    /// Records a new expense owned by `cmd.user_id`.
    pub async fn create_expense(&self, cmd: NewExpense) -> ResultEngine<Expense> {
        let title = normalize_required_text(&cmd.title, "title")?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, cmd.user_id).await?;

            let mut active = expenses::ActiveModel {
                id: ActiveValue::NotSet,
                user_id: ActiveValue::Set(cmd.user_id),
                title: ActiveValue::Set(title),
                spent_at: ActiveValue::Set(cmd.spent_at),
                completed: ActiveValue::Set(false),
                ..Default::default()
            };
            active.set_split(cmd.amount, cmd.split_with);
            let model = active.insert(&db_tx).await?;

            tracing::debug!(
                user_id = model.user_id,
                expense_id = model.id,
                "created expense"
            );
            Ok(Expense::from(model))
        })
    }

    /// Overwrites title, amount and split of an expense and recomputes the
    /// per-person share.
    ///
    /// Authorization: the expense must belong to `cmd.user_id`.
    pub async fn update_expense(&self, cmd: UpdateExpense) -> ResultEngine<Expense> {
        let title = normalize_required_text(&cmd.title, "title")?;
        with_tx!(self, |db_tx| {
            let model = self
                .require_owned_expense(&db_tx, cmd.id, cmd.user_id)
                .await?;

            let mut active: expenses::ActiveModel = model.into();
            active.title = ActiveValue::Set(title);
            active.set_split(cmd.amount, cmd.split_with);
            let model = active.update(&db_tx).await?;

            tracing::debug!(
                user_id = model.user_id,
                expense_id = model.id,
                "updated expense"
            );
            Ok(Expense::from(model))
        })
    }

    /// Removes an expense.
    ///
    /// Authorization: the expense must belong to `user_id`.
    pub async fn delete_expense(&self, expense_id: i32, user_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_owned_expense(&db_tx, expense_id, user_id)
                .await?;
            model.delete(&db_tx).await?;

            tracing::debug!(user_id, expense_id, "deleted expense");
            Ok(())
        })
    }

    /// Return a single expense, checking that `user_id` owns it.
    pub async fn expense_for_owner(&self, expense_id: i32, user_id: i32) -> ResultEngine<Expense> {
        with_tx!(self, |db_tx| {
            self.require_owned_expense(&db_tx, expense_id, user_id)
                .await
                .map(Expense::from)
        })
    }

    /// All expenses of `user_id`, newest first.
    pub async fn list_expenses_for_user(&self, user_id: i32) -> ResultEngine<Vec<Expense>> {
        with_tx!(self, |db_tx| {
            expenses::Entity::find()
                .filter(expenses::Column::UserId.eq(user_id))
                .order_by_desc(expenses::Column::Id)
                .all(&db_tx)
                .await
                .map(|models| models.into_iter().map(Expense::from).collect())
                .map_err(EngineError::from)
        })
    }

    async fn require_owned_expense(
        &self,
        db: &DatabaseTransaction,
        expense_id: i32,
        user_id: i32,
    ) -> ResultEngine<expenses::Model> {
        let model = expenses::Entity::find_by_id(expense_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("expense {expense_id}")))?;

        if model.user_id != user_id {
            tracing::warn!(
                user_id,
                expense_id,
                owner_id = model.user_id,
                "expense access denied"
            );
            return Err(EngineError::Forbidden(format!(
                "expense {expense_id} belongs to another user"
            )));
        }
        Ok(model)
    }
}
