//! The module contains `Expense` struct and its table.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::Serialize;

use crate::{Amount, SplitCount};

/// An expense paid by a user and shared among `split_with` people.
///
/// `per_person` is derived when the expense is written and always equals
/// `amount / split_with`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Expense {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub amount: f64,
    pub spent_at: DateTime<Utc>,
    pub split_with: i32,
    pub per_person: f64,
    /// Stored but not used by any flow yet.
    pub completed: bool,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub amount: f64,
    pub spent_at: DateTimeUtc,
    pub split_with: i32,
    pub per_person: f64,
    pub completed: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Expense {
    fn from(value: Model) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id,
            title: value.title,
            amount: value.amount,
            spent_at: value.spent_at,
            split_with: value.split_with,
            per_person: value.per_person,
            completed: value.completed,
        }
    }
}

impl ActiveModel {
    /// Writes amount, split and the derived per-person share together so
    /// they can never disagree.
    pub(crate) fn set_split(&mut self, amount: Amount, split_with: SplitCount) {
        self.amount = ActiveValue::Set(amount.value());
        self.split_with = ActiveValue::Set(split_with.get());
        self.per_person = ActiveValue::Set(amount.per_person(split_with));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_split_keeps_per_person_in_sync() {
        let mut active = <ActiveModel as Default>::default();
        active.set_split(Amount::new(40.0).unwrap(), SplitCount::new(4).unwrap());

        assert_eq!(active.amount, ActiveValue::Set(40.0));
        assert_eq!(active.split_with, ActiveValue::Set(4));
        assert_eq!(active.per_person, ActiveValue::Set(10.0));
    }

    #[test]
    fn model_converts_to_expense() {
        let model = Model {
            id: 7,
            user_id: 1,
            title: "Lunch".to_string(),
            amount: 40.0,
            spent_at: Utc::now(),
            split_with: 4,
            per_person: 10.0,
            completed: false,
        };
        let expense = Expense::from(model.clone());

        assert_eq!(expense.id, 7);
        assert_eq!(expense.title, "Lunch");
        assert_eq!(expense.spent_at, model.spent_at);
        assert!(!expense.completed);
    }
}
