//! Expense pages: list, add, edit, delete.

use api_types::expense::ExpenseForm;
use axum::{
    Extension, Form,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use engine::{Amount, EngineError, NewExpense, SplitCount, UpdateExpense, User};
use tower_sessions::Session;

use crate::{
    ServerError,
    server::ServerState,
    session,
    views::{self, ExpenseFields},
};

/// Parsed amount and split, or the messages to show next to the form.
fn parse_amounts(payload: &ExpenseForm) -> Result<(Amount, SplitCount), Vec<String>> {
    let amount = payload.amount.parse::<Amount>();
    let split = payload.split.parse::<SplitCount>();
    match (amount, split) {
        (Ok(amount), Ok(split)) => Ok((amount, split)),
        (amount, split) => Err([amount.err(), split.err()]
            .into_iter()
            .flatten()
            .map(|err| err.to_string())
            .collect()),
    }
}

fn fields_of(payload: &ExpenseForm) -> ExpenseFields<'_> {
    ExpenseFields {
        title: &payload.title,
        amount: &payload.amount,
        split: &payload.split,
        date: payload.date.as_deref().unwrap_or_default(),
    }
}

fn invalid_form(expense_id: Option<i32>, payload: &ExpenseForm, errors: &[String]) -> Response {
    let page = views::expense_form(expense_id, &fields_of(payload), errors);
    (StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response()
}

fn is_validation(err: &EngineError) -> bool {
    matches!(
        err,
        EngineError::InvalidAmount(_) | EngineError::InvalidSplit(_) | EngineError::InvalidInput(_)
    )
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    session: Session,
) -> Result<Html<String>, ServerError> {
    let expenses = state.engine.list_expenses_for_user(user.id).await?;
    let flashes = session::take_flashes(&session).await?;
    let engine = &state.engine;
    Ok(Html(views::expenses(
        &expenses,
        |expense| engine.local_date(expense.spent_at),
        &flashes,
    )))
}

pub async fn add_form() -> Html<String> {
    Html(views::expense_form(None, &ExpenseFields::default(), &[]))
}

pub async fn add(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    session: Session,
    Form(payload): Form<ExpenseForm>,
) -> Result<Response, ServerError> {
    let (amount, split_with) = match parse_amounts(&payload) {
        Ok(parsed) => parsed,
        Err(errors) => return Ok(invalid_form(None, &payload, &errors)),
    };

    let spent_at = match payload.spent_on() {
        Ok(Some(day)) => match state.engine.midday_of(day) {
            Ok(at) => at,
            Err(err) => return Ok(invalid_form(None, &payload, &[err.to_string()])),
        },
        Ok(None) => Utc::now(),
        Err(_) => {
            let message = "date must look like YYYY-MM-DD".to_string();
            return Ok(invalid_form(None, &payload, &[message]));
        }
    };

    let created = state
        .engine
        .create_expense(NewExpense {
            user_id: user.id,
            title: payload.title.clone(),
            amount,
            split_with,
            spent_at,
        })
        .await;

    match created {
        Ok(expense) => {
            session::push_flash(&session, format!("Added \"{}\"", expense.title)).await?;
            Ok(Redirect::to("/expenses").into_response())
        }
        Err(err) if is_validation(&err) => Ok(invalid_form(None, &payload, &[err.to_string()])),
        Err(err) => Err(err.into()),
    }
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(expense_id): Path<i32>,
) -> Result<Redirect, ServerError> {
    state.engine.delete_expense(expense_id, user.id).await?;
    Ok(Redirect::to("/expenses"))
}

pub async fn edit_form(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(expense_id): Path<i32>,
) -> Result<Html<String>, ServerError> {
    let expense = state.engine.expense_for_owner(expense_id, user.id).await?;

    let amount = format!("{:.2}", expense.amount);
    let split = expense.split_with.to_string();
    let fields = ExpenseFields {
        title: &expense.title,
        amount: &amount,
        split: &split,
        date: "",
    };
    Ok(Html(views::expense_form(Some(expense.id), &fields, &[])))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    session: Session,
    Path(expense_id): Path<i32>,
    Form(payload): Form<ExpenseForm>,
) -> Result<Response, ServerError> {
    // Someone else's expense is a 403/404 whatever the form says.
    state.engine.expense_for_owner(expense_id, user.id).await?;

    let (amount, split_with) = match parse_amounts(&payload) {
        Ok(parsed) => parsed,
        Err(errors) => return Ok(invalid_form(Some(expense_id), &payload, &errors)),
    };

    let updated = state
        .engine
        .update_expense(UpdateExpense {
            id: expense_id,
            user_id: user.id,
            title: payload.title.clone(),
            amount,
            split_with,
        })
        .await;

    match updated {
        Ok(expense) => {
            session::push_flash(&session, format!("Updated \"{}\"", expense.title)).await?;
            Ok(Redirect::to("/expenses").into_response())
        }
        Err(err) if is_validation(&err) => {
            Ok(invalid_form(Some(expense_id), &payload, &[err.to_string()]))
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_parse_errors_are_reported() {
        let payload = ExpenseForm {
            title: "Lunch".to_string(),
            amount: "abc".to_string(),
            split: "0".to_string(),
            date: None,
        };
        let errors = parse_amounts(&payload).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("not a number"));
        assert!(errors[1].contains("at least 1"));
    }

    #[test]
    fn valid_form_parses() {
        let payload = ExpenseForm {
            title: "Lunch".to_string(),
            amount: "40".to_string(),
            split: "4".to_string(),
            date: None,
        };
        let (amount, split) = parse_amounts(&payload).unwrap();
        assert_eq!(amount.per_person(split), 10.0);
    }
}
