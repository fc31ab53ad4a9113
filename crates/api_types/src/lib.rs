//! Payloads submitted by the HTML forms.
//!
//! Numeric fields are kept as strings: parsing happens in the engine so a
//! typo becomes a validation message instead of a generic rejection.

use serde::{Deserialize, Deserializer, Serialize};

/// Treat an empty form field the same as a missing one.
fn empty_string_as_none<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(de)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

pub mod auth {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct LoginForm {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct RegisterForm {
        pub username: String,
        pub email: String,
        pub password: String,
        #[serde(rename = "confirm-password")]
        pub confirm_password: String,
    }
}

pub mod expense {
    use chrono::NaiveDate;

    use super::*;

    /// Body of `/add_expense` and `/update_expense/{id}`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct ExpenseForm {
        pub title: String,
        pub amount: String,
        /// Number of people sharing the expense.
        pub split: String,
        /// `YYYY-MM-DD`; only read on creation. Empty means "now".
        #[serde(deserialize_with = "empty_string_as_none")]
        pub date: Option<String>,
    }

    impl ExpenseForm {
        /// The calendar day the expense happened on, if one was given.
        pub fn spent_on(&self) -> Result<Option<NaiveDate>, chrono::ParseError> {
            self.date
                .as_deref()
                .map(|raw| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d"))
                .transpose()
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{auth::RegisterForm, expense::ExpenseForm};

    #[test]
    fn register_form_reads_dashed_confirmation() {
        let form: RegisterForm = serde_json::from_str(
            r#"{"username":"alice","email":"a@x.com","password":"pw1","confirm-password":"pw1"}"#,
        )
        .unwrap();
        assert_eq!(form.confirm_password, "pw1");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let form: ExpenseForm = serde_json::from_str(r#"{"title":"Lunch"}"#).unwrap();
        assert_eq!(form.amount, "");
        assert_eq!(form.split, "");
        assert_eq!(form.date, None);
    }

    #[test]
    fn blank_date_means_now() {
        let form: ExpenseForm =
            serde_json::from_str(r#"{"title":"Lunch","amount":"40","split":"4","date":"  "}"#)
                .unwrap();
        assert_eq!(form.spent_on().unwrap(), None);
    }

    #[test]
    fn date_is_parsed() {
        let form = ExpenseForm {
            date: Some("2025-03-17".to_string()),
            ..Default::default()
        };
        assert_eq!(
            form.spent_on().unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 17)
        );

        let bad = ExpenseForm {
            date: Some("17/03/2025".to_string()),
            ..Default::default()
        };
        assert!(bad.spent_on().is_err());
    }
}
