//! Server-side HTML pages.
//!
//! Every user-provided string goes through [`escape`] before it is written
//! into markup.

use std::fmt::Write;

use axum::http::StatusCode;
use chrono::NaiveDate;
use engine::{Dashboard, Expense, User};

/// Escape text for use inside HTML elements and double-quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}

fn layout(title: &str, logged_in: bool, flashes: &[String], body: &str) -> String {
    let nav = if logged_in {
        r#"<a href="/dashboard">Dashboard</a> <a href="/expenses">Expenses</a> <a href="/add_expense">Add expense</a> <a href="/profile">Profile</a> <a href="/logout">Log out</a>"#
    } else {
        r#"<a href="/login">Log in</a> <a href="/register">Sign up</a>"#
    };

    let mut flash_html = String::new();
    for message in flashes {
        let _ = write!(flash_html, r#"<p class="flash">{}</p>"#, escape(message));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} · Spendsplit</title>
</head>
<body>
<nav><a href="/">Spendsplit</a> {nav}</nav>
{flash_html}
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
    )
}

pub fn index(logged_in: bool, flashes: &[String]) -> String {
    let body = if logged_in {
        r#"<h1>Welcome back</h1><p><a href="/dashboard">Open your dashboard</a></p>"#
    } else {
        r#"<h1>Split expenses, keep track</h1><p><a href="/register">Create an account</a> or <a href="/login">log in</a>.</p>"#
    };
    layout("Home", logged_in, flashes, body)
}

pub fn login(email: &str, flashes: &[String]) -> String {
    let body = format!(
        r#"<h1>Log in</h1>
<form method="post" action="/login">
<label>Email <input type="email" name="email" value="{email}" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Log in</button>
</form>"#,
        email = escape(email),
    );
    layout("Log in", false, flashes, &body)
}

pub fn signup(username: &str, email: &str, flashes: &[String]) -> String {
    let body = format!(
        r#"<h1>Sign up</h1>
<form method="post" action="/register">
<label>Username <input type="text" name="username" value="{username}" required></label>
<label>Email <input type="email" name="email" value="{email}" required></label>
<label>Password <input type="password" name="password" required></label>
<label>Confirm password <input type="password" name="confirm-password" required></label>
<button type="submit">Create account</button>
</form>"#,
        username = escape(username),
        email = escape(email),
    );
    layout("Sign up", false, flashes, &body)
}

pub fn profile(user: &User) -> String {
    let body = format!(
        r#"<h1>{username}</h1>
<dl>
<dt>Email</dt><dd>{email}</dd>
<dt>Member number</dt><dd>{id}</dd>
</dl>"#,
        username = escape(&user.username),
        email = escape(&user.email),
        id = user.id,
    );
    layout("Profile", true, &[], &body)
}

fn month_label(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|first| first.format("%B %Y").to_string())
        .unwrap_or_else(|| format!("{year}-{month:02}"))
}

pub fn dashboard(dashboard: &Dashboard) -> String {
    let mut rows = String::new();
    for (day0, amount) in dashboard.daily.iter().enumerate() {
        let _ = write!(
            rows,
            "<tr><td>{day}</td><td>{amount:.2}</td></tr>",
            day = day0 + 1
        );
    }
    let series = serde_json::to_string(&dashboard.daily).unwrap_or_else(|_| "[]".to_string());

    let body = format!(
        r#"<h1>Hi, {username}</h1>
<section class="totals">
<p>Total spent: <strong>{lifetime:.2}</strong></p>
<p>Spent in {month}: <strong>{month_total:.2}</strong></p>
<p>Expenses recorded: <strong>{count}</strong></p>
<p>People split with: <strong>{people}</strong></p>
</section>
<h2>{month}, day by day</h2>
<table>
<thead><tr><th>Day</th><th>Spent</th></tr></thead>
<tbody>{rows}</tbody>
</table>
<script type="application/json" id="daily-series">{series}</script>"#,
        username = escape(&dashboard.username),
        lifetime = dashboard.lifetime_total,
        month = month_label(dashboard.year, dashboard.month),
        month_total = dashboard.month_total,
        count = dashboard.expense_count,
        people = dashboard.total_people,
    );
    layout("Dashboard", true, &[], &body)
}

/// Expense table; `local_day` gives the calendar day shown for each row.
pub fn expenses(
    expenses: &[Expense],
    local_day: impl Fn(&Expense) -> NaiveDate,
    flashes: &[String],
) -> String {
    let body = if expenses.is_empty() {
        r#"<h1>Expenses</h1><p>Nothing here yet. <a href="/add_expense">Add your first expense</a>.</p>"#
            .to_string()
    } else {
        let mut rows = String::new();
        for expense in expenses {
            let _ = write!(
                rows,
                r#"<tr id="expense-{id}"><td>{date}</td><td>{title}</td><td>{amount:.2}</td><td>{split}</td><td>{per_person:.2}</td><td><a href="/edit_expense/{id}">Edit</a> <a href="/delete_expense/{id}">Delete</a></td></tr>"#,
                id = expense.id,
                date = local_day(expense).format("%Y-%m-%d"),
                title = escape(&expense.title),
                amount = expense.amount,
                split = expense.split_with,
                per_person = expense.per_person,
            );
        }
        format!(
            r#"<h1>Expenses</h1>
<table>
<thead><tr><th>Date</th><th>Title</th><th>Amount</th><th>Split with</th><th>Per person</th><th></th></tr></thead>
<tbody>{rows}</tbody>
</table>"#
        )
    };
    layout("Expenses", true, flashes, &body)
}

/// Values shown in the add/edit expense form.
#[derive(Debug, Default)]
pub struct ExpenseFields<'a> {
    pub title: &'a str,
    pub amount: &'a str,
    pub split: &'a str,
    pub date: &'a str,
}

/// Form for a new expense (`expense_id == None`) or an edit.
pub fn expense_form(expense_id: Option<i32>, fields: &ExpenseFields<'_>, errors: &[String]) -> String {
    let (heading, action, date_input) = match expense_id {
        None => (
            "New expense".to_string(),
            "/add_expense".to_string(),
            format!(
                r#"<label>Date <input type="date" name="date" value="{}"></label>"#,
                escape(fields.date)
            ),
        ),
        Some(id) => (
            "Edit expense".to_string(),
            format!("/update_expense/{id}"),
            String::new(),
        ),
    };

    let body = format!(
        r#"<h1>{heading}</h1>
<form method="post" action="{action}">
<label>Title <input type="text" name="title" value="{title}" required></label>
<label>Amount <input type="text" inputmode="decimal" name="amount" value="{amount}" required></label>
<label>Split with <input type="number" min="1" name="split" value="{split}" required></label>
{date_input}
<button type="submit">Save</button>
</form>"#,
        title = escape(fields.title),
        amount = escape(fields.amount),
        split = escape(fields.split),
    );
    layout(&heading, true, errors, &body)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        r#"<h1>{code}</h1><p class="error">{message}</p><p><a href="/">Back home</a></p>"#,
        code = status.as_u16(),
        message = escape(message),
    );
    layout(
        status.canonical_reason().unwrap_or("Error"),
        false,
        &[],
        &body,
    )
}
