use crate::templates::components::{card, error_notice, sql_block};
use crate::templates::desktop_layout;
use maud::{html, Markup};

/// What came back for a question.
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantOutcome {
    /// Fenced SQL from the reply, or the whole reply when it has no fence.
    Sql(String),
    /// Nothing inside the fence; keeps the raw reply for display.
    NoSql(String),
    Failed(String),
}

pub struct AssistantVm {
    pub question: String,
    pub outcome: Option<AssistantOutcome>,
}

pub fn assistant_page(vm: &AssistantVm) -> Markup {
    desktop_layout(
        "SQL Assistant",
        html! {
            main class="container" {
                h1 { "SQL Assistant" }
                section class="card" {
                    form action="/assistant" method="get" {
                        label for="question" { "Ask a question about bookings" }
                        br;
                        textarea id="question" name="question" rows="3" cols="80"
                            placeholder="e.g. Revenue by city for June 2025" { (vm.question) }
                        br;
                        button type="submit" { "Generate SQL" }
                    }
                }

                @match &vm.outcome {
                    Some(AssistantOutcome::Sql(sql)) => (card("Generated SQL", html! {
                        pre class="sql" { code { (sql) } }
                        p class="caption" { "Query execution is disabled. Copy the SQL to run it yourself." }
                    })),
                    Some(AssistantOutcome::NoSql(raw)) => {
                        (error_notice("The model did not return any SQL."))
                        @if !raw.trim().is_empty() {
                            (sql_block("Raw reply", raw))
                        }
                    }
                    Some(AssistantOutcome::Failed(reason)) => (error_notice(&format!("Request failed: {reason}"))),
                    None => {}
                }
            }
        },
    )
}
