use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// Carries the model's text so the caller can show it instead.
    #[error("the model did not return any SQL")]
    NoResultExtracted { raw: String },
}

fn sql_fence() -> &'static Regex {
    static SQL_FENCE: OnceLock<Regex> = OnceLock::new();
    SQL_FENCE.get_or_init(|| Regex::new(r"(?is)```sql\b\s*(.*?)```").expect("sql fence pattern"))
}

/// Pulls the body of the first ```sql fenced block out of a model reply.
/// Without a fence the whole trimmed reply is taken as the query.
pub fn extract_sql(content: &str) -> Result<String, ExtractError> {
    let sql = match sql_fence().captures(content).and_then(|c| c.get(1)) {
        Some(body) => body.as_str().trim(),
        None => content.trim(),
    };

    if sql.is_empty() {
        return Err(ExtractError::NoResultExtracted {
            raw: content.to_string(),
        });
    }
    Ok(sql.to_string())
}
