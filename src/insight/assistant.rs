//! Prompt for the natural-language-to-SQL helper.
//!
//! The schema context is rendered from the same filter policy and channel
//! rules the dashboard queries use, so the model is told exactly what the
//! dashboard itself applies.

use crate::domain::booking::{
    GuestStatus, B2B_SOURCES, NET_REVENUE_DIVISOR, NON_B2C_SOURCES, OWNER_SOURCES,
};
use crate::domain::channel::CHANNEL_RULES;
use crate::query::FilterPolicy;
use std::fmt::Write;

const ALL_STATUSES: [GuestStatus; 5] = [
    GuestStatus::Pending,
    GuestStatus::CheckedIn,
    GuestStatus::CheckedOut,
    GuestStatus::NoShow,
    GuestStatus::Cancelled,
];

fn int_list(codes: &[i64]) -> String {
    codes
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn quoted_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("'{}'", v.replace('\'', "''")))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn schema_context(policy: &FilterPolicy) -> String {
    let mut out = String::new();
    let realized: Vec<i64> = GuestStatus::REALIZED.iter().map(|s| s.code()).collect();
    let prefixes = policy
        .property_prefixes
        .iter()
        .map(|p| format!("'{p}'"))
        .collect::<Vec<_>>()
        .join(" or ");
    let window = policy.default_window_start.format("%Y-%m-%d");

    // Writing to a String cannot fail.
    let _ = writeln!(
        out,
        "You are working with a PostgreSQL table called `mtd` that stores hotel booking data."
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Columns of interest:");
    let _ = writeln!(
        out,
        "- stay_date, created_at, grand_total, booking_id, booking_source, ota_booking_source,\n  room_night_booking_id, guest_status, property_city, property_name, property_id"
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Filters & Inclusions:");
    let _ = writeln!(out, "- Only include records where:");
    let _ = writeln!(out, "    - guest_status IN ({})", int_list(&realized));
    let _ = writeln!(out, "    - property_name starts with {prefixes}");
    if !policy.city_blocklist.is_empty() {
        let _ = writeln!(
            out,
            "    - property_city NOT IN ({})",
            quoted_list(&policy.city_blocklist)
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Revenue Logic:");
    let _ = writeln!(
        out,
        "- Use `grand_total / {NET_REVENUE_DIVISOR}` as net revenue (excludes tax)"
    );
    let _ = writeln!(out, "Room Night Count:");
    let _ = writeln!(out, "- Count of room_night_booking_id");
    let _ = writeln!(out, "ADR Logic:");
    let _ = writeln!(out, "- Net revenue / Count of room_night_booking_id");
    let _ = writeln!(out);
    let _ = writeln!(out, "Monthly Aggregation:");
    let _ = writeln!(
        out,
        "- Use DATE_TRUNC('month', stay_date) AS month to group data by month"
    );
    let _ = writeln!(
        out,
        "- For sold data, use DATE_TRUNC('month', created_at) AS month instead"
    );
    let _ = writeln!(
        out,
        "- Use CURRENT_DATE - INTERVAL '1 month', etc. for rolling periods"
    );
    let _ = writeln!(
        out,
        "- Use ARRAY_AGG or CASE WHEN logic to show month-wise trends"
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Channel Mapping Logic (first matching rule wins):");
    for (rule, label) in CHANNEL_RULES {
        let _ = writeln!(out, "- {rule} -> '{label}'");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "B2C Revenue & Room Nights:");
    let _ = writeln!(
        out,
        "- Use above filters + exclude booking_source IN ({})",
        int_list(&NON_B2C_SOURCES)
    );
    let _ = writeln!(out, "B2B Revenue & Room Nights:");
    let _ = writeln!(out, "- booking_source IN ({})", int_list(&B2B_SOURCES));
    let _ = writeln!(out, "Sold Revenue & Room Nights:");
    let _ = writeln!(out, "- Based on created_at (not stay_date)");
    let _ = writeln!(
        out,
        "- Combine B2C bookings (booking_source NOT IN ({})) with owner bookings (booking_source IN ({}) AND property_id IN ({}))",
        int_list(&NON_B2C_SOURCES),
        int_list(&OWNER_SOURCES),
        int_list(&policy.owner_property_ids)
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Guest Status Mapping:");
    for status in ALL_STATUSES {
        let _ = writeln!(out, "- {} = {}", status.code(), status.label());
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Time Range Defaults:");
    let _ = writeln!(
        out,
        "- If the question does not mention any time period, apply `stay_date >= '{window}'`."
    );
    let _ = writeln!(
        out,
        "- If it is about sold revenue or uses created_at, apply `created_at >= '{window}'` instead."
    );
    let _ = writeln!(out);
    let _ = write!(
        out,
        "Only return safe, optimized SELECT statements. No DELETE/UPDATE. No explanations or markdown."
    );
    out
}

/// Full prompt for one question, or `None` when the question is blank.
pub fn build_sql_prompt(question: &str, policy: &FilterPolicy) -> Option<String> {
    let question = question.trim();
    if question.is_empty() {
        return None;
    }
    Some(format!(
        "{}\n\nConvert this question into an optimized SQL query:\nQuestion: {question}",
        schema_context(policy)
    ))
}
