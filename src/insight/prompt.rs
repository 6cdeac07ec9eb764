use crate::domain::metrics::{format_adr, format_count, format_currency, MetricsRecord};

/// Renders the summarization prompt for one metrics record. A missing ADR
/// (no room nights) is written as `n/a` instead of failing.
pub fn build_prompt(metrics: &MetricsRecord) -> String {
    format!(
        "You are a hotel analyst. Here is the {scope} performance:\n\
         Revenue: {revenue}\n\
         Room Nights: {room_nights}\n\
         ADR: {adr}\n\
         Give a 2-3 line summary and any notable trend or issue.",
        scope = metrics.scope,
        revenue = format_currency(metrics.revenue),
        room_nights = format_count(metrics.room_nights),
        adr = format_adr(metrics.adr),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MetricScope;

    #[test]
    fn prompt_embeds_rounded_metrics() {
        let record = MetricsRecord::new(MetricScope::City("Delhi".into()), 3500.000_000_1, 3);
        let prompt = build_prompt(&record);
        assert!(prompt.starts_with("You are a hotel analyst. Here is the city Delhi performance:"));
        assert!(prompt.contains("Revenue: ₹3,500.00\n"));
        assert!(prompt.contains("Room Nights: 3\n"));
        assert!(prompt.contains("ADR: ₹1,166.67\n"));
        assert!(prompt.ends_with("Give a 2-3 line summary and any notable trend or issue."));
    }

    #[test]
    fn missing_adr_degrades_to_placeholder() {
        let record = MetricsRecord::empty(MetricScope::City("Goa".into()));
        let prompt = build_prompt(&record);
        assert!(prompt.contains("Room Nights: 0\n"));
        assert!(prompt.contains("ADR: n/a\n"));
    }

    #[test]
    fn prompt_is_deterministic() {
        let record = MetricsRecord::new(MetricScope::Portfolio, 120.5, 2);
        assert_eq!(build_prompt(&record), build_prompt(&record));
    }
}
