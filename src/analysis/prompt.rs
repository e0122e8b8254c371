//! Deterministic prompt rendering.
//!
//! `build_prompt` is a pure function: identical inputs always yield
//! byte-identical prompt text, which keeps model requests debuggable and
//! testable. The output-format contract at the end of the prompt must stay
//! byte-for-byte consistent with the schema in [`super::output`].

use rust_decimal::Decimal;

use super::context::AnalysisInput;

/// Rendered in place of absent optional values so the model never sees a blank
const NOT_INFORMED: &str = "not informed";

/// Renders the analysis context into the full model instruction text.
///
/// Four sections: campaign facts, metrics, benchmark table (or an explicit
/// "no benchmark" marker), and the fixed task/rules block with the output
/// contract. Percentages and currency are fixed 2-decimal.
pub fn build_prompt(input: &AnalysisInput) -> String {
    let offer = &input.offer;
    let metrics = &input.metrics;

    let start_date = offer.start_date.format("%Y-%m-%d").to_string();
    let end_date = offer
        .end_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| NOT_INFORMED.to_string());
    let budget = offer.budget.unwrap_or(Decimal::ZERO);

    let benchmarks_text = if input.benchmarks.is_empty() {
        "No benchmark available".to_string()
    } else {
        input
            .benchmarks
            .iter()
            .map(|b| {
                format!(
                    "- {}: Min {:.2} | Ideal {:.2} | Max {:.2}",
                    b.metric_name, b.min_value, b.ideal_value, b.max_value
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"Analyze this marketing campaign:

CAMPAIGN DATA:
- Name: {name}
- Niche: {niche}
- Country: {country}
- Traffic source: {traffic_source}
- Funnel type: {funnel_type}
- Budget: ${budget:.2}
- Period: {start_date} to {end_date}

METRICS:
- Impressions: {impressions}
- Clicks: {clicks}
- CTR: {ctr:.2}%
- CPC: ${cpc:.2}
- CPM: ${cpm:.2}
- Leads: {leads}
- Sales: {sales}
- Conversion rate: {conversion_rate:.2}%
- Revenue: ${revenue:.2}
- Cost: ${cost:.2}
- ROAS: {roas:.2}
- AOV: ${aov:.2}

MARKET BENCHMARKS:
{benchmarks_text}

TASKS:
1. Summarize the performance in 2-3 sentences ("summary" field)
2. Set the validation status ("validation_status" field):
   - "validated": ROAS > 3.0 AND sales > 10
   - "close_to_validation": ROAS 1.5-3.0 OR sales 5-10
   - "not_validated": ROAS < 1.5 AND sales < 5
3. Explain the status ("validation_explanation" field)
4. Identify up to 5 bottlenecks by comparing with benchmarks ("bottlenecks" field):
   - Provide stage, metric, current_value, benchmark_value, severity, explanation
   - Possible stages: traffic, funnel, checkout, offer
   - Severity: high (>30% below ideal), medium (10-30% below), low (<10% below)
5. Create 5 prioritized actions ("action_plan" field):
   - priority: 1 (most important) through 5
   - action: clear description of the action
   - expected_impact: e.g. "+15% CR", "+$500 revenue"
   - difficulty: easy, medium, hard
6. List missing data that would improve the analysis ("missing_data" field)
7. Recommend 3 next tests in a single text ("next_test_recommendations" field)

RULES:
- ALWAYS compare against benchmarks when available
- Be specific with values (don't say "low", say "15% below ideal")
- Prioritize actions with the highest impact and lowest difficulty
- If a benchmark does not exist, do not force a comparison

Return JSON in EXACTLY this format:
{{
  "summary": "string with 2-3 sentences",
  "validation_status": "validated|not_validated|close_to_validation",
  "validation_explanation": "string explaining the status",
  "bottlenecks": [
    {{
      "stage": "traffic|funnel|checkout|offer",
      "metric": "metric name",
      "current_value": number,
      "benchmark_value": number,
      "severity": "high|medium|low",
      "explanation": "detailed explanation"
    }}
  ],
  "action_plan": [
    {{
      "priority": number from 1 to 5,
      "action": "description of the action",
      "expected_impact": "expected impact",
      "difficulty": "easy|medium|hard"
    }}
  ],
  "missing_data": ["item1", "item2"],
  "next_test_recommendations": "text with 3 test recommendations"
}}"#,
        name = offer.name,
        niche = offer.niche,
        country = offer.country,
        traffic_source = offer.traffic_source,
        funnel_type = offer.funnel_type,
        impressions = metrics.impressions,
        clicks = metrics.clicks,
        ctr = metrics.ctr,
        cpc = metrics.cpc,
        cpm = metrics.cpm,
        leads = metrics.leads,
        sales = metrics.sales,
        conversion_rate = metrics.conversion_rate,
        revenue = metrics.revenue,
        cost = metrics.cost,
        roas = metrics.roas,
        aov = metrics.aov,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::context::test_fixtures::*;
    use crate::db::models::benchmarks::MetricName;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn test_input(benchmark_count: usize) -> AnalysisInput {
        let offer = test_offer(Uuid::new_v4());
        let metrics = test_metrics(offer.id);
        let benchmarks: Vec<_> = [
            test_benchmark(MetricName::Ctr, Decimal::new(2, 0)),
            test_benchmark(MetricName::Roas, Decimal::new(3, 0)),
        ]
        .into_iter()
        .take(benchmark_count)
        .collect();
        AnalysisInput::assemble(&offer, Some(&metrics), &benchmarks).unwrap()
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let input = test_input(2);
        assert_eq!(build_prompt(&input), build_prompt(&input));
    }

    #[test]
    fn test_prompt_differs_when_input_differs() {
        let a = test_input(2);
        let mut b = a.clone();
        b.metrics.sales += 1;
        assert_ne!(build_prompt(&a), build_prompt(&b));
    }

    #[test]
    fn test_benchmark_table_contains_exactly_given_entries() {
        let prompt = build_prompt(&test_input(2));
        assert!(prompt.contains("- ctr: Min 1.00 | Ideal 2.00 | Max 4.00"));
        assert!(prompt.contains("- roas: Min 1.50 | Ideal 3.00 | Max 6.00"));
        assert!(!prompt.contains("No benchmark available"));
    }

    #[test]
    fn test_empty_benchmarks_render_explicit_marker() {
        let prompt = build_prompt(&test_input(0));
        assert!(prompt.contains("No benchmark available"));
    }

    #[test]
    fn test_two_decimal_formatting_and_absent_values() {
        let mut input = test_input(0);
        input.offer.budget = None;
        input.offer.end_date = None;

        let prompt = build_prompt(&input);
        assert!(prompt.contains("- Budget: $0.00"));
        assert!(prompt.contains("to not informed"));
        assert!(prompt.contains("- ROAS: 3.50"));
        assert!(prompt.contains("- Revenue: $1750.00"));
    }

    #[test]
    fn test_output_contract_names_every_schema_field() {
        let prompt = build_prompt(&test_input(1));
        for field in [
            "\"summary\"",
            "\"validation_status\"",
            "\"validation_explanation\"",
            "\"bottlenecks\"",
            "\"action_plan\"",
            "\"missing_data\"",
            "\"next_test_recommendations\"",
        ] {
            assert!(prompt.contains(field), "prompt must embed the {field} contract");
        }
    }
}
