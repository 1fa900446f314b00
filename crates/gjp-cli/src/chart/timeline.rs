use gjp_analysis::baseline::UserQuestionBaseline;
use gjp_data::question::Question;
use serde_json::{Value, json};

/// Open periods of questions as horizontal bars.
pub(crate) fn ifp_timeline(title: &str, questions: &[&Question]) -> Value {
    let values = questions
        .iter()
        .map(|q| {
            json!({
                "ifp_id": q.ifp_id,
                "short_title": q.short_title,
                "date_start": q.date_start,
                "date_end": q.date_closed.or(q.date_to_close),
                "outcome": q.outcome,
                "days_open": q.days_open,
            })
        })
        .collect();
    super::spec(
        title,
        values,
        json!({
            "width": 720,
            "height": { "step": 12 },
            "mark": "bar",
            "encoding": {
                "x": { "field": "date_start", "type": "temporal", "title": null },
                "x2": { "field": "date_end" },
                "y": {
                    "field": "short_title",
                    "type": "ordinal",
                    "sort": { "field": "date_start" },
                    "title": null,
                },
                "color": { "field": "outcome", "type": "nominal" },
                "tooltip": [
                    { "field": "ifp_id" },
                    { "field": "short_title" },
                    { "field": "date_start", "type": "temporal" },
                    { "field": "date_end", "type": "temporal" },
                    { "field": "days_open" },
                ],
            },
        }),
    )
}

/// A user's baselines over time, colored by whether the favored option won.
pub(crate) fn user_timeline(title: &str, summaries: &[UserQuestionBaseline]) -> Value {
    let values = summaries
        .iter()
        .map(|s| {
            json!({
                "ifp_id": s.ifp_id,
                "short_title": s.short_title,
                "time": s.time,
                "label": s.label,
                "top_option": s.top_option,
                "top_probability": s.top_probability,
                "is_correct": s.is_correct,
            })
        })
        .collect();
    super::spec(
        title,
        values,
        json!({
            "width": 720,
            "height": { "step": 14 },
            "mark": { "type": "point", "filled": true },
            "encoding": {
                "x": { "field": "time", "type": "temporal", "title": "baseline time" },
                "y": {
                    "field": "short_title",
                    "type": "ordinal",
                    "sort": { "field": "time" },
                    "title": null,
                },
                "size": {
                    "field": "top_probability",
                    "type": "quantitative",
                    "scale": { "domain": [0.5, 1] },
                },
                "color": {
                    "field": "is_correct",
                    "type": "nominal",
                    "scale": { "domain": [true, false], "range": ["#2ca02c", "#d62728"] },
                },
                "tooltip": [
                    { "field": "ifp_id" },
                    { "field": "short_title" },
                    { "field": "time", "type": "temporal" },
                    { "field": "label" },
                ],
            },
        }),
    )
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use gjp_data::AnswerOption;

    use super::*;

    #[test]
    fn test_user_timeline_rows() {
        let time = NaiveDate::from_ymd_opt(2013, 5, 1)
            .unwrap()
            .and_hms_opt(14, 30, 0);
        let summaries = [UserQuestionBaseline {
            ifp_id: "1001-0".to_owned(),
            short_title: "Question".to_owned(),
            time,
            label: "a: 0.3, b: 0.7".to_owned(),
            top_option: AnswerOption::B,
            top_probability: 0.7,
            is_correct: Some(false),
        }];
        let spec = user_timeline("u1", &summaries);
        let row = &spec["data"]["values"][0];
        assert_eq!(row["time"], "2013-05-01T14:30:00");
        assert_eq!(row["top_option"], "b");
        assert_eq!(row["is_correct"], false);
    }
}
