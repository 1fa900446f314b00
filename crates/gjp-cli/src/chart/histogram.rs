use gjp_data::AnswerOption;
use gjp_stats::histogram::Histogram;
use serde_json::{Value, json};

/// Histogram of baseline probabilities, one color per answer option.
pub(crate) fn prior_histogram(title: &str, histograms: &[(AnswerOption, Histogram)]) -> Value {
    let values = histograms
        .iter()
        .flat_map(|(option, histogram)| {
            histogram.bins.iter().map(move |bin| {
                json!({
                    "option": option,
                    "bin_start": bin.range.start,
                    "bin_end": bin.range.end,
                    "count": bin.count,
                })
            })
        })
        .collect();
    super::spec(
        title,
        values,
        json!({
            "width": 480,
            "height": 240,
            "mark": { "type": "bar", "opacity": 0.7 },
            "encoding": {
                "x": {
                    "field": "bin_start",
                    "type": "quantitative",
                    "bin": { "binned": true },
                    "title": "baseline probability",
                    "scale": { "domain": [0, 1] },
                },
                "x2": { "field": "bin_end" },
                "y": {
                    "field": "count",
                    "type": "quantitative",
                    "stack": null,
                    "title": "users",
                },
                "color": { "field": "option", "type": "nominal" },
                "tooltip": [
                    { "field": "option" },
                    { "field": "bin_start", "format": ".2f" },
                    { "field": "bin_end", "format": ".2f" },
                    { "field": "count" },
                ],
            },
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_row_per_bin_and_option() {
        let histograms = [
            (
                AnswerOption::A,
                Histogram::with_domain([0.1, 0.2, 0.9], 4, 0.0..1.0),
            ),
            (
                AnswerOption::B,
                Histogram::with_domain([0.9, 0.8, 0.1], 4, 0.0..1.0),
            ),
        ];
        let spec = prior_histogram("1001-0", &histograms);
        let values = spec["data"]["values"].as_array().unwrap();
        assert_eq!(values.len(), 8);
        assert_eq!(values[0]["option"], "a");
        assert_eq!(values[0]["count"], 2);
        assert_eq!(values[4]["option"], "b");
    }
}
