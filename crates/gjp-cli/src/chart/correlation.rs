use gjp_analysis::correlation::{CorrelationMatrix, RankedCell};
use serde_json::{Value, json};

fn corr_color() -> Value {
    json!({
        "field": "corr",
        "type": "quantitative",
        "scale": { "scheme": "redblue", "domain": [-1, 1], "reverse": true },
        "title": "r",
    })
}

/// Heat map of the full matrix with both axes in `order`.
pub(crate) fn corr_matrix(title: &str, matrix: &CorrelationMatrix, order: &[String]) -> Value {
    let values = matrix
        .cells()
        .iter()
        .map(|cell| {
            json!({
                "ifp_id_x": cell.ifp_id_x,
                "ifp_id_y": cell.ifp_id_y,
                "corr": cell.corr,
                "r2": cell.r2,
                "n_users": cell.n_users,
            })
        })
        .collect();
    let axis = |field: &str| {
        json!({
            "field": field,
            "type": "ordinal",
            "sort": order,
            "title": null,
        })
    };
    super::spec(
        title,
        values,
        json!({
            "width": 16 * order.len(),
            "height": 16 * order.len(),
            "mark": "rect",
            "encoding": {
                "x": axis("ifp_id_y"),
                "y": axis("ifp_id_x"),
                "color": corr_color(),
                "opacity": {
                    "field": "r2",
                    "type": "quantitative",
                    "scale": { "domain": [0, 1], "range": [0.3, 1] },
                    "legend": null,
                },
                "tooltip": [
                    { "field": "ifp_id_x" },
                    { "field": "ifp_id_y" },
                    { "field": "corr", "format": "+.3f" },
                    { "field": "n_users" },
                ],
            },
        }),
    )
}

/// Strongest partners of each row question, one column per rank.
pub(crate) fn corr_top_k(title: &str, cells: &[RankedCell], rows: &[String]) -> Value {
    let values = cells
        .iter()
        .filter(|c| rows.contains(&c.cell.ifp_id_x))
        .map(|c| {
            json!({
                "ifp_id_x": c.cell.ifp_id_x,
                "ifp_id_y": c.cell.ifp_id_y,
                "corr": c.cell.corr,
                "r2": c.cell.r2,
                "n_users": c.cell.n_users,
                "rank": c.rank,
            })
        })
        .collect();
    let encoding = json!({
        "x": { "field": "rank", "type": "ordinal", "title": "rank by r²" },
        "y": { "field": "ifp_id_x", "type": "ordinal", "sort": rows, "title": null },
    });
    super::spec(
        title,
        values,
        json!({
            "encoding": encoding,
            "layer": [
                {
                    "mark": "rect",
                    "encoding": {
                        "color": corr_color(),
                        "tooltip": [
                            { "field": "ifp_id_x" },
                            { "field": "ifp_id_y" },
                            { "field": "corr", "format": "+.3f" },
                            { "field": "n_users" },
                        ],
                    },
                },
                {
                    "mark": { "type": "text", "fontSize": 9 },
                    "encoding": { "text": { "field": "ifp_id_y" } },
                },
            ],
        }),
    )
}
