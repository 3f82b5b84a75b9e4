#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use serde::Serialize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Panel, Style, Width, object::Rows},
};

use super::{criterion::CriteriaPath, evaluate::Grade};

#[derive(Tabled, Serialize, Clone, Debug, PartialEq)]
/// One node of an evaluated grade, flattened for display or export.
pub struct AuditRow {
    #[tabled(rename = "Criterion")]
    /// * `path`: path of the node from the root
    pub path:    String,
    #[tabled(rename = "Weight")]
    /// * `weight`: weight given by the parent, empty for the root
    pub weight:  String,
    #[tabled(rename = "Points")]
    /// * `points`: resulting points of the node
    pub points:  String,
    #[tabled(rename = "Comment")]
    /// * `comment`: comment attached to the node's mark
    pub comment: String,
}

/// Flattens `grade` depth first, parents before their children.
pub fn audit_rows(grade: &Grade) -> Vec<AuditRow> {
    let mut rows = Vec::new();
    collect(grade, &CriteriaPath::ROOT, None, &mut rows);
    rows
}

/// Appends the rows of `grade` and its descendants to `rows`.
fn collect(grade: &Grade, path: &CriteriaPath, weight: Option<f64>, rows: &mut Vec<AuditRow>) {
    rows.push(AuditRow {
        path:    if path.is_root() {
            "(total)".to_string()
        } else {
            path.to_string()
        },
        weight:  weight.map(|w| format!("{w:.3}")).unwrap_or_default(),
        points:  format!("{:.3}", grade.points()),
        comment: grade.mark().comment().to_string(),
    });
    if let Some(sub_grades) = grade.sub_grades() {
        for (criterion, sub) in sub_grades.iter() {
            collect(
                &sub.grade,
                &path.with_suffix(criterion.clone()),
                Some(sub.weight),
                rows,
            );
        }
    }
}

/// Renders `grade` as a table, one row per node, with the total in the
/// footer.
pub fn audit_table(grade: &Grade, title: &str) -> String {
    Table::new(audit_rows(grade))
        .with(Panel::header(title))
        .with(Panel::footer(format!("Total: {:.2}", grade.points())))
        .with(Modify::new(Rows::new(1..)).with(Width::wrap(40).keep_words(true)))
        .with(
            Modify::new(Rows::first())
                .with(Alignment::center())
                .with(Alignment::center_vertical()),
        )
        .with(
            Modify::new(Rows::last())
                .with(Alignment::center())
                .with(Alignment::center_vertical()),
        )
        .with(Style::modern())
        .to_string()
}
