use crate::types::summary::RunSummary;

pub fn to_markdown(summary: &RunSummary) -> String {
    let mut output = String::new();
    output.push_str("# Misrank Summary\n\n");
    output.push_str(&format!(
        "- input rows: {}\n- rows scored: {}\n- rows dropped (missing anchor): {}\n\n",
        summary.input_rows, summary.rows_scored, summary.rows_dropped_missing_anchor
    ));

    output.push_str("## Normalization\n\n");
    if summary.columns_normalized.is_empty() {
        output.push_str("- no columns normalized\n");
    } else {
        output.push_str(&format!(
            "- normalized: {}\n",
            summary.columns_normalized.join(", ")
        ));
    }
    if !summary.columns_skipped.is_empty() {
        output.push_str(&format!(
            "- left unchanged: {}\n",
            summary.columns_skipped.join(", ")
        ));
    }
    output.push('\n');

    output.push_str("## Warnings\n\n");
    if summary.warnings.is_empty() {
        output.push_str("- none\n");
    } else {
        for warning in &summary.warnings {
            output.push_str(&format!("- {warning}\n"));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_summary_contains_sections() {
        let mut summary = RunSummary::new();
        summary.input_rows = 4;
        summary.rows_scored = 2;
        summary.rows_dropped_missing_anchor = 2;
        summary.columns_normalized = vec!["sift".to_string()];
        summary.warn("column cadd left unnormalized (empty or zero maximum)");

        let rendered = to_markdown(&summary);
        assert!(rendered.contains("# Misrank Summary"));
        assert!(rendered.contains("## Normalization"));
        assert!(rendered.contains("- normalized: sift"));
        assert!(rendered.contains("## Warnings"));
        assert!(rendered.contains("cadd"));
    }
}
