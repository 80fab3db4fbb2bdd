use std::fmt::Write;

use chrono::NaiveDate;

use crate::charts::{self, ChartSet};
use crate::feedback::{self, FeedbackBundle};
use crate::models::MatchResult;

pub fn build_report(section: &str, generated_on: NaiveDate, found: &MatchResult<'_>) -> String {
    let record = found.record;
    let bundle = feedback::evaluate(record);
    let chart_set = charts::charts(record);

    let mut output = String::new();

    let _ = writeln!(output, "# نتائج التلميذ: {}", record.name);
    let _ = writeln!(
        output,
        "القسم: {} (تطابق بنسبة {}%، بتاريخ {})",
        section, found.confidence, generated_on
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## النتائج الكاملة");
    let _ = writeln!(
        output,
        "| {} | {} | {} | {} |",
        charts::EVALUATION,
        charts::ASSIGNMENT,
        charts::EXAM,
        charts::AVERAGE
    );
    let _ = writeln!(output, "|---|---|---|---|");
    let _ = writeln!(
        output,
        "| {:.2} | {:.2} | {:.2} | {:.2} |",
        record.continuous_assessment, record.assignment, record.exam, record.average
    );

    write_progress(&mut output, &chart_set);
    write_feedback(&mut output, &bundle);

    output
}

fn write_progress(output: &mut String, chart_set: &ChartSet) {
    let _ = writeln!(output);
    let _ = writeln!(output, "## تطور النتائج (الفرض مقابل الاختبار)");
    let progress = &chart_set.progress;
    for (label, value) in progress.labels.iter().zip(&progress.values) {
        let _ = writeln!(output, "- {label}: {value:.2}");
    }
    let _ = writeln!(output, "- {}", progress.annotation);

    let _ = writeln!(output);
    let _ = writeln!(output, "## {}", chart_set.distribution.title);
    for slice in &chart_set.distribution.slices {
        let _ = writeln!(
            output,
            "- {}: {:.2} ({:.1}%)",
            slice.label,
            slice.value,
            slice.share * 100.0
        );
    }
}

fn write_feedback(output: &mut String, bundle: &FeedbackBundle) {
    let _ = writeln!(output);
    let _ = writeln!(output, "## ملاحظات");
    for line in &bundle.feedback {
        let _ = writeln!(output, "- {line}");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## توجيهات");
    for line in &bundle.guidance {
        let _ = writeln!(output, "- {line}");
    }
}
