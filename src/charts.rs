use serde::Serialize;

use crate::models::{StudentRecord, MAX_SCORE};

pub const EVALUATION: &str = "التقويم";
pub const ASSIGNMENT: &str = "الفرض";
pub const EXAM: &str = "الإختبار";
pub const AVERAGE: &str = "المعدل";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: &'static str,
    pub labels: Vec<&'static str>,
    pub values: Vec<f64>,
    pub text: Vec<String>,
    pub y_range: (f64, f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarChart {
    pub title: &'static str,
    pub axes: Vec<&'static str>,
    pub values: Vec<f64>,
    pub range: (f64, f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Green,
    Red,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressChart {
    pub title: &'static str,
    pub labels: Vec<&'static str>,
    pub values: Vec<f64>,
    pub progress_percent: f64,
    pub color: Direction,
    pub annotation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: &'static str,
    pub value: f64,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub title: &'static str,
    pub slices: Vec<PieSlice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSet {
    pub comparison: BarChart,
    pub radar: RadarChart,
    pub progress: ProgressChart,
    pub distribution: PieChart,
}

pub fn charts(record: &StudentRecord) -> ChartSet {
    ChartSet {
        comparison: comparison_chart(record),
        radar: radar_chart(record),
        progress: progress_chart(record),
        distribution: distribution_chart(record),
    }
}

fn comparison_chart(record: &StudentRecord) -> BarChart {
    let values = vec![
        record.continuous_assessment,
        record.assignment,
        record.exam,
        record.average,
    ];
    BarChart {
        title: "مقارنة النقاط في مختلف التقييمات",
        labels: vec![EVALUATION, ASSIGNMENT, EXAM, AVERAGE],
        text: values.iter().map(|value| format!("{value:.2}")).collect(),
        values,
        y_range: (0.0, MAX_SCORE),
    }
}

fn radar_chart(record: &StudentRecord) -> RadarChart {
    RadarChart {
        title: "تحليل نقاط القوة والضعف",
        axes: vec![EVALUATION, ASSIGNMENT, EXAM],
        values: vec![record.continuous_assessment, record.assignment, record.exam],
        range: (0.0, MAX_SCORE),
    }
}

fn progress_chart(record: &StudentRecord) -> ProgressChart {
    let progress = record.progress_percent();
    let annotation = if progress != 0.0 {
        format!("نسبة التطور: {progress:.1}%")
    } else {
        "لا يوجد تغيير".to_string()
    };
    ProgressChart {
        title: "تطور الأداء بين الفرض والإختبار",
        labels: vec![ASSIGNMENT, EXAM],
        values: vec![record.assignment, record.exam],
        progress_percent: progress,
        color: if progress >= 0.0 {
            Direction::Green
        } else {
            Direction::Red
        },
        annotation,
    }
}

fn distribution_chart(record: &StudentRecord) -> PieChart {
    let parts = [
        (EVALUATION, record.continuous_assessment),
        (ASSIGNMENT, record.assignment),
        (EXAM, record.exam),
    ];
    let total: f64 = parts.iter().map(|(_, value)| value).sum();
    PieChart {
        title: "توزيع النقاط حسب نوع التقييم",
        slices: parts
            .into_iter()
            .map(|(label, value)| PieSlice {
                label,
                value,
                share: if total > 0.0 { value / total } else { 0.0 },
            })
            .collect(),
    }
}
