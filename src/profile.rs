//! Detailed guidance sheet: level, strengths, weaknesses, recommendations
//! and ethical guidance. Unlike the feedback cascade, every hint here is
//! independent and all applicable hints are kept.

use serde::Serialize;

use crate::models::StudentRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceLevel {
    Excellent,
    VeryGood,
    Good,
    Fair,
    Passing,
    Weak,
}

impl PerformanceLevel {
    pub fn from_average(average: f64) -> Self {
        match average {
            a if a >= 18.0 => Self::Excellent,
            a if a >= 16.0 => Self::VeryGood,
            a if a >= 14.0 => Self::Good,
            a if a >= 12.0 => Self::Fair,
            a if a >= 10.0 => Self::Passing,
            _ => Self::Weak,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "ممتاز",
            Self::VeryGood => "جيد جداً",
            Self::Good => "جيد",
            Self::Fair => "متوسط",
            Self::Passing => "مقبول",
            Self::Weak => "ضعيف",
        }
    }
}

struct Hint {
    applies: fn(&StudentRecord) -> bool,
    lines: &'static [&'static str],
}

fn collect(hints: &[Hint], record: &StudentRecord) -> Vec<String> {
    hints
        .iter()
        .filter(|hint| (hint.applies)(record))
        .flat_map(|hint| hint.lines.iter().map(|line| line.to_string()))
        .collect()
}

/// First hint that applies, for fallbacks that must pick one line set.
fn first(hints: &[Hint], record: &StudentRecord) -> Vec<String> {
    hints
        .iter()
        .find(|hint| (hint.applies)(record))
        .map(|hint| hint.lines.iter().map(|line| line.to_string()).collect())
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuidanceProfile {
    pub level: PerformanceLevel,
    pub progress_percent: f64,
    pub personal_message: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
    pub ethical_guidance: Vec<String>,
}

pub fn profile(record: &StudentRecord) -> GuidanceProfile {
    let level = PerformanceLevel::from_average(record.average);
    let progress = record.progress_percent();

    let mut strengths = collect(STRENGTHS, record);
    if strengths.is_empty() {
        strengths = first(STRENGTH_FALLBACK, record);
    }

    let mut weaknesses = collect(WEAKNESSES, record);
    if weaknesses.is_empty() && record.average < 10.0 {
        weaknesses.push("مستوى عام ضعيف في المادة".to_string());
    }

    let mut recommendations = collect(RECOMMENDATIONS, record);
    recommendations.extend(first(OVERALL_RECOMMENDATIONS, record));

    let mut ethical_guidance = first(ETHICS_BY_LEVEL, record);
    ethical_guidance.extend(COMMON_ETHICS.iter().map(|line| line.to_string()));

    GuidanceProfile {
        level,
        progress_percent: progress,
        personal_message: personal_message(&record.name, level, progress),
        strengths,
        weaknesses,
        recommendations,
        ethical_guidance,
    }
}

fn personal_message(name: &str, level: PerformanceLevel, progress: f64) -> String {
    let mut message = format!(
        "عزيزي الطالب {name}، أداؤك العام في مادة الذكاء الاصطناعي {}.",
        level.as_str()
    );
    if progress > 0.0 {
        message.push_str(&format!(
            " لقد أظهرت تطوراً إيجابياً بنسبة {progress:.1}% بين الفرض والاختبار، وهذا يدل على جهدك واهتمامك."
        ));
    } else if progress < 0.0 {
        message.push_str(&format!(
            " لوحظ تراجع بنسبة {:.1}% بين الفرض والاختبار، مما يستدعي مراجعة أسلوب الدراسة.",
            progress.abs()
        ));
    } else {
        message.push_str(" لقد حافظت على مستوى ثابت بين الفرض والاختبار.");
    }
    message
}

static STRENGTHS: &[Hint] = &[
    Hint {
        applies: |r| r.continuous_assessment >= 16.0,
        lines: &["أداء ممتاز في التقويم المستمر"],
    },
    Hint {
        applies: |r| r.assignment >= 16.0,
        lines: &["أداء ممتاز في الفرض"],
    },
    Hint {
        applies: |r| r.exam >= 16.0,
        lines: &["أداء ممتاز في الاختبار"],
    },
    Hint {
        applies: |r| r.progress_percent() > 10.0,
        lines: &["تطور ملحوظ بين الفرض والاختبار"],
    },
];

static STRENGTH_FALLBACK: &[Hint] = &[
    Hint {
        applies: |r| r.average >= 14.0,
        lines: &["مستوى عام جيد في المادة"],
    },
    Hint {
        applies: |r| r.average >= 10.0,
        lines: &["اجتياز المادة بنجاح"],
    },
];

static WEAKNESSES: &[Hint] = &[
    Hint {
        applies: |r| r.continuous_assessment < 10.0,
        lines: &["ضعف في التقويم المستمر"],
    },
    Hint {
        applies: |r| r.assignment < 10.0,
        lines: &["ضعف في الفرض"],
    },
    Hint {
        applies: |r| r.exam < 10.0,
        lines: &["ضعف في الاختبار"],
    },
    Hint {
        applies: |r| r.progress_percent() < -10.0,
        lines: &["تراجع في المستوى بين الفرض والاختبار"],
    },
];

static RECOMMENDATIONS: &[Hint] = &[
    Hint {
        applies: |r| r.continuous_assessment < 12.0,
        lines: &[
            "زيادة المشاركة في الأنشطة الصفية والتفاعل مع المعلم",
            "الالتزام بحضور جميع الحصص وتقديم الواجبات في موعدها",
        ],
    },
    Hint {
        applies: |r| r.assignment < 12.0,
        lines: &[
            "تخصيص وقت أكبر للمراجعة قبل الفروض",
            "حل تمارين إضافية لتعزيز فهم المفاهيم الأساسية",
        ],
    },
    Hint {
        applies: |r| r.exam < 12.0,
        lines: &[
            "تطوير استراتيجية أفضل للمذاكرة قبل الاختبارات",
            "التركيز على فهم المفاهيم بدلاً من الحفظ",
        ],
    },
    Hint {
        applies: |r| r.progress_percent() < 0.0,
        lines: &[
            "مراجعة أسباب التراجع في المستوى بين الفرض والاختبار",
            "طلب المساعدة من المعلم لتحديد نقاط الضعف وكيفية معالجتها",
        ],
    },
];

static OVERALL_RECOMMENDATIONS: &[Hint] = &[
    Hint {
        applies: |r| r.average < 10.0,
        lines: &[
            "حضور حصص تقوية إضافية",
            "تكوين مجموعة دراسة مع زملاء متفوقين",
        ],
    },
    Hint {
        applies: |r| r.average < 14.0,
        lines: &["الاستمرار في العمل الجاد مع التركيز على تحسين نقاط الضعف"],
    },
    Hint {
        applies: |_| true,
        lines: &["الحفاظ على المستوى الجيد والسعي للتميز"],
    },
];

static ETHICS_BY_LEVEL: &[Hint] = &[
    Hint {
        applies: |r| {
            matches!(
                PerformanceLevel::from_average(r.average),
                PerformanceLevel::Excellent | PerformanceLevel::VeryGood
            )
        },
        lines: &[
            "مساعدة الزملاء الذين يواجهون صعوبات في المادة",
            "المشاركة في الأنشطة التطوعية لنشر المعرفة في مجال الذكاء الاصطناعي",
            "الالتزام بأخلاقيات استخدام التكنولوجيا والذكاء الاصطناعي",
        ],
    },
    Hint {
        applies: |r| {
            matches!(
                PerformanceLevel::from_average(r.average),
                PerformanceLevel::Good | PerformanceLevel::Fair
            )
        },
        lines: &[
            "تبني روح المثابرة والتعلم المستمر",
            "التعاون مع الزملاء في مجموعات دراسية لتبادل المعرفة",
            "الاهتمام بالجوانب الأخلاقية للذكاء الاصطناعي وتطبيقاته",
        ],
    },
    Hint {
        applies: |_| true,
        lines: &[
            "عدم الاستسلام للصعوبات والإيمان بالقدرة على التحسن",
            "طلب المساعدة من المعلمين والزملاء دون تردد",
            "التركيز على فهم المفاهيم الأساسية قبل الانتقال للمتقدمة",
        ],
    },
];

static COMMON_ETHICS: &[&str] = &[
    "الالتزام بالأمانة العلمية وتجنب الغش في الاختبارات",
    "تطوير مهارات التفكير النقدي والإبداعي في استخدام التكنولوجيا",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_record;

    #[test]
    fn levels_follow_six_tiers() {
        assert_eq!(PerformanceLevel::from_average(18.0), PerformanceLevel::Excellent);
        assert_eq!(PerformanceLevel::from_average(16.0), PerformanceLevel::VeryGood);
        assert_eq!(PerformanceLevel::from_average(15.99), PerformanceLevel::Good);
        assert_eq!(PerformanceLevel::from_average(12.5), PerformanceLevel::Fair);
        assert_eq!(PerformanceLevel::from_average(10.0), PerformanceLevel::Passing);
        assert_eq!(PerformanceLevel::from_average(9.0), PerformanceLevel::Weak);
    }

    #[test]
    fn strong_student_profile() {
        let record = sample_record("Amina", 17.0, 16.0, 18.0, 17.5);
        let sheet = profile(&record);
        assert_eq!(sheet.level, PerformanceLevel::VeryGood);
        assert_eq!(sheet.strengths.len(), 4);
        assert!(sheet.weaknesses.is_empty());
        assert_eq!(sheet.recommendations, vec!["الحفاظ على المستوى الجيد والسعي للتميز"]);
        assert_eq!(sheet.ethical_guidance.len(), 5);
        assert!(sheet.personal_message.contains("Amina"));
        assert!(sheet.personal_message.contains("12.5%"));
    }

    #[test]
    fn weak_student_profile() {
        let record = sample_record("Yacine", 8.0, 11.0, 7.0, 8.5);
        let sheet = profile(&record);
        assert_eq!(sheet.level, PerformanceLevel::Weak);
        assert!(sheet.strengths.is_empty());
        assert_eq!(sheet.weaknesses.len(), 3);
        // evaluation, assignment, exam, regression, then the weak-average pair
        assert_eq!(sheet.recommendations.len(), 10);
        assert!(sheet.personal_message.contains("36.4%"));
    }

    #[test]
    fn fallback_strength_and_weakness() {
        let passing = profile(&sample_record("x", 12.0, 12.0, 12.0, 11.0));
        assert_eq!(passing.strengths, vec!["اجتياز المادة بنجاح"]);
        assert!(passing.weaknesses.is_empty());

        let low = profile(&sample_record("x", 10.0, 10.0, 10.0, 9.0));
        assert!(low.strengths.is_empty());
        assert_eq!(low.weaknesses, vec!["مستوى عام ضعيف في المادة"]);
    }

    #[test]
    fn steady_scores_mention_stability() {
        let sheet = profile(&sample_record("x", 14.0, 14.0, 14.0, 14.0));
        assert_eq!(sheet.progress_percent, 0.0);
        assert!(sheet.personal_message.contains("مستوى ثابت"));
    }
}
