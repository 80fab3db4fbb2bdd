//! Rule cascade that turns one student's scores into feedback.
//!
//! Rules live in ordered groups. Within a group the first rule whose
//! predicate holds fires and the rest of the group is skipped; groups are
//! independent of each other. Every fired rule contributes one label, one
//! feedback line and one guidance line, in evaluation order.

use serde::Serialize;

use crate::models::StudentRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Excellent,
    VeryGood,
    Good,
    Average,
    NeedsImprovement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improvement,
    Regression,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Consistency {
    /// Continuous assessment is strong but a written score lags.
    WrittenLagging,
    /// Written scores are strong but continuous assessment lags.
    EngagementLagging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "group", content = "label", rename_all = "snake_case")]
pub enum RuleLabel {
    Level(Level),
    Trend(Trend),
    Consistency(Consistency),
}

pub struct Rule {
    pub label: RuleLabel,
    pub applies: fn(&StudentRecord) -> bool,
    pub feedback: fn(&StudentRecord) -> String,
    pub guidance: &'static str,
}

pub struct RuleGroup {
    pub name: &'static str,
    pub rules: &'static [Rule],
}

impl RuleGroup {
    pub fn first_match(&self, record: &StudentRecord) -> Option<&Rule> {
        self.rules.iter().find(|rule| (rule.applies)(record))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedbackBundle {
    pub labels: Vec<RuleLabel>,
    pub feedback: Vec<String>,
    pub guidance: Vec<String>,
}

impl FeedbackBundle {
    pub fn level(&self) -> Option<Level> {
        self.labels.iter().find_map(|label| match label {
            RuleLabel::Level(level) => Some(*level),
            _ => None,
        })
    }

    pub fn trend(&self) -> Option<Trend> {
        self.labels.iter().find_map(|label| match label {
            RuleLabel::Trend(trend) => Some(*trend),
            _ => None,
        })
    }

    pub fn consistency(&self) -> Option<Consistency> {
        self.labels.iter().find_map(|label| match label {
            RuleLabel::Consistency(note) => Some(*note),
            _ => None,
        })
    }

    pub fn feedback_text(&self) -> String {
        self.feedback.join("\n\n")
    }

    pub fn guidance_text(&self) -> String {
        self.guidance.join("\n\n")
    }
}

pub fn evaluate(record: &StudentRecord) -> FeedbackBundle {
    evaluate_with(RULE_GROUPS, record)
}

pub fn evaluate_with(groups: &[RuleGroup], record: &StudentRecord) -> FeedbackBundle {
    let mut bundle = FeedbackBundle::default();
    for group in groups {
        if let Some(rule) = group.first_match(record) {
            tracing::trace!(group = group.name, label = ?rule.label, "rule fired");
            bundle.labels.push(rule.label);
            bundle.feedback.push((rule.feedback)(record));
            bundle.guidance.push(rule.guidance.to_string());
        }
    }
    bundle
}

pub static RULE_GROUPS: &[RuleGroup] = &[
    RuleGroup {
        name: "level",
        rules: LEVEL_RULES,
    },
    RuleGroup {
        name: "trend",
        rules: TREND_RULES,
    },
    RuleGroup {
        name: "consistency",
        rules: CONSISTENCY_RULES,
    },
];

const LEVEL_RULES: &[Rule] = &[
    Rule {
        label: RuleLabel::Level(Level::Excellent),
        applies: |r| r.average >= 18.0,
        feedback: |r| {
            format!(
                "**أداء ممتاز جداً!** معدلك العام ({:.2}) يعكس تفوقك واجتهادك الكبير في المادة. استمر على هذا المنوال الرائع.",
                r.average
            )
        },
        guidance: "حافظ على هذا المستوى العالي بالمراجعة المستمرة وحل تمارين إضافية لتوسيع معرفتك.",
    },
    Rule {
        label: RuleLabel::Level(Level::VeryGood),
        applies: |r| r.average >= 15.0,
        feedback: |r| {
            format!(
                "**أداء جيد جداً.** معدلك العام ({:.2}) يظهر فهماً جيداً للمادة وقدرة على تحقيق نتائج مميزة.",
                r.average
            )
        },
        guidance: "ركز على نقاط القوة لديك وحاول تحسين الجوانب التي تجد فيها بعض الصعوبة من خلال التمارين الإضافية.",
    },
    Rule {
        label: RuleLabel::Level(Level::Good),
        applies: |r| r.average >= 12.0,
        feedback: |r| {
            format!(
                "**أداء جيد.** معدلك العام ({:.2}) مقبول، وهناك مجال للتحسن والتطور.",
                r.average
            )
        },
        guidance: "راجع الدروس بانتظام، ولا تتردد في طلب المساعدة من الأستاذ أو الزملاء في النقاط غير الواضحة.",
    },
    Rule {
        label: RuleLabel::Level(Level::Average),
        applies: |r| r.average >= 10.0,
        feedback: |r| {
            format!(
                "**أداء متوسط.** معدلك العام ({:.2}) يتطلب المزيد من الجهد والمثابرة.",
                r.average
            )
        },
        guidance: "ضع خطة مراجعة منظمة، وركز على فهم المفاهيم الأساسية وحل التمارين بشكل مكثف.",
    },
    Rule {
        label: RuleLabel::Level(Level::NeedsImprovement),
        applies: |_| true,
        feedback: |r| {
            format!(
                "**الأداء بحاجة إلى تحسين.** معدلك العام ({:.2}) يشير إلى وجود صعوبات في المادة.",
                r.average
            )
        },
        guidance: "من الضروري تكثيف الجهود، والمراجعة الدقيقة للدروس، وطلب الدعم الفوري من الأستاذ لفهم النقاط الصعبة.",
    },
];

const TREND_RULES: &[Rule] = &[
    Rule {
        label: RuleLabel::Trend(Trend::Improvement),
        applies: |r| r.exam > r.assignment,
        feedback: |r| {
            format!(
                "**تطور ملحوظ!** نلاحظ تحسناً في أدائك بين الفرض ({:.2}) والاختبار ({:.2}) بنسبة تطور {:.1}%. هذا يدل على استيعابك للملاحظات وجهدك الإضافي.",
                r.assignment,
                r.exam,
                r.progress_percent()
            )
        },
        guidance: "استمر في هذا التطور الإيجابي وحافظ على وتيرة المراجعة.",
    },
    Rule {
        label: RuleLabel::Trend(Trend::Regression),
        applies: |r| r.exam < r.assignment,
        feedback: |r| {
            format!(
                "**تراجع في الأداء.** نلاحظ انخفاضاً في العلامة بين الفرض ({:.2}) والاختبار ({:.2}) بنسبة تطور {:.1}%.",
                r.assignment,
                r.exam,
                r.progress_percent()
            )
        },
        guidance: "راجع أخطاءك في الاختبار وحاول فهم أسباب التراجع. قد تحتاج إلى تغيير طريقة المراجعة أو تكثيف الجهد قبل الاختبارات القادمة.",
    },
    Rule {
        label: RuleLabel::Trend(Trend::Stable),
        applies: |_| true,
        feedback: |r| {
            format!(
                "**أداء مستقر** بين الفرض ({:.2}) والاختبار ({:.2}).",
                r.assignment, r.exam
            )
        },
        guidance: "حافظ على هذا الاستقرار مع السعي نحو التحسين المستمر.",
    },
];

const CONSISTENCY_RULES: &[Rule] = &[
    Rule {
        label: RuleLabel::Consistency(Consistency::WrittenLagging),
        applies: |r| r.continuous_assessment >= 15.0 && (r.assignment < 12.0 || r.exam < 12.0),
        feedback: |_| {
            "**ملاحظة هامة:** علامتك في التقويم المستمر جيدة، لكن هناك تراجع في الفرض أو الاختبار."
                .to_string()
        },
        guidance: "قد يشير هذا إلى أن المشاركة والتفاعل في القسم جيدان، لكن هناك حاجة لتركيز أكبر أثناء المراجعة للامتحانات الكتابية. تأكد من فهم الأسئلة جيداً قبل الإجابة.",
    },
    Rule {
        label: RuleLabel::Consistency(Consistency::EngagementLagging),
        applies: |r| r.continuous_assessment < 12.0 && (r.assignment >= 15.0 || r.exam >= 15.0),
        feedback: |_| {
            "**ملاحظة هامة:** أداؤك في الفروض أو الاختبارات جيد، لكن علامة التقويم المستمر أقل من المتوقع."
                .to_string()
        },
        guidance: "حاول زيادة المشاركة والتفاعل في القسم، وإنجاز الواجبات المطلوبة في وقتها لتحسين علامة التقويم.",
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_record;

    fn count(bundle: &FeedbackBundle, group: fn(&RuleLabel) -> bool) -> usize {
        bundle.labels.iter().filter(|label| group(label)).count()
    }

    #[test]
    fn top_student_is_excellent_and_stable() {
        let record = sample_record("Test A", 19.0, 20.0, 20.0, 19.2);
        let bundle = evaluate(&record);
        assert_eq!(bundle.level(), Some(Level::Excellent));
        assert_eq!(bundle.trend(), Some(Trend::Stable));
        assert_eq!(bundle.consistency(), None);
        assert_eq!(bundle.feedback.len(), 2);
        assert!(bundle.feedback[0].contains("19.20"));
        assert!(bundle.feedback[1].contains("20.00"));
    }

    #[test]
    fn struggling_student_gets_written_lagging_note() {
        let record = sample_record("Test B", 16.0, 10.0, 9.0, 9.5);
        let bundle = evaluate(&record);
        assert_eq!(bundle.level(), Some(Level::NeedsImprovement));
        assert_eq!(bundle.trend(), Some(Trend::Regression));
        assert_eq!(bundle.consistency(), Some(Consistency::WrittenLagging));
        assert_eq!(bundle.feedback.len(), 3);
        assert_eq!(bundle.guidance.len(), 3);
        assert!(bundle.feedback[1].contains("-10.0%"));
    }

    #[test]
    fn engagement_lagging_note() {
        let record = sample_record("Test C", 8.0, 16.0, 17.0, 14.0);
        let bundle = evaluate(&record);
        assert_eq!(bundle.consistency(), Some(Consistency::EngagementLagging));
        assert_eq!(bundle.level(), Some(Level::Good));
        assert_eq!(bundle.trend(), Some(Trend::Improvement));
    }

    #[test]
    fn ladder_boundaries_are_inclusive() {
        let cases = [
            (18.0, Level::Excellent),
            (17.99, Level::VeryGood),
            (15.0, Level::VeryGood),
            (14.99, Level::Good),
            (12.0, Level::Good),
            (11.99, Level::Average),
            (10.0, Level::Average),
            (9.99, Level::NeedsImprovement),
            (0.0, Level::NeedsImprovement),
        ];
        for (average, expected) in cases {
            let bundle = evaluate(&sample_record("x", 13.0, 13.0, 13.0, average));
            assert_eq!(bundle.level(), Some(expected), "average {average}");
        }
    }

    #[test]
    fn zero_assignment_reports_zero_percent() {
        let bundle = evaluate(&sample_record("x", 13.0, 0.0, 5.0, 6.0));
        assert_eq!(bundle.trend(), Some(Trend::Improvement));
        assert!(bundle.feedback[1].contains("0.0%"));
    }

    #[test]
    fn each_group_fires_at_most_once() {
        let mut scores = Vec::new();
        for a in [0.0, 9.0, 11.99, 12.0, 14.5, 15.0, 18.0, 20.0] {
            for b in [0.0, 11.0, 12.0, 15.0, 20.0] {
                scores.push(sample_record("x", a, b, a, b));
                scores.push(sample_record("x", b, a, b, a));
            }
        }
        for record in &scores {
            let bundle = evaluate(record);
            assert_eq!(count(&bundle, |l| matches!(l, RuleLabel::Level(_))), 1);
            assert_eq!(count(&bundle, |l| matches!(l, RuleLabel::Trend(_))), 1);
            assert!(count(&bundle, |l| matches!(l, RuleLabel::Consistency(_))) <= 1);
            assert_eq!(bundle.labels.len(), bundle.feedback.len());
            assert_eq!(bundle.feedback.len(), bundle.guidance.len());
        }
    }

    #[test]
    fn custom_groups_extend_the_cascade() {
        static PERFECT: &[Rule] = &[Rule {
            label: RuleLabel::Level(Level::Excellent),
            applies: |r| r.exam >= 20.0,
            feedback: |_| "perfect exam".to_string(),
            guidance: "keep going",
        }];
        let groups = [RuleGroup {
            name: "perfect",
            rules: PERFECT,
        }];
        let bundle = evaluate_with(&groups, &sample_record("x", 20.0, 20.0, 20.0, 20.0));
        assert_eq!(bundle.feedback, vec!["perfect exam".to_string()]);

        let bundle = evaluate_with(&groups, &sample_record("x", 20.0, 20.0, 19.0, 20.0));
        assert!(bundle.labels.is_empty());
    }

    #[test]
    fn joined_text_uses_blank_lines() {
        let bundle = evaluate(&sample_record("x", 16.0, 10.0, 9.0, 9.5));
        assert_eq!(bundle.feedback_text().matches("\n\n").count(), 2);
        assert_eq!(bundle.guidance_text().matches("\n\n").count(), 2);
    }
}
