use crate::config::GradingConfig;

/// 分数段，按从高到低排列
pub const SCORE_BUCKETS: [&str; 5] = ["90-100", "80-89", "70-79", "60-69", "0-59"];

/// 五分制换算阈值（百分比）
#[derive(Debug, Clone, PartialEq)]
pub struct GradeScale {
    pub excellent: f64,
    pub good: f64,
    pub pass: f64,
}

impl Default for GradeScale {
    fn default() -> Self {
        Self {
            excellent: 85.0,
            good: 70.0,
            pass: 50.0,
        }
    }
}

impl From<&GradingConfig> for GradeScale {
    fn from(config: &GradingConfig) -> Self {
        Self {
            excellent: config.grade_excellent,
            good: config.grade_good,
            pass: config.grade_pass,
        }
    }
}

impl GradeScale {
    pub fn grade(&self, percentage: f64) -> i32 {
        if percentage >= self.excellent {
            5
        } else if percentage >= self.good {
            4
        } else if percentage >= self.pass {
            3
        } else {
            2
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSummary {
    pub score: i32,
    pub max_score: i32,
    pub percentage: f64,
    pub grade: i32,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 得分百分比，保留两位小数；满分为 0 时返回 0
pub fn percentage(score: i32, max_score: i32) -> f64 {
    if max_score <= 0 {
        return 0.0;
    }
    round2(score as f64 / max_score as f64 * 100.0)
}

/// 按 i64 累加后收敛到 i32 范围
fn clamped_sum(values: impl IntoIterator<Item = i32>) -> i32 {
    let total: i64 = values.into_iter().map(i64::from).sum();
    total.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// 汇总一次作答：得分取已答题目之和，满分取测试全部题目之和
pub fn summarize(
    points_earned: impl IntoIterator<Item = i32>,
    question_points: impl IntoIterator<Item = i32>,
    scale: &GradeScale,
) -> ScoreSummary {
    let score = clamped_sum(points_earned);
    let max_score = clamped_sum(question_points);
    let percentage = percentage(score, max_score);

    ScoreSummary {
        score,
        max_score,
        percentage,
        grade: scale.grade(percentage),
    }
}

pub fn score_bucket(percentage: f64) -> &'static str {
    match percentage {
        p if p >= 90.0 => SCORE_BUCKETS[0],
        p if p >= 80.0 => SCORE_BUCKETS[1],
        p if p >= 70.0 => SCORE_BUCKETS[2],
        p if p >= 60.0 => SCORE_BUCKETS[3],
        _ => SCORE_BUCKETS[4],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(2, 3), 66.67);
        assert_eq!(percentage(5, 5), 100.0);
    }

    #[test]
    fn test_percentage_zero_max() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(3, 0), 0.0);
    }

    #[test]
    fn test_grade_thresholds() {
        let scale = GradeScale::default();
        assert_eq!(scale.grade(100.0), 5);
        assert_eq!(scale.grade(85.0), 5);
        assert_eq!(scale.grade(84.99), 4);
        assert_eq!(scale.grade(70.0), 4);
        assert_eq!(scale.grade(69.99), 3);
        assert_eq!(scale.grade(50.0), 3);
        assert_eq!(scale.grade(49.99), 2);
        assert_eq!(scale.grade(0.0), 2);
    }

    #[test]
    fn test_summarize_counts_unanswered_in_max() {
        // 4 道题，每题 2 分，只答对 3 道
        let summary = summarize([2, 2, 0, 2], [2, 2, 2, 2], &GradeScale::default());
        assert_eq!(summary.score, 6);
        assert_eq!(summary.max_score, 8);
        assert_eq!(summary.percentage, 75.0);
        assert_eq!(summary.grade, 4);

        let unanswered = summarize([], [1, 1], &GradeScale::default());
        assert_eq!(unanswered.score, 0);
        assert_eq!(unanswered.percentage, 0.0);
        assert_eq!(unanswered.grade, 2);
    }

    #[test]
    fn test_summarize_large_points_do_not_wrap() {
        let summary = summarize([i32::MAX, 1], [i32::MAX, 1], &GradeScale::default());
        assert_eq!(summary.score, i32::MAX);
        assert_eq!(summary.max_score, i32::MAX);
        assert_eq!(summary.percentage, 100.0);
        assert_eq!(summary.grade, 5);
    }

    #[test]
    fn test_score_buckets() {
        assert_eq!(score_bucket(100.0), "90-100");
        assert_eq!(score_bucket(89.99), "80-89");
        assert_eq!(score_bucket(70.0), "70-79");
        assert_eq!(score_bucket(60.5), "60-69");
        assert_eq!(score_bucket(12.0), "0-59");
    }
}
