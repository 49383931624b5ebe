//! 统计聚合，纯函数

use std::collections::{BTreeMap, HashMap};

use crate::grading::scoring::{SCORE_BUCKETS, round2, score_bucket};
use crate::models::analytics::responses::{
    GradeCount, QuestionStatRow, ScoreRange, StudentTestRow, WrongAnswerCount,
};
use crate::models::attempts::entities::{TestAnswer, TestResult};
use crate::models::questions::entities::Question;
use crate::models::users::entities::User;

const TOP_WRONG_ANSWERS: usize = 3;

/// 平均值，保留两位小数；空集为 0
pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    round2(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn best(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

pub fn worst(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

/// 按 5 到 2 列出各成绩人次，没有的成绩计 0
pub fn grade_distribution(completed: &[&TestResult]) -> Vec<GradeCount> {
    (2..=5)
        .rev()
        .map(|grade| GradeCount {
            grade,
            count: completed.iter().filter(|r| r.grade == Some(grade)).count() as i64,
        })
        .collect()
}

pub fn score_distribution(percentages: &[f64]) -> Vec<ScoreRange> {
    SCORE_BUCKETS
        .iter()
        .map(|range| ScoreRange {
            range: range.to_string(),
            count: percentages
                .iter()
                .filter(|p| score_bucket(**p) == *range)
                .count() as i64,
        })
        .collect()
}

/// 每名学生在每个测试上的最好一次已完成作答
pub fn best_attempts<'a>(results: &'a [TestResult]) -> HashMap<(i64, i64), &'a TestResult> {
    let mut best: HashMap<(i64, i64), &TestResult> = HashMap::new();
    for result in results.iter().filter(|r| r.is_completed) {
        best.entry((result.student_id, result.test_id))
            .and_modify(|current| {
                if result.percentage > current.percentage {
                    *current = result;
                }
            })
            .or_insert(result);
    }
    best
}

/// 单个测试下每名学生的作答情况；没有作答的学生也列出
pub fn student_rows(results: &[TestResult], students: &[User]) -> Vec<StudentTestRow> {
    let mut rows: Vec<StudentTestRow> = students
        .iter()
        .map(|user| {
            let mine: Vec<&TestResult> = results
                .iter()
                .filter(|r| r.student_id == user.id)
                .collect();
            let completed: Vec<&TestResult> =
                mine.iter().copied().filter(|r| r.is_completed).collect();
            let best_result = completed
                .iter()
                .copied()
                .max_by(|a, b| a.percentage.total_cmp(&b.percentage));
            let last = completed.iter().copied().max_by_key(|r| r.completed_at);

            StudentTestRow {
                student_id: user.id,
                username: user.username.clone(),
                display_name: user.display_name.clone(),
                attempts: mine.len() as i64,
                best_percentage: best_result.map(|r| r.percentage),
                last_percentage: last.map(|r| r.percentage),
                best_grade: completed.iter().filter_map(|r| r.grade).max(),
                last_completed_at: last.and_then(|r| r.completed_at),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.best_percentage
            .unwrap_or(-1.0)
            .total_cmp(&a.best_percentage.unwrap_or(-1.0))
            .then_with(|| a.username.cmp(&b.username))
    });
    rows
}

/// 错误答案的展示文本，选择题取选项文字
fn wrong_answer_text(question: &Question, answer: &TestAnswer) -> String {
    if !answer.selected_option_ids.is_empty() {
        let mut texts: Vec<&str> = question
            .options
            .iter()
            .filter(|o| answer.selected_option_ids.contains(&o.id))
            .map(|o| o.text.as_str())
            .collect();
        texts.sort_unstable();
        return texts.join(", ");
    }
    answer
        .answer_text
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}

/// 逐题统计正确率与常见错误答案
pub fn question_rows(questions: &[Question], answers: &[TestAnswer]) -> Vec<QuestionStatRow> {
    questions
        .iter()
        .map(|question| {
            let mine: Vec<&TestAnswer> = answers
                .iter()
                .filter(|a| a.question_id == question.id)
                .collect();
            let correct = mine.iter().filter(|a| a.is_correct).count() as i64;
            let total = mine.len() as i64;

            let mut wrong: BTreeMap<String, i64> = BTreeMap::new();
            for answer in mine.iter().filter(|a| !a.is_correct) {
                let text = wrong_answer_text(question, answer);
                if !text.is_empty() {
                    *wrong.entry(text).or_insert(0) += 1;
                }
            }
            let mut common: Vec<WrongAnswerCount> = wrong
                .into_iter()
                .map(|(answer, count)| WrongAnswerCount { answer, count })
                .collect();
            // BTreeMap 已按文本排序，稳定排序后同频答案保持字母序
            common.sort_by(|a, b| b.count.cmp(&a.count));
            common.truncate(TOP_WRONG_ANSWERS);

            QuestionStatRow {
                question_id: question.id,
                order_index: question.order_index,
                prompt: question.prompt.clone(),
                answers: total,
                correct,
                correct_rate: if total > 0 {
                    round2(correct as f64 / total as f64 * 100.0)
                } else {
                    0.0
                },
                common_wrong_answers: common,
            }
        })
        .collect()
}
