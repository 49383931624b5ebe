use std::collections::BTreeSet;

use crate::models::attempts::requests::AnswerInput;
use crate::models::questions::entities::Question;
use crate::models::tests::entities::TestType;

/// 学生提交的原始答案
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmittedAnswer {
    pub answer_text: Option<String>,
    pub selected_option_ids: Vec<i64>,
}

impl From<&AnswerInput> for SubmittedAnswer {
    fn from(input: &AnswerInput) -> Self {
        Self {
            answer_text: input.answer_text.clone(),
            selected_option_ids: input.selected_option_ids.clone(),
        }
    }
}

impl SubmittedAnswer {
    fn text(&self) -> &str {
        self.answer_text.as_deref().unwrap_or("").trim()
    }
}

pub trait AnswerChecker: Send + Sync {
    fn check(&self, question: &Question, answer: &SubmittedAnswer) -> bool;
}

pub struct SpellingChecker;
pub struct PunctuationChecker;
pub struct OrthoepyChecker;
pub struct RegularChecker;

pub fn checker_for(test_type: TestType) -> &'static dyn AnswerChecker {
    match test_type {
        TestType::Spelling => &SpellingChecker,
        TestType::Punctuation => &PunctuationChecker,
        TestType::Orthoepy => &OrthoepyChecker,
        TestType::Regular => &RegularChecker,
    }
}

/// 判定并计算得分：答对得满分，否则 0 分
pub fn grade_answer(
    test_type: TestType,
    question: &Question,
    answer: &SubmittedAnswer,
) -> (bool, i32) {
    let correct = checker_for(test_type).check(question, answer);
    (correct, if correct { question.points } else { 0 })
}

fn normalize_word(s: &str) -> String {
    s.trim().to_lowercase()
}

/// 拆分可接受写法列表，分隔符为 `;` 或 `,`
pub fn split_alternatives(raw: &str) -> Vec<String> {
    raw.split([';', ','])
        .map(normalize_word)
        .filter(|s| !s.is_empty())
        .collect()
}

/// 解析标点位置列表，忽略非数字与非正数
pub fn parse_positions(raw: &str) -> BTreeSet<u32> {
    raw.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter_map(|token| token.trim().parse::<u32>().ok())
        .filter(|&p| p > 0)
        .collect()
}

/// 位置列表中是否存在无法解析的内容
pub fn has_invalid_position_tokens(raw: &str) -> bool {
    raw.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .any(|t| !matches!(t.parse::<u32>(), Ok(p) if p > 0))
}

impl AnswerChecker for SpellingChecker {
    fn check(&self, question: &Question, answer: &SubmittedAnswer) -> bool {
        let expected = normalize_word(question.correct_answer.as_deref().unwrap_or(""));
        let given = normalize_word(answer.text());

        if given.is_empty() {
            return expected.is_empty();
        }
        if given == expected {
            return true;
        }
        question
            .alternative_answers
            .as_deref()
            .map(split_alternatives)
            .unwrap_or_default()
            .iter()
            .any(|alt| *alt == given)
    }
}

impl AnswerChecker for PunctuationChecker {
    fn check(&self, question: &Question, answer: &SubmittedAnswer) -> bool {
        let expected = parse_positions(question.correct_answer.as_deref().unwrap_or(""));
        let given = parse_positions(answer.text());
        expected == given
    }
}

impl AnswerChecker for OrthoepyChecker {
    fn check(&self, question: &Question, answer: &SubmittedAnswer) -> bool {
        match (question.stress_position, answer.text().parse::<i32>()) {
            (Some(expected), Ok(given)) => expected == given,
            _ => false,
        }
    }
}

impl AnswerChecker for RegularChecker {
    fn check(&self, question: &Question, answer: &SubmittedAnswer) -> bool {
        let expected: BTreeSet<i64> = question.correct_option_ids().into_iter().collect();
        let given: BTreeSet<i64> = answer.selected_option_ids.iter().copied().collect();
        if given.is_empty() {
            return expected.is_empty();
        }
        expected == given
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::questions::entities::QuestionOption;

    fn question() -> Question {
        Question {
            id: 1,
            test_id: 1,
            order_index: 1,
            prompt: "prompt".to_string(),
            points: 2,
            correct_answer: None,
            alternative_answers: None,
            stress_position: None,
            hint: None,
            options: vec![],
            created_at: chrono::Utc::now(),
        }
    }

    fn text(s: &str) -> SubmittedAnswer {
        SubmittedAnswer {
            answer_text: Some(s.to_string()),
            selected_option_ids: vec![],
        }
    }

    fn options(ids: &[i64]) -> SubmittedAnswer {
        SubmittedAnswer {
            answer_text: None,
            selected_option_ids: ids.to_vec(),
        }
    }

    #[test]
    fn test_spelling_case_insensitive_and_trimmed() {
        let mut q = question();
        q.correct_answer = Some("Молоко".to_string());
        let checker = checker_for(TestType::Spelling);

        assert!(checker.check(&q, &text("  молоко ")));
        assert!(checker.check(&q, &text("МОЛОКО")));
        assert!(!checker.check(&q, &text("малако")));
    }

    #[test]
    fn test_spelling_alternatives() {
        let mut q = question();
        q.correct_answer = Some("colour".to_string());
        q.alternative_answers = Some("color; Colour , COLOR".to_string());
        let checker = checker_for(TestType::Spelling);

        assert!(checker.check(&q, &text("color")));
        assert!(!checker.check(&q, &text("culler")));
    }

    #[test]
    fn test_spelling_empty_answer() {
        let mut q = question();
        q.correct_answer = Some("word".to_string());
        let checker = checker_for(TestType::Spelling);
        assert!(!checker.check(&q, &text("   ")));
        assert!(!checker.check(&q, &SubmittedAnswer::default()));

        q.correct_answer = Some(String::new());
        assert!(checker.check(&q, &SubmittedAnswer::default()));
    }

    #[test]
    fn test_punctuation_set_equality() {
        let mut q = question();
        q.correct_answer = Some("3, 7,12".to_string());
        let checker = checker_for(TestType::Punctuation);

        assert!(checker.check(&q, &text("12,3,7")));
        assert!(checker.check(&q, &text("7 3 12 3")));
        assert!(!checker.check(&q, &text("3,7")));
        assert!(!checker.check(&q, &text("3,7,12,15")));
    }

    #[test]
    fn test_punctuation_both_empty_is_correct() {
        let mut q = question();
        q.correct_answer = Some(String::new());
        let checker = checker_for(TestType::Punctuation);

        assert!(checker.check(&q, &text("")));
        assert!(checker.check(&q, &SubmittedAnswer::default()));
        assert!(!checker.check(&q, &text("4")));
    }

    #[test]
    fn test_parse_positions_ignores_noise() {
        let positions = parse_positions("1, x, 4;4  0 -2 9");
        assert_eq!(positions.into_iter().collect::<Vec<_>>(), vec![1, 4, 9]);
        assert!(has_invalid_position_tokens("1, x"));
        assert!(has_invalid_position_tokens("0"));
        assert!(!has_invalid_position_tokens(" 1; 2 ,3 "));
        assert!(!has_invalid_position_tokens(""));
    }

    #[test]
    fn test_orthoepy() {
        let mut q = question();
        q.stress_position = Some(3);
        let checker = checker_for(TestType::Orthoepy);

        assert!(checker.check(&q, &text("3")));
        assert!(checker.check(&q, &text(" 3 ")));
        assert!(!checker.check(&q, &text("2")));
        assert!(!checker.check(&q, &text("три")));
        assert!(!checker.check(&q, &SubmittedAnswer::default()));

        q.stress_position = None;
        assert!(!checker.check(&q, &text("3")));
    }

    #[test]
    fn test_regular_option_sets() {
        let mut q = question();
        q.options = vec![
            QuestionOption {
                id: 10,
                question_id: 1,
                order_index: 1,
                text: "a".to_string(),
                is_correct: true,
            },
            QuestionOption {
                id: 11,
                question_id: 1,
                order_index: 2,
                text: "b".to_string(),
                is_correct: false,
            },
            QuestionOption {
                id: 12,
                question_id: 1,
                order_index: 3,
                text: "c".to_string(),
                is_correct: true,
            },
        ];
        let checker = checker_for(TestType::Regular);

        assert!(checker.check(&q, &options(&[12, 10])));
        assert!(!checker.check(&q, &options(&[10])));
        assert!(!checker.check(&q, &options(&[10, 11, 12])));
        assert!(!checker.check(&q, &options(&[])));
    }

    #[test]
    fn test_grade_answer_points() {
        let mut q = question();
        q.correct_answer = Some("кот".to_string());

        assert_eq!(grade_answer(TestType::Spelling, &q, &text("кот")), (true, 2));
        assert_eq!(grade_answer(TestType::Spelling, &q, &text("кит")), (false, 0));
    }
}
