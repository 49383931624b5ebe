//! 按测试类型校验题目内容

use crate::grading::checker::has_invalid_position_tokens;
use crate::models::questions::requests::OptionInput;
use crate::models::tests::entities::TestType;
use crate::utils::validate::validate_required_text;

const MAX_PROMPT_CHARS: usize = 2000;
pub const MAX_QUESTION_POINTS: i32 = 1000;

/// 新建或合并更新后的题目内容
#[derive(Debug)]
pub struct QuestionDraft<'a> {
    pub prompt: &'a str,
    pub points: i32,
    pub correct_answer: Option<&'a str>,
    pub stress_position: Option<i32>,
    pub options: &'a [OptionInput],
}

pub fn validate_question(test_type: TestType, draft: &QuestionDraft<'_>) -> Result<(), String> {
    validate_required_text("prompt", draft.prompt, MAX_PROMPT_CHARS)?;
    if !(1..=MAX_QUESTION_POINTS).contains(&draft.points) {
        return Err(format!("points must be between 1 and {MAX_QUESTION_POINTS}"));
    }

    match test_type {
        TestType::Spelling => {
            if draft.correct_answer.is_none_or(|a| a.trim().is_empty()) {
                return Err("Spelling questions require correct_answer".to_string());
            }
        }
        TestType::Punctuation => {
            // 空列表表示不需要任何标点
            if draft.correct_answer.is_some_and(has_invalid_position_tokens) {
                return Err(
                    "correct_answer must be a list of positive positions, e.g. \"3, 7\"".to_string(),
                );
            }
        }
        TestType::Orthoepy => {
            let letters = draft.prompt.trim().chars().count() as i32;
            match draft.stress_position {
                Some(pos) if pos >= 1 && pos <= letters => {}
                Some(pos) => {
                    return Err(format!(
                        "stress_position {pos} is outside the word (1..={letters})"
                    ));
                }
                None => return Err("Orthoepy questions require stress_position".to_string()),
            }
        }
        TestType::Regular => {
            if draft.options.len() < 2 {
                return Err("Regular questions require at least 2 options".to_string());
            }
            if draft.options.iter().any(|o| o.text.trim().is_empty()) {
                return Err("Option text cannot be empty".to_string());
            }
            if !draft.options.iter().any(|o| o.is_correct) {
                return Err("At least one option must be correct".to_string());
            }
        }
    }
    Ok(())
}
