//! 判分核心
//!
//! 纯逻辑，不做任何 I/O。服务层负责加载数据并持久化这里的结论。
//!
//! - `checker`: 按测试类型判定单题答案
//! - `scoring`: 总分、百分比与五分制成绩
//! - `attempt`: 作答生命周期（开始、恢复、超时、完成）

pub mod attempt;
pub mod checker;
pub mod scoring;

pub use attempt::{AttemptDecision, decide_start, deadline, is_expired, remaining_seconds};
pub use checker::{AnswerChecker, SubmittedAnswer, checker_for, grade_answer};
pub use scoring::{GradeScale, ScoreSummary, percentage, score_bucket, summarize};
