use chrono::{DateTime, Duration, Utc};

use crate::models::attempts::entities::TestResult;

/// 开始作答时的处理决定
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptDecision {
    /// 存在未过期的进行中作答，继续该作答
    Resume(i64),
    /// 进行中的作答已超时，先按超时完成，之后仍可开始新作答
    FinalizeThenStart { expired_id: i64, attempt_number: i32 },
    /// 进行中的作答已超时，完成后次数已用尽
    FinalizeThenDeny { expired_id: i64 },
    Start { attempt_number: i32 },
    /// 已完成次数达到上限
    Deny,
}

/// 作答截止时间，不限时返回 None
pub fn deadline(started_at: DateTime<Utc>, time_limit_minutes: i32) -> Option<DateTime<Utc>> {
    if time_limit_minutes <= 0 {
        return None;
    }
    Some(started_at + Duration::minutes(time_limit_minutes as i64))
}

/// 进行中的作答是否已超时；已完成的作答不算超时
pub fn is_expired(result: &TestResult, time_limit_minutes: i32, now: DateTime<Utc>) -> bool {
    if result.is_completed {
        return false;
    }
    deadline(result.started_at, time_limit_minutes).is_some_and(|d| now >= d)
}

/// 剩余秒数，不限时返回 None，超时后为 0
pub fn remaining_seconds(
    result: &TestResult,
    time_limit_minutes: i32,
    now: DateTime<Utc>,
) -> Option<i64> {
    deadline(result.started_at, time_limit_minutes)
        .map(|d| d.signed_duration_since(now).num_seconds().max(0))
}

pub fn decide_start(
    attempts: &[TestResult],
    max_attempts: i32,
    time_limit_minutes: i32,
    now: DateTime<Utc>,
) -> AttemptDecision {
    let completed = attempts.iter().filter(|r| r.is_completed).count() as i32;
    let next_number = attempts
        .iter()
        .map(|r| r.attempt_number)
        .max()
        .unwrap_or(0)
        + 1;

    let in_progress = attempts
        .iter()
        .filter(|r| !r.is_completed)
        .max_by_key(|r| (r.started_at, r.id));

    if let Some(current) = in_progress {
        if !is_expired(current, time_limit_minutes, now) {
            return AttemptDecision::Resume(current.id);
        }
        // 超时作答完成后计入已完成次数
        return if completed + 1 < max_attempts {
            AttemptDecision::FinalizeThenStart {
                expired_id: current.id,
                attempt_number: next_number,
            }
        } else {
            AttemptDecision::FinalizeThenDeny {
                expired_id: current.id,
            }
        };
    }

    if completed < max_attempts {
        AttemptDecision::Start {
            attempt_number: next_number,
        }
    } else {
        AttemptDecision::Deny
    }
}
