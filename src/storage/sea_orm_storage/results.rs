//! 作答结果与答案存储操作

use super::SeaOrmStorage;
use crate::entity::test_answers::{
    ActiveModel as AnswerActiveModel, Column as AnswerColumn, Entity as TestAnswers,
};
use crate::entity::test_results::{ActiveModel, Column, Entity as TestResults};
use crate::errors::{Result, TutorSystemError};
use crate::models::{
    PaginationInfo, page_window,
    attempts::{
        entities::{AnswerRecord, ResultOutcome, TestAnswer, TestResult},
        responses::ResultPage,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait, sea_query::Expr,
};

impl SeaOrmStorage {
    /// 新建一次作答，(test_id, student_id, attempt_number) 唯一
    pub async fn create_result_impl(
        &self,
        test_id: i64,
        student_id: i64,
        attempt_number: i32,
    ) -> Result<TestResult> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            test_id: Set(test_id),
            student_id: Set(student_id),
            attempt_number: Set(attempt_number),
            started_at: Set(now),
            completed_at: Set(None),
            is_completed: Set(false),
            timed_out: Set(false),
            score: Set(0),
            max_score: Set(0),
            percentage: Set(0.0),
            grade: Set(None),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                TutorSystemError::conflict("该次作答已存在，请勿重复开始")
            }
            _ => TutorSystemError::database_operation(format!("创建作答失败: {e}")),
        })?;

        Ok(result.into_result())
    }

    /// 通过 ID 获取作答
    pub async fn get_result_by_id_impl(&self, result_id: i64) -> Result<Option<TestResult>> {
        let result = TestResults::find_by_id(result_id)
            .one(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("查询作答失败: {e}")))?;

        Ok(result.map(|m| m.into_result()))
    }

    /// 学生在某测试下的全部作答，按次序
    pub async fn list_results_for_student_test_impl(
        &self,
        test_id: i64,
        student_id: i64,
    ) -> Result<Vec<TestResult>> {
        let rows = TestResults::find()
            .filter(
                Condition::all()
                    .add(Column::TestId.eq(test_id))
                    .add(Column::StudentId.eq(student_id)),
            )
            .order_by_asc(Column::AttemptNumber)
            .all(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("查询作答记录失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_result()).collect())
    }

    /// 若干测试的全部作答
    pub async fn list_results_by_tests_impl(&self, test_ids: &[i64]) -> Result<Vec<TestResult>> {
        if test_ids.is_empty() {
            return Ok(vec![]);
        }

        let rows = TestResults::find()
            .filter(Column::TestId.is_in(test_ids.to_vec()))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("查询测试作答失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_result()).collect())
    }

    /// 学生的全部作答
    pub async fn list_results_by_student_impl(&self, student_id: i64) -> Result<Vec<TestResult>> {
        let rows = TestResults::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("查询学生作答失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_result()).collect())
    }

    /// 分页列出学生的作答历史，最近的在前
    pub async fn list_student_results_with_pagination_impl(
        &self,
        student_id: i64,
        test_id: Option<i64>,
        page: i64,
        size: i64,
    ) -> Result<ResultPage> {
        let (page, size) = page_window(Some(page), Some(size));

        let mut select = TestResults::find().filter(Column::StudentId.eq(student_id));
        if let Some(test_id) = test_id {
            select = select.filter(Column::TestId.eq(test_id));
        }
        select = select
            .order_by_desc(Column::StartedAt)
            .order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("查询作答总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("查询作答页数失败: {e}")))?;

        let rows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("查询作答列表失败: {e}")))?;

        Ok(ResultPage {
            items: rows.into_iter().map(|m| m.into_result()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 统计测试的作答数
    pub async fn count_results_by_test_impl(&self, test_id: i64) -> Result<u64> {
        let count = TestResults::find()
            .filter(Column::TestId.eq(test_id))
            .count(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("统计作答数量失败: {e}")))?;

        Ok(count)
    }

    /// 完成作答，只更新尚未完成的记录；返回是否由本次调用完成
    pub async fn complete_result_impl(
        &self,
        result_id: i64,
        outcome: ResultOutcome,
    ) -> Result<bool> {
        let result = TestResults::update_many()
            .col_expr(Column::IsCompleted, Expr::value(true))
            .col_expr(Column::TimedOut, Expr::value(outcome.timed_out))
            .col_expr(Column::CompletedAt, Expr::value(outcome.completed_at))
            .col_expr(Column::Score, Expr::value(outcome.score))
            .col_expr(Column::MaxScore, Expr::value(outcome.max_score))
            .col_expr(Column::Percentage, Expr::value(outcome.percentage))
            .col_expr(Column::Grade, Expr::value(outcome.grade))
            .filter(
                Condition::all()
                    .add(Column::Id.eq(result_id))
                    .add(Column::IsCompleted.eq(false)),
            )
            .exec(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("完成作答失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 保存或覆盖单题答案
    pub async fn upsert_answer_impl(
        &self,
        result_id: i64,
        answer: AnswerRecord,
    ) -> Result<TestAnswer> {
        write_answer(&self.db, result_id, answer).await
    }

    /// 一次保存一批答案，全部成功或全部不写入
    pub async fn upsert_answers_impl(
        &self,
        result_id: i64,
        answers: Vec<AnswerRecord>,
    ) -> Result<Vec<TestAnswer>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let mut saved = Vec::with_capacity(answers.len());
        for answer in answers {
            saved.push(write_answer(&txn, result_id, answer).await?);
        }

        txn.commit()
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("提交事务失败: {e}")))?;
        Ok(saved)
    }

    /// 一次作答的全部答案
    pub async fn list_answers_by_result_impl(&self, result_id: i64) -> Result<Vec<TestAnswer>> {
        let rows = TestAnswers::find()
            .filter(AnswerColumn::ResultId.eq(result_id))
            .order_by_asc(AnswerColumn::QuestionId)
            .all(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("查询答案失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_answer()).collect())
    }

    /// 多次作答的全部答案
    pub async fn list_answers_by_results_impl(
        &self,
        result_ids: &[i64],
    ) -> Result<Vec<TestAnswer>> {
        if result_ids.is_empty() {
            return Ok(vec![]);
        }

        let rows = TestAnswers::find()
            .filter(AnswerColumn::ResultId.is_in(result_ids.to_vec()))
            .order_by_asc(AnswerColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("批量查询答案失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_answer()).collect())
    }
}

/// 按 (result_id, question_id) 覆盖或插入
async fn write_answer<C: ConnectionTrait>(
    conn: &C,
    result_id: i64,
    answer: AnswerRecord,
) -> Result<TestAnswer> {
    let now = chrono::Utc::now().timestamp();
    let selected = if answer.selected_option_ids.is_empty() {
        None
    } else {
        Some(serde_json::to_string(&answer.selected_option_ids)?)
    };

    let existing = TestAnswers::find()
        .filter(
            Condition::all()
                .add(AnswerColumn::ResultId.eq(result_id))
                .add(AnswerColumn::QuestionId.eq(answer.question_id)),
        )
        .one(conn)
        .await
        .map_err(|e| TutorSystemError::database_operation(format!("查询答案失败: {e}")))?;

    let saved = match existing {
        Some(model) => {
            let mut active: AnswerActiveModel = model.into();
            active.answer_text = Set(answer.answer_text);
            active.selected_option_ids = Set(selected);
            active.is_correct = Set(answer.is_correct);
            active.points_earned = Set(answer.points_earned);
            active.answered_at = Set(now);
            active
                .update(conn)
                .await
                .map_err(|e| TutorSystemError::database_operation(format!("更新答案失败: {e}")))?
        }
        None => AnswerActiveModel {
            result_id: Set(result_id),
            question_id: Set(answer.question_id),
            answer_text: Set(answer.answer_text),
            selected_option_ids: Set(selected),
            is_correct: Set(answer.is_correct),
            points_earned: Set(answer.points_earned),
            answered_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(|e| TutorSystemError::database_operation(format!("保存答案失败: {e}")))?,
    };

    Ok(saved.into_answer())
}


#[cfg(test)]
mod tests {
    use crate::errors::TutorSystemError;
    use crate::models::attempts::entities::{AnswerRecord, ResultOutcome};
    use crate::models::questions::requests::CreateQuestionRequest;
    use crate::models::tests::entities::TestType;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::tests::test_support::make_test;
    use crate::storage::sea_orm_storage::users::test_support::make_user;

    fn outcome(score: i32) -> ResultOutcome {
        ResultOutcome {
            score,
            max_score: 4,
            percentage: score as f64 * 25.0,
            grade: 3,
            timed_out: false,
            completed_at: chrono::Utc::now().timestamp(),
        }
    }

    #[tokio::test]
    async fn test_attempt_numbers_are_unique() {
        let storage = SeaOrmStorage::in_memory().await;
        let teacher = make_user(&storage, "teacher", UserRole::Teacher).await;
        let student = make_user(&storage, "student", UserRole::Student).await;
        let test = make_test(&storage, teacher.id, TestType::Spelling, 0, 3).await;

        let first = storage.create_result_impl(test.id, student.id, 1).await.unwrap();
        assert!(!first.is_completed);

        let dup = storage.create_result_impl(test.id, student.id, 1).await;
        assert!(matches!(dup, Err(TutorSystemError::Conflict(_))));

        storage.create_result_impl(test.id, student.id, 2).await.unwrap();
        let all = storage
            .list_results_for_student_test_impl(test.id, student.id)
            .await
            .unwrap();
        assert_eq!(all.iter().map(|r| r.attempt_number).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(storage.count_results_by_test_impl(test.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_complete_result_only_once() {
        let storage = SeaOrmStorage::in_memory().await;
        let teacher = make_user(&storage, "teacher", UserRole::Teacher).await;
        let student = make_user(&storage, "student", UserRole::Student).await;
        let test = make_test(&storage, teacher.id, TestType::Spelling, 0, 1).await;
        let result = storage.create_result_impl(test.id, student.id, 1).await.unwrap();

        assert!(storage.complete_result_impl(result.id, outcome(2)).await.unwrap());
        assert!(!storage.complete_result_impl(result.id, outcome(4)).await.unwrap());

        let stored = storage.get_result_by_id_impl(result.id).await.unwrap().unwrap();
        assert!(stored.is_completed);
        assert_eq!(stored.score, 2);
        assert_eq!(stored.percentage, 50.0);
        assert_eq!(stored.grade, Some(3));
        assert!(stored.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_upsert_answer_overwrites() {
        let storage = SeaOrmStorage::in_memory().await;
        let teacher = make_user(&storage, "teacher", UserRole::Teacher).await;
        let student = make_user(&storage, "student", UserRole::Student).await;
        let test = make_test(&storage, teacher.id, TestType::Regular, 0, 1).await;
        let question = storage
            .create_question_impl(
                test.id,
                CreateQuestionRequest {
                    prompt: "pick".to_string(),
                    points: Some(2),
                    order_index: None,
                    correct_answer: None,
                    alternative_answers: None,
                    stress_position: None,
                    hint: None,
                    options: vec![],
                },
            )
            .await
            .unwrap();
        let result = storage.create_result_impl(test.id, student.id, 1).await.unwrap();

        let record = |ids: Vec<i64>, correct: bool| AnswerRecord {
            question_id: question.id,
            answer_text: None,
            selected_option_ids: ids,
            is_correct: correct,
            points_earned: if correct { 2 } else { 0 },
        };

        storage
            .upsert_answer_impl(result.id, record(vec![1], false))
            .await
            .unwrap();
        let saved = storage
            .upsert_answer_impl(result.id, record(vec![2, 3], true))
            .await
            .unwrap();
        assert_eq!(saved.selected_option_ids, vec![2, 3]);

        let answers = storage.list_answers_by_result_impl(result.id).await.unwrap();
        assert_eq!(answers.len(), 1);
        assert!(answers[0].is_correct);
        assert_eq!(answers[0].points_earned, 2);

        let page = storage
            .list_student_results_with_pagination_impl(student.id, Some(test.id), 1, 10)
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 1);
    }

    #[tokio::test]
    async fn test_upsert_answers_is_all_or_nothing() {
        let storage = SeaOrmStorage::in_memory().await;
        let teacher = make_user(&storage, "teacher", UserRole::Teacher).await;
        let student = make_user(&storage, "student", UserRole::Student).await;
        let test = make_test(&storage, teacher.id, TestType::Spelling, 0, 1).await;
        let question = storage
            .create_question_impl(
                test.id,
                CreateQuestionRequest {
                    prompt: "к..рова".to_string(),
                    points: Some(1),
                    order_index: None,
                    correct_answer: Some("корова".to_string()),
                    alternative_answers: None,
                    stress_position: None,
                    hint: None,
                    options: vec![],
                },
            )
            .await
            .unwrap();
        let result = storage.create_result_impl(test.id, student.id, 1).await.unwrap();

        let record = |question_id: i64| AnswerRecord {
            question_id,
            answer_text: Some("корова".to_string()),
            selected_option_ids: vec![],
            is_correct: true,
            points_earned: 1,
        };

        // 第二条指向不存在的题目，外键失败后第一条也不应留下
        let failed = storage
            .upsert_answers_impl(result.id, vec![record(question.id), record(question.id + 1000)])
            .await;
        assert!(failed.is_err());
        assert!(storage.list_answers_by_result_impl(result.id).await.unwrap().is_empty());

        let saved = storage
            .upsert_answers_impl(result.id, vec![record(question.id)])
            .await
            .unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(storage.list_answers_by_result_impl(result.id).await.unwrap().len(), 1);
    }
}
