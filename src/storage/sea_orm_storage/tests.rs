//! 测试与测试分配存储操作

use super::SeaOrmStorage;
use crate::entity::class_students::{Column as ClassStudentColumn, Entity as ClassStudents};
use crate::entity::question_options::{Column as OptionColumn, Entity as QuestionOptions};
use crate::entity::questions::{Column as QuestionColumn, Entity as Questions};
use crate::entity::test_assignments::{
    ActiveModel as AssignmentActiveModel, Column as AssignmentColumn, Entity as TestAssignments,
};
use crate::entity::tests::{ActiveModel, Column, Entity as Tests};
use crate::errors::{Result, TutorSystemError};
use crate::models::{
    PaginationInfo, page_window,
    tests::{
        entities::{Test, TestAssignment},
        requests::{CreateTestRequest, TestListQuery, UpdateTestRequest},
        responses::TestListResponse,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, SqlErr, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建测试，时限和次数需由服务层补全
    pub async fn create_test_impl(&self, teacher_id: i64, req: CreateTestRequest) -> Result<Test> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            teacher_id: Set(teacher_id),
            title: Set(req.title),
            description: Set(req.description),
            test_type: Set(req.test_type.to_string()),
            time_limit_minutes: Set(req.time_limit_minutes.unwrap_or(0)),
            max_attempts: Set(req.max_attempts.unwrap_or(1)),
            show_correct_answers: Set(req.show_correct_answers),
            is_active: Set(true),
            available_from: Set(req.available_from.map(|t| t.timestamp())),
            available_until: Set(req.available_until.map(|t| t.timestamp())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("创建测试失败: {e}")))?;

        Ok(result.into_test())
    }

    /// 通过 ID 获取测试
    pub async fn get_test_by_id_impl(&self, test_id: i64) -> Result<Option<Test>> {
        let result = Tests::find_by_id(test_id)
            .one(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("查询测试失败: {e}")))?;

        Ok(result.map(|m| m.into_test()))
    }

    /// 批量获取测试
    pub async fn get_tests_by_ids_impl(&self, ids: &[i64]) -> Result<Vec<Test>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let tests = Tests::find()
            .filter(Column::Id.is_in(ids.to_vec()))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("批量查询测试失败: {e}")))?;

        Ok(tests.into_iter().map(|m| m.into_test()).collect())
    }

    /// 分页列出测试
    pub async fn list_tests_with_pagination_impl(
        &self,
        query: TestListQuery,
    ) -> Result<TestListResponse> {
        let (page, size) = page_window(query.page, query.size);

        let mut select = Tests::find();

        if let Some(teacher_id) = query.teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }

        if let Some(test_type) = query.test_type {
            select = select.filter(Column::TestType.eq(test_type.to_string()));
        }

        if let Some(is_active) = query.is_active {
            select = select.filter(Column::IsActive.eq(is_active));
        }

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(Column::Title.contains(&escaped));
        }

        select = select.order_by_desc(Column::CreatedAt);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("查询测试总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("查询测试页数失败: {e}")))?;

        let tests = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("查询测试列表失败: {e}")))?;

        Ok(TestListResponse {
            items: tests.into_iter().map(|m| m.into_test()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 更新测试
    pub async fn update_test_impl(
        &self,
        test_id: i64,
        update: UpdateTestRequest,
    ) -> Result<Option<Test>> {
        let existing = self.get_test_by_id_impl(test_id).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        let mut model = ActiveModel {
            id: Set(test_id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(title) = update.title {
            model.title = Set(title);
        }

        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }

        if let Some(time_limit) = update.time_limit_minutes {
            model.time_limit_minutes = Set(time_limit);
        }

        if let Some(max_attempts) = update.max_attempts {
            model.max_attempts = Set(max_attempts);
        }

        if let Some(show) = update.show_correct_answers {
            model.show_correct_answers = Set(show);
        }

        if let Some(is_active) = update.is_active {
            model.is_active = Set(is_active);
        }

        if let Some(from) = update.available_from {
            model.available_from = Set(from.map(|t| t.timestamp()));
        }

        if let Some(until) = update.available_until {
            model.available_until = Set(until.map(|t| t.timestamp()));
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("更新测试失败: {e}")))?;

        self.get_test_by_id_impl(test_id).await
    }

    /// 删除测试，先清理题目、选项与分配
    pub async fn delete_test_impl(&self, test_id: i64) -> Result<bool> {
        // 有作答记录时不能删除，避免先删掉题目
        if self.count_results_by_test_impl(test_id).await? > 0 {
            return Err(TutorSystemError::conflict("测试已有作答记录"));
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let question_ids: Vec<i64> = Questions::find()
            .select_only()
            .column(QuestionColumn::Id)
            .filter(QuestionColumn::TestId.eq(test_id))
            .into_tuple()
            .all(&txn)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("查询测试题目失败: {e}")))?;

        if !question_ids.is_empty() {
            QuestionOptions::delete_many()
                .filter(OptionColumn::QuestionId.is_in(question_ids))
                .exec(&txn)
                .await
                .map_err(|e| {
                    TutorSystemError::database_operation(format!("删除题目选项失败: {e}"))
                })?;
        }

        Questions::delete_many()
            .filter(QuestionColumn::TestId.eq(test_id))
            .exec(&txn)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("删除测试题目失败: {e}")))?;

        TestAssignments::delete_many()
            .filter(AssignmentColumn::TestId.eq(test_id))
            .exec(&txn)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("删除测试分配失败: {e}")))?;

        let result = Tests::delete_by_id(test_id)
            .exec(&txn)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("删除测试失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 分配测试到班级
    pub async fn assign_test_impl(
        &self,
        test_id: i64,
        class_id: i64,
        due_at: Option<i64>,
    ) -> Result<TestAssignment> {
        let now = chrono::Utc::now().timestamp();

        let model = AssignmentActiveModel {
            test_id: Set(test_id),
            class_id: Set(class_id),
            assigned_at: Set(now),
            due_at: Set(due_at),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                TutorSystemError::conflict("测试已分配到该班级")
            }
            _ => TutorSystemError::database_operation(format!("分配测试失败: {e}")),
        })?;

        Ok(result.into_assignment())
    }

    /// 取消分配
    pub async fn unassign_test_impl(&self, test_id: i64, class_id: i64) -> Result<bool> {
        let result = TestAssignments::delete_many()
            .filter(
                Condition::all()
                    .add(AssignmentColumn::TestId.eq(test_id))
                    .add(AssignmentColumn::ClassId.eq(class_id)),
            )
            .exec(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("取消分配失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 测试的全部分配
    pub async fn list_test_assignments_impl(&self, test_id: i64) -> Result<Vec<TestAssignment>> {
        let rows = TestAssignments::find()
            .filter(AssignmentColumn::TestId.eq(test_id))
            .order_by_asc(AssignmentColumn::AssignedAt)
            .all(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("查询测试分配失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_assignment()).collect())
    }

    /// 班级的全部分配
    pub async fn list_class_assignments_impl(&self, class_id: i64) -> Result<Vec<TestAssignment>> {
        let rows = TestAssignments::find()
            .filter(AssignmentColumn::ClassId.eq(class_id))
            .order_by_asc(AssignmentColumn::AssignedAt)
            .all(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("查询班级分配失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_assignment()).collect())
    }

    /// 学生所在班级收到的全部分配
    pub async fn list_assignments_for_student_impl(
        &self,
        student_id: i64,
    ) -> Result<Vec<TestAssignment>> {
        let class_ids: Vec<i64> = ClassStudents::find()
            .select_only()
            .column(ClassStudentColumn::ClassId)
            .filter(ClassStudentColumn::StudentId.eq(student_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| {
                TutorSystemError::database_operation(format!("查询学生班级关联失败: {e}"))
            })?;

        if class_ids.is_empty() {
            return Ok(vec![]);
        }

        let rows = TestAssignments::find()
            .filter(AssignmentColumn::ClassId.is_in(class_ids))
            .order_by_asc(AssignmentColumn::AssignedAt)
            .all(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("查询学生测试分配失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_assignment()).collect())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::models::tests::{
        entities::{Test, TestType},
        requests::CreateTestRequest,
    };
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    pub(crate) async fn make_test(
        storage: &SeaOrmStorage,
        teacher_id: i64,
        test_type: TestType,
        time_limit_minutes: i32,
        max_attempts: i32,
    ) -> Test {
        storage
            .create_test_impl(
                teacher_id,
                CreateTestRequest {
                    title: format!("{test_type} test"),
                    description: None,
                    test_type,
                    time_limit_minutes: Some(time_limit_minutes),
                    max_attempts: Some(max_attempts),
                    show_correct_answers: false,
                    available_from: None,
                    available_until: None,
                },
            )
            .await
            .expect("create test")
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::make_test;
    use crate::errors::TutorSystemError;
    use crate::models::classes::requests::CreateClassRequest;
    use crate::models::questions::requests::CreateQuestionRequest;
    use crate::models::tests::{
        entities::TestType,
        requests::{TestListQuery, UpdateTestRequest},
    };
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::users::test_support::make_user;

    #[tokio::test]
    async fn test_create_list_and_update_tests() {
        let storage = SeaOrmStorage::in_memory().await;
        let teacher = make_user(&storage, "teacher", UserRole::Teacher).await;
        let spelling = make_test(&storage, teacher.id, TestType::Spelling, 10, 2).await;
        make_test(&storage, teacher.id, TestType::Regular, 0, 1).await;

        let listed = storage
            .list_tests_with_pagination_impl(TestListQuery {
                page: None,
                size: None,
                teacher_id: Some(teacher.id),
                test_type: Some(TestType::Spelling),
                is_active: None,
                search: None,
            })
            .await
            .unwrap();
        assert_eq!(listed.pagination.total, 1);
        assert_eq!(listed.items[0].id, spelling.id);

        let updated = storage
            .update_test_impl(
                spelling.id,
                UpdateTestRequest {
                    title: None,
                    description: None,
                    time_limit_minutes: Some(0),
                    max_attempts: None,
                    show_correct_answers: Some(true),
                    is_active: Some(false),
                    available_from: None,
                    available_until: None,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.time_limit_minutes, 0);
        assert_eq!(updated.max_attempts, 2);
        assert!(updated.show_correct_answers);
        assert!(!updated.is_active);
    }

    #[tokio::test]
    async fn test_assignments_reach_enrolled_students() {
        let storage = SeaOrmStorage::in_memory().await;
        let teacher = make_user(&storage, "teacher", UserRole::Teacher).await;
        let student = make_user(&storage, "student", UserRole::Student).await;
        let class = storage
            .create_class_impl(
                teacher.id,
                CreateClassRequest {
                    teacher_id: None,
                    name: "6A".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap();
        let test = make_test(&storage, teacher.id, TestType::Orthoepy, 0, 1).await;

        storage.assign_test_impl(test.id, class.id, None).await.unwrap();
        let again = storage.assign_test_impl(test.id, class.id, None).await;
        assert!(matches!(again, Err(TutorSystemError::Conflict(_))));

        assert!(storage.list_assignments_for_student_impl(student.id).await.unwrap().is_empty());
        storage.add_student_to_class_impl(class.id, student.id).await.unwrap();
        let assigned = storage.list_assignments_for_student_impl(student.id).await.unwrap();
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].test_id, test.id);

        assert!(storage.unassign_test_impl(test.id, class.id).await.unwrap());
        assert!(storage.list_test_assignments_impl(test.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_test_removes_dependents() {
        let storage = SeaOrmStorage::in_memory().await;
        let teacher = make_user(&storage, "teacher", UserRole::Teacher).await;
        let class = storage
            .create_class_impl(
                teacher.id,
                CreateClassRequest {
                    teacher_id: None,
                    name: "6A".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap();
        let test = make_test(&storage, teacher.id, TestType::Regular, 0, 1).await;
        storage.assign_test_impl(test.id, class.id, None).await.unwrap();

        assert!(storage.delete_test_impl(test.id).await.unwrap());
        assert!(storage.get_test_by_id_impl(test.id).await.unwrap().is_none());
        assert!(storage.list_class_assignments_impl(class.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_test_refused_once_attempted() {
        let storage = SeaOrmStorage::in_memory().await;
        let teacher = make_user(&storage, "teacher", UserRole::Teacher).await;
        let student = make_user(&storage, "student", UserRole::Student).await;
        let test = make_test(&storage, teacher.id, TestType::Spelling, 0, 1).await;
        storage
            .create_question_impl(
                test.id,
                CreateQuestionRequest {
                    prompt: "з..мля".to_string(),
                    points: Some(1),
                    order_index: None,
                    correct_answer: Some("земля".to_string()),
                    alternative_answers: None,
                    stress_position: None,
                    hint: None,
                    options: vec![],
                },
            )
            .await
            .unwrap();
        storage.create_result_impl(test.id, student.id, 1).await.unwrap();

        let refused = storage.delete_test_impl(test.id).await;
        assert!(matches!(refused, Err(TutorSystemError::Conflict(_))));
        assert!(storage.get_test_by_id_impl(test.id).await.unwrap().is_some());
        assert_eq!(storage.list_questions_impl(test.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_clears_availability_window() {
        let storage = SeaOrmStorage::in_memory().await;
        let teacher = make_user(&storage, "teacher", UserRole::Teacher).await;
        let test = make_test(&storage, teacher.id, TestType::Regular, 0, 1).await;
        let until = chrono::Utc::now() + chrono::Duration::days(1);

        let set = storage
            .update_test_impl(
                test.id,
                UpdateTestRequest {
                    available_until: Some(Some(until)),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(set.available_until.map(|t| t.timestamp()), Some(until.timestamp()));

        // 字段缺失保持原值
        let kept = storage
            .update_test_impl(
                test.id,
                UpdateTestRequest {
                    title: Some("renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(kept.available_until.is_some());

        let cleared = storage
            .update_test_impl(
                test.id,
                UpdateTestRequest {
                    available_until: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(cleared.available_until.is_none());
        assert_eq!(cleared.title, "renamed");
    }
}
