use std::sync::Arc;

use crate::models::{
    attempts::{
        entities::{AnswerRecord, ResultOutcome, TestAnswer, TestResult},
        responses::ResultPage,
    },
    class_students::{
        entities::ClassStudent, requests::ClassStudentQuery, responses::ClassStudentListResponse,
    },
    classes::{
        entities::Class,
        requests::{ClassListQuery, CreateClassRequest, UpdateClassRequest},
        responses::ClassListResponse,
    },
    questions::{
        entities::Question,
        requests::{CreateQuestionRequest, UpdateQuestionRequest},
    },
    tests::{
        entities::{Test, TestAssignment},
        requests::{CreateTestRequest, TestListQuery, UpdateTestRequest},
        responses::TestListResponse,
    },
    users::{
        entities::User,
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 批量获取用户信息
    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>>;
    // 通过用户名获取用户信息
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 通过用户名或邮箱获取用户信息
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    // 列出用户
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    // 更新用户信息
    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>>;
    // 删除用户
    async fn delete_user(&self, id: i64) -> Result<bool>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;

    /// 班级管理方法
    // 创建班级，邀请码由存储层生成
    async fn create_class(&self, teacher_id: i64, class: CreateClassRequest) -> Result<Class>;
    // 通过ID获取班级信息
    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>>;
    // 通过邀请码获取班级信息
    async fn get_class_by_code(&self, invite_code: &str) -> Result<Option<Class>>;
    // 列出班级
    async fn list_classes_with_pagination(
        &self,
        query: ClassListQuery,
    ) -> Result<ClassListResponse>;
    // 列出学生加入的班级
    async fn list_student_classes_with_pagination(
        &self,
        student_id: i64,
        query: ClassListQuery,
    ) -> Result<ClassListResponse>;
    // 学生加入的全部班级
    async fn list_classes_for_student(&self, student_id: i64) -> Result<Vec<Class>>;
    // 更新班级信息
    async fn update_class(
        &self,
        class_id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>>;
    // 删除班级
    async fn delete_class(&self, class_id: i64) -> Result<bool>;

    /// 班级学生管理方法
    // 学生加入班级
    async fn add_student_to_class(&self, class_id: i64, student_id: i64) -> Result<ClassStudent>;
    // 学生离开/移出班级
    async fn remove_student_from_class(&self, class_id: i64, student_id: i64) -> Result<bool>;
    // 获取学生在班级中的记录
    async fn get_class_student(
        &self,
        class_id: i64,
        student_id: i64,
    ) -> Result<Option<ClassStudent>>;
    // 统计班级学生人数
    async fn count_class_students(&self, class_id: i64) -> Result<u64>;
    // 列出班级学生
    async fn list_class_students_with_pagination(
        &self,
        class_id: i64,
        query: ClassStudentQuery,
    ) -> Result<ClassStudentListResponse>;
    // 班级全部学生ID
    async fn list_class_student_ids(&self, class_id: i64) -> Result<Vec<i64>>;

    /// 测试管理方法
    // 创建测试
    async fn create_test(&self, teacher_id: i64, test: CreateTestRequest) -> Result<Test>;
    // 通过ID获取测试
    async fn get_test_by_id(&self, test_id: i64) -> Result<Option<Test>>;
    // 批量获取测试
    async fn get_tests_by_ids(&self, ids: &[i64]) -> Result<Vec<Test>>;
    // 列出测试
    async fn list_tests_with_pagination(&self, query: TestListQuery) -> Result<TestListResponse>;
    // 更新测试
    async fn update_test(&self, test_id: i64, update: UpdateTestRequest) -> Result<Option<Test>>;
    // 删除测试（题目、选项、分配随之删除）
    async fn delete_test(&self, test_id: i64) -> Result<bool>;
    // 分配测试到班级
    async fn assign_test(
        &self,
        test_id: i64,
        class_id: i64,
        due_at: Option<i64>,
    ) -> Result<TestAssignment>;
    // 取消分配
    async fn unassign_test(&self, test_id: i64, class_id: i64) -> Result<bool>;
    // 测试的全部分配
    async fn list_test_assignments(&self, test_id: i64) -> Result<Vec<TestAssignment>>;
    // 班级的全部分配
    async fn list_class_assignments(&self, class_id: i64) -> Result<Vec<TestAssignment>>;
    // 学生所在班级收到的全部分配
    async fn list_assignments_for_student(&self, student_id: i64) -> Result<Vec<TestAssignment>>;

    /// 题目管理方法
    // 新增题目（含选项）
    async fn create_question(
        &self,
        test_id: i64,
        question: CreateQuestionRequest,
    ) -> Result<Question>;
    // 通过ID获取题目
    async fn get_question_by_id(&self, question_id: i64) -> Result<Option<Question>>;
    // 测试的全部题目，按顺序
    async fn list_questions(&self, test_id: i64) -> Result<Vec<Question>>;
    // 更新题目，传入选项时整体替换
    async fn update_question(
        &self,
        question_id: i64,
        update: UpdateQuestionRequest,
    ) -> Result<Option<Question>>;
    // 删除题目
    async fn delete_question(&self, question_id: i64) -> Result<bool>;

    /// 作答与结果方法
    // 新建一次作答
    async fn create_result(
        &self,
        test_id: i64,
        student_id: i64,
        attempt_number: i32,
    ) -> Result<TestResult>;
    // 通过ID获取作答
    async fn get_result_by_id(&self, result_id: i64) -> Result<Option<TestResult>>;
    // 学生在某测试下的全部作答
    async fn list_results_for_student_test(
        &self,
        test_id: i64,
        student_id: i64,
    ) -> Result<Vec<TestResult>>;
    // 若干测试的全部作答
    async fn list_results_by_tests(&self, test_ids: &[i64]) -> Result<Vec<TestResult>>;
    // 学生的全部作答
    async fn list_results_by_student(&self, student_id: i64) -> Result<Vec<TestResult>>;
    // 学生的作答历史（分页）
    async fn list_student_results_with_pagination(
        &self,
        student_id: i64,
        test_id: Option<i64>,
        page: i64,
        size: i64,
    ) -> Result<ResultPage>;
    // 统计测试的作答数
    async fn count_results_by_test(&self, test_id: i64) -> Result<u64>;
    // 完成作答，仅对未完成的作答生效
    async fn complete_result(&self, result_id: i64, outcome: ResultOutcome) -> Result<bool>;
    // 保存或覆盖单题答案
    async fn upsert_answer(&self, result_id: i64, answer: AnswerRecord) -> Result<TestAnswer>;
    // 在同一事务中保存一批答案
    async fn upsert_answers(
        &self,
        result_id: i64,
        answers: Vec<AnswerRecord>,
    ) -> Result<Vec<TestAnswer>>;
    // 一次作答的全部答案
    async fn list_answers_by_result(&self, result_id: i64) -> Result<Vec<TestAnswer>>;
    // 多次作答的全部答案
    async fn list_answers_by_results(&self, result_ids: &[i64]) -> Result<Vec<TestAnswer>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
