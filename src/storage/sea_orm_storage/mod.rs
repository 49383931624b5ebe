//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod class_students;
mod classes;
mod questions;
pub(crate) mod results;
pub(crate) mod tests;
pub(crate) mod users;

use crate::config::AppConfig;
use crate::errors::{Result, TutorSystemError};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        let storage = Self::from_connection(db).await?;
        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(storage)
    }

    /// 使用已有连接创建存储实例，并运行迁移
    pub async fn from_connection(db: DatabaseConnection) -> Result<Self> {
        Migrator::up(&db, None)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("数据库迁移失败: {e}")))?;

        Ok(Self { db })
    }

    /// 测试用内存数据库
    #[cfg(test)]
    pub(crate) async fn in_memory() -> Self {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        // 内存库每个连接独立，只能保留一个连接
        opt.max_connections(1).min_connections(1).sqlx_logging(false);

        let db = Database::connect(opt)
            .await
            .expect("failed to open in-memory sqlite");
        Self::from_connection(db)
            .await
            .expect("failed to migrate in-memory sqlite")
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| TutorSystemError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| TutorSystemError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| TutorSystemError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(TutorSystemError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
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
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        self.get_users_by_ids_impl(ids).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        self.delete_user_impl(id).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    // 班级模块
    async fn create_class(&self, teacher_id: i64, class: CreateClassRequest) -> Result<Class> {
        self.create_class_impl(teacher_id, class).await
    }

    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>> {
        self.get_class_by_id_impl(class_id).await
    }

    async fn get_class_by_code(&self, invite_code: &str) -> Result<Option<Class>> {
        self.get_class_by_code_impl(invite_code).await
    }

    async fn list_classes_with_pagination(
        &self,
        query: ClassListQuery,
    ) -> Result<ClassListResponse> {
        self.list_classes_with_pagination_impl(query).await
    }

    async fn list_student_classes_with_pagination(
        &self,
        student_id: i64,
        query: ClassListQuery,
    ) -> Result<ClassListResponse> {
        self.list_student_classes_with_pagination_impl(student_id, query)
            .await
    }

    async fn list_classes_for_student(&self, student_id: i64) -> Result<Vec<Class>> {
        self.list_classes_for_student_impl(student_id).await
    }

    async fn update_class(
        &self,
        class_id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>> {
        self.update_class_impl(class_id, update).await
    }

    async fn delete_class(&self, class_id: i64) -> Result<bool> {
        self.delete_class_impl(class_id).await
    }

    // 班级学生模块
    async fn add_student_to_class(&self, class_id: i64, student_id: i64) -> Result<ClassStudent> {
        self.add_student_to_class_impl(class_id, student_id).await
    }

    async fn remove_student_from_class(&self, class_id: i64, student_id: i64) -> Result<bool> {
        self.remove_student_from_class_impl(class_id, student_id)
            .await
    }

    async fn get_class_student(
        &self,
        class_id: i64,
        student_id: i64,
    ) -> Result<Option<ClassStudent>> {
        self.get_class_student_impl(class_id, student_id).await
    }

    async fn count_class_students(&self, class_id: i64) -> Result<u64> {
        self.count_class_students_impl(class_id).await
    }

    async fn list_class_students_with_pagination(
        &self,
        class_id: i64,
        query: ClassStudentQuery,
    ) -> Result<ClassStudentListResponse> {
        self.list_class_students_with_pagination_impl(class_id, query)
            .await
    }

    async fn list_class_student_ids(&self, class_id: i64) -> Result<Vec<i64>> {
        self.list_class_student_ids_impl(class_id).await
    }

    // 测试模块
    async fn create_test(&self, teacher_id: i64, test: CreateTestRequest) -> Result<Test> {
        self.create_test_impl(teacher_id, test).await
    }

    async fn get_test_by_id(&self, test_id: i64) -> Result<Option<Test>> {
        self.get_test_by_id_impl(test_id).await
    }

    async fn get_tests_by_ids(&self, ids: &[i64]) -> Result<Vec<Test>> {
        self.get_tests_by_ids_impl(ids).await
    }

    async fn list_tests_with_pagination(&self, query: TestListQuery) -> Result<TestListResponse> {
        self.list_tests_with_pagination_impl(query).await
    }

    async fn update_test(&self, test_id: i64, update: UpdateTestRequest) -> Result<Option<Test>> {
        self.update_test_impl(test_id, update).await
    }

    async fn delete_test(&self, test_id: i64) -> Result<bool> {
        self.delete_test_impl(test_id).await
    }

    async fn assign_test(
        &self,
        test_id: i64,
        class_id: i64,
        due_at: Option<i64>,
    ) -> Result<TestAssignment> {
        self.assign_test_impl(test_id, class_id, due_at).await
    }

    async fn unassign_test(&self, test_id: i64, class_id: i64) -> Result<bool> {
        self.unassign_test_impl(test_id, class_id).await
    }

    async fn list_test_assignments(&self, test_id: i64) -> Result<Vec<TestAssignment>> {
        self.list_test_assignments_impl(test_id).await
    }

    async fn list_class_assignments(&self, class_id: i64) -> Result<Vec<TestAssignment>> {
        self.list_class_assignments_impl(class_id).await
    }

    async fn list_assignments_for_student(&self, student_id: i64) -> Result<Vec<TestAssignment>> {
        self.list_assignments_for_student_impl(student_id).await
    }

    // 题目模块
    async fn create_question(
        &self,
        test_id: i64,
        question: CreateQuestionRequest,
    ) -> Result<Question> {
        self.create_question_impl(test_id, question).await
    }

    async fn get_question_by_id(&self, question_id: i64) -> Result<Option<Question>> {
        self.get_question_by_id_impl(question_id).await
    }

    async fn list_questions(&self, test_id: i64) -> Result<Vec<Question>> {
        self.list_questions_impl(test_id).await
    }

    async fn update_question(
        &self,
        question_id: i64,
        update: UpdateQuestionRequest,
    ) -> Result<Option<Question>> {
        self.update_question_impl(question_id, update).await
    }

    async fn delete_question(&self, question_id: i64) -> Result<bool> {
        self.delete_question_impl(question_id).await
    }

    // 作答模块
    async fn create_result(
        &self,
        test_id: i64,
        student_id: i64,
        attempt_number: i32,
    ) -> Result<TestResult> {
        self.create_result_impl(test_id, student_id, attempt_number)
            .await
    }

    async fn get_result_by_id(&self, result_id: i64) -> Result<Option<TestResult>> {
        self.get_result_by_id_impl(result_id).await
    }

    async fn list_results_for_student_test(
        &self,
        test_id: i64,
        student_id: i64,
    ) -> Result<Vec<TestResult>> {
        self.list_results_for_student_test_impl(test_id, student_id)
            .await
    }

    async fn list_results_by_tests(&self, test_ids: &[i64]) -> Result<Vec<TestResult>> {
        self.list_results_by_tests_impl(test_ids).await
    }

    async fn list_results_by_student(&self, student_id: i64) -> Result<Vec<TestResult>> {
        self.list_results_by_student_impl(student_id).await
    }

    async fn list_student_results_with_pagination(
        &self,
        student_id: i64,
        test_id: Option<i64>,
        page: i64,
        size: i64,
    ) -> Result<ResultPage> {
        self.list_student_results_with_pagination_impl(student_id, test_id, page, size)
            .await
    }

    async fn count_results_by_test(&self, test_id: i64) -> Result<u64> {
        self.count_results_by_test_impl(test_id).await
    }

    async fn complete_result(&self, result_id: i64, outcome: ResultOutcome) -> Result<bool> {
        self.complete_result_impl(result_id, outcome).await
    }

    async fn upsert_answer(&self, result_id: i64, answer: AnswerRecord) -> Result<TestAnswer> {
        self.upsert_answer_impl(result_id, answer).await
    }

    async fn upsert_answers(
        &self,
        result_id: i64,
        answers: Vec<AnswerRecord>,
    ) -> Result<Vec<TestAnswer>> {
        self.upsert_answers_impl(result_id, answers).await
    }

    async fn list_answers_by_result(&self, result_id: i64) -> Result<Vec<TestAnswer>> {
        self.list_answers_by_result_impl(result_id).await
    }

    async fn list_answers_by_results(&self, result_ids: &[i64]) -> Result<Vec<TestAnswer>> {
        self.list_answers_by_results_impl(result_ids).await
    }
}
