//! 测试结果实体（每次作答一行）

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "test_results")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub test_id: i64,
    pub student_id: i64,
    pub attempt_number: i32,
    pub started_at: i64,
    pub completed_at: Option<i64>,
    pub is_completed: bool,
    pub timed_out: bool,
    pub score: i32,
    pub max_score: i32,
    #[sea_orm(column_type = "Double")]
    pub percentage: f64,
    pub grade: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tests::Entity",
        from = "Column::TestId",
        to = "super::tests::Column::Id"
    )]
    Test,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::StudentId",
        to = "super::users::Column::Id"
    )]
    Student,
    #[sea_orm(has_many = "super::test_answers::Entity")]
    Answers,
}

impl Related<super::tests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Test.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::test_answers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Answers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_result(self) -> crate::models::attempts::entities::TestResult {
        use crate::models::attempts::entities::TestResult;
        use chrono::{DateTime, Utc};

        TestResult {
            id: self.id,
            test_id: self.test_id,
            student_id: self.student_id,
            attempt_number: self.attempt_number,
            started_at: DateTime::<Utc>::from_timestamp(self.started_at, 0).unwrap_or_default(),
            completed_at: self
                .completed_at
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            is_completed: self.is_completed,
            timed_out: self.timed_out,
            score: self.score,
            max_score: self.max_score,
            percentage: self.percentage,
            grade: self.grade,
        }
    }
}
