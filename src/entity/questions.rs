//! 题目实体
//!
//! 各题型专属字段均可为空，由业务层按测试类型校验。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "questions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub test_id: i64,
    pub order_index: i32,
    pub prompt: String,
    pub points: i32,
    pub correct_answer: Option<String>,
    pub alternative_answers: Option<String>,
    pub stress_position: Option<i32>,
    pub hint: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tests::Entity",
        from = "Column::TestId",
        to = "super::tests::Column::Id"
    )]
    Test,
    #[sea_orm(has_many = "super::question_options::Entity")]
    Options,
}

impl Related<super::tests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Test.def()
    }
}

impl Related<super::question_options::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Options.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 选项需单独查询后传入
    pub fn into_question(
        self,
        options: Vec<crate::models::questions::entities::QuestionOption>,
    ) -> crate::models::questions::entities::Question {
        use crate::models::questions::entities::Question;
        use chrono::{DateTime, Utc};

        Question {
            id: self.id,
            test_id: self.test_id,
            order_index: self.order_index,
            prompt: self.prompt,
            points: self.points,
            correct_answer: self.correct_answer,
            alternative_answers: self.alternative_answers,
            stress_position: self.stress_position,
            hint: self.hint,
            options,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        }
    }
}
