//! 作答答案实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "test_answers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub result_id: i64,
    pub question_id: i64,
    pub answer_text: Option<String>,
    /// JSON 数组文本
    pub selected_option_ids: Option<String>,
    pub is_correct: bool,
    pub points_earned: i32,
    pub answered_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::test_results::Entity",
        from = "Column::ResultId",
        to = "super::test_results::Column::Id"
    )]
    TestResult,
    #[sea_orm(
        belongs_to = "super::questions::Entity",
        from = "Column::QuestionId",
        to = "super::questions::Column::Id"
    )]
    Question,
}

impl Related<super::test_results::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TestResult.def()
    }
}

impl Related<super::questions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Question.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_answer(self) -> crate::models::attempts::entities::TestAnswer {
        use crate::models::attempts::entities::TestAnswer;
        use chrono::{DateTime, Utc};

        let selected_option_ids = self
            .selected_option_ids
            .as_deref()
            .and_then(|json| serde_json::from_str::<Vec<i64>>(json).ok())
            .unwrap_or_default();

        TestAnswer {
            id: self.id,
            result_id: self.result_id,
            question_id: self.question_id,
            answer_text: self.answer_text,
            selected_option_ids,
            is_correct: self.is_correct,
            points_earned: self.points_earned,
            answered_at: DateTime::<Utc>::from_timestamp(self.answered_at, 0).unwrap_or_default(),
        }
    }
}
