//! 题目与选项存储操作

use super::SeaOrmStorage;
use crate::entity::question_options::{
    ActiveModel as OptionActiveModel, Column as OptionColumn, Entity as QuestionOptions,
};
use crate::entity::questions::{ActiveModel, Column, Entity as Questions};
use crate::errors::{Result, TutorSystemError};
use crate::models::questions::{
    entities::{Question, QuestionOption},
    requests::{CreateQuestionRequest, OptionInput, UpdateQuestionRequest},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::collections::HashMap;

/// 写入一组选项，顺序即 order_index
async fn insert_options<C: ConnectionTrait>(
    conn: &C,
    question_id: i64,
    options: Vec<OptionInput>,
) -> Result<()> {
    for (idx, option) in options.into_iter().enumerate() {
        OptionActiveModel {
            question_id: Set(question_id),
            order_index: Set(idx as i32 + 1),
            text: Set(option.text),
            is_correct: Set(option.is_correct),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(|e| TutorSystemError::database_operation(format!("创建题目选项失败: {e}")))?;
    }
    Ok(())
}

impl SeaOrmStorage {
    /// 新增题目，未指定顺序时排在末尾
    pub async fn create_question_impl(
        &self,
        test_id: i64,
        req: CreateQuestionRequest,
    ) -> Result<Question> {
        let now = chrono::Utc::now().timestamp();

        let order_index = match req.order_index {
            Some(idx) => idx,
            None => {
                let last = Questions::find()
                    .filter(Column::TestId.eq(test_id))
                    .order_by_desc(Column::OrderIndex)
                    .one(&self.db)
                    .await
                    .map_err(|e| {
                        TutorSystemError::database_operation(format!("查询题目顺序失败: {e}"))
                    })?;
                last.map(|q| q.order_index + 1).unwrap_or(1)
            }
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let model = ActiveModel {
            test_id: Set(test_id),
            order_index: Set(order_index),
            prompt: Set(req.prompt),
            points: Set(req.points.unwrap_or(1)),
            correct_answer: Set(req.correct_answer),
            alternative_answers: Set(req.alternative_answers),
            stress_position: Set(req.stress_position),
            hint: Set(req.hint),
            created_at: Set(now),
            ..Default::default()
        };

        let inserted = model
            .insert(&txn)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("创建题目失败: {e}")))?;

        insert_options(&txn, inserted.id, req.options).await?;

        txn.commit()
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("提交事务失败: {e}")))?;

        self.get_question_by_id_impl(inserted.id)
            .await?
            .ok_or_else(|| TutorSystemError::database_operation("新建的题目未找到"))
    }

    /// 通过 ID 获取题目（含选项）
    pub async fn get_question_by_id_impl(&self, question_id: i64) -> Result<Option<Question>> {
        let Some(model) = Questions::find_by_id(question_id)
            .one(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("查询题目失败: {e}")))?
        else {
            return Ok(None);
        };

        let options = QuestionOptions::find()
            .filter(OptionColumn::QuestionId.eq(question_id))
            .order_by_asc(OptionColumn::OrderIndex)
            .all(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("查询题目选项失败: {e}")))?;

        Ok(Some(model.into_question(
            options.into_iter().map(|o| o.into_option()).collect(),
        )))
    }

    /// 测试的全部题目，按 order_index 排序
    pub async fn list_questions_impl(&self, test_id: i64) -> Result<Vec<Question>> {
        let questions = Questions::find()
            .filter(Column::TestId.eq(test_id))
            .order_by_asc(Column::OrderIndex)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("查询题目列表失败: {e}")))?;

        if questions.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
        let options = QuestionOptions::find()
            .filter(OptionColumn::QuestionId.is_in(ids))
            .order_by_asc(OptionColumn::OrderIndex)
            .all(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("查询题目选项失败: {e}")))?;

        let mut grouped: HashMap<i64, Vec<QuestionOption>> = HashMap::new();
        for option in options {
            grouped
                .entry(option.question_id)
                .or_default()
                .push(option.into_option());
        }

        Ok(questions
            .into_iter()
            .map(|q| {
                let opts = grouped.remove(&q.id).unwrap_or_default();
                q.into_question(opts)
            })
            .collect())
    }

    /// 更新题目，传入 options 时整体替换
    pub async fn update_question_impl(
        &self,
        question_id: i64,
        update: UpdateQuestionRequest,
    ) -> Result<Option<Question>> {
        let existing = Questions::find_by_id(question_id)
            .one(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("查询题目失败: {e}")))?;
        if existing.is_none() {
            return Ok(None);
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let mut model = ActiveModel {
            id: Set(question_id),
            ..Default::default()
        };
        let mut changed = false;

        if let Some(prompt) = update.prompt {
            model.prompt = Set(prompt);
            changed = true;
        }
        if let Some(points) = update.points {
            model.points = Set(points);
            changed = true;
        }
        if let Some(order_index) = update.order_index {
            model.order_index = Set(order_index);
            changed = true;
        }
        if let Some(correct_answer) = update.correct_answer {
            model.correct_answer = Set(Some(correct_answer));
            changed = true;
        }
        if let Some(alternatives) = update.alternative_answers {
            model.alternative_answers = Set(Some(alternatives));
            changed = true;
        }
        if let Some(stress_position) = update.stress_position {
            model.stress_position = Set(Some(stress_position));
            changed = true;
        }
        if let Some(hint) = update.hint {
            model.hint = Set(Some(hint));
            changed = true;
        }

        if changed {
            model
                .update(&txn)
                .await
                .map_err(|e| TutorSystemError::database_operation(format!("更新题目失败: {e}")))?;
        }

        if let Some(options) = update.options {
            QuestionOptions::delete_many()
                .filter(OptionColumn::QuestionId.eq(question_id))
                .exec(&txn)
                .await
                .map_err(|e| {
                    TutorSystemError::database_operation(format!("删除旧选项失败: {e}"))
                })?;
            insert_options(&txn, question_id, options).await?;
        }

        txn.commit()
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("提交事务失败: {e}")))?;

        self.get_question_by_id_impl(question_id).await
    }

    /// 删除题目及其选项
    pub async fn delete_question_impl(&self, question_id: i64) -> Result<bool> {
        QuestionOptions::delete_many()
            .filter(OptionColumn::QuestionId.eq(question_id))
            .exec(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("删除题目选项失败: {e}")))?;

        let result = Questions::delete_by_id(question_id)
            .exec(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("删除题目失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
