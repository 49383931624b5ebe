//! 班级学生关联存储操作

use super::SeaOrmStorage;
use crate::entity::class_students::{ActiveModel, Column, Entity as ClassStudents};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{Result, TutorSystemError};
use crate::models::{
    PaginationInfo, page_window,
    class_students::{
        entities::{ClassStudent, ClassStudentDetail},
        requests::ClassStudentQuery,
        responses::ClassStudentListResponse,
    },
};
use crate::utils::escape_like_pattern;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set, SqlErr,
};

impl SeaOrmStorage {
    /// 统计班级学生人数
    pub async fn count_class_students_impl(&self, class_id: i64) -> Result<u64> {
        let count = ClassStudents::find()
            .filter(Column::ClassId.eq(class_id))
            .count(&self.db)
            .await
            .map_err(|e| {
                TutorSystemError::database_operation(format!("查询班级学生数量失败: {e}"))
            })?;

        Ok(count)
    }

    /// 学生加入班级
    pub async fn add_student_to_class_impl(
        &self,
        class_id: i64,
        student_id: i64,
    ) -> Result<ClassStudent> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            class_id: Set(class_id),
            student_id: Set(student_id),
            joined_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                TutorSystemError::conflict("学生已在该班级中")
            }
            _ => TutorSystemError::database_operation(format!("加入班级失败: {e}")),
        })?;

        Ok(result.into_class_student())
    }

    /// 学生离开/被移出班级
    pub async fn remove_student_from_class_impl(
        &self,
        class_id: i64,
        student_id: i64,
    ) -> Result<bool> {
        let result = ClassStudents::delete_many()
            .filter(
                Condition::all()
                    .add(Column::StudentId.eq(student_id))
                    .add(Column::ClassId.eq(class_id)),
            )
            .exec(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("移出班级失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 获取学生在班级中的记录
    pub async fn get_class_student_impl(
        &self,
        class_id: i64,
        student_id: i64,
    ) -> Result<Option<ClassStudent>> {
        let result = ClassStudents::find()
            .filter(
                Condition::all()
                    .add(Column::StudentId.eq(student_id))
                    .add(Column::ClassId.eq(class_id)),
            )
            .one(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("查询班级学生失败: {e}")))?;

        Ok(result.map(|m| m.into_class_student()))
    }

    /// 分页列出班级学生（附带学生信息）
    pub async fn list_class_students_with_pagination_impl(
        &self,
        class_id: i64,
        query: ClassStudentQuery,
    ) -> Result<ClassStudentListResponse> {
        let (page, size) = page_window(query.page, query.size);

        let mut select = ClassStudents::find()
            .find_also_related(Users)
            .filter(Column::ClassId.eq(class_id));

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(UserColumn::Username.contains(&escaped))
                    .add(UserColumn::DisplayName.contains(&escaped)),
            );
        }

        let select = select.order_by_asc(Column::JoinedAt);

        let paginator = select.paginate(&self.db, size);
        let total = paginator.num_items().await.map_err(|e| {
            TutorSystemError::database_operation(format!("查询班级学生总数失败: {e}"))
        })?;

        let pages = paginator.num_pages().await.map_err(|e| {
            TutorSystemError::database_operation(format!("查询班级学生页数失败: {e}"))
        })?;

        let rows = paginator.fetch_page(page - 1).await.map_err(|e| {
            TutorSystemError::database_operation(format!("查询班级学生列表失败: {e}"))
        })?;

        let items = rows
            .into_iter()
            .filter_map(|(cs, user)| {
                user.map(|u| ClassStudentDetail {
                    student_id: cs.student_id,
                    username: u.username,
                    display_name: u.display_name,
                    email: u.email,
                    joined_at: DateTime::<Utc>::from_timestamp(cs.joined_at, 0)
                        .unwrap_or_default(),
                })
            })
            .collect();

        Ok(ClassStudentListResponse {
            items,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 班级全部学生 ID
    pub async fn list_class_student_ids_impl(&self, class_id: i64) -> Result<Vec<i64>> {
        let records = ClassStudents::find()
            .filter(Column::ClassId.eq(class_id))
            .order_by_asc(Column::StudentId)
            .all(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("查询班级学生失败: {e}")))?;

        Ok(records.into_iter().map(|m| m.student_id).collect())
    }
}
