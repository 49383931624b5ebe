//! 班级存储操作

use super::SeaOrmStorage;
use crate::entity::class_students::{Column as ClassStudentColumn, Entity as ClassStudents};
use crate::entity::classes::{ActiveModel, Column, Entity as Classes};
use crate::entity::test_assignments::{Column as AssignmentColumn, Entity as TestAssignments};
use crate::errors::{Result, TutorSystemError};
use crate::models::{
    PaginationInfo, page_window,
    classes::{
        entities::Class,
        requests::{ClassListQuery, CreateClassRequest, UpdateClassRequest},
        responses::ClassListResponse,
    },
};
use crate::utils::{escape_like_pattern, random_code::generate_random_code};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    SqlErr,
};

const INVITE_CODE_LEN: usize = 8;
const INVITE_CODE_RETRIES: usize = 5;

impl SeaOrmStorage {
    /// 创建班级，自动生成唯一邀请码
    pub async fn create_class_impl(&self, teacher_id: i64, req: CreateClassRequest) -> Result<Class> {
        let now = chrono::Utc::now().timestamp();

        let mut invite_code = generate_random_code(INVITE_CODE_LEN);
        let mut retries = 0;
        while self.get_class_by_code_impl(&invite_code).await?.is_some() {
            retries += 1;
            if retries >= INVITE_CODE_RETRIES {
                return Err(TutorSystemError::conflict("无法生成唯一的班级邀请码"));
            }
            invite_code = generate_random_code(INVITE_CODE_LEN);
        }

        let model = ActiveModel {
            teacher_id: Set(teacher_id),
            name: Set(req.name),
            description: Set(req.description),
            invite_code: Set(invite_code),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("创建班级失败: {e}")))?;

        Ok(result.into_class())
    }

    /// 通过 ID 获取班级
    pub async fn get_class_by_id_impl(&self, class_id: i64) -> Result<Option<Class>> {
        let result = Classes::find_by_id(class_id)
            .one(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("查询班级失败: {e}")))?;

        Ok(result.map(|m| m.into_class()))
    }

    /// 通过邀请码获取班级
    pub async fn get_class_by_code_impl(&self, invite_code: &str) -> Result<Option<Class>> {
        let result = Classes::find()
            .filter(Column::InviteCode.eq(invite_code))
            .one(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("查询班级失败: {e}")))?;

        Ok(result.map(|m| m.into_class()))
    }

    /// 分页列出班级
    pub async fn list_classes_with_pagination_impl(
        &self,
        query: ClassListQuery,
    ) -> Result<ClassListResponse> {
        let (page, size) = page_window(query.page, query.size);

        let mut select = Classes::find();

        // 教师筛选
        if let Some(teacher_id) = query.teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }

        // 搜索条件
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(Column::Name.contains(&escaped));
        }

        select = select.order_by_desc(Column::CreatedAt);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("查询班级总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("查询班级页数失败: {e}")))?;

        let classes = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("查询班级列表失败: {e}")))?;

        Ok(ClassListResponse {
            items: classes.into_iter().map(|m| m.into_class()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 学生加入的班级 ID
    async fn student_class_ids(&self, student_id: i64) -> Result<Vec<i64>> {
        let records = ClassStudents::find()
            .filter(ClassStudentColumn::StudentId.eq(student_id))
            .all(&self.db)
            .await
            .map_err(|e| {
                TutorSystemError::database_operation(format!("查询学生班级关联失败: {e}"))
            })?;

        Ok(records.iter().map(|cs| cs.class_id).collect())
    }

    /// 分页列出学生所在的班级
    pub async fn list_student_classes_with_pagination_impl(
        &self,
        student_id: i64,
        query: ClassListQuery,
    ) -> Result<ClassListResponse> {
        let (page, size) = page_window(query.page, query.size);

        let class_ids = self.student_class_ids(student_id).await?;

        if class_ids.is_empty() {
            return Ok(ClassListResponse {
                items: vec![],
                pagination: PaginationInfo::empty(page, size),
            });
        }

        let mut select = Classes::find().filter(Column::Id.is_in(class_ids));

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(Column::Name.contains(&escaped));
        }

        select = select.order_by_desc(Column::CreatedAt);

        let paginator = select.paginate(&self.db, size);
        let total = paginator.num_items().await.map_err(|e| {
            TutorSystemError::database_operation(format!("查询学生班级总数失败: {e}"))
        })?;

        let pages = paginator.num_pages().await.map_err(|e| {
            TutorSystemError::database_operation(format!("查询学生班级页数失败: {e}"))
        })?;

        let classes = paginator.fetch_page(page - 1).await.map_err(|e| {
            TutorSystemError::database_operation(format!("查询学生班级列表失败: {e}"))
        })?;

        Ok(ClassListResponse {
            items: classes.into_iter().map(|m| m.into_class()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 学生加入的全部班级
    pub async fn list_classes_for_student_impl(&self, student_id: i64) -> Result<Vec<Class>> {
        let class_ids = self.student_class_ids(student_id).await?;
        if class_ids.is_empty() {
            return Ok(vec![]);
        }

        let classes = Classes::find()
            .filter(Column::Id.is_in(class_ids))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("查询学生班级失败: {e}")))?;

        Ok(classes.into_iter().map(|m| m.into_class()).collect())
    }

    /// 更新班级信息
    pub async fn update_class_impl(
        &self,
        class_id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>> {
        let existing = self.get_class_by_id_impl(class_id).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        let mut model = ActiveModel {
            id: Set(class_id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name);
        }

        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }

        if let Some(is_active) = update.is_active {
            model.is_active = Set(is_active);
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("更新班级失败: {e}")))?;

        self.get_class_by_id_impl(class_id).await
    }

    /// 删除班级
    pub async fn delete_class_impl(&self, class_id: i64) -> Result<bool> {
        // 分配记录随班级一起删除
        TestAssignments::delete_many()
            .filter(AssignmentColumn::ClassId.eq(class_id))
            .exec(&self.db)
            .await
            .map_err(|e| TutorSystemError::database_operation(format!("删除班级测试分配失败: {e}")))?;

        let result = Classes::delete_by_id(class_id)
            .exec(&self.db)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                    TutorSystemError::conflict("班级中仍有学生")
                }
                _ => TutorSystemError::database_operation(format!("删除班级失败: {e}")),
            })?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::models::classes::requests::{
        ClassListQuery, CreateClassRequest, UpdateClassRequest,
    };
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::users::test_support::make_user;

    fn class_request(name: &str) -> CreateClassRequest {
        CreateClassRequest {
            teacher_id: None,
            name: name.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_class_generates_invite_code() {
        let storage = SeaOrmStorage::in_memory().await;
        let teacher = make_user(&storage, "teacher", UserRole::Teacher).await;

        let class = storage
            .create_class_impl(teacher.id, class_request("5A"))
            .await
            .unwrap();
        assert_eq!(class.invite_code.len(), 8);
        assert!(class.is_active);

        let found = storage
            .get_class_by_code_impl(&class.invite_code)
            .await
            .unwrap();
        assert_eq!(found.map(|c| c.id), Some(class.id));
    }

    #[tokio::test]
    async fn test_list_classes_by_teacher_and_student() {
        let storage = SeaOrmStorage::in_memory().await;
        let t1 = make_user(&storage, "t1", UserRole::Teacher).await;
        let t2 = make_user(&storage, "t2", UserRole::Teacher).await;
        let student = make_user(&storage, "s1", UserRole::Student).await;

        let a = storage.create_class_impl(t1.id, class_request("Alpha")).await.unwrap();
        storage.create_class_impl(t1.id, class_request("Beta")).await.unwrap();
        storage.create_class_impl(t2.id, class_request("Gamma")).await.unwrap();

        let query = ClassListQuery {
            page: None,
            size: None,
            teacher_id: Some(t1.id),
            search: None,
        };
        let listed = storage.list_classes_with_pagination_impl(query.clone()).await.unwrap();
        assert_eq!(listed.pagination.total, 2);

        let empty = storage
            .list_student_classes_with_pagination_impl(student.id, query.clone())
            .await
            .unwrap();
        assert!(empty.items.is_empty());

        storage.add_student_to_class_impl(a.id, student.id).await.unwrap();
        let joined = storage.list_classes_for_student_impl(student.id).await.unwrap();
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].name, "Alpha");
    }

    #[tokio::test]
    async fn test_update_class_toggles_active() {
        let storage = SeaOrmStorage::in_memory().await;
        let teacher = make_user(&storage, "teacher", UserRole::Teacher).await;
        let class = storage.create_class_impl(teacher.id, class_request("5A")).await.unwrap();

        let updated = storage
            .update_class_impl(
                class.id,
                UpdateClassRequest {
                    name: None,
                    description: Some("morning group".to_string()),
                    is_active: Some(false),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(!updated.is_active);
        assert_eq!(updated.description.as_deref(), Some("morning group"));

        assert!(storage.update_class_impl(9999, UpdateClassRequest {
            name: None,
            description: None,
            is_active: None,
        }).await.unwrap().is_none());
    }
}
