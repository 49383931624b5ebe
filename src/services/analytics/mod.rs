pub mod aggregate;
pub mod class_report;
pub mod student_report;
pub mod test_report;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::warn;

use crate::cache::ObjectCache;
use crate::services::common::storage_from;
use crate::storage::Storage;

/// 测试统计快照的缓存键
pub(crate) fn test_analytics_key(test_id: i64) -> String {
    format!("analytics:test:{test_id}")
}

/// 清除测试统计快照
///
/// 作答、题目、分配和班级成员的任何变动都会影响统计，写入成功后调用。
pub(crate) async fn invalidate_test_analytics(
    cache: Option<&Arc<dyn ObjectCache>>,
    test_ids: impl IntoIterator<Item = i64>,
) {
    if let Some(cache) = cache {
        for test_id in test_ids {
            cache.remove(&test_analytics_key(test_id)).await;
        }
    }
}

/// 班级成员变动后清除分配给该班级的所有测试快照
pub(crate) async fn invalidate_class_analytics(
    storage: &Arc<dyn Storage>,
    cache: Option<&Arc<dyn ObjectCache>>,
    class_id: i64,
) {
    let Some(cache) = cache else {
        return;
    };
    match storage.list_class_assignments(class_id).await {
        Ok(assignments) => {
            invalidate_test_analytics(Some(cache), assignments.iter().map(|a| a.test_id)).await;
        }
        Err(e) => warn!("Failed to load assignments of class {}: {}", class_id, e),
    }
}

pub struct AnalyticsService {
    storage: Option<Arc<dyn Storage>>,
}

impl AnalyticsService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => storage_from(request),
        }
    }

    pub async fn test_analytics(
        &self,
        request: &HttpRequest,
        test_id: i64,
    ) -> ActixResult<HttpResponse> {
        test_report::test_analytics(self, request, test_id).await
    }

    pub async fn class_analytics(
        &self,
        request: &HttpRequest,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        class_report::class_analytics(self, request, class_id).await
    }

    pub async fn student_analytics(
        &self,
        request: &HttpRequest,
        student_id: i64,
    ) -> ActixResult<HttpResponse> {
        student_report::student_analytics(self, request, student_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    use crate::cache::object_cache::moka::MokaCacheWrapper;
    use crate::models::class_students::requests::JoinClassRequest;
    use crate::models::classes::requests::CreateClassRequest;
    use crate::models::tests::entities::TestType;
    use crate::models::users::entities::UserRole;
    use crate::services::class_students::ClassStudentService;
    use crate::services::common::test_support::request_as;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::tests::test_support::make_test;
    use crate::storage::sea_orm_storage::users::test_support::make_user;

    #[tokio::test]
    async fn test_joining_class_drops_assigned_test_snapshots() {
        let db = SeaOrmStorage::in_memory().await;
        let teacher = make_user(&db, "teacher", UserRole::Teacher).await;
        let student = make_user(&db, "student", UserRole::Student).await;
        let assigned = make_test(&db, teacher.id, TestType::Spelling, 0, 1).await;
        let other = make_test(&db, teacher.id, TestType::Regular, 0, 1).await;
        let storage: Arc<dyn Storage> = Arc::new(db);
        let class = storage
            .create_class(
                teacher.id,
                CreateClassRequest {
                    teacher_id: None,
                    name: "9А".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap();
        storage.assign_test(assigned.id, class.id, None).await.unwrap();

        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_settings(100, 60));
        for id in [assigned.id, other.id] {
            cache.insert_raw(test_analytics_key(id), "{}".to_string(), 0).await;
        }

        let req = request_as(&storage, Some(&cache), &student);
        let resp = ClassStudentService::new_lazy()
            .join_class(
                &req,
                JoinClassRequest {
                    invite_code: class.invite_code.clone(),
                },
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        assert!(
            cache
                .get_json::<serde_json::Value>(&test_analytics_key(assigned.id))
                .await
                .is_none()
        );
        assert!(
            cache
                .get_json::<serde_json::Value>(&test_analytics_key(other.id))
                .await
                .is_some()
        );
    }
}
