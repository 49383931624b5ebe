use super::entities::ClassStudentDetail;
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class_student.ts")]
pub struct ClassStudentListResponse {
    pub items: Vec<ClassStudentDetail>,
    pub pagination: PaginationInfo,
}
