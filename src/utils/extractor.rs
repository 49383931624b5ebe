//! 路径参数提取器
//!
//! 既可直接作为 handler 参数（读取指定名称的路径参数），
//! 也可放进 `web::Path<(A, B)>` 元组中按位置反序列化。

use actix_web::{HttpResponse, error::InternalError};

use crate::models::{ApiResponse, ErrorCode};

pub(crate) fn invalid_id_error(param: &str) -> actix_web::Error {
    InternalError::from_response(
        format!("invalid path parameter: {param}"),
        HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            format!("路径参数 {param} 必须为正整数"),
        )),
    )
    .into()
}

pub(crate) fn parse_positive_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}

#[macro_export]
macro_rules! define_safe_i64_extractor {
    ($name:ident, $param:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name(pub i64);

        impl actix_web::FromRequest for $name {
            type Error = actix_web::Error;
            type Future = futures_util::future::Ready<Result<Self, Self::Error>>;

            fn from_request(
                req: &actix_web::HttpRequest,
                _payload: &mut actix_web::dev::Payload,
            ) -> Self::Future {
                let parsed = req
                    .match_info()
                    .get($param)
                    .and_then($crate::utils::extractor::parse_positive_id)
                    .map($name)
                    .ok_or_else(|| $crate::utils::extractor::invalid_id_error($param));
                futures_util::future::ready(parsed)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                $crate::utils::extractor::parse_positive_id(&raw)
                    .map($name)
                    .ok_or_else(|| {
                        serde::de::Error::custom(format!("路径参数 {} 必须为正整数", $param))
                    })
            }
        }
    };
}

define_safe_i64_extractor!(SafeIDI64, "id");
define_safe_i64_extractor!(SafeClassIdI64, "class_id");
define_safe_i64_extractor!(SafeTestIdI64, "test_id");
define_safe_i64_extractor!(SafeQuestionIdI64, "question_id");
define_safe_i64_extractor!(SafeResultIdI64, "result_id");
define_safe_i64_extractor!(SafeStudentIdI64, "student_id");
