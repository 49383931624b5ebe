//! 部分更新字段：缺失表示不改，显式 null 表示清空

use serde::{Deserialize, Deserializer};

/// 配合 `#[serde(default, deserialize_with = "nullable_field")]` 使用
///
/// - 字段缺失 => `None`
/// - `null` => `Some(None)`
/// - 有值 => `Some(Some(v))`
pub fn nullable_field<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
