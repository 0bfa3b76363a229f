use std::{
    any::{TypeId, type_name},
    borrow::Cow,
    fmt,
};

/// `ServiceKey` 标识服务集合中的一条绑定。
///
/// # 教案级注释
/// - **组成 (What)**：服务的 [`TypeId`]、用于诊断输出的类型名，以及可选的绑定名称；
/// - **相等性 (How)**：`TypeId` 与名称共同决定身份，同一类型可以同时存在匿名绑定与多个具名绑定；
/// - **排序**：派生 `Ord`，使 `BTreeMap` 中的遍历顺序在同一次编译产物内保持稳定。
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceKey {
    type_id: TypeId,
    type_name: &'static str,
    name: Option<Cow<'static, str>>,
}

impl ServiceKey {
    /// 类型 `T` 的匿名绑定键。
    pub fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            name: None,
        }
    }

    /// 类型 `T` 的具名绑定键。
    pub fn named<T: 'static>(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            name: Some(name.into()),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}#{name}", self.type_name),
            None => f.write_str(self.type_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_and_anonymous_keys_differ() {
        assert_ne!(ServiceKey::of::<u32>(), ServiceKey::named::<u32>("primary"));
        assert_eq!(
            ServiceKey::named::<u32>("primary"),
            ServiceKey::named::<u32>(String::from("primary"))
        );
    }

    #[test]
    fn display_includes_binding_name() {
        assert_eq!(ServiceKey::of::<u32>().to_string(), "u32");
        assert_eq!(ServiceKey::named::<u32>("port").to_string(), "u32#port");
    }
}
