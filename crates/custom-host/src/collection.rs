use std::{
    any::Any,
    borrow::Cow,
    collections::BTreeMap,
    fmt,
    sync::Arc,
};

use crate::{
    error::{BoxError, ServiceRegistrationError},
    key::ServiceKey,
};

pub(crate) type AnyService = Arc<dyn Any + Send + Sync>;
pub(crate) type AnyFactory = Arc<dyn Fn() -> Result<AnyService, BoxError> + Send + Sync>;

/// 绑定的实例化方式。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceLifetime {
    /// 注册时即持有的共享实例，每次解析返回同一个 `Arc`。
    Singleton,
    /// 每次解析都调用工厂生成新实例。
    Transient,
}

/// 服务注册项，封装直接实例或惰性工厂的两种形态。
#[derive(Clone)]
pub(crate) enum ServiceEntry {
    Instance(AnyService),
    Factory(AnyFactory),
}

impl ServiceEntry {
    pub(crate) fn lifetime(&self) -> ServiceLifetime {
        match self {
            ServiceEntry::Instance(_) => ServiceLifetime::Singleton,
            ServiceEntry::Factory(_) => ServiceLifetime::Transient,
        }
    }

    pub(crate) fn produce(&self) -> Result<AnyService, BoxError> {
        match self {
            ServiceEntry::Instance(instance) => Ok(Arc::clone(instance)),
            ServiceEntry::Factory(factory) => factory(),
        }
    }
}

impl fmt::Debug for ServiceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceEntry::Instance(_) => f
                .debug_tuple("ServiceEntry::Instance")
                .field(&"Arc<dyn Any>")
                .finish(),
            ServiceEntry::Factory(_) => f
                .debug_tuple("ServiceEntry::Factory")
                .field(&"Fn() -> Result<..>")
                .finish(),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Binding {
    pub(crate) entry: ServiceEntry,
    pub(crate) default: bool,
}

/// `ServiceCollection` 是注册动作操作的可变绑定表。
///
/// # 教案级注释
/// - **生命周期 (Where)**：由 [`HostBuilder::build`](crate::HostBuilder::build) 为每次构建新建，
///   依次交给注册动作修改，随后被编译为 [`ServiceProvider`](crate::ServiceProvider) 并丢弃；
/// - **绑定语义 (What)**：
///   - `add_*` 覆盖同键绑定（后写者胜出）；
///   - `try_add_*` 遇到已有的非默认绑定时返回 [`ServiceRegistrationError::Duplicate`]；
///   - 默认绑定（如 [`HostOptions`](crate::HostOptions)）可被任何方式覆盖，覆盖后视为自定义绑定；
/// - **内部结构 (How)**：`BTreeMap<ServiceKey, Binding>`，值统一擦除为 `Arc<dyn Any + Send + Sync>`，
///   解析时按 [`TypeId`](std::any::TypeId) 向下转型。
#[derive(Default)]
pub struct ServiceCollection {
    bindings: BTreeMap<ServiceKey, Binding>,
    requirements: Vec<ServiceKey>,
}

impl fmt::Debug for ServiceCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<String> = self.bindings.keys().map(ToString::to_string).collect();
        f.debug_struct("ServiceCollection")
            .field("bindings", &keys)
            .field("requirements", &self.requirements.len())
            .finish()
    }
}

impl ServiceCollection {
    /// 构造不含任何绑定的集合。
    pub fn new() -> Self {
        Self::default()
    }

    /// 绑定类型 `T` 的单例实例，覆盖已有绑定。
    pub fn add_singleton<T>(&mut self, value: T) -> &mut Self
    where
        T: Send + Sync + 'static,
    {
        self.insert(ServiceKey::of::<T>(), instance(value), false);
        self
    }

    /// 以名称绑定类型 `T` 的单例实例，覆盖已有同名绑定。
    pub fn add_named_singleton<T>(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        value: T,
    ) -> &mut Self
    where
        T: Send + Sync + 'static,
    {
        self.insert(ServiceKey::named::<T>(name), instance(value), false);
        self
    }

    /// 绑定类型 `T` 的瞬态工厂，覆盖已有绑定。
    pub fn add_transient<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.insert(ServiceKey::of::<T>(), erase_factory(factory), false);
        self
    }

    /// 以名称绑定类型 `T` 的瞬态工厂，覆盖已有同名绑定。
    pub fn add_named_transient<T, F>(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        factory: F,
    ) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.insert(ServiceKey::named::<T>(name), erase_factory(factory), false);
        self
    }

    /// 仅在尚无自定义绑定时注册单例。
    ///
    /// - **返回值**：成功时链式返回 `&mut Self`；键已被自定义绑定占用时返回
    ///   [`ServiceRegistrationError::Duplicate`]，集合保持不变。
    pub fn try_add_singleton<T>(&mut self, value: T) -> Result<&mut Self, ServiceRegistrationError>
    where
        T: Send + Sync + 'static,
    {
        self.try_insert(ServiceKey::of::<T>(), instance(value))?;
        Ok(self)
    }

    pub fn try_add_named_singleton<T>(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        value: T,
    ) -> Result<&mut Self, ServiceRegistrationError>
    where
        T: Send + Sync + 'static,
    {
        self.try_insert(ServiceKey::named::<T>(name), instance(value))?;
        Ok(self)
    }

    /// 仅在尚无自定义绑定时注册瞬态工厂。
    pub fn try_add_transient<T, F>(
        &mut self,
        factory: F,
    ) -> Result<&mut Self, ServiceRegistrationError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.try_insert(ServiceKey::of::<T>(), erase_factory(factory))?;
        Ok(self)
    }

    pub fn try_add_named_transient<T, F>(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        factory: F,
    ) -> Result<&mut Self, ServiceRegistrationError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.try_insert(ServiceKey::named::<T>(name), erase_factory(factory))?;
        Ok(self)
    }

    /// 移除类型 `T` 的匿名绑定，返回是否存在过。
    pub fn remove<T: 'static>(&mut self) -> bool {
        self.bindings.remove(&ServiceKey::of::<T>()).is_some()
    }

    pub fn remove_named<T: 'static>(&mut self, name: impl Into<Cow<'static, str>>) -> bool {
        self.bindings.remove(&ServiceKey::named::<T>(name)).is_some()
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.bindings.contains_key(&ServiceKey::of::<T>())
    }

    pub fn contains_named<T: 'static>(&self, name: impl Into<Cow<'static, str>>) -> bool {
        self.bindings.contains_key(&ServiceKey::named::<T>(name))
    }

    /// 声明宿主运行必需类型 `T` 的匿名绑定；编译阶段若缺失则构建失败。
    pub fn require<T: 'static>(&mut self) -> &mut Self {
        self.requirements.push(ServiceKey::of::<T>());
        self
    }

    /// 声明宿主运行必需类型 `T` 的具名绑定。
    pub fn require_named<T: 'static>(&mut self, name: impl Into<Cow<'static, str>>) -> &mut Self {
        self.requirements.push(ServiceKey::named::<T>(name));
        self
    }

    /// 当前绑定数量，包含默认绑定。
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// 按键顺序遍历所有绑定键。
    pub fn keys(&self) -> impl Iterator<Item = &ServiceKey> {
        self.bindings.keys()
    }

    /// 写入由集合本身提供的默认绑定。
    pub(crate) fn add_default_singleton<T>(&mut self, value: T) -> &mut Self
    where
        T: Send + Sync + 'static,
    {
        self.insert(ServiceKey::of::<T>(), instance(value), true);
        self
    }

    /// 读取类型 `T` 的匿名单例绑定；未绑定或绑定为工厂时返回 `None`。
    pub(crate) fn singleton<T>(&self) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        match &self.bindings.get(&ServiceKey::of::<T>())?.entry {
            ServiceEntry::Instance(instance) => Arc::clone(instance).downcast::<T>().ok(),
            ServiceEntry::Factory(_) => None,
        }
    }

    pub(crate) fn into_parts(self) -> (BTreeMap<ServiceKey, Binding>, Vec<ServiceKey>) {
        (self.bindings, self.requirements)
    }

    fn insert(&mut self, key: ServiceKey, entry: ServiceEntry, default: bool) {
        if let Some(previous) = self.bindings.get(&key)
            && !previous.default
        {
            tracing::debug!(service = %key, "service binding overridden");
        }
        self.bindings.insert(key, Binding { entry, default });
    }

    fn try_insert(
        &mut self,
        key: ServiceKey,
        entry: ServiceEntry,
    ) -> Result<(), ServiceRegistrationError> {
        if self.bindings.get(&key).is_some_and(|binding| !binding.default) {
            return Err(ServiceRegistrationError::Duplicate { key });
        }
        self.bindings.insert(
            key,
            Binding {
                entry,
                default: false,
            },
        );
        Ok(())
    }
}

fn instance<T>(value: T) -> ServiceEntry
where
    T: Send + Sync + 'static,
{
    ServiceEntry::Instance(Arc::new(value))
}

fn erase_factory<T, F>(factory: F) -> ServiceEntry
where
    T: Send + Sync + 'static,
    F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
{
    ServiceEntry::Factory(Arc::new(move || {
        factory().map(|value| Arc::new(value) as AnyService)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_overrides_previous_binding() {
        let mut services = ServiceCollection::new();
        services.add_singleton(1_u32).add_singleton(2_u32);
        assert_eq!(services.len(), 1);
        let (bindings, _) = services.into_parts();
        let value = bindings[&ServiceKey::of::<u32>()]
            .entry
            .produce()
            .ok()
            .and_then(|any| any.downcast::<u32>().ok());
        assert_eq!(value.as_deref(), Some(&2));
    }

    #[test]
    fn try_add_rejects_custom_binding_but_replaces_default() {
        let mut services = ServiceCollection::new();
        services.add_default_singleton(String::from("default"));
        assert!(services.try_add_singleton(String::from("custom")).is_ok());

        assert!(matches!(
            services.try_add_singleton(String::from("again")),
            Err(ServiceRegistrationError::Duplicate { key }) if key == ServiceKey::of::<String>()
        ));
    }

    #[test]
    fn named_bindings_are_independent_of_anonymous_ones() {
        let mut services = ServiceCollection::new();
        services
            .add_singleton(80_u16)
            .add_named_singleton("admin", 8080_u16);
        assert!(services.contains::<u16>());
        assert!(services.contains_named::<u16>("admin"));
        assert!(services.remove::<u16>());
        assert!(!services.contains::<u16>());
        assert!(services.contains_named::<u16>("admin"));
    }

    #[test]
    fn try_add_variants_reject_existing_custom_bindings() {
        let mut services = ServiceCollection::new();
        services
            .add_singleton(1_u8)
            .add_named_singleton("primary", 2_u8)
            .add_named_transient("replica", || Ok(3_u8));

        assert!(matches!(
            services.try_add_transient(|| Ok(4_u8)),
            Err(ServiceRegistrationError::Duplicate { key }) if key == ServiceKey::of::<u8>()
        ));
        assert!(matches!(
            services.try_add_named_singleton("primary", 5_u8),
            Err(ServiceRegistrationError::Duplicate { key })
                if key == ServiceKey::named::<u8>("primary")
        ));
        assert!(matches!(
            services.try_add_named_transient("replica", || Ok(6_u8)),
            Err(ServiceRegistrationError::Duplicate { key })
                if key == ServiceKey::named::<u8>("replica")
        ));
        assert!(services.try_add_named_transient("standby", || Ok(7_u8)).is_ok());
        assert_eq!(services.len(), 4);
    }

    #[test]
    fn remove_named_reports_whether_binding_existed() {
        let mut services = ServiceCollection::new();
        services.add_named_singleton("admin", 8080_u16);
        assert!(services.remove_named::<u16>("admin"));
        assert!(!services.remove_named::<u16>("admin"));
        assert!(!services.contains_named::<u16>("admin"));
    }

    #[test]
    fn overriding_singleton_is_readable_but_factories_are_not() {
        let mut services = ServiceCollection::new();
        services.add_default_singleton(String::from("default"));
        assert_eq!(services.singleton::<String>().as_deref().map(String::as_str), Some("default"));

        services.add_transient(|| Ok(String::from("lazy")));
        assert!(services.singleton::<String>().is_none());
    }
}
