use std::{borrow::Cow, sync::Arc};

use crate::{
    collection::ServiceLifetime,
    error::ResolveError,
    key::ServiceKey,
    options::HostOptions,
    provider::ServiceProvider,
};

/// `Host` 是构建阶段的最终产物，只负责向应用代码提供已注册的服务。
///
/// # 教案级注释
/// - **体系位置 (Where)**
///   - 由 [`HostBuilder::build`](crate::HostBuilder::build) 生成，随后交由应用主循环持有；
///   - 不再具备任何注册能力，构建之后的绑定集合固定不变。
/// - **关键要素 (How)**
///   - `provider`：编译后的 [`ServiceProvider`]；
///   - `options`：生效的 [`HostOptions`]，同时也以默认单例的形式可被解析。
/// - **契约说明 (What)**
///   - `Host` 满足 `Clone + Send + Sync`，克隆体共享同一份只读绑定表；
///   - 结构体自身不执行任何 I/O。
#[derive(Clone, Debug)]
pub struct Host {
    options: Arc<HostOptions>,
    provider: ServiceProvider,
}

impl Host {
    pub(crate) fn new(options: Arc<HostOptions>, provider: ServiceProvider) -> Self {
        Self { options, provider }
    }

    /// 宿主名称，来自 [`HostOptions::name`]。
    pub fn name(&self) -> &str {
        &self.options.name
    }

    pub fn options(&self) -> &HostOptions {
        &self.options
    }

    /// 访问底层解析视图。
    pub fn services(&self) -> &ServiceProvider {
        &self.provider
    }

    /// 解析类型 `T`，未注册或工厂失败时返回 `None`。
    pub fn get<T>(&self) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        self.provider.resolve().ok()
    }

    pub fn get_named<T>(&self, name: impl Into<Cow<'static, str>>) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        self.provider.resolve_named(name).ok()
    }

    /// 解析类型 `T` 并保留失败原因。
    pub fn resolve<T>(&self) -> Result<Arc<T>, ResolveError>
    where
        T: Send + Sync + 'static,
    {
        self.provider.resolve()
    }

    pub fn resolve_named<T>(
        &self,
        name: impl Into<Cow<'static, str>>,
    ) -> Result<Arc<T>, ResolveError>
    where
        T: Send + Sync + 'static,
    {
        self.provider.resolve_named(name)
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.provider.contains_key(&ServiceKey::of::<T>())
    }

    pub fn contains_named<T: 'static>(&self, name: impl Into<Cow<'static, str>>) -> bool {
        self.provider.contains_key(&ServiceKey::named::<T>(name))
    }

    /// 全部绑定数量，包含默认绑定。
    pub fn service_count(&self) -> usize {
        self.provider.len()
    }

    /// 注册动作写入的绑定数量。
    pub fn custom_service_count(&self) -> usize {
        self.provider.custom_len()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = (&ServiceKey, ServiceLifetime)> {
        self.provider.descriptors()
    }
}
