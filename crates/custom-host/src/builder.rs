use std::{fmt, sync::Arc};

use crate::{
    collection::ServiceCollection,
    error::{HostBuildError, HostBuilderError, ServiceRegistrationError},
    host::Host,
    options::HostOptions,
    provider::ServiceProvider,
    registry::{RegistrationAction, RegistrationIntent, ServiceRegistry},
};

/// `HostBuilder` 收集服务注册步骤，并在 `build` 时一次性产出 [`Host`]。
///
/// # 教案级注释
/// - **两个阶段 (What)**
///   - 累积阶段：`register_services` / `configure_services` 每次追加一个动作并返回同一个 Builder；
///   - 构建阶段：[`build`](Self::build) 消费 Builder，之后不存在任何可以修改已构建宿主的入口。
/// - **关键流程 (How)**
///   1. 新建空的 [`ServiceCollection`]，写入默认绑定（生效的 [`HostOptions`]）；
///   2. 调用 [`ServiceRegistry::apply_all`] 按追加顺序执行全部动作，首个失败即中止；
///   3. 经 [`ServiceProvider::compile`] 校验并冻结绑定；
///   4. 打包为 [`Host`]。
/// - **两个入口的关系**：`register_services` 与 `configure_services` 共用同一次内部追加，
///   记录下来的 [`RegistrationIntent`] 只出现在日志与诊断中。
/// - **克隆**：`Clone` 复制动作列表（闭包通过 `Arc` 共享），两个 Builder 此后各自追加、各自构建。
#[derive(Clone, Default)]
pub struct HostBuilder {
    options: HostOptions,
    registry: ServiceRegistry,
}

impl fmt::Debug for HostBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostBuilder")
            .field("name", &self.options.name)
            .field("action_count", &self.registry.len())
            .finish()
    }
}

impl HostBuilder {
    /// 创建使用默认选项、尚无任何注册动作的 Builder。
    pub fn new() -> Self {
        Self::default()
    }

    /// 以给定选项创建 Builder。
    pub fn with_host_options(options: HostOptions) -> Self {
        Self {
            options,
            registry: ServiceRegistry::new(),
        }
    }

    /// 替换构建选项。
    pub fn with_options(&mut self, options: HostOptions) -> &mut Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &HostOptions {
        &self.options
    }

    /// 已累积的注册动作。
    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// 追加一个注册动作。
    ///
    /// - **输入**：`configure` 在构建时接收服务集合的可变引用；返回错误将中止构建并以
    ///   [`HostBuildError::Configuration`] 上报；
    /// - **返回值**：同一个 Builder，便于链式调用。
    pub fn register_services<F>(&mut self, configure: F) -> &mut Self
    where
        F: Fn(&mut ServiceCollection) -> Result<(), ServiceRegistrationError>
            + Send
            + Sync
            + 'static,
    {
        self.append(RegistrationAction::new(configure), RegistrationIntent::Register)
    }

    /// 追加一个注册动作，语义与 [`register_services`](Self::register_services) 完全一致。
    pub fn configure_services<F>(&mut self, configure: F) -> &mut Self
    where
        F: Fn(&mut ServiceCollection) -> Result<(), ServiceRegistrationError>
            + Send
            + Sync
            + 'static,
    {
        self.append(RegistrationAction::new(configure), RegistrationIntent::Configure)
    }

    /// 追加可能缺失的注册动作（例如来自插件表的可选条目）。
    ///
    /// - **错误**：`None` 返回 [`HostBuilderError::InvalidArgument`]，注册表不变。
    pub fn try_register_services(
        &mut self,
        action: Option<RegistrationAction>,
    ) -> Result<&mut Self, HostBuilderError> {
        self.try_append(action, RegistrationIntent::Register, "register_services")
    }

    pub fn try_configure_services(
        &mut self,
        action: Option<RegistrationAction>,
    ) -> Result<&mut Self, HostBuilderError> {
        self.try_append(action, RegistrationIntent::Configure, "configure_services")
    }

    /// 构建宿主实例。
    ///
    /// # 教案级注释
    /// - **错误 (What)**
    ///   - [`HostBuildError::Configuration`]：某个注册动作失败，之后的动作未被调用；
    ///   - [`HostBuildError::Compile`]：必需服务缺失或工厂探测失败。
    /// - **生效选项**：注册动作以单例覆盖 [`HostOptions`] 时，覆盖值用于编译校验并由
    ///   [`Host::options`] 返回；绑定被移除或改为工厂时沿用 Builder 持有的选项。
    /// - **后置条件**：成功返回的 [`Host`] 独占本次构建的绑定表；Builder 被消费。
    pub fn build(self) -> Result<Host, HostBuildError> {
        let HostBuilder { options, registry } = self;

        let mut services = ServiceCollection::new();
        services.add_default_singleton(options.clone());
        registry.apply_all(&mut services)?;

        let options = services
            .singleton::<HostOptions>()
            .unwrap_or_else(|| Arc::new(options));

        let provider = ServiceProvider::compile(services, &options).map_err(|error| {
            tracing::warn!(
                host = %options.name,
                error = %error,
                "service provider compilation failed"
            );
            HostBuildError::from(error)
        })?;

        tracing::info!(
            host = %options.name,
            actions = registry.len(),
            services = provider.len(),
            custom_services = provider.custom_len(),
            "host built"
        );
        Ok(Host::new(options, provider))
    }

    fn append(&mut self, action: RegistrationAction, intent: RegistrationIntent) -> &mut Self {
        self.registry.push(action.with_intent(intent));
        self
    }

    fn try_append(
        &mut self,
        action: Option<RegistrationAction>,
        intent: RegistrationIntent,
        operation: &'static str,
    ) -> Result<&mut Self, HostBuilderError> {
        let action = action.ok_or(HostBuilderError::InvalidArgument { operation })?;
        Ok(self.append(action, intent))
    }
}
