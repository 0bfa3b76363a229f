use std::fmt;

use parking_lot::Mutex;

use crate::{
    builder::HostBuilder,
    collection::ServiceCollection,
    error::{HostBuildError, HostBuilderError, ServiceRegistrationError},
    host::Host,
    options::HostOptions,
    registry::RegistrationAction,
};

enum SharedState {
    Accumulating(HostBuilder),
    Spent,
}

/// 可跨线程共享的 [`HostBuilder`] 包装。
///
/// # 教案级注释
/// - **并发语义 (What)**
///   - 所有追加方法只需 `&self`，内部以 `parking_lot::Mutex` 串行化，最终执行顺序即追加完成的顺序；
///   - [`build`](Self::build) 在锁内把累积的 Builder 整体移出并标记为已消费，释放锁后再执行构建，
///     因此构建过程不会观察到并发追加造成的中途修改；
///   - 构建之后的追加返回 [`HostBuilderError::Spent`]，再次构建返回 [`HostBuildError::Spent`]。
/// - **使用方式 (How)**：通常以 `Arc<SharedHostBuilder>` 分发给多个初始化线程。
pub struct SharedHostBuilder {
    state: Mutex<SharedState>,
}

impl fmt::Debug for SharedHostBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        let mut debug = f.debug_struct("SharedHostBuilder");
        match &*state {
            SharedState::Accumulating(builder) => {
                debug.field("action_count", &builder.registry().len())
            }
            SharedState::Spent => debug.field("spent", &true),
        };
        debug.finish()
    }
}

impl Default for SharedHostBuilder {
    fn default() -> Self {
        Self::from_builder(HostBuilder::new())
    }
}

impl From<HostBuilder> for SharedHostBuilder {
    fn from(builder: HostBuilder) -> Self {
        Self::from_builder(builder)
    }
}

impl SharedHostBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host_options(options: HostOptions) -> Self {
        Self::from_builder(HostBuilder::with_host_options(options))
    }

    /// 以已有 Builder 的累积状态为起点。
    pub fn from_builder(builder: HostBuilder) -> Self {
        Self {
            state: Mutex::new(SharedState::Accumulating(builder)),
        }
    }

    pub fn register_services<F>(&self, configure: F) -> Result<&Self, HostBuilderError>
    where
        F: Fn(&mut ServiceCollection) -> Result<(), ServiceRegistrationError>
            + Send
            + Sync
            + 'static,
    {
        self.with_builder(|builder| {
            builder.register_services(configure);
            Ok(())
        })
    }

    pub fn configure_services<F>(&self, configure: F) -> Result<&Self, HostBuilderError>
    where
        F: Fn(&mut ServiceCollection) -> Result<(), ServiceRegistrationError>
            + Send
            + Sync
            + 'static,
    {
        self.with_builder(|builder| {
            builder.configure_services(configure);
            Ok(())
        })
    }

    /// 已构建时返回 `Spent`，动作缺失时返回 `InvalidArgument`；两种失败都不改变注册表。
    pub fn try_register_services(
        &self,
        action: Option<RegistrationAction>,
    ) -> Result<&Self, HostBuilderError> {
        self.with_builder(|builder| builder.try_register_services(action).map(|_| ()))
    }

    pub fn try_configure_services(
        &self,
        action: Option<RegistrationAction>,
    ) -> Result<&Self, HostBuilderError> {
        self.with_builder(|builder| builder.try_configure_services(action).map(|_| ()))
    }

    /// 是否已经构建过。
    pub fn is_spent(&self) -> bool {
        matches!(*self.state.lock(), SharedState::Spent)
    }

    /// 已累积的动作数量；构建后为 `0`。
    pub fn action_count(&self) -> usize {
        match &*self.state.lock() {
            SharedState::Accumulating(builder) => builder.registry().len(),
            SharedState::Spent => 0,
        }
    }

    /// 取出累积状态并构建宿主。
    pub fn build(&self) -> Result<Host, HostBuildError> {
        let builder = {
            let mut state = self.state.lock();
            match std::mem::replace(&mut *state, SharedState::Spent) {
                SharedState::Accumulating(builder) => builder,
                SharedState::Spent => return Err(HostBuildError::Spent),
            }
        };
        builder.build()
    }

    fn with_builder<F>(&self, mutate: F) -> Result<&Self, HostBuilderError>
    where
        F: FnOnce(&mut HostBuilder) -> Result<(), HostBuilderError>,
    {
        match &mut *self.state.lock() {
            SharedState::Accumulating(builder) => mutate(builder)?,
            SharedState::Spent => return Err(HostBuilderError::Spent),
        }
        Ok(self)
    }
}
