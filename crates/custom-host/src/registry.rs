use std::{borrow::Cow, fmt, sync::Arc};

use crate::{
    collection::ServiceCollection,
    error::{HostBuildError, HostBuilderError, ServiceRegistrationError},
};

type ConfigureFn =
    dyn Fn(&mut ServiceCollection) -> Result<(), ServiceRegistrationError> + Send + Sync;

/// 注册动作的来源入口，仅用于日志与诊断，不影响执行语义。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistrationIntent {
    /// 经由 `register_services` 追加。
    Register,
    /// 经由 `configure_services` 追加。
    Configure,
}

impl RegistrationIntent {
    pub fn as_str(self) -> &'static str {
        match self {
            RegistrationIntent::Register => "register",
            RegistrationIntent::Configure => "configure",
        }
    }
}

/// 一个待执行的配置步骤。
///
/// - **契约 (What)**：捕获后不可变；执行时接收服务集合的可变引用，返回失败即中止构建；
/// - **共享 (How)**：闭包以 `Arc` 保存，克隆注册表只复制引用。
#[derive(Clone)]
pub struct RegistrationAction {
    label: Cow<'static, str>,
    intent: RegistrationIntent,
    configure: Arc<ConfigureFn>,
}

impl fmt::Debug for RegistrationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationAction")
            .field("label", &self.label)
            .field("intent", &self.intent)
            .finish()
    }
}

impl RegistrationAction {
    /// 包装闭包为注册动作，默认标签为闭包类型名。
    pub fn new<F>(configure: F) -> Self
    where
        F: Fn(&mut ServiceCollection) -> Result<(), ServiceRegistrationError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            label: Cow::Borrowed(std::any::type_name::<F>()),
            intent: RegistrationIntent::Register,
            configure: Arc::new(configure),
        }
    }

    /// 替换诊断标签。
    pub fn with_label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = label.into();
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn intent(&self) -> RegistrationIntent {
        self.intent
    }

    pub(crate) fn with_intent(mut self, intent: RegistrationIntent) -> Self {
        self.intent = intent;
        self
    }

    /// 对服务集合执行该动作。
    pub fn apply(&self, services: &mut ServiceCollection) -> Result<(), ServiceRegistrationError> {
        (self.configure)(services)
    }
}

/// `ServiceRegistry` 按注册顺序保存配置步骤，并在构建时确定性地回放。
///
/// # 教案级注释
/// - **顺序 (What)**：仅追加；回放顺序即追加顺序，后执行的动作可以覆盖先前的绑定；
/// - **失败策略 (How)**：[`apply_all`](Self::apply_all) 遇到首个失败立即返回，后续动作不再调用，
///   已执行动作对集合的修改保留不回滚；
/// - **所有权**：注册表由 [`HostBuilder`](crate::HostBuilder) 独占，不对外暴露可变引用。
#[derive(Clone, Debug, Default)]
pub struct ServiceRegistry {
    actions: Vec<RegistrationAction>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加可能缺失的注册动作。
    ///
    /// - **前置检查**：`None` 返回 [`HostBuilderError::InvalidArgument`]，注册表不变；
    /// - **复杂度**：均摊 O(1)。
    pub fn append(
        &mut self,
        action: Option<RegistrationAction>,
    ) -> Result<(), HostBuilderError> {
        let action = action.ok_or(HostBuilderError::InvalidArgument {
            operation: "ServiceRegistry::append",
        })?;
        self.push(action);
        Ok(())
    }

    pub fn push(&mut self, action: RegistrationAction) {
        self.actions.push(action);
    }

    /// 依序对同一集合执行全部动作。
    pub fn apply_all(&self, services: &mut ServiceCollection) -> Result<(), HostBuildError> {
        for (index, action) in self.actions.iter().enumerate() {
            tracing::debug!(
                index,
                label = action.label(),
                intent = action.intent().as_str(),
                "applying registration action"
            );
            if let Err(source) = action.apply(services) {
                tracing::warn!(
                    index,
                    label = action.label(),
                    error = %source,
                    "registration action failed; remaining actions skipped"
                );
                return Err(HostBuildError::Configuration {
                    index,
                    label: action.label.clone(),
                    source,
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// 按追加顺序返回全部动作。
    pub fn iter(&self) -> impl Iterator<Item = &RegistrationAction> {
        self.actions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_action_leaves_registry_untouched() {
        let mut registry = ServiceRegistry::new();
        registry.push(RegistrationAction::new(|_| Ok(())));
        let result = registry.append(None);
        assert!(matches!(
            result,
            Err(HostBuilderError::InvalidArgument { .. })
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn with_label_replaces_type_name_label() {
        let action = RegistrationAction::new(|_| Ok(())).with_label("database");
        assert_eq!(action.label(), "database");
        assert_eq!(action.intent(), RegistrationIntent::Register);
    }
}
