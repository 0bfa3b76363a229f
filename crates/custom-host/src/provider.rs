use std::{borrow::Cow, collections::BTreeMap, fmt, sync::Arc};

use crate::{
    collection::{Binding, ServiceCollection, ServiceLifetime},
    error::{CompileError, ResolveError},
    key::ServiceKey,
    options::HostOptions,
};

/// 编译完成、只读的服务解析视图。
///
/// # 教案级注释
/// - **生成 (Where)**：仅由 [`ServiceProvider::compile`] 从一次构建的 [`ServiceCollection`] 产出；
/// - **不可变性 (What)**：绑定表置于 `Arc` 之后，克隆只增加引用计数，任何克隆都无法再修改绑定；
/// - **解析 (How)**：单例返回共享 `Arc`，瞬态绑定每次调用工厂。
#[derive(Clone)]
pub struct ServiceProvider {
    bindings: Arc<BTreeMap<ServiceKey, Binding>>,
}

impl fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("service_count", &self.len())
            .field("custom_service_count", &self.custom_len())
            .finish()
    }
}

impl ServiceProvider {
    /// 校验并冻结服务集合。
    ///
    /// # 教案级注释
    /// - **执行步骤 (How)**
    ///   1. 逐个检查集合内声明的必需绑定（[`ServiceCollection::require`]）；
    ///   2. 检查 `options.required_services` 中的每个名称至少对应一个具名绑定；
    ///   3. 若 `options.validate_on_build` 开启，调用每个瞬态工厂一次并丢弃产物；
    /// - **返回值 (What)**：首个失败项以 [`CompileError`] 返回，集合随之被丢弃。
    pub fn compile(
        services: ServiceCollection,
        options: &HostOptions,
    ) -> Result<Self, CompileError> {
        let (bindings, requirements) = services.into_parts();

        if let Some(missing) = requirements.iter().find(|key| !bindings.contains_key(*key)) {
            return Err(CompileError::MissingService {
                requirement: missing.to_string(),
            });
        }

        for name in &options.required_services {
            let satisfied = bindings.keys().any(|key| key.name() == Some(name.as_str()));
            if !satisfied {
                return Err(CompileError::MissingService {
                    requirement: name.clone(),
                });
            }
        }

        if options.validate_on_build {
            for (key, binding) in &bindings {
                if binding.entry.lifetime() == ServiceLifetime::Transient {
                    binding
                        .entry
                        .produce()
                        .map_err(|source| CompileError::FactoryFailed {
                            key: key.clone(),
                            source,
                        })?;
                }
            }
        }

        Ok(Self {
            bindings: Arc::new(bindings),
        })
    }

    /// 解析类型 `T` 的匿名绑定。
    pub fn resolve<T>(&self) -> Result<Arc<T>, ResolveError>
    where
        T: Send + Sync + 'static,
    {
        self.resolve_key(ServiceKey::of::<T>())
    }

    /// 解析类型 `T` 的具名绑定。
    pub fn resolve_named<T>(
        &self,
        name: impl Into<Cow<'static, str>>,
    ) -> Result<Arc<T>, ResolveError>
    where
        T: Send + Sync + 'static,
    {
        self.resolve_key(ServiceKey::named::<T>(name))
    }

    pub fn contains_key(&self, key: &ServiceKey) -> bool {
        self.bindings.contains_key(key)
    }

    /// 绑定总数，包含默认绑定。
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// 由注册动作写入（或覆盖默认值）的绑定数量。
    pub fn custom_len(&self) -> usize {
        self.bindings.values().filter(|binding| !binding.default).count()
    }

    /// 按键顺序列出绑定及其生命周期。
    pub fn descriptors(&self) -> impl Iterator<Item = (&ServiceKey, ServiceLifetime)> {
        self.bindings
            .iter()
            .map(|(key, binding)| (key, binding.entry.lifetime()))
    }

    fn resolve_key<T>(&self, key: ServiceKey) -> Result<Arc<T>, ResolveError>
    where
        T: Send + Sync + 'static,
    {
        let Some(binding) = self.bindings.get(&key) else {
            return Err(ResolveError::NotRegistered { key });
        };
        let value = match binding.entry.produce() {
            Ok(value) => value,
            Err(source) => return Err(ResolveError::FactoryFailed { key, source }),
        };
        value
            .downcast::<T>()
            .map_err(|_| ResolveError::TypeMismatch { key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_requirement_fails_compilation() {
        let mut services = ServiceCollection::new();
        services.require::<u64>();
        let result = ServiceProvider::compile(services, &HostOptions::default());
        assert!(matches!(result, Err(CompileError::MissingService { .. })));
    }

    #[test]
    fn validation_can_be_disabled() {
        let mut services = ServiceCollection::new();
        services.add_transient::<u8, _>(|| Err("not yet".into()));
        let options = HostOptions::default().with_validate_on_build(false);
        let provider = ServiceProvider::compile(services, &options);
        assert!(provider.is_ok());

        let error = provider.ok().map(|provider| provider.resolve::<u8>());
        assert!(matches!(error, Some(Err(ResolveError::FactoryFailed { .. }))));
    }

    #[test]
    fn enabled_validation_calls_each_factory_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut services = ServiceCollection::new();
        services.add_transient(move || Ok(counter.fetch_add(1, Ordering::SeqCst)));

        let options = HostOptions::default().with_validate_on_build(true);
        let provider = ServiceProvider::compile(services, &options);
        assert!(provider.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn same_name_with_different_types_resolves_each_type() {
        let mut services = ServiceCollection::new();
        services
            .add_named_singleton("port", 8080_u16)
            .add_named_singleton("port", String::from("8080"));
        let provider = ServiceProvider::compile(services, &HostOptions::default());
        let Ok(provider) = provider else {
            panic!("compilation should succeed");
        };

        assert_eq!(provider.resolve_named::<u16>("port").ok().as_deref(), Some(&8080));
        assert_eq!(
            provider.resolve_named::<String>("port").ok().as_deref().map(String::as_str),
            Some("8080")
        );
        assert!(matches!(
            provider.resolve_named::<u32>("port"),
            Err(ResolveError::NotRegistered { .. })
        ));
    }
}
