//! # error 模块说明
//!
//! 宿主装配流程的错误域，按阶段拆分：
//! - [`HostBuilderError`]：配置阶段（追加注册动作）；
//! - [`ServiceRegistrationError`]：单个注册动作内部对服务集合的操作失败；
//! - [`HostBuildError`]：构建阶段，包含动作执行失败与编译失败；
//! - [`CompileError`]：服务集合编译为可解析视图时的失败；
//! - [`ResolveError`]：宿主运行期解析服务失败。
//!
//! 所有类型均派生 [`thiserror::Error`]，满足 `Send + Sync + 'static`，可直接用 `?` 向上传播。

use std::borrow::Cow;

use thiserror::Error;

use crate::key::ServiceKey;

/// 工厂与自定义注册失败使用的装箱错误。
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// 配置阶段的错误。
#[derive(Debug, Error)]
pub enum HostBuilderError {
    /// 传入的注册动作缺失。
    ///
    /// - **契约 (What)**：`operation` 为触发校验的入口名称；返回该错误时注册表保持调用前状态。
    #[error("registration action passed to `{operation}` is absent")]
    InvalidArgument { operation: &'static str },

    /// 共享 Builder 已完成构建，不再接受新的注册动作。
    #[error("host builder has already been built")]
    Spent,
}

/// 注册动作在操作服务集合时返回的错误。
#[derive(Debug, Error)]
pub enum ServiceRegistrationError {
    /// 绑定已存在，`try_add_*` 拒绝覆盖。
    #[error("service `{key}` already registered")]
    Duplicate { key: ServiceKey },

    /// 注册动作自行判定的失败，例如绑定参数非法。
    #[error("{reason}")]
    Rejected { reason: Cow<'static, str> },

    /// 注册动作内部的其他失败。
    #[error(transparent)]
    Other(#[from] BoxError),
}

impl ServiceRegistrationError {
    /// 以可读原因构造 [`ServiceRegistrationError::Rejected`]。
    pub fn rejected(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }
}

/// 服务集合编译失败。
#[derive(Debug, Error)]
pub enum CompileError {
    /// 声明为必需的服务没有任何绑定。
    #[error("required service `{requirement}` is not registered")]
    MissingService { requirement: String },

    /// 构建期探测工厂时工厂返回失败。
    #[error("factory for service `{key}` failed during validation")]
    FactoryFailed {
        key: ServiceKey,
        #[source]
        source: BoxError,
    },
}

/// 构建宿主时的错误。
#[derive(Debug, Error)]
pub enum HostBuildError {
    /// 第 `index` 个注册动作执行失败，后续动作未被调用。
    ///
    /// - **契约 (What)**：失败前的动作对服务集合造成的修改不会回滚，但该集合随错误一同被丢弃。
    #[error("registration action #{index} (`{label}`) failed")]
    Configuration {
        index: usize,
        label: Cow<'static, str>,
        #[source]
        source: ServiceRegistrationError,
    },

    /// 服务集合无法编译为可解析的提供者。
    #[error("service provider compilation failed")]
    Compile(#[from] CompileError),

    /// 共享 Builder 已经构建过一次。
    #[error("host builder has already been built")]
    Spent,
}

/// 解析服务时的错误。
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("service `{key}` is not registered")]
    NotRegistered { key: ServiceKey },

    #[error("factory for service `{key}` failed")]
    FactoryFailed {
        key: ServiceKey,
        #[source]
        source: BoxError,
    },

    /// 绑定值与键的类型不一致。
    ///
    /// 公开 API 无法触发：键中的 `TypeId` 与写入的 `Arc<T>` 总由同一个泛型参数确定。
    /// 该分支只为向下转型失败保留一个可诊断的出口，而不是 panic。
    #[error("service `{key}` holds a value of a different type")]
    TypeMismatch { key: ServiceKey },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn configuration_failure_chains_action_error() {
        let error = HostBuildError::Configuration {
            index: 1,
            label: Cow::Borrowed("storage"),
            source: ServiceRegistrationError::rejected("bad connection string"),
        };
        assert_eq!(
            error.to_string(),
            "registration action #1 (`storage`) failed"
        );
        let source = error.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("bad connection string"));
    }

    #[test]
    fn boxed_errors_convert_into_registration_errors() {
        let boxed: BoxError = "disk full".into();
        let error = ServiceRegistrationError::from(boxed);
        assert_eq!(error.to_string(), "disk full");
    }
}
