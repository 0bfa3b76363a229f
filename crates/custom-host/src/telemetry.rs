//! 日志订阅器安装入口。
//!
//! 库内部只通过 `tracing` 门面输出事件；是否以及如何落地由宿主应用决定。
//! [`install_fmt_subscriber`] 为命令行程序与演示代码提供 `fmt + EnvFilter` 的默认组合。

use thiserror::Error;
use tracing::dispatcher;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt};

/// 订阅器安装失败。
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// 全局 Subscriber 已被设置，拒绝覆盖。
    #[error("a global tracing subscriber is already installed")]
    SubscriberAlreadySet,

    /// 过滤指令无法解析。
    #[error("invalid log filter directives `{directives}`")]
    InvalidFilter {
        directives: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("failed to set the global tracing subscriber")]
    SetGlobalSubscriber(#[from] dispatcher::SetGlobalDefaultError),
}

/// 安装全局 `fmt` 订阅器。
///
/// - **过滤规则**：`directives` 优先；为 `None` 时读取 `RUST_LOG`，仍缺失则退回 `info`；
/// - **错误**：已有全局订阅器时返回 [`TelemetryError::SubscriberAlreadySet`]。
pub fn install_fmt_subscriber(directives: Option<&str>) -> Result<(), TelemetryError> {
    if dispatcher::has_been_set() {
        return Err(TelemetryError::SubscriberAlreadySet);
    }

    let subscriber = tracing_subscriber::registry()
        .with(build_env_filter(directives)?)
        .with(tracing_subscriber::fmt::layer());
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn build_env_filter(directives: Option<&str>) -> Result<EnvFilter, TelemetryError> {
    match directives {
        Some(directives) => {
            EnvFilter::try_new(directives).map_err(|source| TelemetryError::InvalidFilter {
                directives: directives.to_owned(),
                source,
            })
        }
        None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))),
    }
}
