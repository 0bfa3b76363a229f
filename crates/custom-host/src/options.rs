use std::{fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

/// 宿主构建选项。
///
/// # 教案级注释
/// - **来源 (Where)**：可直接构造，也可通过 [`HostOptions::from_toml_str`] / [`HostOptions::from_path`]
///   从 TOML 加载；未出现的字段取默认值，未知字段被拒绝；
/// - **作用 (What)**：
///   - `name`：宿主名称，仅用于日志；
///   - `validate_on_build`：默认关闭；开启后构建时会调用每个瞬态工厂一次并丢弃产物，失败即构建失败，
///     因此带副作用的工厂会在首次解析之前多运行一次；
///   - `required_services`：必须存在的具名绑定名称列表；
/// - **生效值**：服务集合以默认单例的形式预置 Builder 的选项；注册动作若以单例覆盖 `HostOptions`，
///   覆盖值即为生效选项，编译校验与 [`Host::options`](crate::Host::options) 都以它为准。
///
/// ```toml
/// name = "billing"
/// validate_on_build = false
/// required_services = ["primary-db"]
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostOptions {
    pub name: String,
    pub validate_on_build: bool,
    pub required_services: Vec<String>,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            name: String::from("custom-host"),
            validate_on_build: false,
            required_services: Vec::new(),
        }
    }
}

/// 选项加载失败。
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("failed to read host options from `{path}`")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid host options")]
    Parse(#[from] toml::de::Error),
}

impl HostOptions {
    /// 解析 TOML 文本。
    pub fn from_toml_str(text: &str) -> Result<Self, OptionsError> {
        Ok(toml::from_str(text)?)
    }

    /// 读取并解析 TOML 文件。
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, OptionsError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| OptionsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_validate_on_build(mut self, validate: bool) -> Self {
        self.validate_on_build = validate;
        self
    }

    pub fn require_service(mut self, name: impl Into<String>) -> Self {
        self.required_services.push(name.into());
        self
    }
}
