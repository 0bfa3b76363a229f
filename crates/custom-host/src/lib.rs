#![deny(unsafe_code)]
#![doc = r#"
# custom-host

两阶段的服务宿主装配器：

1. **累积阶段**：[`HostBuilder::register_services`] / [`HostBuilder::configure_services`]
   追加注册动作，并返回同一个 Builder 以便链式调用；
2. **构建阶段**：[`HostBuilder::build`] 为本次构建新建 [`ServiceCollection`]，按追加顺序执行全部动作，
   编译为只读的 [`ServiceProvider`]，最终产出不可变的 [`Host`]。

```rust
use custom_host::HostBuilder;

struct Greeting(&'static str);

let mut builder = HostBuilder::new();
builder
    .register_services(|services| {
        services.add_singleton(Greeting("hello"));
        Ok(())
    })
    .configure_services(|services| {
        services.add_singleton(Greeting("bonjour"));
        Ok(())
    });

let host = builder.build()?;
assert_eq!(host.resolve::<Greeting>()?.0, "bonjour");
# Ok::<(), Box<dyn std::error::Error>>(())
```

多线程装配请使用 [`SharedHostBuilder`]。
"#]

mod builder;
mod collection;
mod error;
mod host;
mod key;
mod options;
mod provider;
mod registry;
mod shared;
#[cfg(feature = "telemetry")]
pub mod telemetry;

pub use builder::HostBuilder;
pub use collection::{ServiceCollection, ServiceLifetime};
pub use error::{
    BoxError, CompileError, HostBuildError, HostBuilderError, ResolveError,
    ServiceRegistrationError,
};
pub use host::Host;
pub use key::ServiceKey;
pub use options::{HostOptions, OptionsError};
pub use provider::ServiceProvider;
pub use registry::{RegistrationAction, RegistrationIntent, ServiceRegistry};
pub use shared::SharedHostBuilder;
