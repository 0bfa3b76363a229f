//! 演示程序：加载可选的 TOML 选项，装配一组示例服务并打印宿主绑定表。
//!
//! 用法：`custom-host-demo [options.toml]`，日志级别由 `RUST_LOG` 控制。

use std::{env, process::ExitCode, sync::Arc};

use custom_host::{BoxError, HostBuilder, HostOptions, ServiceLifetime, telemetry};

struct Clock {
    epoch: u64,
}

struct Greeter {
    greeting: String,
}

fn run() -> Result<(), BoxError> {
    telemetry::install_fmt_subscriber(None)?;

    let options = match env::args().nth(1) {
        Some(path) => HostOptions::from_path(path)?,
        None => HostOptions::default().with_name("custom-host-demo"),
    };

    let mut builder = HostBuilder::with_host_options(options);
    builder
        .register_services(|services| {
            services
                .add_singleton(Clock { epoch: 0 })
                .add_named_singleton("greeting", String::from("hello"));
            Ok(())
        })
        .configure_services(|services| {
            services.add_transient(|| {
                Ok(Greeter {
                    greeting: String::from("hello from a transient factory"),
                })
            });
            Ok(())
        });

    let host = builder.build()?;
    println!("host `{}`:", host.name());
    for (key, lifetime) in host.descriptors() {
        let lifetime = match lifetime {
            ServiceLifetime::Singleton => "singleton",
            ServiceLifetime::Transient => "transient",
        };
        println!("  {key} ({lifetime})");
    }

    let clock: Arc<Clock> = host.resolve()?;
    let greeter: Arc<Greeter> = host.resolve()?;
    println!("clock epoch = {}", clock.epoch);
    println!("{}", greeter.greeting);
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("custom-host-demo: {error}");
            ExitCode::FAILURE
        }
    }
}
