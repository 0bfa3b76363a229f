//! 测试共用的调用记录工具。
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use custom_host::{ServiceCollection, ServiceRegistrationError};

/// 记录注册动作被调用的顺序。
#[derive(Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<usize>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 生成一个在执行时记录 `id` 的注册动作。
    pub fn action(
        &self,
        id: usize,
    ) -> impl Fn(&mut ServiceCollection) -> Result<(), ServiceRegistrationError>
    + Send
    + Sync
    + 'static {
        let calls = Arc::clone(&self.calls);
        move |_services: &mut ServiceCollection| {
            calls.lock().unwrap().push(id);
            Ok(())
        }
    }

    pub fn calls(&self) -> Vec<usize> {
        self.calls.lock().unwrap().clone()
    }
}

/// 用于覆盖测试的服务实现标记。
#[derive(Debug, PartialEq, Eq)]
pub struct Implementation(pub u32);
