//! 追加顺序与覆盖语义的性质测试。

mod support;

use custom_host::HostBuilder;
use proptest::prelude::*;
use support::{CallLog, Implementation};

proptest! {
    /// 任意 `register`/`configure` 混合序列都按追加顺序回放。
    #[test]
    fn prop_actions_replay_in_append_order(
        entry_points in prop::collection::vec(any::<bool>(), 0..64),
    ) {
        let log = CallLog::new();
        let mut builder = HostBuilder::new();
        for (id, use_configure) in entry_points.iter().enumerate() {
            if *use_configure {
                builder.configure_services(log.action(id));
            } else {
                builder.register_services(log.action(id));
            }
        }

        builder.build().unwrap();
        let expected: Vec<usize> = (0..entry_points.len()).collect();
        prop_assert_eq!(log.calls(), expected);
    }

    /// 对同一服务的多次绑定，解析结果始终是最后一次写入的值。
    #[test]
    fn prop_last_binding_wins(values in prop::collection::vec(any::<u32>(), 1..32)) {
        let mut builder = HostBuilder::new();
        for value in values.iter().copied() {
            builder.register_services(move |services| {
                services.add_singleton(Implementation(value));
                Ok(())
            });
        }

        let host = builder.build().unwrap();
        let last = values.last().copied().unwrap();
        let resolved = host.resolve::<Implementation>().unwrap();
        prop_assert_eq!(&*resolved, &Implementation(last));
        prop_assert_eq!(host.custom_service_count(), 1);
    }
}
