use chrono::{Local, TimeZone};
use hostpulse::system::memory::memory_from_counters;
use hostpulse::system::snapshot::{
    CpuInfo, DiskInfo, DiskIoInfo, NetworkInfo, NetworkTotals, PartitionInfo, ProcessSample,
    Reading, Snapshot, SystemInfo, UsageInfo,
};
use insta::assert_snapshot;

fn fixed_snapshot() -> Snapshot {
    Snapshot {
        timestamp: Local.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap(),
        system: SystemInfo {
            system: "Linux".to_string(),
            node: "build-01".to_string(),
            release: "6.1.0".to_string(),
            version: "#1 SMP".to_string(),
            machine: "x86_64".to_string(),
            processor: "Test CPU".to_string(),
        },
        cpu: CpuInfo {
            cpu_percent: 12.5,
            cpu_count: 2,
            cpu_freq: Reading::Unavailable,
            per_cpu: vec![10.0, 15.0],
        },
        memory: memory_from_counters(8192, 4096, 2048),
        disk: DiskInfo {
            main_disk: UsageInfo::new(4096, 1024, 3072),
            io: Some(DiskIoInfo {
                read_bytes: 1536,
                write_bytes: 0,
                read_bytes_formatted: "1.50 KB".to_string(),
                write_bytes_formatted: "0.00 B".to_string(),
            }),
            partitions: vec![PartitionInfo {
                device: "/dev/sda1".to_string(),
                mountpoint: "/".to_string(),
                fstype: "ext4".to_string(),
                usage: UsageInfo::new(4096, 1024, 3072),
            }],
        },
        network: NetworkInfo {
            total: NetworkTotals {
                bytes_sent: 1024,
                bytes_recv: 2048,
                packets_sent: 8,
                packets_recv: 16,
                bytes_sent_formatted: "1.00 KB".to_string(),
                bytes_recv_formatted: "2.00 KB".to_string(),
            },
            interfaces: vec![],
        },
        processes: vec![ProcessSample {
            pid: 42,
            name: "worker".to_string(),
            username: None,
            cpu_percent: 50.0,
            memory_percent: 1.5,
            memory_rss: "12.00 MB".to_string(),
            create_time: "Unknown".to_string(),
        }],
    }
}

#[test]
fn cpu_section_shape() {
    let snapshot = fixed_snapshot();
    assert_snapshot!(
        serde_json::to_string(&snapshot.cpu).unwrap(),
        @r#"{"cpu_percent":12.5,"cpu_count":2,"cpu_freq":"N/A","per_cpu":[10.0,15.0]}"#
    );
}

#[test]
fn process_section_shape() {
    let snapshot = fixed_snapshot();
    assert_snapshot!(
        serde_json::to_string(&snapshot.processes).unwrap(),
        @r#"[{"pid":42,"name":"worker","username":null,"cpu_percent":50.0,"memory_percent":1.5,"memory_rss":"12.00 MB","create_time":"Unknown"}]"#
    );
}

#[test]
fn partition_usage_is_flattened() {
    let snapshot = fixed_snapshot();
    assert_snapshot!(
        serde_json::to_string(&snapshot.disk.partitions[0]).unwrap(),
        @r#"{"device":"/dev/sda1","mountpoint":"/","fstype":"ext4","total":4096,"used":1024,"free":3072,"percent":25.0,"total_formatted":"4.00 KB","used_formatted":"1.00 KB","free_formatted":"3.00 KB"}"#
    );
}

#[test]
fn top_level_keys_and_timestamp() {
    let value = serde_json::to_value(fixed_snapshot()).unwrap();
    let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec!["cpu", "disk", "memory", "network", "processes", "system", "timestamp"]
    );
    assert_eq!(value["timestamp"], "2024-01-15 09:30:00");
    assert_eq!(value["memory"]["percent"], 50.0);
    assert_eq!(value["memory"]["used_formatted"], "2.00 KB");
}
