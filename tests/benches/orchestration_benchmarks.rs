//! # Clique-Net Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | cn-01 Genesis | extraData encoding, full genesis build |
//! | cn-03 IP Allocation | free-address scan on a crowded subnet |

use std::collections::BTreeSet;
use std::net::Ipv4Addr;
use std::time::Duration;

use cn_01_genesis::{encode_extra_data, GenesisBuilder, GenesisConfig};
use cn_03_ip_allocation::find_free_address;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use shared_types::{Address, Ipv4Subnet};

fn validators(count: u8) -> Vec<Address> {
    (1..=count).map(|i| Address::new([i; 20])).collect()
}

// ============================================================================
// CN-01: Genesis
// ============================================================================

fn bench_extra_data(c: &mut Criterion) {
    let mut group = c.benchmark_group("cn-01-genesis");

    for count in [1u8, 5, 21] {
        let signers = validators(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("extra_data_encode", count), &signers, |b, signers| {
            b.iter(|| black_box(encode_extra_data(signers)))
        });
    }

    group.bench_function("genesis_build_5_signers", |b| {
        let config = GenesisConfig::new(1337, validators(5));
        let builder = GenesisBuilder::new(config);
        b.iter(|| black_box(builder.build().unwrap()))
    });

    group.finish();
}

// ============================================================================
// CN-03: IP Allocation
// ============================================================================

fn bench_address_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("cn-03-ip-allocation");
    group.measurement_time(Duration::from_secs(5));
    let subnet: Ipv4Subnet = "10.5.0.0/16".parse().unwrap();

    for taken_count in [0u8, 120, 244] {
        let taken: BTreeSet<Ipv4Addr> = (0..taken_count)
            .map(|i| Ipv4Addr::new(10, 5, 0, 10 + i))
            .collect();
        group.bench_with_input(BenchmarkId::new("find_free_address", taken_count), &taken, |b, taken| {
            b.iter(|| black_box(find_free_address(&subnet, taken)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_extra_data, bench_address_scan);
criterion_main!(benches);
