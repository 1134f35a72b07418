// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for report assembly, permission filtering and
// operation dispatch in the devsignal-collector crate.

use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use devsignal_bridge::fake::FakePlatform;
use devsignal_collector::SignalCollector;
use devsignal_core::types::{PROTECTION_DANGEROUS, REQUESTED_PERMISSION_GRANTED};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A fake device declaring `count` permissions, every third one dangerous and
/// every other one granted.
fn device_with_permissions(count: usize) -> FakePlatform {
    (0..count).fold(FakePlatform::default(), |fake, i| {
        let flags = if i % 2 == 0 { REQUESTED_PERMISSION_GRANTED } else { 0 };
        let level = if i % 3 == 0 { PROTECTION_DANGEROUS } else { 0 };
        fake.with_permission(&format!("android.permission.P{i}"), flags, Some(level))
    })
}

fn collector(fake: FakePlatform) -> SignalCollector {
    SignalCollector::with_platform(Arc::new(fake).platform())
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Full aggregate report over a typical app (~30 declared permissions).
fn bench_report(c: &mut Criterion) {
    let collector = collector(device_with_permissions(30));
    c.bench_function("report (30 permissions)", |b| {
        b.iter(|| black_box(collector.report()));
    });
}

/// Permission filtering alone at increasing manifest sizes.
fn bench_dangerous_permissions(c: &mut Criterion) {
    let mut group = c.benchmark_group("dangerous_permissions");
    for count in [10usize, 100, 1000] {
        let collector = collector(device_with_permissions(count));
        group.bench_function(format!("{count} declared"), |b| {
            b.iter(|| black_box(collector.dangerous_permissions()));
        });
    }
    group.finish();
}

/// Named dispatch including JSON encoding of the result.
fn bench_execute(c: &mut Criterion) {
    let collector = collector(device_with_permissions(30));
    c.bench_function("execute getSecurityInfo", |b| {
        b.iter(|| black_box(collector.execute(black_box("getSecurityInfo"))));
    });
}

criterion_group!(
    benches,
    bench_report,
    bench_dangerous_permissions,
    bench_execute
);
criterion_main!(benches);
