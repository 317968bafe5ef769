//! Basic usage: lifecycle, timeouts, stats, and the exposition exporter

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use respool::{BoxError, MetricsExporter, PoolConfig, ResourcePool};

#[derive(Debug)]
struct Conn {
    id: u64,
}

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn open_conn() -> Result<Conn, BoxError> {
    Ok(Conn {
        id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
    })
}

fn close_conn(_conn: Conn) {}

fn test_conn(_conn: &Conn) -> Result<(), BoxError> {
    Ok(())
}

fn main() {
    println!("=== respool - Basic Examples ===\n");

    // Example 1: acquire, release, reuse
    lifecycle();

    // Example 2: waiting on a saturated pool
    timeouts();

    // Example 3: stats, health, and Prometheus export
    stats_and_export();

    // Example 4: shutdown
    shutdown();
}

fn lifecycle() {
    println!("1. Lifecycle:");
    let pool = ResourcePool::new(
        PoolConfig::new().with_max_open(4).with_max_reserve(2),
        open_conn,
        close_conn,
        test_conn,
    );

    {
        let conn = pool.get().unwrap();
        println!("   Got connection {}", conn.id);
        // Returned to the reserve when dropped
    }

    let conn = pool.get().unwrap();
    println!("   Reused connection {}", conn.id);
    println!("   Opened so far: {}\n", pool.counters().opened);
}

fn timeouts() {
    println!("2. Timeouts:");
    let pool = ResourcePool::new(
        PoolConfig::new().with_max_open(1).with_max_reserve(1),
        open_conn,
        close_conn,
        test_conn,
    );

    let held = pool.get().unwrap();
    match pool.get_with_timeout(Duration::from_millis(50)) {
        Ok(conn) => println!("   Got connection {}", conn.id),
        Err(err) => println!("   Error: {}", err),
    }
    drop(held);
    println!();
}

fn stats_and_export() {
    println!("3. Stats and Export:");
    let pool = ResourcePool::new(
        PoolConfig::new().with_max_open(4).with_max_reserve(2),
        open_conn,
        close_conn,
        test_conn,
    );

    let busy = pool.get().unwrap();
    drop(pool.get().unwrap()); // one idle in the reserve

    let stats = pool.stats();
    println!(
        "   open={} available={} in_use={} cap={}",
        stats.resources_open, stats.available_now, stats.in_use, stats.cap
    );

    let health = pool.health_status();
    println!(
        "   Health: {}",
        if health.is_healthy() { "healthy" } else { "degraded" }
    );

    println!("\n{}", MetricsExporter::export_prometheus(
        &stats,
        &pool.counters(),
        "demo",
        None,
    ));
    drop(busy);
}

fn shutdown() {
    println!("4. Shutdown:");
    let pool = ResourcePool::new(
        PoolConfig::new().with_max_open(2).with_max_reserve(2),
        open_conn,
        close_conn,
        test_conn,
    );

    drop(pool.get().unwrap());
    pool.close();

    match pool.get() {
        Ok(conn) => println!("   Got connection {}", conn.id),
        Err(err) => println!("   After close: {}", err),
    }
}
