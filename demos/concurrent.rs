//! Concurrent access: many tasks contending for a few connections

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use respool::{BoxError, PoolConfig, ResourcePool};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn open_conn() -> Result<u64, BoxError> {
    Ok(NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

#[tokio::main]
async fn main() {
    println!("=== respool - Concurrent Access ===\n");

    let pool = Arc::new(ResourcePool::new(
        PoolConfig::new()
            .with_max_open(3)
            .with_max_reserve(3)
            .with_acquire_timeout(Duration::from_secs(2)),
        open_conn,
        |_conn| {},
        |_conn| Ok(()),
    ));

    let mut tasks = Vec::new();
    for worker in 0..10 {
        let pool = Arc::clone(&pool);
        tasks.push(tokio::spawn(async move {
            match pool.get_async().await {
                Ok(conn) => {
                    println!("   worker {} got connection {}", worker, *conn);
                    tokio::time::sleep(Duration::from_millis(25)).await;
                }
                Err(err) => println!("   worker {} failed: {}", worker, err),
            }
        }));
    }

    for task in tasks {
        task.await.unwrap();
    }

    let stats = pool.stats();
    println!(
        "\n   open={} available={} ({} opens served 10 workers)",
        stats.resources_open,
        stats.available_now,
        pool.counters().opened
    );

    pool.close();
}
