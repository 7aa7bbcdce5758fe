use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Opens one session per worker and keeps echoing until the deadline,
/// checking that every reply matches what was sent.
#[tokio::main]
async fn main() {
    let mut args = std::env::args().skip(1);
    let url = args
        .next()
        .unwrap_or_else(|| "ws://127.0.0.1:8989/stream".to_string());
    let num_workers: u64 = args.next().and_then(|v| v.parse().ok()).unwrap_or(50);
    let duration_secs: u64 = args.next().and_then(|v| v.parse().ok()).unwrap_or(10);

    let counter = Arc::new(AtomicU64::new(0));
    let mismatch_counter = Arc::new(AtomicU64::new(0));
    let error_counter = Arc::new(AtomicU64::new(0));
    let start = Instant::now();

    println!("Starting stream echo benchmark against {}", url);
    println!("Workers: {}, Duration: {}s", num_workers, duration_secs);

    let mut tasks = vec![];

    for worker in 0..num_workers {
        let url = url.clone();
        let counter = counter.clone();
        let mismatch_counter = mismatch_counter.clone();
        let error_counter = error_counter.clone();
        let task = tokio::spawn(async move {
            let mut ws = match connect_async(url.as_str()).await {
                Ok((ws, _)) => ws,
                Err(_) => {
                    error_counter.fetch_add(1, Ordering::Relaxed);
                    return;
                }
            };

            let mut seq: u64 = 0;
            while start.elapsed().as_secs() < duration_secs {
                let outgoing = if seq % 2 == 0 {
                    Message::Text(format!("worker-{}-{}", worker, seq).into())
                } else {
                    Message::Binary(seq.to_be_bytes().to_vec().into())
                };
                seq += 1;

                if ws.send(outgoing.clone()).await.is_err() {
                    error_counter.fetch_add(1, Ordering::Relaxed);
                    return;
                }
                match ws.next().await {
                    Some(Ok(reply)) if reply == outgoing => {
                        counter.fetch_add(1, Ordering::Relaxed);
                    }
                    Some(Ok(_)) => {
                        mismatch_counter.fetch_add(1, Ordering::Relaxed);
                    }
                    _ => {
                        error_counter.fetch_add(1, Ordering::Relaxed);
                        return;
                    }
                }
            }

            ws.close(None).await.ok();
        });
        tasks.push(task);
    }

    for task in tasks {
        task.await.ok();
    }

    let total = counter.load(Ordering::Relaxed);
    let mismatches = mismatch_counter.load(Ordering::Relaxed);
    let errors = error_counter.load(Ordering::Relaxed);
    let elapsed = start.elapsed().as_secs_f64();

    println!("\n=== Stream Echo Benchmark Results ===");
    println!("Echoed messages: {}", total);
    println!("Mismatched echoes: {}", mismatches);
    println!("Session errors: {}", errors);
    println!("Duration: {:.2}s", elapsed);
    println!("Messages/sec: {:.2}", total as f64 / elapsed);
}
