//! Demo 03: Shared store
//!
//! Shares one store across threads behind `Arc` and shows that
//! rapid-fire mutations are serialized, so no add is lost.
//!
//! Run with: cargo run --example 03_shared_store

use eyre::Result;
use std::sync::{Arc, Barrier};
use std::thread;
use taskpad::{MemoryStorage, TaskStore};

fn main() -> Result<()> {
    println!("Taskpad Shared Store Demo");
    println!("=========================\n");

    let store = Arc::new(TaskStore::open(MemoryStorage::new())?);

    // Four workers adding five tasks each, released together so the
    // adds land as close in time as possible
    let barrier = Arc::new(Barrier::new(4));
    let mut handles = Vec::new();
    for worker in 0..4 {
        let store = Arc::clone(&store);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for i in 0..5 {
                store
                    .add(format!("worker {worker} item {i}"))
                    .expect("add failed");
            }
        }));
    }
    for handle in handles {
        handle.join().expect("worker panicked");
    }

    let tasks = store.tasks();
    println!("4 workers x 5 adds -> {} task(s)", tasks.len());

    let mut stamps: Vec<&str> = tasks.iter().map(|t| t.timestamp.as_str()).collect();
    stamps.sort_unstable();
    stamps.dedup();
    println!("{} distinct timestamps\n", stamps.len());

    println!("Demo complete!");
    Ok(())
}
