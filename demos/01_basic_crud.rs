//! Demo 01: Basic task operations
//!
//! Adds, toggles, and removes tasks against an in-memory slot, printing
//! the collection after each step.
//!
//! Run with: cargo run --example 01_basic_crud

use eyre::Result;
use taskpad::{MemoryStorage, Task, TaskStore};

fn main() -> Result<()> {
    println!("Taskpad Basic Operations Demo");
    println!("=============================\n");

    // Open a store over an in-memory slot
    let store = TaskStore::open(MemoryStorage::new())?;
    println!("Store opened. {} task(s).\n", store.tasks().len());

    // ADD: newest first
    println!("1. ADD - Creating two tasks...");
    store.add("Buy milk")?;
    let tasks = store.add("Call home")?;
    print_tasks(&tasks);

    // TOGGLE: mark the older task done
    println!("2. TOGGLE - Completing \"Buy milk\"...");
    let id = tasks[1].id();
    let tasks = store.set_status(&id, true)?;
    print_tasks(&tasks);

    // REMOVE: drop the completed task
    println!("3. REMOVE - Deleting \"Buy milk\"...");
    let tasks = store.remove(&id)?;
    print_tasks(&tasks);

    println!("Demo complete!");
    Ok(())
}

fn print_tasks(tasks: &[Task]) {
    for task in tasks {
        let marker = if task.status { "x" } else { " " };
        println!("   [{}] {} ({})", marker, task.title, task.timestamp);
    }
    println!();
}
