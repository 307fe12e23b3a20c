//! Demo 02: Durable backends
//!
//! Persists the same collection through the SQLite and flat-file
//! backends and shows it surviving a store re-open.
//!
//! Run with: cargo run --example 02_backends

use eyre::Result;
use taskpad::{FileStorage, SqliteStorage, TaskStore};

fn main() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;

    println!("Taskpad Backends Demo");
    println!("=====================\n");
    println!("Store path: {}\n", temp_dir.path().display());

    // SQLite: one kv row under the TASKS key
    println!("1. SQLite backend...");
    let db_path = temp_dir.path().join("taskpad.db");
    {
        let store = TaskStore::open(SqliteStorage::open(&db_path)?)?;
        store.add("Water the plants")?;
        store.add("Book dentist")?;
    }
    let store = TaskStore::open(SqliteStorage::open(&db_path)?)?;
    println!("   Re-opened with {} task(s):", store.tasks().len());
    for task in store.tasks().iter() {
        println!("   - {}", task.title);
    }
    println!();

    // Flat file: a TASKS.json file in the store directory
    println!("2. Flat-file backend...");
    {
        let store = TaskStore::open(FileStorage::open(temp_dir.path())?)?;
        store.add("Take out trash")?;
    }
    let store = TaskStore::open(FileStorage::open(temp_dir.path())?)?;
    println!("   Re-opened with {} task(s):", store.tasks().len());
    for task in store.tasks().iter() {
        println!("   - {}", task.title);
    }
    println!();

    println!("Demo complete!");
    Ok(())
}
