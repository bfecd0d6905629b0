//! Concurrent access tests for write_atomic locking

use filestate_fs::io;
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::tempdir;

#[test]
fn test_concurrent_writes_no_corruption() {
    let dir = tempdir().unwrap();
    let file_path = Arc::new(dir.path().join("concurrent.txt"));

    let num_threads = 10;
    let writes_per_thread = 20;
    let barrier = Arc::new(Barrier::new(num_threads));

    let handles: Vec<_> = (0..num_threads)
        .map(|thread_id| {
            let path = Arc::clone(&file_path);
            let barrier = Arc::clone(&barrier);

            thread::spawn(move || {
                barrier.wait();
                for i in 0..writes_per_thread {
                    let content = format!("thread{}:write{}\n", thread_id, i);
                    io::write_text(&path, &content).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread should not panic");
    }

    let content = std::fs::read_to_string(file_path.as_ref()).unwrap();
    assert!(content.starts_with("thread"), "got: {content}");
    assert_eq!(
        content.matches("thread").count(),
        1,
        "Content should be one complete write, not interleaved"
    );
}

#[test]
fn test_write_waits_for_external_lock() {
    use fs2::FileExt;
    use std::time::Duration;

    let dir = tempdir().unwrap();
    let file_path = dir.path().join("locked.txt");
    std::fs::write(&file_path, "before").unwrap();

    let holder = std::fs::File::open(&file_path).unwrap();
    holder.lock_exclusive().unwrap();

    let writer_path = file_path.clone();
    let writer = thread::spawn(move || io::write_text(&writer_path, "after"));

    thread::sleep(Duration::from_millis(100));
    assert_eq!(std::fs::read_to_string(&file_path).unwrap(), "before");

    drop(holder);
    writer.join().unwrap().unwrap();
    assert_eq!(std::fs::read_to_string(&file_path).unwrap(), "after");
}
