/// Run `op` on a rayon pool of `threads` workers. Zero means the global pool.
pub fn run_in_pool<T, F>(threads: usize, op: F) -> T
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    if threads == 0 {
        return op();
    }

    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(op),
        Err(e) => {
            log::warn!("Falling back to the global thread pool: {e}");
            op()
        }
    }
}
