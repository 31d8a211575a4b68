/// Lock a mutex and return a possible poison error converted to an `anyhow::Error`.
/// ```ignore
/// let mutex = Mutex::new(Board::new());
/// // needs to be inside of a function that returns an anyhow::Result
/// lock!(mutex).add_destination();
/// ```
macro_rules! lock {
    ($mutex:expr) => {
        $mutex.lock().map_err(|e| anyhow::anyhow!("{e}"))?
    };
}
