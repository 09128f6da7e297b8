/// Installs a formatted `tracing` subscriber for applications that do not
/// bring their own. Safe to call more than once; later calls are no-ops.
pub fn init() {
    let _ = tracing_subscriber::fmt().try_init();
}
