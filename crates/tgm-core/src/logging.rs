use crate::Result;

/// Initialize tracing for the process.
///
/// Default: info for our crates, warn for everything else. Override with `RUST_LOG`.
pub fn init(service_name: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,tgm_core=info,tgm_openai=info,{service_name}=info"
        ))
    });

    // A second init (tests, embedding apps) keeps the first subscriber.
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .try_init();

    Ok(())
}
