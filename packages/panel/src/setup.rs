//! Process-wide setup for the `voice-panel` binary.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the tracing subscriber.
///
/// `RUST_LOG` still applies; `debug` raises the crate's own level. Calling
/// this twice is harmless, the second call is ignored.
pub fn init_tracing(debug: bool) -> Result<(), String> {
    let directive = if debug {
        "voice_panel=debug"
    } else {
        "voice_panel=info"
    };

    let _ = tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env().add_directive(
                directive
                    .parse()
                    .map_err(|e| format!("Failed to parse tracing directive: {e}"))?,
            ),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init();

    Ok(())
}
