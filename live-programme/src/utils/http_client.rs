use std::{sync::OnceLock, time::Duration};

use tracing::{debug, warn};

pub fn install_rustls_provider() {
    static PROVIDER_INSTALLED: OnceLock<()> = OnceLock::new();
    PROVIDER_INSTALLED.get_or_init(|| {
        if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
            // Can happen if another crate installed it first.
            debug!(existing_provider = ?e, "rustls CryptoProvider already installed");
        }
    });
}

/// Build the `reqwest::Client` shared by all platform adapters.
pub fn build_platform_client(request_timeout: Duration, pool_max_idle_per_host: usize) -> reqwest::Client {
    install_rustls_provider();

    let mut builder = reqwest::Client::builder()
        .user_agent(concat!("live-programme/", env!("CARGO_PKG_VERSION")));

    if request_timeout > Duration::ZERO {
        builder = builder.timeout(request_timeout);
    }

    if pool_max_idle_per_host > 0 {
        builder = builder.pool_max_idle_per_host(pool_max_idle_per_host);
    }

    builder.build().unwrap_or_else(|error| {
        warn!(
            error = %error,
            "Failed to create configured HTTP client; falling back to reqwest defaults"
        );
        reqwest::Client::new()
    })
}
