use anyhow::Result;
use prometheus::Registry;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::metrics;

pub struct Observability {
    pub registry: Registry,
}

impl Observability {
    /// Install the tracing subscriber and build the metrics registry.
    ///
    /// `RUST_LOG` selects levels; `LOG_FORMAT=json` switches to JSON lines.
    pub fn init() -> Result<Self> {
        let registry = Self::registry()?;

        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "api=debug,helloworld_api=debug,tower_http=debug".into());

        let json = std::env::var("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if json {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?;
        } else {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .try_init()?;
        }

        tracing::info!(json_logs = json, "Observability stack initialized (tracing + Prometheus)");
        Ok(Self { registry })
    }

    /// Registry with every application metric registered under the `helloworld` prefix
    pub fn registry() -> Result<Registry> {
        let registry = Registry::new_custom(Some("helloworld".into()), None)?;
        metrics::register_all(&registry)?;
        Ok(registry)
    }
}
