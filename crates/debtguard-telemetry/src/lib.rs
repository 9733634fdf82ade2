use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Configuration for the telemetry subsystem.
#[derive(Clone, Debug)]
pub struct TelemetryConfig {
    /// Default log level. Overridden by RUST_LOG env var.
    pub log_level: Level,
    /// Per-module level overrides (e.g. "debtguard_llm" => DEBUG).
    pub module_levels: Vec<(String, Level)>,
    /// Emit JSON lines instead of human-readable text.
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Level::WARN,
            module_levels: Vec::new(),
            json: false,
        }
    }
}

impl TelemetryConfig {
    pub fn with_module_level(mut self, module: impl Into<String>, level: Level) -> Self {
        let module = module.into();
        if let Some(entry) = self.module_levels.iter_mut().find(|(m, _)| *m == module) {
            entry.1 = level;
        } else {
            self.module_levels.push((module, level));
        }
        self
    }

    /// The `EnvFilter` directive string derived from this config.
    pub fn directives(&self) -> String {
        let mut filter_str = self.log_level.to_string().to_lowercase();
        for (module, level) in &self.module_levels {
            filter_str.push_str(&format!(",{}={}", module, level.to_string().to_lowercase()));
        }
        filter_str
    }
}

/// Handle returned by [`init_telemetry`].
#[derive(Debug)]
pub struct TelemetryGuard {
    installed: bool,
    directives: String,
}

impl TelemetryGuard {
    /// False when another global subscriber was already set.
    pub fn installed(&self) -> bool {
        self.installed
    }

    pub fn directives(&self) -> &str {
        &self.directives
    }
}

/// Install the global tracing subscriber. Logs go to stderr so stdout stays
/// free for the interactive front end. Safe to call more than once.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryGuard {
    let directives = config.directives();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directives));

    let json_layer = config.json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!config.json).then(|| {
        tracing_subscriber::fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(std::io::stderr)
    });

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .is_ok();

    TelemetryGuard { installed, directives }
}

/// Parse a level name ("info", "DEBUG", ...). Unknown names yield `None`.
pub fn parse_level(name: &str) -> Option<Level> {
    name.trim().parse().ok()
}
