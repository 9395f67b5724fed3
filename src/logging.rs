//! Инициализация логирования

use tracing_subscriber::EnvFilter;

/// fmt-подписчик в stderr, уровень из RUST_LOG (по умолчанию info).
/// stdout остается для строки с accuracy.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Повторная инициализация (например, в тестах) не считается ошибкой
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
