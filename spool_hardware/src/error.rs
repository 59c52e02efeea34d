use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("hx711 data-ready timeout")]
    DataReadyTimeout,
    #[error("scale returned no samples")]
    NoSamples,
    #[error("display error: {0}")]
    Display(String),
}

pub type Result<T> = std::result::Result<T, HwError>;
