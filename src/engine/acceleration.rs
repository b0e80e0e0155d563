//! Hardware-accelerated decoding selection

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::domain::errors::DomainError;
use crate::ports::{LogPort, MediaBackendPort};

/// Decoder acceleration methods the engine knows how to request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HardwareAcceleration {
    Cuda,
    VideoToolbox,
    Qsv,
    Vaapi,
    D3d11va,
    Dxva2,
}

impl HardwareAcceleration {
    /// Preference order used by automatic selection
    pub const PREFERENCE: [HardwareAcceleration; 6] = [
        HardwareAcceleration::Cuda,
        HardwareAcceleration::VideoToolbox,
        HardwareAcceleration::Qsv,
        HardwareAcceleration::Vaapi,
        HardwareAcceleration::D3d11va,
        HardwareAcceleration::Dxva2,
    ];

    /// Name passed to `-hwaccel`
    pub fn hwaccel_name(&self) -> &'static str {
        match self {
            HardwareAcceleration::Cuda => "cuda",
            HardwareAcceleration::VideoToolbox => "videotoolbox",
            HardwareAcceleration::Qsv => "qsv",
            HardwareAcceleration::Vaapi => "vaapi",
            HardwareAcceleration::D3d11va => "d3d11va",
            HardwareAcceleration::Dxva2 => "dxva2",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::PREFERENCE
            .iter()
            .copied()
            .find(|method| method.hwaccel_name().eq_ignore_ascii_case(name))
    }

    /// First preferred method present in a backend's capability list
    pub fn pick_preferred(available: &[String]) -> Option<Self> {
        Self::PREFERENCE.iter().copied().find(|method| {
            available
                .iter()
                .any(|name| name.trim().eq_ignore_ascii_case(method.hwaccel_name()))
        })
    }
}

impl fmt::Display for HardwareAcceleration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hwaccel_name())
    }
}

/// How the engine chooses acceleration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccelerationMode {
    /// Probe the backend once and use the preferred available method
    #[default]
    Auto,
    /// Never request acceleration
    Disabled,
    /// Always request the given method without probing
    Force(HardwareAcceleration),
}

impl AccelerationMode {
    /// Parse `auto`, `none`, or a method name
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value.trim().to_lowercase().as_str() {
            "auto" => Ok(AccelerationMode::Auto),
            "none" | "off" | "disabled" => Ok(AccelerationMode::Disabled),
            other => HardwareAcceleration::from_name(other)
                .map(AccelerationMode::Force)
                .ok_or_else(|| {
                    DomainError::BadArgs(format!(
                        "Unknown acceleration '{}'. Valid values: auto, none, {}",
                        value,
                        HardwareAcceleration::PREFERENCE
                            .iter()
                            .map(|m| m.hwaccel_name())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ))
                }),
        }
    }
}

impl fmt::Display for AccelerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccelerationMode::Auto => f.write_str("auto"),
            AccelerationMode::Disabled => f.write_str("none"),
            AccelerationMode::Force(method) => write!(f, "{}", method),
        }
    }
}

/// Acceleration choice resolved at most once per engine.
///
/// A failed or empty probe resolves to no acceleration and is never retried.
#[derive(Debug, Default)]
pub struct AccelerationSelector {
    mode: AccelerationMode,
    probed: OnceCell<Option<HardwareAcceleration>>,
}

impl AccelerationSelector {
    pub fn new(mode: AccelerationMode) -> Self {
        Self {
            mode,
            probed: OnceCell::new(),
        }
    }

    pub fn mode(&self) -> AccelerationMode {
        self.mode
    }

    pub async fn resolve(
        &self,
        backend: &dyn MediaBackendPort,
        log_port: &dyn LogPort,
    ) -> Option<HardwareAcceleration> {
        match self.mode {
            AccelerationMode::Disabled => None,
            AccelerationMode::Force(method) => Some(method),
            AccelerationMode::Auto => *self
                .probed
                .get_or_init(|| async {
                    match backend.available_accelerations().await {
                        Ok(available) => {
                            let chosen = HardwareAcceleration::pick_preferred(&available);
                            match chosen {
                                Some(method) => {
                                    log_port
                                        .info(&format!("Using hardware acceleration: {}", method))
                                        .await
                                }
                                None => {
                                    log_port
                                        .debug("No preferred hardware acceleration available")
                                        .await
                                }
                            }
                            chosen
                        }
                        Err(e) => {
                            log_port
                                .debug(&format!("Acceleration probe failed: {}", e))
                                .await;
                            None
                        }
                    }
                })
                .await,
        }
    }
}
