// Dance Skeleton 🕺 AGPL-3.0 License

//! Compute backend selection.
//!
//! The delegate names the backend the pose model runs on. CPU is the
//! default and always available; hardware backends require the matching
//! Cargo feature.

use std::fmt;
use std::str::FromStr;

/// Compute backend for pose model inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delegate {
    /// CPU execution (default).
    Cpu,
    /// NVIDIA CUDA GPU. The argument is the device index.
    Cuda(usize),
    /// Apple `CoreML` (macOS/iOS).
    CoreMl,
}

impl Default for Delegate {
    fn default() -> Self {
        Self::Cpu
    }
}

impl fmt::Display for Delegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda(i) => write!(f, "cuda:{i}"),
            Self::CoreMl => write!(f, "coreml"),
        }
    }
}

impl FromStr for Delegate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_lowercase();
        match s.as_str() {
            "cpu" => Ok(Self::Cpu),
            "coreml" => Ok(Self::CoreMl),
            _ => {
                if let Some(rest) = s.strip_prefix("cuda") {
                    Ok(Self::Cuda(parse_device_index(rest).unwrap_or(0)))
                } else {
                    Err(format!("Unknown delegate: {s}"))
                }
            }
        }
    }
}

/// Parse a device index suffix like ":0".
fn parse_device_index(s: &str) -> Option<usize> {
    if s.is_empty() {
        return None;
    }
    s.strip_prefix(':')
        .and_then(|index_str| index_str.parse::<usize>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delegate() {
        assert_eq!(Delegate::from_str("cpu").unwrap(), Delegate::Cpu);
        assert_eq!(Delegate::from_str("cuda").unwrap(), Delegate::Cuda(0));
        assert_eq!(Delegate::from_str("cuda:1").unwrap(), Delegate::Cuda(1));
        assert_eq!(Delegate::from_str("coreml").unwrap(), Delegate::CoreMl);
        assert!(Delegate::from_str("tpu").is_err());
    }

    #[test]
    fn test_delegate_display() {
        assert_eq!(Delegate::Cpu.to_string(), "cpu");
        assert_eq!(Delegate::Cuda(2).to_string(), "cuda:2");
    }
}
