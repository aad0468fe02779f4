use std::fmt;

/// Whether this binary carries an accelerator backend.
pub fn accelerator_available() -> bool {
    cfg!(feature = "gpu")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceChoice {
    Cpu,
    Accelerator,
}

impl DeviceChoice {
    pub fn resolve(no_cuda: bool) -> Self {
        let available = accelerator_available();
        let choice = Self::select(available, no_cuda);
        tracing::info!("accelerator available: {available}, using {choice}");
        choice
    }

    fn select(available: bool, no_cuda: bool) -> Self {
        if available && !no_cuda {
            Self::Accelerator
        } else {
            Self::Cpu
        }
    }
}

impl fmt::Display for DeviceChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Accelerator => write!(f, "accelerator"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accelerator_needs_availability_and_permission() {
        assert_eq!(DeviceChoice::select(true, false), DeviceChoice::Accelerator);
        assert_eq!(DeviceChoice::select(true, true), DeviceChoice::Cpu);
        assert_eq!(DeviceChoice::select(false, false), DeviceChoice::Cpu);
        assert_eq!(DeviceChoice::select(false, true), DeviceChoice::Cpu);
    }

    #[test]
    fn no_cuda_always_resolves_to_cpu() {
        assert_eq!(DeviceChoice::resolve(true), DeviceChoice::Cpu);
    }
}
