#[cfg(feature = "gpu")]
use burn::backend::{wgpu::WgpuDevice, Wgpu};
use burn::backend::{ndarray::NdArrayDevice, NdArray};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod device;
mod walk;

use device::DeviceChoice;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cmd = cli::Cli::parse();
    cmd.validate()?;

    let summary = match DeviceChoice::resolve(cmd.no_cuda) {
        DeviceChoice::Cpu => walk::run::<NdArray>(&cmd, NdArrayDevice::Cpu)?,
        #[cfg(feature = "gpu")]
        DeviceChoice::Accelerator => walk::run::<Wgpu>(&cmd, WgpuDevice::default())?,
        #[cfg(not(feature = "gpu"))]
        DeviceChoice::Accelerator => {
            unreachable!("accelerator resolved in a build without the gpu feature")
        }
    };
    tracing::info!(
        "training set ready: {} windows in {} batches",
        summary.windows,
        summary.batches
    );

    Ok(())
}
