// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! GPU 可用性检查
//!
//! 两个条件同时满足才算可用:
//! - ONNX Runtime 带有 CUDA 执行器
//! - `nvidia-smi` 能查询到指定设备

use std::process::Command;
use std::sync::LazyLock;

use ort::execution_providers::{
    CUDAExecutionProvider, ExecutionProvider, TensorRTExecutionProvider,
};
use regex::Regex;
use tracing::{debug, warn};

static CUDA_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"CUDA Version:\s*([0-9]+(?:\.[0-9]+)*)").expect("valid regex"));

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GpuReport {
    pub available: bool,
    pub cuda_provider: bool,
    pub tensorrt_provider: bool,
    pub device_id: i32,
    pub device_name: Option<String>,
    pub driver_version: Option<String>,
    pub cuda_version: Option<String>,
}

impl GpuReport {
    pub fn print(&self) {
        if self.available {
            println!("✅ GPU is available and ONNX Runtime is set up correctly!");
            println!(
                "CUDA version: {}",
                self.cuda_version.as_deref().unwrap_or("unknown")
            );
            println!("Device ID: {}", self.device_id);
            println!(
                "Device name: {}",
                self.device_name.as_deref().unwrap_or("unknown")
            );
            if let Some(driver) = &self.driver_version {
                println!("Driver version: {}", driver);
            }
            println!(
                "TensorRT: {}",
                if self.tensorrt_provider { "available" } else { "not available" }
            );
        } else {
            println!(
                "❌ Warning: could not find a usable GPU. The model will run on the CPU, which will be much slower."
            );
            if !self.cuda_provider {
                println!("   ONNX Runtime was built without the CUDA execution provider.");
            }
            if self.device_name.is_none() {
                println!("   nvidia-smi did not report device {}.", self.device_id);
            }
        }
    }
}

pub fn probe(device_id: i32) -> GpuReport {
    let cuda_provider = provider_available(
        "CUDA",
        CUDAExecutionProvider::default()
            .with_device_id(device_id)
            .is_available(),
    );
    let tensorrt_provider = provider_available(
        "TensorRT",
        TensorRTExecutionProvider::default()
            .with_device_id(device_id)
            .is_available(),
    );

    let (device_name, driver_version) = nvidia_smi(&[
        "-i",
        &device_id.to_string(),
        "--query-gpu=name,driver_version",
        "--format=csv,noheader",
    ])
    .and_then(|out| parse_query_line(&out))
    .map(|(name, driver)| (Some(name), Some(driver)))
    .unwrap_or((None, None));

    let cuda_version = nvidia_smi(&[]).and_then(|out| parse_cuda_version(&out));

    GpuReport {
        available: cuda_provider && device_name.is_some(),
        cuda_provider,
        tensorrt_provider,
        device_id,
        device_name,
        driver_version,
        cuda_version,
    }
}

fn provider_available(name: &str, result: ort::Result<bool>) -> bool {
    match result {
        Ok(available) => available,
        Err(e) => {
            warn!("⚠️ 查询 {} 执行器失败: {}", name, e);
            false
        }
    }
}

fn nvidia_smi(args: &[&str]) -> Option<String> {
    match Command::new("nvidia-smi").args(args).output() {
        Ok(out) if out.status.success() => Some(String::from_utf8_lossy(&out.stdout).into_owned()),
        Ok(out) => {
            debug!("nvidia-smi exited with {}", out.status);
            None
        }
        Err(e) => {
            debug!("nvidia-smi not runnable: {}", e);
            None
        }
    }
}

/// `NVIDIA GeForce RTX 3080 Ti, 535.104.05` → (name, driver)
pub fn parse_query_line(out: &str) -> Option<(String, String)> {
    let line = out.lines().map(str::trim).find(|l| !l.is_empty())?;
    let (name, driver) = line.rsplit_once(',')?;
    let (name, driver) = (name.trim(), driver.trim());
    if name.is_empty() || driver.is_empty() {
        return None;
    }
    Some((name.to_string(), driver.to_string()))
}

/// 从 nvidia-smi 表头中取 `CUDA Version: 12.2`
pub fn parse_cuda_version(out: &str) -> Option<String> {
    CUDA_VERSION.captures(out).map(|cap| cap[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_line() {
        let out = "NVIDIA GeForce RTX 3080 Ti, 535.104.05\n";
        assert_eq!(
            parse_query_line(out),
            Some((
                "NVIDIA GeForce RTX 3080 Ti".to_string(),
                "535.104.05".to_string()
            ))
        );
        assert_eq!(parse_query_line(""), None);
        assert_eq!(parse_query_line("no comma here"), None);
    }

    #[test]
    fn test_parse_cuda_version() {
        let banner = "+---------------------------------------------------------------------------------------+\n\
                      | NVIDIA-SMI 535.104.05             Driver Version: 535.104.05   CUDA Version: 12.2     |\n";
        assert_eq!(parse_cuda_version(banner).as_deref(), Some("12.2"));
        assert_eq!(parse_cuda_version("nothing"), None);
    }

    #[test]
    fn test_unavailable_report_defaults() {
        let report = GpuReport::default();
        assert!(!report.available);
        report.print();
    }
}
