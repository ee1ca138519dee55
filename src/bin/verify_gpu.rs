// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 检查 GPU 是否可用于推理
use anyhow::{bail, Result};
use clap::Parser;
use steel_qc::{gpu, logging};

#[derive(Parser, Debug)]
#[command(author, version, about = "Check that ONNX Runtime can use the GPU", long_about = None)]
struct Args {
    /// GPU 设备号
    #[arg(long, default_value_t = 0)]
    device_id: i32,

    /// GPU 不可用时以非零状态退出
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    let report = gpu::probe(args.device_id);
    report.print();
    if args.strict && !report.available {
        bail!("GPU {} is not available", args.device_id);
    }
    Ok(())
}
