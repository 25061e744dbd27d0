use anyhow::Result;
use std::path::Path;

use thematic_classifier::orchestrator::App;
use thematic_classifier::utils::logging;
use thematic_classifier::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置（环境变量 + 可选 secrets.toml）
    let config = Config::load(Path::new("secrets.toml"));

    // 任务描述文件：第一个命令行参数，缺省 job.toml
    let job_file_path = std::env::args().nth(1).unwrap_or_else(|| "job.toml".to_string());

    // 初始化并运行应用
    App::initialize(config)?.run(Path::new(&job_file_path)).await?;

    Ok(())
}
