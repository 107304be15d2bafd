use anyhow::Result;
use job_snapshot_crawler::utils::logging;
use job_snapshot_crawler::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 凭据等放在 .env 中，不存在时忽略
    dotenvy::dotenv().ok();

    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let app = App::initialize(config).await?;
    let result = app.run().await;
    app.shutdown().await;
    result?;

    Ok(())
}
