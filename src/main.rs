use anyhow::Result;
use quiz_auto_answer::logger;
use quiz_auto_answer::orchestrator::App;
use quiz_auto_answer::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logger::init();

    // 加载配置
    let config = Config::from_env();

    // 初始化并运行应用
    let mut app = App::initialize(config)?;
    app.run().await?;

    Ok(())
}
