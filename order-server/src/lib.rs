//! Order Server - 烤肉/烤鸡店订单跟踪与销售日报
//!
//! # 架构概述
//!
//! - **订单生命周期** (`orders`): 创建、稀疏更新、删除；pending → paid/cancelled
//!   时在同一事务内写入归档快照
//! - **数据库** (`db`): 嵌入式 SQLite (sqlx)，启动时执行迁移
//! - **统计** (`stats`): 实时统计、按日快照、归档区间汇总
//! - **日报** (`digest`): pt-BR 文本生成、WhatsApp 发送、每周定时任务
//! - **HTTP API** (`api`): axum RESTful 接口
//!
//! # 模块结构
//!
//! ```text
//! order-server/src/
//! ├── core/          # 配置、状态、后台任务、错误
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 连接池、迁移、仓储
//! ├── orders/        # 生命周期、金额计算
//! ├── stats/         # 聚合统计
//! ├── digest/        # 日报生成、发送、调度
//! └── utils/         # 错误、日志、时间、校验
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod digest;
pub mod orders;
pub mod stats;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, LogSettings, Server, ServerState};
pub use digest::{DigestDispatcher, DigestService};
pub use orders::LifecycleManager;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::init_logger_with_file;

/// 设置运行环境：加载 .env，初始化日志
///
/// 在读取 [`Config`] 之前调用，配置回退警告才能被记录。
pub fn setup_environment() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    let logs = LogSettings::from_env();
    if let Some(dir) = &logs.dir {
        std::fs::create_dir_all(dir)?;
    }
    init_logger_with_file(Some(&logs.level), logs.dir.as_deref());
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   ____          __
  / __ \_______/ /__ _______
 / /_/ / __/ _  / -_) __(_-<
 \____/_/  \_,_/\__/_/ /___/
    "#
    );
}
