use std::sync::Arc;

use sqlx::SqlitePool;

use crate::core::tasks::BackgroundTasks;
use crate::core::{Config, Result, ServerError};
use crate::db::DbService;
use crate::digest::{
    DigestDispatcher, DigestScheduler, DigestService, HttpMessageChannel, MessageChannel,
};
use crate::orders::LifecycleManager;

/// 服务器状态 - 持有进程级单例的引用
///
/// 启动时构造一次，通过 axum `State` 注入到所有处理器，
/// 并交给后台调度器。Clone 只复制句柄。
///
/// # 示例
///
/// ```ignore
/// let state = ServerState::initialize(&config).await?;
/// let order = state.lifecycle.create(payload).await?;
/// ```
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// 订单生命周期 (创建/更新/删除 + 归档)
    pub lifecycle: LifecycleManager,
    /// 周报流水线
    pub digest: DigestService,
}

impl ServerState {
    /// 由已有组件构造 (测试中注入内存数据库和模拟通道)
    pub fn from_parts(config: Config, pool: SqlitePool, channel: Arc<dyn MessageChannel>) -> Self {
        let tz = config.timezone;
        let dispatcher = DigestDispatcher::new(
            channel,
            config.whatsapp_phone.clone(),
            config.whatsapp_api_key.clone(),
        );
        Self {
            lifecycle: LifecycleManager::new(pool.clone(), tz),
            digest: DigestService::new(pool.clone(), dispatcher, tz),
            pool,
            config,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录
    /// 2. 数据库 (迁移在打开时执行)
    /// 3. WhatsApp 网关通道
    pub async fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir).map_err(ServerError::WorkDir)?;
        if let Some(parent) = std::path::Path::new(&config.database_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(ServerError::WorkDir)?;
            }
        }

        let db = DbService::new(&config.database_path).await?;

        let channel = HttpMessageChannel::new(
            config.whatsapp_api_url.clone(),
            config.dispatch_timeout(),
        )?;

        let state = Self::from_parts(config.clone(), db.pool, Arc::new(channel));
        if state.digest.is_dispatch_configured() {
            tracing::info!("WhatsApp digest dispatch configured");
        } else {
            tracing::warn!("WHATSAPP_PHONE / WHATSAPP_API_KEY not set, digests will not be delivered");
        }
        Ok(state)
    }

    /// 启动后台任务
    ///
    /// 启动的任务：
    /// - 周报调度器 (DIGEST_ENABLED=true 时)
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();

        if self.config.digest_enabled {
            let scheduler = DigestScheduler::new(
                self.digest.clone(),
                tasks.shutdown_token(),
                self.config.digest_weekday,
                self.config.digest_time,
                self.config.timezone,
            );
            tasks.spawn("digest_scheduler", scheduler.run());
        } else {
            tracing::info!("Digest scheduler disabled");
        }

        tracing::info!("Background tasks registered: {}", tasks.len());
        tasks
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
