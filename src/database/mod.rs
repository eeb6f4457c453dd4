// 数据库模块
// 管理员与面板的只读访问，表结构由迁移工具维护

pub mod models; // 数据库实体与领域模型
pub mod repositories; // 查询实现

// 重新导出常用类型，方便其他模块使用
pub use models::{Admin, AdminEntity, Panel, PanelEntity};
pub use repositories::{Directory, DirectoryError, PgDirectory};
