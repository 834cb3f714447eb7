// ==========================================
// CBAM 铝业碳排放平台 - 当前主体 (认证接口)
// ==========================================
// 认证本身由外部服务完成,这里只定义取得当前主体的接口
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::facility::Principal;
use async_trait::async_trait;

#[async_trait]
pub trait PrincipalProvider: Send + Sync {
    /// 当前登录主体;未登录返回 Unauthenticated
    async fn current_principal(&self) -> ApiResult<Principal>;
}

/// 固定主体 (CLI / 测试)
#[derive(Debug, Clone, Default)]
pub struct StaticPrincipalProvider {
    principal: Option<Principal>,
}

impl StaticPrincipalProvider {
    pub fn new(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    pub fn anonymous() -> Self {
        Self { principal: None }
    }
}

#[async_trait]
impl PrincipalProvider for StaticPrincipalProvider {
    async fn current_principal(&self) -> ApiResult<Principal> {
        self.principal.clone().ok_or(ApiError::Unauthenticated)
    }
}

/// 写操作权限检查
pub(crate) fn ensure_can_write(principal: &Principal) -> ApiResult<()> {
    if principal.role.can_write() {
        Ok(())
    } else {
        Err(ApiError::PermissionDenied(format!(
            "用户 {} 为只读角色",
            principal.user_id
        )))
    }
}
