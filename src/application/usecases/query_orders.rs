// Use cases: list_orders and get_order (read-only views of the cached projection).

use crate::application::context::AppContext;
use crate::domain::entities::cached_order::CachedOrder;
use crate::domain::value_objects::environment::Environment;

pub const DEFAULT_ORDER_LIMIT: u32 = 50;
pub const MAX_ORDER_LIMIT: u32 = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOrdersError {
    InvalidEnv,
    NotFound,
    Storage(String),
}

fn resolve_env(ctx: &AppContext, env: Option<&str>) -> Result<Environment, QueryOrdersError> {
    let env = env.unwrap_or(&ctx.settings.upstream.default_env);
    Environment::parse(env).ok_or(QueryOrdersError::InvalidEnv)
}

pub struct ListOrdersUseCase;

impl ListOrdersUseCase {
    /// Cached orders of one environment, most recently updated first.
    pub async fn execute(
        ctx: &AppContext,
        env: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<CachedOrder>, QueryOrdersError> {
        let env = resolve_env(ctx, env)?;
        let limit = limit.unwrap_or(DEFAULT_ORDER_LIMIT).clamp(1, MAX_ORDER_LIMIT);

        ctx.repos
            .order
            .list(env, limit)
            .await
            .map_err(|e| QueryOrdersError::Storage(format!("{e:?}")))
    }
}

pub struct GetOrderUseCase;

impl GetOrderUseCase {
    pub async fn execute(
        ctx: &AppContext,
        env: Option<&str>,
        order_id: &str,
    ) -> Result<CachedOrder, QueryOrdersError> {
        let env = resolve_env(ctx, env)?;

        ctx.repos
            .order
            .get(env, order_id.trim())
            .await
            .map_err(|e| QueryOrdersError::Storage(format!("{e:?}")))?
            .ok_or(QueryOrdersError::NotFound)
    }
}
