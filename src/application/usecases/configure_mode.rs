// Use cases: get_mode and set_mode.

use crate::application::context::AppContext;
use crate::domain::value_objects::delivery_mode::{
    DeliveryMode, ModeValidationError, validate_timeout_ms,
};
use crate::domain::value_objects::environment::Environment;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeError {
    InvalidEnv,
    InvalidMode,
    InvalidTimeout,
    NotFound,
    Storage(String),
}

impl From<ModeValidationError> for ModeError {
    fn from(err: ModeValidationError) -> Self {
        match err {
            ModeValidationError::InvalidMode => ModeError::InvalidMode,
            ModeValidationError::InvalidTimeout => ModeError::InvalidTimeout,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeSettings {
    pub env: Environment,
    pub mode: DeliveryMode,
    pub timeout_ms: u32,
}

/// Reads the simulation mode of an environment's active endpoint.
pub struct GetModeUseCase;

impl GetModeUseCase {
    pub async fn execute(ctx: &AppContext, env: &str) -> Result<ModeSettings, ModeError> {
        let env = Environment::parse(env).ok_or(ModeError::InvalidEnv)?;

        let endpoint = ctx
            .repos
            .endpoint
            .get_active(env)
            .await
            .map_err(|e| ModeError::Storage(format!("{e:?}")))?
            .ok_or(ModeError::NotFound)?;

        Ok(ModeSettings {
            env,
            mode: endpoint.delivery_mode,
            timeout_ms: endpoint.timeout_ms,
        })
    }
}

/// Sets the simulation mode for a whole environment.
pub struct SetModeUseCase;

#[derive(Debug, Clone)]
pub struct SetModeCommand {
    pub env: String,
    pub mode: String,
    /// Omitted keeps the active endpoint's delay, or the configured default.
    pub timeout_ms: Option<i64>,
}

impl SetModeUseCase {
    pub async fn execute(ctx: &AppContext, cmd: SetModeCommand) -> Result<ModeSettings, ModeError> {
        // Step 1: Validate env, mode and delay bound.
        let env = Environment::parse(&cmd.env).ok_or(ModeError::InvalidEnv)?;
        let mode = DeliveryMode::parse(&cmd.mode)?;
        let max = ctx.settings.delivery.max_simulated_timeout_ms;
        let timeout_ms = match cmd.timeout_ms {
            Some(value) => validate_timeout_ms(value, max)?,
            None => Self::current_timeout(ctx, env).await?,
        };

        // Step 2: Write the mode, seeding a default endpoint for an empty environment.
        let touched = ctx
            .repos
            .endpoint
            .upsert_mode(env, mode, timeout_ms, &ctx.endpoint_defaults())
            .await
            .map_err(|e| ModeError::Storage(format!("{e:?}")))?;

        info!(env = %env, mode = %mode, timeout_ms, endpoints = touched, "delivery mode set");
        Ok(ModeSettings {
            env,
            mode,
            timeout_ms,
        })
    }

    async fn current_timeout(ctx: &AppContext, env: Environment) -> Result<u32, ModeError> {
        let active = ctx
            .repos
            .endpoint
            .get_active(env)
            .await
            .map_err(|e| ModeError::Storage(format!("{e:?}")))?;
        Ok(active
            .map(|endpoint| endpoint.timeout_ms)
            .unwrap_or(ctx.settings.delivery.default_timeout_ms))
    }
}
