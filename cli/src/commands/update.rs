//! update

use crate::app::runtime::Runtime;
use crate::errors::CliError;
use crate::installer::update::{UpdateEngine, UpdatePlan, UpdateRequest};

pub async fn update(rt: &mut Runtime<'_>, request: &UpdateRequest) -> Result<(), CliError> {
    let plan = UpdatePlan::resolve(rt.ctx, request).await?;
    UpdateEngine::new(rt.ctx, rt.installer, rt.scripts)
        .run(&plan, &mut *rt.out)
        .await
}
