use crate::commands::Session;
use envctl_cloud::Expectation;

/// Poll until the environment is gone (`absent`) or fully present
///
/// Unlike the post-action verification, a timeout here fails the command.
pub async fn handle(session: &Session, env_name: &str, absent: bool) -> anyhow::Result<()> {
    session.log_source();
    let env = session.environment(env_name)?;
    let controller = session.controller()?;
    controller.authenticate().await?;

    let expectation = if absent {
        Expectation::Absent
    } else {
        Expectation::Present {
            min_resources: env.expected_resources.unwrap_or(0),
        }
    };

    let outcome = controller
        .wait_for(&env.resource_group, expectation, None)
        .await;
    if !outcome.is_confirmed() {
        anyhow::bail!(
            "{} is not {} after {} checks",
            env.resource_group,
            expectation,
            outcome.attempts()
        );
    }
    Ok(())
}
