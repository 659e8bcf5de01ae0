use std::sync::Arc;

use anyhow::{anyhow, bail, Context as _};
use serde::Serialize;
use serde_json::{json, Value};

use crate::client::{ApiClient, LeaveFilter, LeaveStatus, ListQuery, UserFilter};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::identity::{get_permissions, FileStorage, GuardDecision, Role, RouteGuard, Session, SessionStore};
use crate::navigation::{MemoryNavigator, Navigator};

use super::args::{Cli, Command};
use super::table::render_table;

const DEPARTMENT_COLUMNS: &[&str] = &["id", "name", "nameAr", "employeeCount", "managerId"];
const USER_COLUMNS: &[&str] = &["id", "name", "email", "role", "departmentId", "isActive"];
const LEAVE_COLUMNS: &[&str] = &["id", "userName", "leaveTypeName", "startDate", "endDate", "days", "status"];
const APPROVER_ROLES: &[Role] = &[Role::GeneralManager, Role::HrManager, Role::TeamLeader];

/// Everything one CLI invocation needs: a client over the persisted session and the
/// navigator the 401 policy reports to.
pub struct Context {
    pub client: ApiClient,
    pub navigator: Arc<MemoryNavigator>,
    pub config: ClientConfig,
    pub json: bool,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = ClientConfig::from_env();
        if let Some(url) = &cli.base_url {
            config.base_url = url.clone();
        }
        if let Some(path) = &cli.session_file {
            config = config.with_session_path(path.clone());
        }
        let session = SessionStore::new(Arc::new(FileStorage::new(config.session_path.clone())));
        let navigator = Arc::new(MemoryNavigator::default());
        let client = ApiClient::new(&config, session, navigator.clone())
            .with_context(|| format!("while configuring a client for {}", config.base_url))?;
        Ok(Self { client, navigator, config, json: cli.json })
    }

    fn session(&self) -> &SessionStore { self.client.session() }

    /// Local pre-flight check; the backend still has the final word.
    fn require(&self, roles: &[Role]) -> anyhow::Result<Session> {
        match RouteGuard::with_roles(roles).check(self.session()) {
            GuardDecision::Allow(s) => Ok(s),
            GuardDecision::RedirectToLogin => bail!("not logged in; run `kmt login --email <email> --password <password>`"),
            GuardDecision::Deny { role } => bail!("role '{}' may not do this", role),
        }
    }

    /// Turn a gateway error into a CLI error, with a hint when the 401 policy sent us
    /// back to the login screen.
    fn explain(&self, err: ApiError) -> anyhow::Error {
        let sent_to_login = self.navigator.current_path() == self.config.paths.login;
        let err = anyhow!(err);
        if sent_to_login {
            err.context("the backend rejected the stored session and it was cleared; run `kmt login` again")
        } else {
            err
        }
    }

    fn render<T: Serialize>(&self, value: &T, columns: &[&str]) -> anyhow::Result<String> {
        let v = serde_json::to_value(value)?;
        if self.json {
            return Ok(serde_json::to_string_pretty(&v)?);
        }
        Ok(render_table(&v, Some(columns)).unwrap_or_else(|| v.to_string()))
    }
}

/// Run one command and return what should be printed.
pub async fn run(cli: Cli) -> anyhow::Result<String> {
    let ctx = Context::from_cli(&cli)?;
    execute(&ctx, cli.command).await
}

pub async fn execute(ctx: &Context, command: Command) -> anyhow::Result<String> {
    match command {
        Command::Login { email, password } => {
            let s = ctx.client.login(&email, &password).await.map_err(|e| ctx.explain(e))?;
            Ok(format!("logged in as {} <{}> ({})", s.user.name, s.user.email, s.user.role))
        }
        Command::Logout => {
            ctx.client.logout().await;
            Ok("logged out".to_string())
        }
        Command::Whoami => {
            let s = ctx.require(&[])?;
            let perms = get_permissions(Some(&s.user));
            if ctx.json {
                let v = json!({ "user": serde_json::to_value(&s.user)?, "permissions": serde_json::to_value(&perms)? });
                return Ok(serde_json::to_string_pretty(&v)?);
            }
            let flags: Vec<&str> = perms.iter().map(|c| c.flag_name()).collect();
            Ok(format!("{} <{}>\nrole: {}\ncan: {}", s.user.name, s.user.email, s.user.role, flags.join(", ")))
        }
        Command::Departments { search } => {
            ctx.require(&[])?;
            let query = ListQuery { search, ..Default::default() };
            let items = ctx.client.get_departments(&query).await.map_err(|e| ctx.explain(e))?;
            ctx.render(&items, DEPARTMENT_COLUMNS)
        }
        Command::Users { search, department_id } => {
            ctx.require(&[])?;
            let filter = UserFilter { search, department_id, ..Default::default() };
            let listing = ctx.client.list_users(&filter).await.map_err(|e| ctx.explain(e))?;
            ctx.render(&listing, USER_COLUMNS)
        }
        Command::Leave { status } => {
            ctx.require(&[])?;
            let status = status.as_deref().map(str::parse::<LeaveStatus>).transpose()?;
            let filter = LeaveFilter { status, ..Default::default() };
            let listing = ctx.client.list_leave_requests(&filter).await.map_err(|e| ctx.explain(e))?;
            ctx.render(&listing, LEAVE_COLUMNS)
        }
        Command::Approve { id, comment } => {
            ctx.require(APPROVER_ROLES)?;
            ctx.client.approve_leave(id, comment.as_deref()).await.map_err(|e| ctx.explain(e))?;
            Ok(format!("leave request {} approved", id))
        }
        Command::Reject { id, comment } => {
            ctx.require(APPROVER_ROLES)?;
            ctx.client.reject_leave(id, comment.as_deref()).await.map_err(|e| ctx.explain(e))?;
            Ok(format!("leave request {} rejected", id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn ctx_in(dir: &std::path::Path) -> Context {
        let cli = Cli::try_parse_from([
            "kmt",
            "--base-url",
            "http://127.0.0.1:9/api",
            "--session-file",
            dir.join("s.json").to_str().unwrap(),
            "whoami",
        ])
        .unwrap();
        Context::from_cli(&cli).unwrap()
    }

    #[tokio::test]
    async fn list_commands_need_a_session() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx_in(dir.path());
        let err = execute(&ctx, Command::Departments { search: None }).await.unwrap_err();
        assert!(err.to_string().contains("not logged in"));
    }

    #[tokio::test]
    async fn approve_is_refused_locally_for_plain_employees() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx_in(dir.path());
        ctx.session().set_auth("t", &crate::identity::User::from_login_email("dev@kmt.io")).unwrap();
        let err = execute(&ctx, Command::Approve { id: 1, comment: None }).await.unwrap_err();
        assert!(err.to_string().contains("role 'default'"));
    }

    #[tokio::test]
    async fn whoami_reads_persisted_session() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx_in(dir.path());
        ctx.session().set_auth("t", &crate::identity::User::from_login_email("dev@kmt.io")).unwrap();
        let again = ctx_in(dir.path());
        let out = execute(&again, Command::Whoami).await.unwrap();
        assert!(out.starts_with("dev <dev@kmt.io>"));
        assert!(out.contains("canRequestLeave"));
        assert!(!out.contains("canApproveLeave"));
    }
}
