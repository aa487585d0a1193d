// Command line definition: one subcommand per cellar action

use std::path::PathBuf;

use anyhow::Context;
use cellar_client::{Action, OverrideConfig, constants::cellar_api_path};
use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};

use crate::settings::ConnectionOverrides;

#[derive(Debug, Parser)]
#[command(name = "cellar-cli", version, about = "CLI client for the cellar API")]
pub struct Cli {
    /// Configuration file (toml, yaml, json, ...)
    #[arg(short = 'c', long = "config", global = true)]
    pub config_file: Option<PathBuf>,

    /// URL scheme [default: https]
    #[arg(long, global = true)]
    pub scheme: Option<String>,

    /// API hostname [default: cellar.goa.design]
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Request timeout in milliseconds [default: 20000]
    #[arg(long = "timeout-ms", global = true)]
    pub timeout_ms: Option<u64>,

    /// Log requests to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn connection_overrides(&self) -> ConnectionOverrides {
        ConnectionOverrides {
            config_file: self.config_file.clone(),
            scheme: self.scheme.clone(),
            host: self.host.clone(),
            timeout_ms: self.timeout_ms,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create new account
    CreateAccount(CreateAccountArgs),
    /// Record new bottle
    CreateBottle(PayloadArgs),
    /// Retrieve account with given id
    ShowAccount(PathArgs),
    /// Retrieve bottle with given id
    ShowBottle(PathArgs),
    /// Change account name
    UpdateAccount(PayloadArgs),
    UpdateBottle(PayloadArgs),
    DeleteAccount(PathArgs),
    DeleteBottle(PathArgs),
    /// List all bottles in account optionally filtering by year
    ListBottle(ListArgs),
    RateBottle(PayloadArgs),
}

#[derive(Debug, Args)]
pub struct OverrideArg {
    /// JSON object merged over the request, e.g. '{"timeoutMs":500}'
    #[arg(long = "override", value_name = "JSON")]
    pub overrides: Option<String>,
}

#[derive(Debug, Args)]
pub struct PathArgs {
    /// Request path, e.g. /cellar/accounts/1
    pub path: String,
    #[command(flatten)]
    pub overrides: OverrideArg,
}

#[derive(Debug, Args)]
pub struct PayloadArgs {
    /// Request path, e.g. /cellar/accounts/1/bottles
    pub path: String,
    /// Request JSON body
    #[arg(long)]
    pub payload: Option<String>,
    #[command(flatten)]
    pub overrides: OverrideArg,
}

#[derive(Debug, Args)]
pub struct CreateAccountArgs {
    /// Request path
    #[arg(default_value = cellar_api_path::ACCOUNTS)]
    pub path: String,
    /// Request JSON body
    #[arg(long)]
    pub payload: Option<String>,
    #[command(flatten)]
    pub overrides: OverrideArg,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Request path, e.g. /cellar/accounts/1/bottles
    pub path: String,
    /// Filter by years (repeatable)
    #[arg(long)]
    pub years: Vec<i64>,
    #[command(flatten)]
    pub overrides: OverrideArg,
}

/// Everything needed for one `CellarClient::call`
#[derive(Debug, PartialEq)]
pub struct Request {
    pub action: Action,
    pub path: String,
    pub payload: Option<Value>,
    pub years: Option<Value>,
    pub overrides: Option<OverrideConfig>,
}

impl Command {
    pub fn action(&self) -> Action {
        match self {
            Command::CreateAccount(_) => Action::CreateAccount,
            Command::CreateBottle(_) => Action::CreateBottle,
            Command::ShowAccount(_) => Action::ShowAccount,
            Command::ShowBottle(_) => Action::ShowBottle,
            Command::UpdateAccount(_) => Action::UpdateAccount,
            Command::UpdateBottle(_) => Action::UpdateBottle,
            Command::DeleteAccount(_) => Action::DeleteAccount,
            Command::DeleteBottle(_) => Action::DeleteBottle,
            Command::ListBottle(_) => Action::ListBottle,
            Command::RateBottle(_) => Action::RateBottle,
        }
    }

    /// Parse the JSON arguments. Fails before any request is made.
    pub fn into_request(self) -> anyhow::Result<Request> {
        let action = self.action();
        let (path, payload, years, overrides) = match self {
            Command::CreateAccount(args) => (args.path, Some(args.payload), None, args.overrides),
            Command::CreateBottle(args)
            | Command::UpdateAccount(args)
            | Command::UpdateBottle(args)
            | Command::RateBottle(args) => (args.path, Some(args.payload), None, args.overrides),
            Command::ShowAccount(args)
            | Command::ShowBottle(args)
            | Command::DeleteAccount(args)
            | Command::DeleteBottle(args) => (args.path, None, None, args.overrides),
            Command::ListBottle(args) => (args.path, None, Some(args.years), args.overrides),
        };

        let payload = match payload {
            Some(raw) => Some(parse_payload(raw.as_deref())?),
            None => None,
        };
        let years = years
            .filter(|years| !years.is_empty())
            .map(|years| json!(years));
        let overrides = overrides
            .overrides
            .as_deref()
            .map(serde_json::from_str::<OverrideConfig>)
            .transpose()
            .context("Failed to deserialize override config")?;

        Ok(Request {
            action,
            path,
            payload,
            years,
            overrides,
        })
    }
}

/// A missing payload is sent as an empty object
fn parse_payload(raw: Option<&str>) -> anyhow::Result<Value> {
    match raw {
        Some(raw) if !raw.is_empty() => {
            serde_json::from_str(raw).context("Failed to deserialize payload")
        }
        _ => Ok(json!({})),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(args: &[&str]) -> Request {
        let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
        cli.command.into_request().unwrap()
    }

    #[test]
    fn test_create_account_default_path() {
        let req = request(&["cellar-cli", "create-account", "--payload", r#"{"name":"Acme"}"#]);
        assert_eq!(req.action, Action::CreateAccount);
        assert_eq!(req.path, "/cellar/accounts");
        assert_eq!(req.payload, Some(json!({"name": "Acme"})));
        assert!(req.years.is_none());
        assert!(req.overrides.is_none());
    }

    #[test]
    fn test_missing_payload_is_empty_object() {
        let req = request(&["cellar-cli", "rate-bottle", "/cellar/accounts/1/bottles/2/actions/rate"]);
        assert_eq!(req.action, Action::RateBottle);
        assert_eq!(req.payload, Some(json!({})));
    }

    #[test]
    fn test_invalid_payload_is_rejected() {
        let cli = Cli::try_parse_from([
            "cellar-cli",
            "update-account",
            "/cellar/accounts/1",
            "--payload",
            "{not json",
        ])
        .unwrap();
        assert!(cli.command.into_request().is_err());
    }

    #[test]
    fn test_list_bottle_years() {
        let req = request(&[
            "cellar-cli",
            "list-bottle",
            "/cellar/accounts/1/bottles",
            "--years",
            "2015",
            "--years",
            "2016",
        ]);
        assert_eq!(req.action, Action::ListBottle);
        assert_eq!(req.years, Some(json!([2015, 2016])));
        assert!(req.payload.is_none());

        let req = request(&["cellar-cli", "list-bottle", "/cellar/accounts/1/bottles"]);
        assert!(req.years.is_none());
    }

    #[test]
    fn test_path_required_for_show() {
        assert!(Cli::try_parse_from(["cellar-cli", "show-bottle"]).is_err());
    }

    #[test]
    fn test_override_and_global_flags() {
        let cli = Cli::try_parse_from([
            "cellar-cli",
            "delete-bottle",
            "/cellar/accounts/1/bottles/2",
            "--override",
            r#"{"timeoutMs":500,"headers":{"x-id":"1"}}"#,
            "--host",
            "localhost:8080",
            "--scheme",
            "http",
        ])
        .unwrap();

        let overrides = cli.connection_overrides();
        assert_eq!(overrides.host.as_deref(), Some("localhost:8080"));
        assert_eq!(overrides.scheme.as_deref(), Some("http"));
        assert!(overrides.timeout_ms.is_none());

        let req = cli.command.into_request().unwrap();
        assert_eq!(req.action, Action::DeleteBottle);
        let overrides = req.overrides.unwrap();
        assert_eq!(overrides.timeout_ms, Some(500));
        assert_eq!(overrides.headers.unwrap()["x-id"], "1");
    }

    #[test]
    fn test_every_action_has_a_subcommand() {
        let subcommands = [
            ("create-account", Action::CreateAccount),
            ("create-bottle", Action::CreateBottle),
            ("show-account", Action::ShowAccount),
            ("show-bottle", Action::ShowBottle),
            ("update-account", Action::UpdateAccount),
            ("update-bottle", Action::UpdateBottle),
            ("delete-account", Action::DeleteAccount),
            ("delete-bottle", Action::DeleteBottle),
            ("list-bottle", Action::ListBottle),
            ("rate-bottle", Action::RateBottle),
        ];

        for (name, action) in subcommands {
            let cli = Cli::try_parse_from(["cellar-cli", name, "/p"]).unwrap();
            assert_eq!(cli.command.action(), action, "{name}");
            // Subcommand names match the action names
            assert_eq!(name.parse::<Action>().unwrap(), action);
        }
    }
}
