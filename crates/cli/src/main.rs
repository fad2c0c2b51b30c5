//! `thanks-io` CLI entry-point — hosts the thanks.io node locally.
//!
//! Available sub-commands:
//! - `describe`         — print the node's parameter schema as JSON.
//! - `credentials`      — print the accepted credential types as JSON.
//! - `test-credentials` — check the API key or access token against `/ping`.
//! - `search-lists`     — run the mailing list search.
//! - `run`              — execute the node over a batch of items.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use nodes::credentials::CredentialData;
use nodes::{Credentials, ExecutableNode, ExecutionContext, ListSearchNode, NodeParameters, RequestHelper};
use serde_json::{json, Value};
use thanks_io::credentials::{
    api_key_credential, credential_types, oauth2_credential, API_KEY_AUTHENTICATION, API_KEY_CREDENTIAL,
    OAUTH2_AUTHENTICATION, OAUTH2_CREDENTIAL,
};
use thanks_io::description::SEARCH_MAILING_LISTS;
use thanks_io::{ThanksIoConfig, ThanksIoNode};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "thanks-io",
    about = "Run the thanks.io workflow node from the command line",
    version
)]
struct Cli {
    /// Personal access token (API key).
    #[arg(long, env = "THANKS_IO_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// OAuth2 access token obtained from the thanks.io dashboard.
    #[arg(long, env = "THANKS_IO_ACCESS_TOKEN", global = true, hide_env_values = true)]
    access_token: Option<String>,

    /// API root; defaults to `THANKS_IO_BASE_URL` or production.
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the node description (parameter schema).
    Describe,
    /// Print the credential type descriptions.
    Credentials,
    /// Verify the configured credential.
    TestCredentials,
    /// Search mailing lists as the list picker does.
    SearchLists {
        #[arg(long)]
        query: Option<String>,
    },
    /// Execute the node over a batch of input items.
    Run {
        /// JSON object with the node parameters.
        #[arg(long)]
        parameters: PathBuf,
        /// JSON array of input items; a single empty item when omitted.
        #[arg(long)]
        items: Option<PathBuf>,
        /// Emit an error item instead of aborting on a failed item.
        #[arg(long)]
        continue_on_fail: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = run(cli).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run(cli: Cli) -> Result<Value> {
    let mut config = ThanksIoConfig::from_env();
    if let Some(url) = &cli.base_url {
        config = config.with_base_url(url.as_str());
    }
    let credentials = credentials(&cli);
    let node = ThanksIoNode::new(config.clone());

    match cli.command {
        Command::Describe => Ok(serde_json::to_value(node.description())?),
        Command::Credentials => Ok(serde_json::to_value(credential_types())?),
        Command::TestCredentials => {
            let (mut description, data) = if let Some(key) = &cli.api_key {
                (api_key_credential(), CredentialData::default().with("apiKey", json!(key)))
            } else if let Some(token) = &cli.access_token {
                let mut oauth = oauth2_credential();
                oauth.test = api_key_credential().test;
                (oauth, oauth_data(token))
            } else {
                bail!("set --api-key or --access-token");
            };
            if let Some(test) = description.test.as_mut() {
                test.url = config.url("/ping");
            }
            RequestHelper::default()
                .test_credential(&description, &data)
                .await
                .with_context(|| format!("credential '{}' was rejected", description.name))?;
            info!(credential = %description.name, "credential accepted");
            Ok(json!({ "status": "OK", "credential": description.name }))
        }
        Command::SearchLists { query } => {
            let mut parameters = NodeParameters::default();
            parameters.set("authentication", json!(authentication(&cli.api_key)));
            let ctx = ExecutionContext::new(Vec::new())
                .with_parameters(parameters)
                .with_credentials(credentials);
            let result = node.search(SEARCH_MAILING_LISTS, query.as_deref(), &ctx).await?;
            Ok(serde_json::to_value(result)?)
        }
        Command::Run { parameters, items, continue_on_fail } => {
            let mut parameters = NodeParameters::from_value(read_json(&parameters)?);
            if !parameters.raw().contains_key("authentication") {
                parameters.set("authentication", json!(authentication(&cli.api_key)));
            }
            let items = match items {
                Some(path) => match read_json(&path)? {
                    Value::Array(items) => items,
                    _ => bail!("{} must contain a JSON array of items", path.display()),
                },
                None => vec![json!({})],
            };

            let ctx = ExecutionContext::new(items)
                .with_parameters(parameters)
                .with_credentials(credentials)
                .continue_on_fail(continue_on_fail)
                .with_cancellation(cancel_on_ctrl_c());
            let output = node.execute(&ctx).await?;
            info!(items = output.len(), "execution finished");
            Ok(Value::Array(output))
        }
    }
}

/// `apiKey` when a key was given, OAuth2 otherwise.
fn authentication(api_key: &Option<String>) -> &'static str {
    if api_key.is_some() {
        API_KEY_AUTHENTICATION
    } else {
        OAUTH2_AUTHENTICATION
    }
}

fn credentials(cli: &Cli) -> Credentials {
    let mut credentials = Credentials::new();
    if let Some(key) = &cli.api_key {
        credentials.insert(API_KEY_CREDENTIAL, CredentialData::default().with("apiKey", json!(key)));
    }
    if let Some(token) = &cli.access_token {
        credentials.insert(OAUTH2_CREDENTIAL, oauth_data(token));
    }
    credentials
}

fn oauth_data(token: &str) -> CredentialData {
    CredentialData::default().with("oauthTokenData", json!({ "access_token": token }))
}

fn read_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// Token fired by the first Ctrl-C.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling execution");
            trigger.cancel();
        }
    });
    token
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments should parse")
    }

    #[test]
    fn run_arguments_parse() {
        let cli = parse(&[
            "thanks-io", "--api-key", "k", "run", "--parameters", "p.json", "--continue-on-fail",
        ]);
        assert_eq!(cli.api_key.as_deref(), Some("k"));
        match cli.command {
            Command::Run { parameters, items, continue_on_fail } => {
                assert_eq!(parameters, PathBuf::from("p.json"));
                assert!(items.is_none());
                assert!(continue_on_fail);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn credentials_follow_flags() {
        let cli = parse(&["thanks-io", "--access-token", "t", "describe"]);
        let creds = credentials(&cli);
        assert!(creds.get(OAUTH2_CREDENTIAL).is_ok());
        assert!(creds.get(API_KEY_CREDENTIAL).is_err());
        assert_eq!(authentication(&cli.api_key), OAUTH2_AUTHENTICATION);
    }

    #[tokio::test]
    async fn describe_emits_the_schema() {
        let out = run(parse(&["thanks-io", "describe"])).await.unwrap();
        assert_eq!(out["name"], "thanksIo");
        assert!(out["properties"].as_array().is_some_and(|p| !p.is_empty()));
    }

    #[tokio::test]
    async fn test_credentials_hits_ping() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/ping"))
            .and(header("authorization", "Bearer k"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "pong": true })))
            .expect(1)
            .mount(&server)
            .await;

        let base = format!("{}/api/v2", server.uri());
        let out = run(parse(&["thanks-io", "--api-key", "k", "--base-url", &base, "test-credentials"]))
            .await
            .unwrap();
        assert_eq!(out["status"], "OK");
    }

    #[tokio::test]
    async fn run_executes_items_from_files() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/recipients/999"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 999 })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = std::env::temp_dir().join(format!("thanks-io-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let params = dir.join("params.json");
        std::fs::write(
            &params,
            json!({ "resource": "recipient", "operation": "get", "recipientId": 999 }).to_string(),
        )
        .unwrap();

        let base = format!("{}/api/v2", server.uri());
        let out = run(parse(&[
            "thanks-io", "--api-key", "k", "--base-url", &base, "run", "--parameters",
            params.to_str().unwrap(),
        ]))
        .await
        .unwrap();
        assert_eq!(out, json!([{ "id": 999 }]));
        std::fs::remove_dir_all(&dir).ok();
    }
}
