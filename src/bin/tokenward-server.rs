// ABOUTME: Server binary for the Tokenward authorization server
// ABOUTME: Serves the HTTP endpoints and provisions schema, signing keys, clients, and users
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Tokenward Server Binary
//!
//! ```bash
//! # Create tables and a signing key pair, then serve
//! tokenward-server migrate
//! tokenward-server provision-jwk
//! tokenward-server create-client --key web --secret s3cret --tenant acme
//! tokenward-server create-user --tenant acme --username alice --password pw
//! tokenward-server serve --port 8080
//! ```

use anyhow::{anyhow, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::sync::Arc;
use tokenward::{
    config::{DatabaseUrl, ServerConfig},
    logging,
    oauth2_server::OAuthService,
    routes,
};
use tokenward_core::constants::{oauth::jwk::RSA_KEY_SIZE, password};
use tokenward_core::models::{Client, PasswordScheme, User};
use tracing::info;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "tokenward-server",
    about = "Tokenward OAuth2 authorization server",
    long_about = "Issue, introspect, and revoke OAuth2 tokens. Configuration comes from environment variables; flags override a few of them."
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Database URL override
    #[arg(long, global = true)]
    database_url: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP endpoints
    Serve {
        /// Override HTTP port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Create the schema and exit
    Migrate,

    /// Generate the JWT signing key pair unless one exists
    ProvisionJwk {
        /// RSA modulus size in bits
        #[arg(long, default_value_t = RSA_KEY_SIZE)]
        key_size: usize,
    },

    /// Register a client
    CreateClient {
        /// Public client id
        #[arg(long)]
        key: String,

        /// Client secret (stored as a bcrypt hash)
        #[arg(long)]
        secret: String,

        /// Tenant the client belongs to
        #[arg(long)]
        tenant: String,

        /// Redirect URI for the authorization code flow
        #[arg(long)]
        redirect_uri: Option<String>,
    },

    /// Create a user
    CreateUser {
        /// Tenant the user belongs to
        #[arg(long)]
        tenant: String,

        /// Login name
        #[arg(long)]
        username: String,

        /// Account identifier accepted by the password grant (defaults to username)
        #[arg(long)]
        account: Option<String>,

        /// Phone number accepted by the password grant
        #[arg(long)]
        phone: Option<String>,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Password
        #[arg(long)]
        password: String,

        /// Hashing scheme
        #[arg(long, value_enum, default_value_t = SchemeArg::HmacSha1V2)]
        scheme: SchemeArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SchemeArg {
    Bcrypt,
    HmacSha1V2,
}

impl From<SchemeArg> for PasswordScheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::Bcrypt => Self::Bcrypt,
            SchemeArg::HmacSha1V2 => Self::HmacSha1V2,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(url) = &args.database_url {
        config.database.url = DatabaseUrl::parse_url(url)?;
    }
    // Provisioning commands must always see the schema
    if !matches!(args.command, Command::Serve { .. }) {
        config.database.auto_migrate = true;
    }

    let service = OAuthService::from_config(&config).await?;

    match args.command {
        Command::Serve { port } => {
            serve(service, port.unwrap_or(config.http_port)).await?;
        }
        Command::Migrate => info!(url = %config.database.url, "Schema is up to date"),
        Command::ProvisionJwk { key_size } => {
            if service.keys().provision(key_size).await? {
                info!(key_size, "Provisioned JWT signing key pair");
            } else {
                info!("JWT signing key pair already present, nothing to do");
            }
        }
        Command::CreateClient {
            key,
            secret,
            tenant,
            redirect_uri,
        } => {
            let client = Client {
                id: Uuid::new_v4(),
                key,
                secret_hash: bcrypt::hash(secret, bcrypt::DEFAULT_COST)?,
                redirect_uri,
                tenant_id: tenant,
                created_at: Utc::now(),
            };
            service.store().create_client(&client).await?;
            info!(client_id = %client.id, client_key = %client.key, "Client created");
        }
        Command::CreateUser {
            tenant,
            username,
            account,
            phone,
            name,
            password: plain,
            scheme,
        } => {
            let scheme = PasswordScheme::from(scheme);
            let mut user = User {
                id: Uuid::new_v4(),
                tenant_id: tenant,
                account: Some(account.unwrap_or_else(|| username.clone())),
                username,
                phone,
                name,
                password_hash: None,
                password_scheme: Some(scheme.as_tag().to_owned()),
                created_at: Utc::now(),
            };
            user.password_hash = Some(match scheme {
                PasswordScheme::Bcrypt => bcrypt::hash(&plain, bcrypt::DEFAULT_COST)?,
                PasswordScheme::HmacSha1V2 => {
                    if config.oauth.password_secret.is_empty() {
                        return Err(anyhow!(
                            "PASSWORD_HMAC_SECRET must be set to create {} users",
                            password::SCHEME_HMAC_SHA1_V2
                        ));
                    }
                    service.credentials().passwords().hash_v2(&plain, &user)
                }
            });
            service.store().create_user(&user).await?;
            info!(user_id = %user.id, tenant_id = %user.tenant_id, "User created");
        }
    }

    Ok(())
}

async fn serve(service: OAuthService, port: u16) -> Result<()> {
    let app = routes::router(Arc::new(service));
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Tokenward listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Tokenward stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
