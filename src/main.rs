//! Emberhold - a concurrent text MUD server.
//!
//! Boots config, stores, and the World, then accepts telnet connections and
//! hands each one to the connection orchestrator.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info, warn};

use emberhold::area::{AreaLoader, DefaultAreaLoader, JsonFileAreaLoader};
use emberhold::commands::{AppState, Registry};
use emberhold::config::{self, Config, WebAddr};
use emberhold::orchestrator;
use emberhold::stores::{AccountStore, MailStore, TellStore};
use emberhold::world::World;

const RESET_TICK_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).with_target(true).init();

    let config = Config::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{}", config::USAGE);
        anyhow::anyhow!("bad configuration: {}", e)
    })?;

    if config.web_addr != WebAddr::Off {
        warn!("-web-addr is configured but the staff portal HTTP server is an external component; no listener is started here");
    }

    let accounts = Arc::new(AccountStore::load(config.accounts.clone())?);
    let mail = Arc::new(MailStore::load(config.mail.clone())?);
    let tells = Arc::new(TellStore::load(config.tells.clone())?);

    let area_loader: Arc<dyn AreaLoader> = match &config.areas {
        Some(path) => Arc::new(JsonFileAreaLoader { path: path.clone() }),
        None => Arc::new(DefaultAreaLoader),
    };
    let world = Arc::new(World::new(area_loader, "start").map_err(|e| anyhow::anyhow!("failed to load area data: {}", e))?);
    world.configure_privileges(config.everyone_admin, false);

    let registry = Arc::new(Registry::new());
    let app = Arc::new(AppState {
        world: Arc::clone(&world),
        accounts,
        mail,
        tells,
        registry,
        portal: None,
        admin_account: config.admin.clone(),
    });

    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    {
        let shutdown_tx = shutdown_tx.clone();
        tokio::spawn(async move {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
            let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
            tokio::select! {
                _ = sigint.recv() => info!("received SIGINT, shutting down"),
                _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
            }
            let _ = shutdown_tx.send(());
        });
    }

    {
        let world = Arc::clone(&world);
        let mut shutdown_rx = shutdown_tx.subscribe();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(RESET_TICK_INTERVAL);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        world.apply_all_resets();
                        tracing::debug!("applied periodic room resets");
                    }
                    _ = shutdown_rx.recv() => {
                        info!("reset tick task shutting down");
                        break;
                    }
                }
            }
        });
    }

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, tls = config.tls, "Emberhold listening");

    let tls_acceptor = if config.tls {
        Some(build_tls_acceptor(&config).await?)
    } else {
        None
    };

    let mut shutdown_rx = shutdown_tx.subscribe();
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        error!(error = %e, "failed to accept connection");
                        continue;
                    }
                };
                let app = Arc::clone(&app);
                match &tls_acceptor {
                    Some(acceptor) => {
                        let acceptor = acceptor.clone();
                        tokio::spawn(async move {
                            match acceptor.accept(stream).await {
                                Ok(tls_stream) => orchestrator::handle_connection(tls_stream, peer, app).await,
                                Err(e) => warn!(%peer, error = %e, "TLS handshake failed"),
                            }
                        });
                    }
                    None => {
                        tokio::spawn(orchestrator::handle_connection(stream, peer, app));
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                info!("gateway shutting down, no longer accepting connections");
                break;
            }
        }
    }

    Ok(())
}

async fn build_tls_acceptor(config: &Config) -> anyhow::Result<tokio_rustls::TlsAcceptor> {
    use rustls_pemfile::{certs, pkcs8_private_keys};
    use std::io::Cursor;
    use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer};
    use tokio_rustls::rustls::ServerConfig;
    use tokio_rustls::TlsAcceptor;

    let cert_path = config.cert.as_ref().ok_or_else(|| anyhow::anyhow!("-tls requires -cert"))?;
    let key_path = config.key.as_ref().ok_or_else(|| anyhow::anyhow!("-tls requires -key"))?;

    let cert_data = tokio::fs::read(cert_path).await?;
    let cert_chain: Vec<CertificateDer<'static>> = certs(&mut Cursor::new(&cert_data)).filter_map(|r| r.ok()).collect();
    if cert_chain.is_empty() {
        return Err(anyhow::anyhow!("no certificates found in {}", cert_path.display()));
    }

    let key_data = tokio::fs::read(key_path).await?;
    let key: PrivateKeyDer<'static> = pkcs8_private_keys(&mut Cursor::new(&key_data))
        .filter_map(|r| r.ok())
        .map(PrivateKeyDer::Pkcs8)
        .next()
        .ok_or_else(|| anyhow::anyhow!("no private key found in {}", key_path.display()))?;

    let tls_config = ServerConfig::builder().with_no_client_auth().with_single_cert(cert_chain, key)?;
    Ok(TlsAcceptor::from(Arc::new(tls_config)))
}
