//! Connection Orchestrator (C8): accepts one live connection, drives the
//! login state machine, spawns the writer task, and runs the reader loop
//! until disconnect. Generic over the transport so the plain-TCP and
//! TLS-wrapped listeners in `main` share this one code path.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};

use crate::commands::{dispatch_tracking_rename, render_room_for, AppState};
use crate::model::{Channel, Role, StoredChannelPrefs, OUTPUT_QUEUE_CAPACITY};
use crate::session::{SessionReader, SessionWriter, TerminalInfo};

const MAX_USERNAME_ATTEMPTS: u32 = 5;
const MAX_PASSWORD_ATTEMPTS: u32 = 3;
const MAX_USERNAME_LEN: usize = 24;

struct LoggedIn {
    name: String,
    roles: HashSet<Role>,
    home: String,
    channel_prefs: std::collections::HashMap<Channel, StoredChannelPrefs>,
}

/// Runs one connection end to end: handshake, login, startup sequence, and
/// the dispatch loop. Returns once the session has fully torn down.
#[instrument(skip(stream, app), fields(peer = %peer))]
pub async fn handle_connection<S>(stream: S, peer: SocketAddr, app: Arc<AppState>)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    info!("client connected");
    let (read_half, write_half) = tokio::io::split(stream);
    let mut reader = SessionReader::new(read_half);
    let writer = Arc::new(SessionWriter::new(write_half));

    if let Err(e) = writer.handshake().await {
        warn!(error = %e, "telnet handshake failed");
        return;
    }

    let mut term = TerminalInfo::default();
    let login = match run_login(&mut reader, &writer, &mut term, &app).await {
        Some(l) => l,
        None => {
            info!("client disconnected during login");
            return;
        }
    };

    let (tx, mut rx) = mpsc::channel::<String>(OUTPUT_QUEUE_CAPACITY);
    if let Err(e) = app.world.add_player(&login.name, &login.home, &login.home, login.roles, tx) {
        let _ = writer.write_line(&format!("Login failed: {}", e)).await;
        return;
    }
    app.world.hydrate_channel_prefs(&login.name, &login.channel_prefs);

    let writer_task = {
        let writer = Arc::clone(&writer);
        tokio::spawn(async move {
            while let Some(line) = rx.recv().await {
                if writer.write_line(&line).await.is_err() {
                    break;
                }
            }
        })
    };

    let mut name = login.name.clone();
    info!(player = %name, "player logged in");
    app.world.update_terminal_info(&name, term.width, term.height, term.terminal_type.as_deref().unwrap_or(""));

    for tell in app.tells.pending_for(&name) {
        if let Some(p) = app.world.read().players.get(&name) {
            p.enqueue(format!("(offline) {} told you: {}", tell.sender, tell.body));
        }
    }

    let home = login.home.clone();
    if let Some(p) = app.world.read().players.get(&name) {
        p.enqueue(format!("Welcome to Emberhold, {}.", name));
        p.enqueue(render_room_for(&app, &name, &home));
    }
    let _ = writer.write_prompt("> ").await;

    reader_loop(&mut reader, &writer, &mut term, &app, &mut name).await;

    let room = app.world.player_room(&name).unwrap_or_default();
    app.world.remove_player(&name);
    app.world.broadcast_to_room(&room, &format!("{} leaves.", name), Some(&name));
    writer_task.abort();
    info!(player = %name, "player disconnected");
}

async fn reader_loop<R, W>(
    reader: &mut SessionReader<R>,
    writer: &Arc<SessionWriter<W>>,
    term: &mut TerminalInfo,
    app: &Arc<AppState>,
    name: &mut String,
) where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        let line = match reader.read_line(writer, term).await {
            Ok(Some(l)) => l,
            Ok(None) | Err(_) => break,
        };
        app.world.update_terminal_info(name.as_str(), term.width, term.height, term.terminal_type.as_deref().unwrap_or(""));

        if !app.world.read().players.get(name.as_str()).map(|p| p.alive).unwrap_or(false) {
            break;
        }

        if line.trim().is_empty() {
            if writer.write_prompt("> ").await.is_err() {
                break;
            }
            continue;
        }

        let quit = match std::panic::catch_unwind(AssertUnwindSafe(|| dispatch_tracking_rename(app, &mut *name, &line))) {
            Ok(quit) => quit,
            Err(_) => {
                tracing::error!(player = %name, "command handler panicked");
                if let Some(p) = app.world.read().players.get(name.as_str()) {
                    p.enqueue("Something went wrong handling that command.".to_string());
                }
                false
            }
        };

        if quit {
            break;
        }
        if writer.write_prompt("> ").await.is_err() {
            break;
        }
    }
}

/// Drives the login FSM (spec 6): `AskUser` -> `AskPassword` (existing
/// account) or `AskNewPassword` (new account). Returns `None` if the
/// connection should simply be dropped (attempt limits exhausted or
/// transport error).
async fn run_login<R, W>(
    reader: &mut SessionReader<R>,
    writer: &Arc<SessionWriter<W>>,
    term: &mut TerminalInfo,
    app: &AppState,
) -> Option<LoggedIn>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let name = ask_username(reader, writer, term, app).await?;

    let success = if app.accounts.exists(&name) {
        ask_existing_password(reader, writer, term, app, &name).await
    } else {
        ask_new_password(reader, writer, term, app, &name).await
    };

    if !success {
        return None;
    }

    let account = app.accounts.get(&name)?;
    let now = chrono::Utc::now().timestamp();
    let _ = app.accounts.record_login(&account.name, now);

    let mut roles: HashSet<Role> = account.roles.iter().copied().collect();
    if account.name.eq_ignore_ascii_case(&app.admin_account) {
        roles.insert(Role::Admin);
    }
    let home = account.home.clone().unwrap_or_else(|| app.world.start_room());

    let _ = writer.write_line(&format!("Welcome, {}.", account.name)).await;
    Some(LoggedIn {
        name: account.name,
        roles,
        home,
        channel_prefs: account.channel_prefs,
    })
}

async fn ask_username<R, W>(reader: &mut SessionReader<R>, writer: &Arc<SessionWriter<W>>, term: &mut TerminalInfo, app: &AppState) -> Option<String>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    for _ in 0..MAX_USERNAME_ATTEMPTS {
        writer.write_prompt("Username: ").await.ok()?;
        let line = reader.read_line(writer, term).await.ok()??;
        let name = line.trim().to_string();
        if name.is_empty() || name.len() > MAX_USERNAME_LEN || name.contains(char::is_whitespace) || !name.is_ascii() {
            writer.write_line("Names must be 1-24 ASCII characters with no spaces.").await.ok()?;
            continue;
        }
        if app.world.find_player(&name).is_some() {
            writer.write_line("That name is already connected.").await.ok()?;
            continue;
        }
        return Some(name);
    }
    let _ = writer.write_line("Too many invalid attempts. Goodbye.").await;
    None
}

async fn ask_existing_password<R, W>(reader: &mut SessionReader<R>, writer: &Arc<SessionWriter<W>>, term: &mut TerminalInfo, app: &AppState, name: &str) -> bool
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    for _ in 0..MAX_PASSWORD_ATTEMPTS {
        if writer.write_prompt("Password: ").await.is_err() {
            return false;
        }
        let Ok(Some(line)) = reader.read_line(writer, term).await else { return false };
        match app.accounts.authenticate(name, &line) {
            Ok(true) => return true,
            _ => {
                if writer.write_line("Incorrect password.").await.is_err() {
                    return false;
                }
            }
        }
    }
    let _ = writer.write_line("Too many failed attempts. Goodbye.").await;
    false
}

async fn ask_new_password<R, W>(reader: &mut SessionReader<R>, writer: &Arc<SessionWriter<W>>, term: &mut TerminalInfo, app: &AppState, name: &str) -> bool
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let _ = writer.write_line(&format!("'{}' is a new name.", name)).await;
    for _ in 0..MAX_PASSWORD_ATTEMPTS {
        if writer.write_prompt("Choose a password (min 6 characters): ").await.is_err() {
            return false;
        }
        let Ok(Some(line)) = reader.read_line(writer, term).await else { return false };
        match app.accounts.register(name, &line) {
            Ok(_) => return true,
            Err(e) => {
                if writer.write_line(&e.to_string()).await.is_err() {
                    return false;
                }
            }
        }
    }
    let _ = writer.write_line("Too many failed attempts. Goodbye.").await;
    false
}
