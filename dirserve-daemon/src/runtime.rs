use std::fs;
use std::io::ErrorKind;
use std::os::unix::net::UnixStream as StdUnixStream;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::OwnedWriteHalf;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc};

use dirserve_core::codec;
use dirserve_core::envelope::RequestEnvelope;

use crate::dispatch::Dispatcher;
use crate::error::{io_err, DaemonError};
use crate::lifecycle::ProcessStatus;
use crate::paths::{pid_path, run_dir, socket_path};
use crate::pidfile;
use crate::services::{ClientId, ConnectionRegistry, DirectoryService, Services};
use crate::store::MemoryDirectory;

const OUTBOUND_QUEUE_DEPTH: usize = 64;

/// Start the daemon runtime and block the current thread until it exits.
pub fn start_blocking(home: &Path) -> Result<(), DaemonError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(home.to_path_buf()))
}

/// Run the daemon runtime: load the directory, bind the socket, dispatch
/// requests until a shutdown signal arrives.
pub async fn run(home: PathBuf) -> Result<(), DaemonError> {
    tracing::info!(label = crate::paths::DAEMON_LABEL, "starting daemon");
    ensure_runtime_dirs(&home)?;
    guard_existing_instance(&home)?;

    let directory = Arc::new(MemoryDirectory::load_at(&home)?);
    tracing::info!(entries = directory.len(), "directory loaded");

    let connections = Arc::new(ConnectionRegistry::new());
    let dispatcher = Arc::new(Dispatcher::new(Services {
        connections: connections.clone(),
        directory,
    }));

    write_pid_file(&home)?;

    let (shutdown_tx, _) = broadcast::channel::<()>(16);

    let socket_handle = {
        let shutdown = shutdown_tx.clone();
        let home = home.clone();
        tokio::spawn(async move {
            let result = socket_server_task(home, connections, dispatcher, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let result = signal_task(shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let (socket_result, signal_result) = tokio::join!(socket_handle, signal_handle);
    let outcome = handle_join("socket_server", socket_result)
        .and(handle_join("signal_handler", signal_result));

    remove_pid_file(&home);
    outcome
}

/// Wait for SIGTERM or Ctrl-C and convert it into the broadcast shutdown.
async fn signal_task(mut shutdown_rx: broadcast::Receiver<()>) -> Result<(), DaemonError> {
    let mut sigterm =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .map_err(|e| io_err("sigterm handler", e))?;

    tokio::select! {
        _ = shutdown_rx.recv() => Ok(()),
        _ = sigterm.recv() => {
            tracing::info!("received SIGTERM, shutting down daemon");
            Ok(())
        }
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => {
                    tracing::info!("received ctrl-c, shutting down daemon");
                    Ok(())
                }
                Err(err) => Err(DaemonError::Protocol(format!(
                    "ctrl-c handler failed: {err}"
                ))),
            }
        }
    }
}

async fn socket_server_task<D: DirectoryService>(
    home: PathBuf,
    connections: Arc<ConnectionRegistry>,
    dispatcher: Arc<Dispatcher<D>>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    let socket = socket_path(&home);
    prepare_socket_for_bind(&socket)?;

    let listener = UnixListener::bind(&socket).map_err(|e| io_err(&socket, e))?;
    set_socket_permissions(&socket)?;
    tracing::info!(socket = %socket.display(), "listening for clients");

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            accepted = listener.accept() => {
                let (stream, _) = accepted.map_err(|e| io_err(&socket, e))?;
                let connections = connections.clone();
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move {
                    if let Err(err) = handle_connection(stream, connections, dispatcher).await {
                        tracing::error!(error = %err, "socket client error");
                    }
                });
            }
        }
    }

    if socket.exists() {
        let _ = fs::remove_file(&socket);
    }
    Ok(())
}

/// Serve one client connection: register an outbound channel, then read
/// newline-delimited frames and dispatch each in its own task so requests
/// from this client execute concurrently and replies may interleave.
async fn handle_connection<D: DirectoryService>(
    stream: UnixStream,
    connections: Arc<ConnectionRegistry>,
    dispatcher: Arc<Dispatcher<D>>,
) -> Result<(), DaemonError> {
    let (reader, writer) = stream.into_split();

    let (outbound_tx, outbound_rx) = mpsc::channel::<Vec<u8>>(OUTBOUND_QUEUE_DEPTH);
    let client = connections.register(outbound_tx).await;
    tracing::debug!(%client, "client connected");

    tokio::spawn(writer_task(writer, outbound_rx, client));

    let result = read_loop(reader, client, &dispatcher).await;
    connections.unregister(client).await;
    tracing::debug!(%client, "client disconnected");
    result
}

async fn read_loop<D: DirectoryService>(
    reader: tokio::net::unix::OwnedReadHalf,
    client: ClientId,
    dispatcher: &Arc<Dispatcher<D>>,
) -> Result<(), DaemonError> {
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| io_err("client socket read", e))?
    {
        if line.trim().is_empty() {
            continue;
        }

        let request: RequestEnvelope = match codec::decode(line.as_bytes()) {
            Ok(request) => request,
            Err(err) => {
                // Discard the frame but keep the connection; transport
                // policy for repeat offenders is not ours to decide.
                tracing::warn!(%client, error = %err, "discarding malformed message");
                continue;
            }
        };

        let dispatcher = Arc::clone(dispatcher);
        tokio::spawn(async move {
            dispatcher.handle(client, request).await;
        });
    }

    Ok(())
}

/// Drain encoded reply frames to the socket. Ends when every sender is gone
/// or the peer stops reading.
async fn writer_task(
    mut writer: OwnedWriteHalf,
    mut outbound_rx: mpsc::Receiver<Vec<u8>>,
    client: ClientId,
) {
    while let Some(frame) = outbound_rx.recv().await {
        if let Err(err) = write_frame(&mut writer, &frame).await {
            tracing::debug!(%client, error = %err, "reply write failed; closing writer");
            break;
        }
    }
}

async fn write_frame(writer: &mut OwnedWriteHalf, frame: &[u8]) -> Result<(), DaemonError> {
    writer
        .write_all(frame)
        .await
        .map_err(|e| io_err("client socket write", e))?;
    writer
        .write_all(b"\n")
        .await
        .map_err(|e| io_err("client socket write", e))?;
    writer
        .flush()
        .await
        .map_err(|e| io_err("client socket flush", e))?;
    Ok(())
}

/// Refuse to start when the PID file names a live process; clear a stale
/// one.
fn guard_existing_instance(home: &Path) -> Result<(), DaemonError> {
    let pid_file = pid_path(home);
    match pidfile::check_pid_file(&pid_file) {
        Ok(ProcessStatus::Running) => Err(DaemonError::Protocol(format!(
            "daemon already running (pid file {})",
            pid_file.display()
        ))),
        Ok(ProcessStatus::Stopped) => {
            if pid_file.exists() {
                tracing::warn!(
                    pid_file = %pid_file.display(),
                    "removing stale pid file from a previous instance"
                );
                fs::remove_file(&pid_file).map_err(|e| io_err(&pid_file, e))?;
            }
            Ok(())
        }
        Err(err) => {
            tracing::warn!(
                pid_file = %pid_file.display(),
                error = %err,
                "unreadable pid file; overwriting"
            );
            Ok(())
        }
    }
}

fn write_pid_file(home: &Path) -> Result<(), DaemonError> {
    let pid_file = pid_path(home);
    fs::write(&pid_file, format!("{}\n", std::process::id())).map_err(|e| io_err(&pid_file, e))
}

fn remove_pid_file(home: &Path) {
    let _ = fs::remove_file(pid_path(home));
}

fn prepare_socket_for_bind(socket: &Path) -> Result<(), DaemonError> {
    if !socket.exists() {
        return Ok(());
    }

    // A connectable socket means another instance is live; anything else is
    // a leftover from an unclean exit.
    if StdUnixStream::connect(socket).is_ok() {
        return Err(DaemonError::Protocol(format!(
            "daemon socket already in use: {}",
            socket.display()
        )));
    }

    tracing::warn!(socket = %socket.display(), "removing stale daemon socket before bind");
    match fs::remove_file(socket) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(io_err(socket, err)),
    }
}

fn ensure_runtime_dirs(home: &Path) -> Result<(), DaemonError> {
    let run = run_dir(home);
    if !run.exists() {
        fs::create_dir_all(&run).map_err(|e| io_err(&run, e))?;
    }
    Ok(())
}

fn handle_join(
    task: &str,
    result: Result<Result<(), DaemonError>, tokio::task::JoinError>,
) -> Result<(), DaemonError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(DaemonError::Protocol(format!(
            "{task} task join failure: {err}"
        ))),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

#[cfg(unix)]
fn set_socket_permissions(path: &Path) -> Result<(), DaemonError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_socket_permissions(_path: &Path) -> Result<(), DaemonError> {
    Ok(())
}
