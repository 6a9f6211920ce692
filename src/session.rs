use crate::common::ParsedCommand;
use crate::compiler::Compiler;
use crate::device::{AnalogDevice, Indicator, IndicatorState};
use crate::engine::Engine;
use crate::formatter::format_reply;
use crate::parser::parse_command;
use anyhow::Context;
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

// longest request line accepted, terminator included
const MAX_LINE_BYTES: u64 = 1024;

/// Yields client connections one at a time.
pub trait ConnectionSource {
    type Stream: AsyncRead + AsyncWrite + Unpin;

    async fn accept(&mut self) -> std::io::Result<(Self::Stream, SocketAddr)>;
}

impl ConnectionSource for TcpListener {
    type Stream = TcpStream;

    async fn accept(&mut self) -> std::io::Result<(TcpStream, SocketAddr)> {
        TcpListener::accept(self).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Quit,
    Disconnected,
    ReceiveFailed,
    LineTooLong,
    SendFailed,
}

pub struct Server<D, I> {
    device: D,
    ready_led: I,
    client_led: I,
    compiler: Compiler,
    engine: Engine,
}

impl<D: AnalogDevice, I: Indicator> Server<D, I> {
    pub fn new(device: D, ready_led: I, client_led: I, compiler: Compiler, engine: Engine) -> Self {
        Server {
            device,
            ready_led,
            client_led,
            compiler,
            engine,
        }
    }

    /// Serves clients strictly one after another. Only an accept failure
    /// ends the loop.
    pub async fn run<S: ConnectionSource>(&mut self, source: &mut S) -> anyhow::Result<()> {
        self.ready_led.set(IndicatorState::On);
        loop {
            info!("waiting for new connection...");
            let accepted = source.accept().await;
            let (stream, address) = match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("failed to accept new connection ({:?})", e);
                    self.ready_led.set(IndicatorState::Off);
                    return Err(e).context("accept failed");
                }
            };

            info!("accepted client from {}", address);
            self.client_led.set(IndicatorState::On);
            let (end, mut stream) = self.serve(stream).await;
            info!("session with {} ended: {:?}", address, end);
            self.client_led.set(IndicatorState::Off);

            if let Err(e) = stream.shutdown().await {
                warn!("close connection with {} failed ({:?})", address, e);
            }
        }
    }

    pub async fn serve<T>(&mut self, stream: T) -> (SessionEnd, T)
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        let mut stream = BufReader::new(stream);
        let mut line = String::new();

        let end = loop {
            line.clear();
            match (&mut stream).take(MAX_LINE_BYTES).read_line(&mut line).await {
                Ok(0) => break SessionEnd::Disconnected,
                Ok(n) if n as u64 == MAX_LINE_BYTES && !line.ends_with('\n') => {
                    warn!("command longer than {} bytes, closing connection", MAX_LINE_BYTES);
                    break SessionEnd::LineTooLong;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("failed to receive command ({:?})", e);
                    break SessionEnd::ReceiveFailed;
                }
            }
            debug!("received {:?}", line.trim());

            let command = parse_command(&line);
            if command == ParsedCommand::Quit {
                break SessionEnd::Quit;
            }
            let reply = self.handle(&command).await;

            if let Err(e) = stream.get_mut().write_all(reply.as_bytes()).await {
                warn!("failed to send reply ({:?})", e);
                break SessionEnd::SendFailed;
            }
        };
        (end, stream.into_inner())
    }

    async fn handle(&mut self, command: &ParsedCommand) -> String {
        let program = self.compiler.compile(command);
        let outcome = self.engine.execute(&mut self.device, &program.ops).await;
        format_reply(program.target.as_ref(), &outcome)
    }
}
