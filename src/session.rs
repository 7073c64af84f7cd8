//! Terminal Session (C1): frames a byte stream into lines, negotiates
//! telnet options, tracks window size and terminal type, and escapes
//! output. One `Session` wraps one live connection; reads and writes both
//! go through `tokio::io` halves, with writes serialized by a mutex so the
//! writer task and any synchronous notices never interleave.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

const IAC: u8 = 255;
const DONT: u8 = 254;
const DO: u8 = 253;
const WONT: u8 = 252;
const WILL: u8 = 251;
const SB: u8 = 250;
const GA: u8 = 249;
const EL: u8 = 248;
const EC: u8 = 247;
const AYT: u8 = 246;
const AO: u8 = 245;
const IP: u8 = 244;
const BRK: u8 = 243;
const DM: u8 = 242;
const NOP: u8 = 241;
const SE: u8 = 240;

const OPT_ECHO: u8 = 1;
const OPT_SUPPRESS_GA: u8 = 3;
const OPT_TERMINAL_TYPE: u8 = 24;
const OPT_WINDOW_SIZE: u8 = 31;
const OPT_LINEMODE: u8 = 34;

const TERMINAL_TYPE_IS: u8 = 0;
const TERMINAL_TYPE_SEND: u8 = 1;

fn server_supported(opt: u8) -> bool {
    opt == OPT_SUPPRESS_GA
}

fn client_supported(opt: u8) -> bool {
    opt == OPT_TERMINAL_TYPE || opt == OPT_WINDOW_SIZE
}

/// One half of the session: the raw reader, buffering bytes between line
/// reads. Owned solely by the reader loop.
pub struct SessionReader<R> {
    inner: R,
    buf: Vec<u8>,
    line: Vec<u8>,
}

/// The writable half, shared between the writer task and any handler that
/// needs to push a notice directly (e.g. the login FSM before a player
/// record exists). Serializes writes with a mutex per spec 4.1.
pub struct SessionWriter<W> {
    inner: Mutex<W>,
}

/// Negotiated terminal state, shared by reference so the dispatcher and
/// `who`/`stats` handlers can read it without touching the socket.
#[derive(Debug, Clone, Default)]
pub struct TerminalInfo {
    pub terminal_type: Option<String>,
    pub width: u16,
    pub height: u16,
}

impl<R: AsyncRead + Unpin> SessionReader<R> {
    pub fn new(inner: R) -> Self {
        SessionReader {
            inner,
            buf: Vec::new(),
            line: Vec::new(),
        }
    }

    /// Reads one CR-, LF-, or CRLF-terminated line, handling telnet IAC
    /// negotiation transparently. `reply` is used to answer DO/WILL/SB
    /// sequences. Returns `Ok(None)` on clean EOF.
    pub async fn read_line<W: AsyncWrite + Unpin>(
        &mut self,
        reply: &SessionWriter<W>,
        term: &mut TerminalInfo,
    ) -> std::io::Result<Option<String>> {
        self.line.clear();
        let mut byte = [0u8; 1];
        loop {
            if !self.buf.is_empty() {
                byte[0] = self.buf.remove(0);
            } else {
                let n = self.inner.read(&mut byte).await?;
                if n == 0 {
                    return Ok(None);
                }
            }

            match byte[0] {
                0 => continue,
                0x08 | 0x7F => {
                    self.line.pop();
                }
                b'\r' => {
                    // Consume a following LF if present to normalize CRLF.
                    let mut peek = [0u8; 1];
                    if self.inner.read(&mut peek).await.unwrap_or(0) == 1 && peek[0] != b'\n' {
                        self.buf.push(peek[0]);
                    }
                    return Ok(Some(String::from_utf8_lossy(&self.line).into_owned()));
                }
                b'\n' => {
                    return Ok(Some(String::from_utf8_lossy(&self.line).into_owned()));
                }
                IAC => {
                    self.handle_negotiation(reply, term).await?;
                }
                b => self.line.push(b),
            }
        }
    }

    async fn handle_negotiation<W: AsyncWrite + Unpin>(
        &mut self,
        reply: &SessionWriter<W>,
        term: &mut TerminalInfo,
    ) -> std::io::Result<()> {
        let mut cmd = [0u8; 1];
        if self.inner.read(&mut cmd).await? == 0 {
            return Ok(());
        }
        match cmd[0] {
            DO => {
                let opt = self.read_byte().await?;
                if server_supported(opt) {
                    reply.raw(&[IAC, WILL, opt]).await?;
                } else {
                    reply.raw(&[IAC, WONT, opt]).await?;
                }
            }
            DONT => {
                let opt = self.read_byte().await?;
                reply.raw(&[IAC, WONT, opt]).await?;
            }
            WILL => {
                let opt = self.read_byte().await?;
                if client_supported(opt) {
                    reply.raw(&[IAC, DO, opt]).await?;
                    if opt == OPT_TERMINAL_TYPE {
                        reply.raw(&[IAC, SB, OPT_TERMINAL_TYPE, TERMINAL_TYPE_SEND, IAC, SE]).await?;
                    }
                } else {
                    reply.raw(&[IAC, DONT, opt]).await?;
                }
            }
            WONT => {
                let opt = self.read_byte().await?;
                reply.raw(&[IAC, DONT, opt]).await?;
            }
            SB => {
                let opt = self.read_byte().await?;
                let payload = self.read_subnegotiation().await?;
                match opt {
                    OPT_TERMINAL_TYPE => {
                        if payload.first() == Some(&TERMINAL_TYPE_IS) {
                            let name = String::from_utf8_lossy(&payload[1..]).to_ascii_uppercase();
                            term.terminal_type = Some(name);
                        }
                    }
                    OPT_WINDOW_SIZE => {
                        if payload.len() >= 4 {
                            term.width = u16::from_be_bytes([payload[0], payload[1]]);
                            term.height = u16::from_be_bytes([payload[2], payload[3]]);
                        }
                    }
                    _ => {}
                }
            }
            NOP | DM | BRK | IP | AO | AYT | EC | EL | GA => {}
            _ => {}
        }
        Ok(())
    }

    async fn read_byte(&mut self) -> std::io::Result<u8> {
        let mut b = [0u8; 1];
        self.inner.read_exact(&mut b).await?;
        Ok(b[0])
    }

    /// Reads until `IAC SE`, unescaping any doubled `IAC` bytes in the
    /// payload.
    async fn read_subnegotiation(&mut self) -> std::io::Result<Vec<u8>> {
        let mut payload = Vec::new();
        loop {
            let b = self.read_byte().await?;
            if b == IAC {
                let next = self.read_byte().await?;
                if next == SE {
                    return Ok(payload);
                }
                if next == IAC {
                    payload.push(IAC);
                    continue;
                }
                // Unexpected IAC <cmd> inside subnegotiation: stop here.
                return Ok(payload);
            }
            payload.push(b);
        }
    }
}

impl<W: AsyncWrite + Unpin> SessionWriter<W> {
    pub fn new(inner: W) -> Self {
        SessionWriter { inner: Mutex::new(inner) }
    }

    async fn raw(&self, bytes: &[u8]) -> std::io::Result<()> {
        let mut g = self.inner.lock().await;
        g.write_all(bytes).await?;
        g.flush().await
    }

    /// Performs the initial handshake: WILL suppress-go-ahead, WON'T echo,
    /// DON'T line-mode, DO terminal-type, DO window-size.
    pub async fn handshake(&self) -> std::io::Result<()> {
        self.raw(&[IAC, WILL, OPT_SUPPRESS_GA]).await?;
        self.raw(&[IAC, WONT, OPT_ECHO]).await?;
        self.raw(&[IAC, DONT, OPT_LINEMODE]).await?;
        self.raw(&[IAC, DO, OPT_TERMINAL_TYPE]).await?;
        self.raw(&[IAC, DO, OPT_WINDOW_SIZE]).await
    }

    /// Writes a line of text, converting bare LF to CRLF and doubling any
    /// literal 0xFF byte, per the wire contract.
    pub async fn write_line(&self, text: &str) -> std::io::Result<()> {
        let mut out = Vec::with_capacity(text.len() + 2);
        for &b in text.as_bytes() {
            if b == IAC {
                out.push(IAC);
                out.push(IAC);
            } else if b == b'\n' {
                out.push(b'\r');
                out.push(b'\n');
            } else {
                out.push(b);
            }
        }
        out.push(b'\r');
        out.push(b'\n');
        self.raw(&out).await
    }

    pub async fn write_prompt(&self, text: &str) -> std::io::Result<()> {
        let mut out = Vec::with_capacity(text.len());
        for &b in text.as_bytes() {
            if b == IAC {
                out.push(IAC);
                out.push(IAC);
            } else {
                out.push(b);
            }
        }
        self.raw(&out).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn reads_crlf_terminated_line() {
        let data = b"hello\r\nworld\n".to_vec();
        let mut reader = SessionReader::new(Cursor::new(data));
        let writer = SessionWriter::new(Vec::new());
        let mut term = TerminalInfo::default();
        let line = reader.read_line(&writer, &mut term).await.unwrap();
        assert_eq!(line, Some("hello".to_string()));
        let line2 = reader.read_line(&writer, &mut term).await.unwrap();
        assert_eq!(line2, Some("world".to_string()));
    }

    #[tokio::test]
    async fn backspace_truncates_buffer() {
        let data = b"helLO\x08\x08\r\n".to_vec();
        let mut reader = SessionReader::new(Cursor::new(data));
        let writer = SessionWriter::new(Vec::new());
        let mut term = TerminalInfo::default();
        let line = reader.read_line(&writer, &mut term).await.unwrap();
        assert_eq!(line, Some("hel".to_string()));
    }

    #[tokio::test]
    async fn window_size_subnegotiation_parses() {
        let mut data = vec![IAC, SB, OPT_WINDOW_SIZE, 0, 80, 0, 24, IAC, SE];
        data.extend_from_slice(b"ok\r\n");
        let mut reader = SessionReader::new(Cursor::new(data));
        let writer = SessionWriter::new(Vec::new());
        let mut term = TerminalInfo::default();
        let line = reader.read_line(&writer, &mut term).await.unwrap();
        assert_eq!(line, Some("ok".to_string()));
        assert_eq!(term.width, 80);
        assert_eq!(term.height, 24);
    }

    #[tokio::test]
    async fn terminal_type_subnegotiation_uppercases() {
        let mut data = vec![IAC, SB, OPT_TERMINAL_TYPE, TERMINAL_TYPE_IS];
        data.extend_from_slice(b"xterm");
        data.extend_from_slice(&[IAC, SE]);
        data.extend_from_slice(b"ok\r\n");
        let mut reader = SessionReader::new(Cursor::new(data));
        let writer = SessionWriter::new(Vec::new());
        let mut term = TerminalInfo::default();
        reader.read_line(&writer, &mut term).await.unwrap();
        assert_eq!(term.terminal_type.as_deref(), Some("XTERM"));
    }

    #[tokio::test]
    async fn write_line_converts_bare_lf_to_crlf() {
        let writer = SessionWriter::new(Vec::new());
        writer.write_line("hi").await.unwrap();
        let g = writer.inner.lock().await;
        assert_eq!(&g[..], b"hi\r\n");
    }
}
