use std::io::{self, Write};
use std::os::unix::net::{UnixDatagram, UnixStream};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

/// syslog facility `local0`
const FACILITY_LOCAL0: u8 = 16;

/// `/dev/log` is a datagram socket on most systems and a stream socket on some.
#[derive(Debug)]
enum SyslogSocket {
    Datagram(UnixDatagram),
    Stream(Mutex<UnixStream>),
}

impl SyslogSocket {
    fn connect(path: &Path) -> io::Result<Self> {
        let datagram = UnixDatagram::unbound().and_then(|socket| {
            socket.connect(path)?;
            Ok(socket)
        });

        match datagram {
            Ok(socket) => Ok(Self::Datagram(socket)),
            Err(_) => Ok(Self::Stream(Mutex::new(UnixStream::connect(path)?))),
        }
    }

    fn send(&self, message: &[u8]) -> io::Result<()> {
        match self {
            Self::Datagram(socket) => socket.send(message).map(|_| ()),
            Self::Stream(stream) => {
                let mut stream = stream
                    .lock()
                    .map_err(|_| io::Error::other("syslog stream lock poisoned"))?;
                // stream frames are NUL terminated
                stream.write_all(message)?;
                stream.write_all(b"\0")
            }
        }
    }
}

/// Sends each formatted event as one RFC 3164 message:
/// `<PRI>ident: LEVEL - message`
#[derive(Debug, Clone)]
pub struct SyslogMakeWriter {
    socket: Arc<SyslogSocket>,
    ident: &'static str,
}

impl SyslogMakeWriter {
    pub fn connect(path: &Path, ident: &'static str) -> io::Result<Self> {
        Ok(Self {
            socket: Arc::new(SyslogSocket::connect(path)?),
            ident,
        })
    }

    pub fn is_stream(&self) -> bool {
        matches!(*self.socket, SyslogSocket::Stream(_))
    }

    pub fn line(&self, level: Level) -> SyslogLine {
        SyslogLine {
            socket: Arc::clone(&self.socket),
            ident: self.ident,
            level,
            buf: Vec::new(),
        }
    }
}

impl<'a> MakeWriter<'a> for SyslogMakeWriter {
    type Writer = SyslogLine;

    fn make_writer(&'a self) -> Self::Writer {
        self.line(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        self.line(*meta.level())
    }
}

/// Buffers one event and sends it when dropped
pub struct SyslogLine {
    socket: Arc<SyslogSocket>,
    ident: &'static str,
    level: Level,
    buf: Vec<u8>,
}

impl SyslogLine {
    fn message(&self) -> Option<Vec<u8>> {
        let message = String::from_utf8_lossy(&self.buf);
        let message = message.trim_end();
        if message.is_empty() {
            return None;
        }

        let priority = FACILITY_LOCAL0 * 8 + severity(self.level);
        Some(format!("<{}>{}: {} - {}", priority, self.ident, self.level, message).into_bytes())
    }
}

impl Write for SyslogLine {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for SyslogLine {
    fn drop(&mut self) {
        if let Some(message) = self.message() {
            // syslog delivery is best effort; the console still has the line
            let _ = self.socket.send(&message);
        }
    }
}

fn severity(level: Level) -> u8 {
    match level {
        Level::ERROR => 3,
        Level::WARN => 4,
        Level::INFO => 6,
        _ => 7,
    }
}
