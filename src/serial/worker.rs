use std::{
    io::{ErrorKind, Read},
    thread::JoinHandle,
    time::Duration,
};

use crossbeam::channel::Sender;
use tracing::{debug, error, info};

use crate::settings::Settings;

use super::SourceResult;

/// How long a port read waits before giving the thread a chance to notice shutdown.
const READ_TIMEOUT: Duration = Duration::from_millis(10);
const READ_CHUNK: usize = 4096;

/// Opens `port` at `baud_rate` with the remaining bus settings from `settings`
/// and starts forwarding everything read from it into `tx`.
///
/// The port is opened before this returns, so connection errors surface here.
/// The thread ends when the port errors out or the receiving side is dropped.
pub fn spawn_serial_reader(
    port: &str,
    baud_rate: u32,
    settings: &Settings,
    tx: Sender<Vec<u8>>,
) -> SourceResult<JoinHandle<()>> {
    let mut serial = serialport::new(port, baud_rate)
        .data_bits(settings.data_bits())
        .parity(settings.parity())
        .stop_bits(settings.stop_bits())
        .flow_control(settings.flow_control())
        .timeout(READ_TIMEOUT)
        .open()?;
    info!("Opened {port} @ {baud_rate}");

    let handle = std::thread::Builder::new()
        .name("serial-reader".into())
        .spawn(move || {
            let mut rx_buffer = vec![0; READ_CHUNK];
            loop {
                match serial.read(&mut rx_buffer) {
                    Ok(0) => (),
                    Ok(n) => {
                        if tx.send(rx_buffer[..n].to_vec()).is_err() {
                            debug!("Serial reader closed gracefully!");
                            return;
                        }
                    }
                    Err(e) if e.kind() == ErrorKind::TimedOut => (),
                    Err(e) => {
                        error!("Serial reader closed with error: {e}");
                        return;
                    }
                }
            }
        })?;
    Ok(handle)
}

/// Forwards stdin into `tx` until EOF.
pub fn spawn_stdin_reader(tx: Sender<Vec<u8>>) -> SourceResult<JoinHandle<()>> {
    spawn_reader("stdin-reader", std::io::stdin(), tx)
}

/// Forwards everything from a blocking reader into `tx` until EOF or error.
pub fn spawn_reader<R>(name: &str, mut reader: R, tx: Sender<Vec<u8>>) -> SourceResult<JoinHandle<()>>
where
    R: Read + Send + 'static,
{
    let handle = std::thread::Builder::new()
        .name(name.to_owned())
        .spawn(move || {
            let mut rx_buffer = vec![0; READ_CHUNK];
            loop {
                match reader.read(&mut rx_buffer) {
                    Ok(0) => {
                        debug!("Reader hit EOF");
                        return;
                    }
                    Ok(n) => {
                        if tx.send(rx_buffer[..n].to_vec()).is_err() {
                            return;
                        }
                    }
                    Err(e) if e.kind() == ErrorKind::Interrupted => (),
                    Err(e) => {
                        error!("Reader closed with error: {e}");
                        return;
                    }
                }
            }
        })?;
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use crossbeam::channel::unbounded;

    use super::*;
    use crate::{serial::ChannelSource, traits::ByteSource};

    #[test]
    fn test_reader_forwards_until_eof() {
        let (tx, rx) = unbounded();
        let data: Vec<u8> = (0..10_000).map(|i| (i % 251) as u8).collect();
        let handle = spawn_reader("test-reader", std::io::Cursor::new(data.clone()), tx).unwrap();
        handle.join().unwrap();

        let mut source = ChannelSource::new(rx);
        let mut out = vec![0; 20_000];
        let received = source.try_receive(&mut out);
        assert_eq!(&out[..received], data);
        assert!(source.is_finished());
    }
}
