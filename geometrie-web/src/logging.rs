/// `tracing` output for the browser: one console call per event, at the
/// console level matching the event level
use std::io::{self, Write};
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::JsValue;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMakeWriter;

/// Buffers one formatted event and hands it to the console when dropped
pub struct ConsoleWriter {
    level: Level,
    buffer: Vec<u8>,
}

impl ConsoleWriter {
    fn new(level: Level) -> Self {
        Self {
            level,
            buffer: Vec::new(),
        }
    }
}

impl Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if let Some(line) = finish_line(&self.buffer) {
            emit(self.level, &line);
        }
    }
}

/// The buffered event without its trailing newline; `None` when empty
pub fn finish_line(buffer: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(buffer);
    let line = text.trim_end();
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

fn emit(level: Level, line: &str) {
    let message = JsValue::from_str(line);
    if level == Level::ERROR {
        web_sys::console::error_1(&message);
    } else if level == Level::WARN {
        web_sys::console::warn_1(&message);
    } else if level == Level::INFO {
        web_sys::console::info_1(&message);
    } else {
        web_sys::console::debug_1(&message);
    }
}

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::new(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter::new(*meta.level())
    }
}

/// Install the console subscriber; later calls are ignored
pub fn init(max_level: Level) {
    // wasm32 has no system clock, so events carry no timestamp
    let _ = tracing_subscriber::fmt()
        .without_time()
        .with_ansi(false)
        .with_target(false)
        .with_max_level(max_level)
        .with_writer(ConsoleMakeWriter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_line_trims_newline() {
        assert_eq!(
            finish_line(b" WARN event ignored err=bad size\n"),
            Some(" WARN event ignored err=bad size".to_string())
        );
    }

    #[test]
    fn test_finish_line_skips_blank_events() {
        assert_eq!(finish_line(b""), None);
        assert_eq!(finish_line(b"\n"), None);
    }

    #[test]
    fn test_writer_buffers_until_dropped() {
        let mut writer = ConsoleMakeWriter.make_writer();
        write!(writer, "mounted").unwrap();
        writer.write_all(b" selector=.geometrie-3d\n").unwrap();
        assert_eq!(
            finish_line(&writer.buffer),
            Some("mounted selector=.geometrie-3d".to_string())
        );
        // dropping would reach the browser console
        writer.buffer.clear();
    }
}
