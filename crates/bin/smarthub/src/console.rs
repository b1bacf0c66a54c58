//! Console observer: echoes every hub event as one line.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use smarthub_app::ports::Observer;
use smarthub_domain::error::SmartHubError;
use smarthub_domain::event::Event;

pub struct ConsoleObserver<W> {
    out: Mutex<W>,
}

impl ConsoleObserver<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleObserver<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl<W: Write + Send> Observer for ConsoleObserver<W> {
    fn name(&self) -> &str {
        "console"
    }

    fn notify(&self, event: &Event) -> Result<(), SmartHubError> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(out, "{event}").map_err(|err| SmartHubError::Storage(Box::new(err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smarthub_domain::device::DeviceKind;
    use smarthub_domain::id::DeviceId;
    use smarthub_domain::time::now;

    #[test]
    fn should_print_one_line_per_event() {
        let console = ConsoleObserver::new(Vec::new());
        console
            .notify(&Event::device_added(DeviceId::from("tv"), DeviceKind::Tv, now()))
            .unwrap();

        let out = console.out.into_inner().unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "[EVENT] DeviceAdded: {id: tv, kind: TV}\n"
        );
    }
}
