//! Capture of application logs into the console through a custom
//! [LogPlugin](bevy::log::LogPlugin) layer.

use std::sync::mpsc;

use bevy::log::{BoxedLayer, Level};
use bevy::prelude::*;
use tracing::Subscriber;
use tracing_subscriber::field::Visit;
use tracing_subscriber::Layer;

use crate::core::{DevConsole, MIRROR_TARGET};

/// A function that routes `tracing` events into the [`DevConsole`] history
/// via [`LogPlugin::custom_layer`](bevy::log::LogPlugin::custom_layer).
///
/// Events the console itself mirrors to the log (target
/// [`MIRROR_TARGET`]) are not captured again.
pub fn custom_log_layer(app: &mut App) -> Option<BoxedLayer> {
    Some(Box::new(create_custom_log_layer(app)))
}

fn create_custom_log_layer(app: &mut App) -> LogCaptureLayer {
    let (sender, receiver) = mpsc::channel();
    app.insert_non_send_resource(CapturedLogEvents(receiver));
    app.add_systems(PostUpdate, transfer_log_events);

    LogCaptureLayer { sender }
}

/// One captured `tracing` event.
#[derive(Debug, Clone)]
pub struct CapturedLog {
    pub message: String,
    pub target: &'static str,
    pub level: Level,
}

/// Moves captured events into the console, if one exists.
fn transfer_log_events(
    receiver: NonSend<CapturedLogEvents>,
    console: Option<ResMut<DevConsole>>,
) {
    let Some(mut console) = console else {
        // Drain so the channel does not grow without a console.
        receiver.0.try_iter().for_each(drop);
        return;
    };
    for log in receiver.0.try_iter() {
        append(&mut console, &log);
    }
}

/// Append `log` to the history as `[target] message`.
fn append(console: &mut DevConsole, log: &CapturedLog) {
    let text = format!("[{}] {}", log.target, log.message);
    match log.level {
        Level::ERROR => console.error(&text),
        Level::WARN => console.warn(&text),
        Level::INFO => console.info(&text),
        _ => console.debug(&text),
    }
}

/// Holds [`CapturedLog`]s until [`transfer_log_events`] runs.
struct CapturedLogEvents(mpsc::Receiver<CapturedLog>);

/// A [`Layer`] that sends log events to [`CapturedLogEvents`].
struct LogCaptureLayer {
    sender: mpsc::Sender<CapturedLog>,
}

impl<S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>> Layer<S>
    for LogCaptureLayer
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let metadata = event.metadata();
        if metadata.target() == MIRROR_TARGET {
            return;
        }

        let mut message = None;
        event.record(&mut LogEventVisitor(&mut message));
        if let Some(message) = message {
            let _ = self.sender.send(CapturedLog {
                message,
                target: metadata.target(),
                level: *metadata.level(),
            });
        }
    }
}

/// A [`Visit`]or that keeps only the `message` field.
struct LogEventVisitor<'a>(&'a mut Option<String>);

impl Visit for LogEventVisitor<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.0 = Some(format!("{value:?}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConsoleConfig;
    use crate::core::ConsoleOutputLevel;

    fn log(level: Level, message: &str) -> CapturedLog {
        CapturedLog {
            message: message.to_string(),
            target: "game",
            level,
        }
    }

    #[test]
    fn test_levels_map_to_console_output() {
        let mut config = ConsoleConfig::default();
        config.show_debug = false;
        let mut console = DevConsole::new(config);

        append(&mut console, &log(Level::ERROR, "boom"));
        append(&mut console, &log(Level::WARN, "careful"));
        append(&mut console, &log(Level::INFO, "hello"));
        append(&mut console, &log(Level::TRACE, "noise"));

        let levels: Vec<_> = console.history().iter().map(|l| l.level).collect();
        assert_eq!(
            levels,
            vec![
                ConsoleOutputLevel::Error,
                ConsoleOutputLevel::Warn,
                ConsoleOutputLevel::Info
            ]
        );
        assert_eq!(console.history()[0].text, "[game] boom");
    }

    #[test]
    fn test_transfer_without_console_drains() {
        let mut app = App::new();
        let (sender, receiver) = mpsc::channel();
        app.insert_non_send_resource(CapturedLogEvents(receiver));
        app.add_systems(Update, transfer_log_events);

        sender.send(log(Level::INFO, "lost")).unwrap();
        app.update();
        assert!(app.world().non_send_resource::<CapturedLogEvents>().0.try_recv().is_err());

        app.insert_resource(DevConsole::default());
        sender.send(log(Level::INFO, "kept")).unwrap();
        app.update();
        let console = app.world().resource::<DevConsole>();
        assert_eq!(console.history().last().unwrap().text, "[game] kept");
    }
}
