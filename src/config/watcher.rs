//! Configuration file watcher for hot reload.

use std::path::Path;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::AppConfig;

/// Watch a configuration file and emit reloaded configurations.
///
/// Each successful reload is validated by the loader before it is sent; a
/// broken edit leaves the running configuration untouched. The returned
/// watcher must be kept alive for events to fire.
pub fn watch_config(
    path: &Path,
) -> Result<(RecommendedWatcher, mpsc::UnboundedReceiver<AppConfig>), notify::Error> {
    let (tx, rx) = mpsc::unbounded_channel();
    let watched = path.to_path_buf();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                match load_config(&watched) {
                    Ok(new_config) => {
                        tracing::info!(path = ?watched, "Config file changed, applying reload");
                        let _ = tx.send(new_config);
                    }
                    Err(e) => {
                        tracing::error!(
                            path = ?watched,
                            error = %e,
                            "Config reload failed, keeping current configuration"
                        );
                    }
                }
            }
            Ok(_) => {}
            Err(e) => tracing::error!(error = ?e, "Config watch error"),
        },
        Config::default().with_poll_interval(Duration::from_secs(2)),
    )?;

    watcher.watch(path, RecursiveMode::NonRecursive)?;
    tracing::info!(path = ?path, "Config watcher started");

    Ok((watcher, rx))
}
