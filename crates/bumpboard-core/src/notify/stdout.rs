use async_trait::async_trait;
use serde::Serialize;
use tokio::io::{AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

use crate::error::BumpResult;
use crate::traits::Notifier;
use crate::types::{Location, Notice};

#[derive(Serialize)]
struct NoticeLine<'a> {
    location: &'a Location,
    #[serde(flatten)]
    notice: &'a Notice,
}

/// Prints one JSON object per notice on stdout.
pub struct StdoutNotifier {
    out: Mutex<Stdout>,
}

impl StdoutNotifier {
    pub fn new() -> Self {
        Self {
            out: Mutex::new(tokio::io::stdout()),
        }
    }

    pub(crate) fn render(location: &Location, notice: &Notice) -> BumpResult<String> {
        let mut line = serde_json::to_string(&NoticeLine { location, notice })?;
        line.push('\n');
        Ok(line)
    }
}

impl Default for StdoutNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for StdoutNotifier {
    async fn notify(&self, location: &Location, notice: &Notice) -> BumpResult<()> {
        let line = Self::render(location, notice)?;
        let mut out = self.out.lock().await;
        out.write_all(line.as_bytes()).await?;
        out.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::notices;

    #[test]
    fn test_render_is_single_json_line() {
        let line = StdoutNotifier::render(&Location::new("c1"), &notices::reminder("U1")).unwrap();
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);

        let value: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(value["location"], "c1");
        assert_eq!(value["title"], "Friendly Reminder");
        assert_eq!(value["accent"], "reminder");
    }
}
