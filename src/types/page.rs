use std::time::Duration;

/// Output of one browser session after the settle sequence.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// URL the browser ended on after redirects.
    pub final_url: String,
    /// Serialized DOM after lazy content had a chance to load.
    pub html: String,
    /// Time spent in navigation, up to the load event.
    pub load_time: Duration,
}
