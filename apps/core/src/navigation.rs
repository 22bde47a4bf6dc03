use std::sync::{Arc, Mutex};

pub const BROWSE_PATH: &str = "/prompts";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Prompt { slug: String },
    Blog { slug: String },
    Search { query: String },
    Browse,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Self::Prompt { slug } => format!("/prompt/{slug}"),
            Self::Blog { slug } => format!("/blog/{slug}"),
            Self::Search { query } => format!("/search?q={}", urlencoding::encode(query)),
            Self::Browse => BROWSE_PATH.to_string(),
        }
    }
}

/// Client-side route push.
pub trait Navigator: Send {
    fn navigate(&mut self, route: &Route);
}

/// Keeps every path it was asked to open. Shared handles see the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    visited: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    pub fn visited(&self) -> Vec<String> {
        self.visited
            .lock()
            .map(|visited| visited.clone())
            .unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, route: &Route) {
        if let Ok(mut visited) = self.visited.lock() {
            visited.push(route.path());
        }
    }
}

#[derive(Debug, Default)]
pub struct StdoutNavigator;

impl Navigator for StdoutNavigator {
    fn navigate(&mut self, route: &Route) {
        let path = route.path();
        tracing::info!(%path, "navigate");
        println!("navigate {path}");
    }
}
