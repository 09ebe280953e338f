//! Client-side routes and the navigation history.

use std::fmt;

const HOME: &str = "/web";
const PLUGIN_PREFIX: &str = "/web/plugin/";
const APPS_PREFIX: &str = "/web/apps/";
const WEBRADIO: &str = "webradio";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    /// `/web`: the sidebar on a compact terminal, a landing page otherwise.
    #[default]
    Home,
    /// `/web/plugin/:plugin`
    Plugin(String),
    /// `/web/apps/webradio`
    WebRadio,
}

impl Route {
    /// Parse a path.  Anything unrecognised lands on `/web`.
    pub fn parse(path: &str) -> Self {
        let path = path.trim();
        let path = path.split(['?', '#']).next().unwrap_or("");
        let path = path.trim_end_matches('/');

        if let Some(name) = path.strip_prefix(PLUGIN_PREFIX) {
            if !name.is_empty() && !name.contains('/') {
                return Route::Plugin(name.to_string());
            }
        }
        if path.strip_prefix(APPS_PREFIX) == Some(WEBRADIO) {
            return Route::WebRadio;
        }
        Route::Home
    }

    /// Route for an app entry of the plugin list.  Only the web radio app
    /// has a view; other apps fall back to home.
    pub fn for_app(name: &str) -> Self {
        if name == WEBRADIO {
            Route::WebRadio
        } else {
            Route::Home
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => HOME.to_string(),
            Route::Plugin(name) => format!("{}{}", PLUGIN_PREFIX, name),
            Route::WebRadio => format!("{}{}", APPS_PREFIX, WEBRADIO),
        }
    }

    pub fn title(&self) -> String {
        match self {
            Route::Home => "home".to_string(),
            Route::Plugin(name) => format!("plugin · {}", name),
            Route::WebRadio => "web radio".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Current route plus the way back.
pub struct Router {
    current: Route,
    history: Vec<Route>,
}

const MAX_HISTORY: usize = 32;

impl Router {
    pub fn new(start: Route) -> Self {
        Self {
            current: start,
            history: Vec::new(),
        }
    }

    pub fn current(&self) -> &Route {
        &self.current
    }

    /// Go to `route`.  Returns `false` when already there.
    pub fn navigate(&mut self, route: Route) -> bool {
        if route == self.current {
            return false;
        }
        let prev = std::mem::replace(&mut self.current, route);
        self.history.push(prev);
        if self.history.len() > MAX_HISTORY {
            self.history.remove(0);
        }
        true
    }

    /// Pop the history.  With nothing to go back to, non-home routes go home.
    pub fn back(&mut self) -> bool {
        match self.history.pop() {
            Some(prev) => {
                self.current = prev;
                true
            }
            None if self.current != Route::Home => {
                self.current = Route::Home;
                true
            }
            None => false,
        }
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty() || self.current != Route::Home
    }
}
