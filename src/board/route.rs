use std::fmt;

/// Client-side destinations reachable from the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Detail view keyed by whatever identifier was given; it is neither
    /// validated nor escaped here.
    Detail(String),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Detail(id) => format!("/detail/{}", id),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Search submission: empty input goes nowhere.
pub fn search_route(input: &str) -> Option<Route> {
    if input.is_empty() {
        return None;
    }
    Some(Route::Detail(input.to_string()))
}
