use serde::{Deserialize, Serialize};

/// State carried along a navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    /// Path the user was trying to reach before being sent elsewhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

/// The location being visited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<NavigationState>,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            state: None,
        }
    }

    /// Attach a captured origin path.
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.state = Some(NavigationState {
            from: Some(from.into()),
        });
        self
    }

    /// The captured origin path, if one is present and non-empty.
    pub fn from(&self) -> Option<&str> {
        self.state
            .as_ref()
            .and_then(|s| s.from.as_deref())
            .filter(|from| !from.is_empty())
    }
}

/// Where to send the user instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<NavigationState>,
    /// Replace the current history entry rather than pushing a new one.
    pub replace: bool,
}

/// Outcome of a guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GuardDecision {
    /// Show the guarded content.
    Render,
    /// The boot check has not settled; show a placeholder.
    Pending,
    /// Navigate elsewhere.
    Redirect(Redirect),
}

impl GuardDecision {
    pub(crate) fn redirect(to: &str, from: Option<&str>) -> Self {
        GuardDecision::Redirect(Redirect {
            to: to.to_string(),
            state: from.map(|from| NavigationState {
                from: Some(from.to_string()),
            }),
            replace: true,
        })
    }

    pub fn is_render(&self) -> bool {
        matches!(self, GuardDecision::Render)
    }

    /// Target path of a redirect.
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            GuardDecision::Redirect(r) => Some(&r.to),
            _ => None,
        }
    }
}
