use dlwatch_core::ListenError;

pub fn to_listen_error(e: impl std::fmt::Display, action: &str) -> ListenError {
    let s = e.to_string();
    if s.contains("navigation") || s.contains("Navigation") {
        ListenError::navigation_error(format!("{} navigation failed: {}", action, s))
    } else if s.contains("Cannot find context") || s.contains("Execution context was destroyed") {
        ListenError::navigation_error(format!("{} lost its page context: {}", action, s))
    } else if s.contains("Uncaught") || s.contains("Error:") {
        ListenError::script_error(format!("{} script failed: {}", action, s))
    } else {
        ListenError::browser_error(format!("{} failed: {}", action, s))
    }
}
