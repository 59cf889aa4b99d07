//! JavaScript snippets evaluated in web surfaces.

/// Deliver an assistant reply to a page.
///
/// Replies that are already JSON are passed as an object literal; anything
/// else is wrapped as `{"content": ...}`.
pub fn receive_ai_message(message: &str) -> String {
    if serde_json::from_str::<serde_json::Value>(message).is_ok() {
        format!("window.receiveAIMessage({message})")
    } else {
        let wrapped = serde_json::json!({ "content": message });
        format!("window.receiveAIMessage({wrapped})")
    }
}

/// Tell a panel page its own route name so it can tag outgoing events.
pub fn dock_route_name(name: &str) -> String {
    let quoted = serde_json::Value::String(name.to_string());
    format!("window.__dockRouteName = {quoted};")
}
