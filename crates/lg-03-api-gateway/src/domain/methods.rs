//! Method registry and subscription streams.

/// Where a method may be called from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    /// HTTP and WebSocket
    Any,
    /// Needs a live connection to push to
    WebSocketOnly,
}

/// Method metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodInfo {
    pub name: &'static str,
    pub transport: Transport,
    pub description: &'static str,
}

impl MethodInfo {
    const fn any(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            transport: Transport::Any,
            description,
        }
    }

    const fn ws(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            transport: Transport::WebSocketOnly,
            description,
        }
    }
}

static METHOD_REGISTRY: &[MethodInfo] = &[
    MethodInfo::any("tx", "Transaction by hash, optionally within a ledger window"),
    MethodInfo::any("ledger_range", "Known contiguous range of ledgers"),
    MethodInfo::any("server_info", "Node status and complete ledgers"),
    MethodInfo::any("ledger_entry", "State entry by key at a ledger"),
    MethodInfo::any("ledger", "Header of a closed ledger"),
    MethodInfo::ws("subscribe", "Start receiving stream notifications"),
    MethodInfo::ws("unsubscribe", "Stop receiving stream notifications"),
];

/// Get method info by name
pub fn get_method_info(method: &str) -> Option<&'static MethodInfo> {
    METHOD_REGISTRY.iter().find(|m| m.name == method)
}

/// Check if method is supported on any transport
pub fn is_method_supported(method: &str) -> bool {
    get_method_info(method).is_some()
}

/// Label used for request metrics; unknown names collapse to one series.
pub fn metric_label(method: &str) -> &'static str {
    get_method_info(method).map_or("unknown", |m| m.name)
}

/// Subscribable streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    /// One notification per newly validated ledger
    Ledger,
}

impl Stream {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ledger" => Some(Stream::Ledger),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stream::Ledger => "ledger",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_registry() {
        assert!(is_method_supported("tx"));
        assert!(is_method_supported("ledger_entry"));
        assert!(!is_method_supported("account_info"));
    }

    #[test]
    fn test_subscribe_is_websocket_only() {
        assert_eq!(
            get_method_info("subscribe").map(|m| m.transport),
            Some(Transport::WebSocketOnly)
        );
        assert_eq!(get_method_info("tx").map(|m| m.transport), Some(Transport::Any));
    }

    #[test]
    fn test_metric_label_bounds_cardinality() {
        assert_eq!(metric_label("ledger"), "ledger");
        assert_eq!(metric_label("random_garbage_42"), "unknown");
    }

    #[test]
    fn test_streams() {
        assert_eq!(Stream::from_str("ledger"), Some(Stream::Ledger));
        assert_eq!(Stream::from_str("transactions"), None);
        assert_eq!(Stream::Ledger.as_str(), "ledger");
    }
}
