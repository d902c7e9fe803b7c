//! `server_info`.

use super::RpcHandlers;
use crate::domain::types::ServerInfoResult;

impl RpcHandlers {
    pub fn server_info(&self) -> ServerInfoResult {
        ServerInfoResult {
            complete_ledgers: self
                .backend
                .fetch_range()
                .map_or_else(|| "empty".to_string(), |range| range.to_string()),
            read_only: self.backend.mode().is_read_only(),
            build_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::rpc::testing::{backend_with_ledgers, empty_backend, handlers};

    #[tokio::test]
    async fn test_server_info_reports_complete_ledgers() {
        let info = handlers(empty_backend().await).server_info();
        assert_eq!(info.complete_ledgers, "empty");
        assert!(!info.read_only);

        let info = handlers(backend_with_ledgers(3, 9).await).server_info();
        assert_eq!(info.complete_ledgers, "3-9");
    }
}
