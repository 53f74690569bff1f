use async_trait::async_trait;
use mockall::mock;

use trackit_sync::application::ports::{RemoteError, RemoteGateway};
use trackit_sync::domain::value_objects::RecordPayload;

mock! {
    pub RemoteGatewayPort {}

    #[async_trait]
    impl RemoteGateway for RemoteGatewayPort {
        async fn create(&self, payload: &RecordPayload) -> Result<String, RemoteError>;
        async fn update(&self, server_id: &str, payload: &RecordPayload) -> Result<(), RemoteError>;
    }
}

pub type MockRemoteGateway = MockRemoteGatewayPort;
