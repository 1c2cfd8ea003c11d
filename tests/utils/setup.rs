use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use codespace::{
    room::{generators::RandomTokenGenerator, RegistryLimits, RoomRegistry, SessionCoordinator},
    ConnectionId, WebsocketReceiveHandler,
};

use super::mocks::MockConnectionManager;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub coordinator: Arc<SessionCoordinator>,
    pub mock_conn_manager: Arc<MockConnectionManager>,
    pub input_handler: WebsocketReceiveHandler,
    pub names: Vec<String>,
    connections: HashMap<String, ConnectionId>,
}

impl TestSetup {
    /// Connection id behind a test client name
    pub fn id(&self, name: &str) -> ConnectionId {
        *self
            .connections
            .get(name)
            .unwrap_or_else(|| panic!("unknown test client {}", name))
    }
}

pub struct TestSetupBuilder {
    names: Vec<String>,
    limits: RegistryLimits,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            names: vec![],
            limits: RegistryLimits::default(),
        }
    }

    pub fn with_clients(mut self, names: Vec<&str>) -> Self {
        self.names = names.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_three_clients(self) -> Self {
        self.with_clients(vec!["alice", "bob", "carol"])
    }

    /// Adds `count` numbered clients named `client-0`, `client-1`, ...
    pub fn with_numbered_clients(mut self, count: usize) -> Self {
        self.names = (0..count).map(|i| format!("client-{}", i)).collect();
        self
    }

    pub fn with_room_capacity(mut self, capacity: usize) -> Self {
        self.limits.room_capacity = capacity;
        self
    }

    pub async fn build(self) -> TestSetup {
        let mock_conn_manager = Arc::new(MockConnectionManager::new());
        let registry = RoomRegistry::new(self.limits, Box::new(RandomTokenGenerator::default()));
        let coordinator = Arc::new(SessionCoordinator::new(
            registry,
            mock_conn_manager.clone(),
        ));

        // Connect clients
        let mut connections = HashMap::new();
        for name in &self.names {
            let id = Uuid::new_v4();
            mock_conn_manager.add_connected(id).await;
            connections.insert(name.clone(), id);
        }

        let input_handler =
            WebsocketReceiveHandler::new(coordinator.clone(), mock_conn_manager.clone());

        TestSetup {
            coordinator,
            mock_conn_manager,
            input_handler,
            names: self.names,
            connections,
        }
    }
}
