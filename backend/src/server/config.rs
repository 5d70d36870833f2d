//! HTTP server configuration object.

use std::net::SocketAddr;

use crate::outbound::persistence::MongoStore;

/// Everything needed to start the HTTP server: where to listen and the
/// connected document store backing the users collection.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) store: MongoStore,
}

impl ServerConfig {
    /// Construct a server configuration bound to `bind_addr` over `store`.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, store: MongoStore) -> Self {
        Self { bind_addr, store }
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
