// Interface adapters: wire protocol, sockets and HTTP routes.

pub mod http;
pub mod net;
pub mod protocol;
pub mod state;
