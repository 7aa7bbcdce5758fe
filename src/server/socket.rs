use anyhow::Result;
use socket2::TcpKeepalive;
use std::time::Duration;
use tokio::net::TcpStream;

use crate::config::ServerConfig;

/// Applies the configured TCP options to an accepted client socket.
pub fn configure(stream: &TcpStream, config: &ServerConfig) -> Result<()> {
    if let Some(secs) = config.tcp_keepalive_secs {
        let sock_ref = socket2::SockRef::from(stream);
        let keepalive = TcpKeepalive::new().with_time(Duration::from_secs(secs)); // idle time before the first keepalive
        sock_ref.set_tcp_keepalive(&keepalive)?;
    }

    stream.set_nodelay(config.tcp_nodelay)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn applies_keepalive_and_nodelay() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).await.unwrap();
        let (accepted, _) = listener.accept().await.unwrap();

        let config = ServerConfig {
            tcp_keepalive_secs: Some(30),
            tcp_nodelay: true,
            ..ServerConfig::default()
        };
        tokio_test::assert_ok!(configure(&accepted, &config));
        assert!(accepted.nodelay().unwrap());
        assert!(socket2::SockRef::from(&accepted).keepalive().unwrap());
        drop(client);
    }
}
