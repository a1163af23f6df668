use mock_server::{Member, MockConfig};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let page_size = std::env::var("PAGE_SIZE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(mock_server::DEFAULT_PAGE_SIZE);
    let config = MockConfig {
        page_size,
        members: vec![
            Member::new(1, "Ada Lovelace", "ada@example.com"),
            Member::new(2, "Grace Hopper", "grace@example.com"),
            Member::new(3, "Alan Turing", "alan@example.com"),
        ],
        ..MockConfig::default()
    };
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    println!("listening on {addr} (token {:?}, org id {:?})", config.token, config.org_id);
    mock_server::run_with(listener, config).await
}
