#[tokio::main]
async fn main() {
    ordenes_server::start_server().await;
}
