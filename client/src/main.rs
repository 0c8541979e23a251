use anyhow::Result;
use clap::Parser;

use ordenes_client::{
    api::ApiClient,
    session::{Session, session_path},
    views,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// API base URL; persisted for later runs.
    #[arg(long)]
    api_base: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let path = session_path();
    let mut session = Session::load(&path);

    let base = session.api_base(args.api_base.as_deref());
    if args.api_base.is_some() {
        session.api_base = Some(base.clone());
        session.save(&path)?;
    }

    let api = ApiClient::new(&base);
    println!("API: {}", api.base());

    views::run(&api, &mut session, &path)
}
