use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cfg = ceremonium::config::Config::parse();
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(ceremonium::run(cfg))
}
