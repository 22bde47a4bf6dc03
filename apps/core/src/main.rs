#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match pixico_core::runtime::parse_cli_args(&args) {
        Ok(options) => options,
        Err(error) => error.exit(),
    };

    if let Err(error) = pixico_core::runtime::run_with_options(options).await {
        eprintln!("[pixico-search] runtime failed: {error}");
        std::process::exit(1);
    }
}
