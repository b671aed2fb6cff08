use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "merkled")]
pub struct Config {
    /// Bind address for the HTTP server.
    #[arg(long, default_value = "0.0.0.0:8080")]
    pub bind: String,

    /// Largest number of leaves accepted in one request.
    #[arg(long, default_value_t = 100_000)]
    pub max_leaves: usize,

    /// Request body limit in bytes.
    #[arg(long, default_value_t = 16 * 1024 * 1024)]
    pub body_limit_bytes: usize,
}
