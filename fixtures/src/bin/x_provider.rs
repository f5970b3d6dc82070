use clap::Parser;
use fixtures::{run_server, x::XFixture, FixtureArgs};

/// Fake X (Twitter) OAuth2 provider and API fixture server
#[derive(Parser, Debug)]
#[clap(name = "x-provider-fixture")]
struct Cli {
    #[clap(flatten)]
    common: FixtureArgs,

    /// Client ID the fixture accepts
    #[arg(long, env = "CLIENT_ID", default_value = "fixture-client")]
    client_id: String,

    /// Client secret the fixture accepts
    #[arg(long, env = "CLIENT_SECRET", default_value = "fixture-secret")]
    client_secret: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let fixture = XFixture::new(args.client_id, args.client_secret);

    run_server(args.common, fixture.router()).await
}
